//! 数据库仓储层
//!
//! 封装 SQL 细节，仓储只负责数据读写，不包含业务逻辑。
//! 每个仓储都实现对应的 trait，服务层通过泛型参数依赖 trait 以便 mock 测试。

mod customer_repo;
mod event_repo;
mod link_repo;
mod program_repo;
mod traits;
mod user_repo;
mod webhook_repo;
mod workspace_repo;

pub use customer_repo::CustomerRepository;
pub use event_repo::EventRepository;
pub use link_repo::LinkRepository;
pub use program_repo::ProgramRepository;
pub use traits::*;
pub use user_repo::UserRepository;
pub use webhook_repo::WebhookRepository;
pub use workspace_repo::WorkspaceRepository;

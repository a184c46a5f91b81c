//! 领域模型
//!
//! 包含链接管理与合作伙伴计划的核心实体定义

pub mod customer;
pub mod enums;
pub mod event;
pub mod link;
pub mod program;
pub mod webhook;
pub mod workspace;

// 重新导出常用类型
pub use customer::Customer;
pub use enums::{EventKind, RewardType, WebhookTrigger};
pub use event::{ClickDetails, CustomerEvent, EventRow, TimeseriesRow, UrlCount};
pub use link::{AbTestVariant, Link, LinkSummary, TestCompletionCursor};
pub use program::{Discount, Program, ProgramWithRelations, Reward};
pub use webhook::Webhook;
pub use workspace::{ApiToken, Workspace};

//! HTTP 请求处理器
//!
//! 工作区 API 的处理器都依赖认证中间件注入的 `WorkspaceContext`

pub mod analytics;
pub mod customer;
pub mod health;
pub mod link;
pub mod program;

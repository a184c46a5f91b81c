//! 中间件模块
//!
//! - `workspace_auth`: 工作区 API Key 认证
//! - `partners`: 合作伙伴门户重定向与重写
//! - `security`: HTTP 安全头

pub mod partners;
pub mod security;
pub mod workspace_auth;

pub use partners::{
    DefaultPartnerResolver, PartnerPortalState, PortalAction, partners_middleware,
};
pub use security::security_headers;
pub use workspace_auth::{WorkspaceContext, workspace_auth_middleware};

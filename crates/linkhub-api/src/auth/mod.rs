//! 认证模块
//!
//! - `session`: 合作伙伴门户会话 JWT
//! - `api_key`: 工作区 API Key 哈希

pub mod api_key;
pub mod session;

pub use api_key::{extract_bearer_token, hash_api_key};
pub use session::{SessionClaims, SessionManager};

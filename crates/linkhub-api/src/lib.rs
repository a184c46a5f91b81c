//! Linkhub REST API 服务
//!
//! 对外提供工作区 API（客户活动、Program、A/B 测试、分析查询），
//! 同时承载合作伙伴门户的路由中间件。
//!
//! ## 模块结构
//!
//! - `auth`: 会话 JWT 与 API Key 哈希
//! - `dto`: 统一响应体和查询参数
//! - `error`: HTTP 错误类型
//! - `handlers`: HTTP 请求处理器
//! - `middleware`: 工作区认证、合作伙伴门户重定向/重写、安全头
//! - `routes`: 路由配置
//! - `state`: 应用状态
//! - `worker`: 后台任务

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod worker;

pub use dto::ApiResponse;
pub use error::{ApiError, Result};
pub use state::AppState;

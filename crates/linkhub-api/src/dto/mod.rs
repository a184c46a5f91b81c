//! 数据传输对象
//!
//! - `request`: 查询参数
//! - `response`: 统一响应体

pub mod request;
pub mod response;

pub use request::{AnalyticsQuery, ProgramQuery};
pub use response::ApiResponse;

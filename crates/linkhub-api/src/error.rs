//! API 错误类型定义

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use link_management::LinkError;

/// API 错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 认证错误
    #[error("未授权: {0}")]
    Unauthorized(String),

    // 验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),
    #[error("A/B 测试变体无效: {0}")]
    InvalidTestVariants(String),

    // 资源不存在
    #[error("客户不存在: {0}")]
    CustomerNotFound(String),
    #[error("短链不存在: {0}")]
    LinkNotFound(String),
    #[error("Program not found")]
    ProgramNotFound(String),
    #[error("奖励不存在: {0}")]
    RewardNotFound(String),
    #[error("工作区不存在: {0}")]
    WorkspaceNotFound(String),
    #[error("资源不存在: {0}")]
    NotFound(String),

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidTestVariants(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::CustomerNotFound(_)
            | Self::LinkNotFound(_)
            | Self::ProgramNotFound(_)
            | Self::RewardNotFound(_)
            | Self::WorkspaceNotFound(_)
            | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidTestVariants(_) => "INVALID_TEST_VARIANTS",
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::LinkNotFound(_) => "LINK_NOT_FOUND",
            Self::ProgramNotFound(_) => "PROGRAM_NOT_FOUND",
            Self::RewardNotFound(_) => "REWARD_NOT_FOUND",
            Self::WorkspaceNotFound(_) => "WORKSPACE_NOT_FOUND",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统错误只返回通用提示，详情写日志
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 从 JSON 序列化错误转换
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON 处理错误: {}", err))
    }
}

/// 从 link-management 的错误转换
impl From<LinkError> for ApiError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::CustomerNotFound(id) => Self::CustomerNotFound(id),
            LinkError::LinkNotFound(id) => Self::LinkNotFound(id),
            LinkError::ProgramNotFound(id) => Self::ProgramNotFound(id),
            LinkError::RewardNotFound(id) => Self::RewardNotFound(id),
            LinkError::WorkspaceNotFound(id) => Self::WorkspaceNotFound(id),
            LinkError::InvalidTestVariants(msg) => Self::InvalidTestVariants(msg),
            LinkError::Validation(msg) => Self::Validation(msg),
            LinkError::Database(e) => Self::Database(e),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// API 层 Result 类型别名
pub type Result<T> = std::result::Result<T, ApiError>;

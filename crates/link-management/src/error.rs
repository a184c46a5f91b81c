//! 链接管理服务错误类型
//!
//! 定义服务层的业务错误和系统错误

use thiserror::Error;

/// 链接管理服务错误类型
#[derive(Debug, Error)]
pub enum LinkError {
    // === 资源不存在 ===
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

    // === 业务错误 ===
    #[error("A/B 测试变体无效: {0}")]
    InvalidTestVariants(String),

    #[error("参数校验失败: {0}")]
    Validation(String),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Webhook 投递失败: {0}")]
    Webhook(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 链接管理服务 Result 类型别名
pub type Result<T> = std::result::Result<T, LinkError>;

impl LinkError {
    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Webhook(_))
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::Database(_) | Self::Serialization(_) | Self::Webhook(_) | Self::Internal(_)
        )
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::LinkNotFound(_) => "LINK_NOT_FOUND",
            Self::ProgramNotFound(_) => "PROGRAM_NOT_FOUND",
            Self::RewardNotFound(_) => "REWARD_NOT_FOUND",
            Self::WorkspaceNotFound(_) => "WORKSPACE_NOT_FOUND",
            Self::InvalidTestVariants(_) => "INVALID_TEST_VARIANTS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Webhook(_) => "WEBHOOK_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for LinkError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

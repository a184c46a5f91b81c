//! 回填工具错误类型

use thiserror::Error;

use link_management::LinkError;

#[derive(Debug, Error)]
pub enum StripeSyncError {
    #[error("未配置 Stripe 密钥 (livemode={livemode})")]
    MissingSecretKey { livemode: bool },

    #[error("Stripe 请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stripe 返回错误 {status}: {message}")]
    Api { status: u16, message: String },

    #[error("参数无效: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Store(#[from] LinkError),
}

pub type Result<T> = std::result::Result<T, StripeSyncError>;

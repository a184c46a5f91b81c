//! Webhook 投递

pub mod publisher;
pub mod signature;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::WebhookTrigger;

pub use publisher::{WebhookPayload, WebhookPublisher};
pub use signature::{sign_payload, verify_signature};

/// Webhook 分发接口
///
/// 服务层通过该接口发送事件，便于测试时替换
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookDispatcher: Send + Sync {
    /// 同步等待投递完成，返回成功投递数
    async fn send_workspace_webhook(
        &self,
        trigger: WebhookTrigger,
        workspace_id: &str,
        data: Value,
    ) -> Result<usize>;

    /// 后台投递，不等待结果，失败只记录日志
    fn publish_detached(&self, trigger: WebhookTrigger, workspace_id: String, data: Value);
}

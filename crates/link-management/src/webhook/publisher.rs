//! Webhook 发布器
//!
//! 找出工作区内订阅了该事件的 Webhook，签名后并发投递。
//! 单个 Webhook 失败只记录日志，不影响其它投递。

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use linkhub_shared::config::WebhookConfig;
use linkhub_shared::observability::metrics as app_metrics;

use super::WebhookDispatcher;
use super::signature::sign_payload;
use crate::error::{LinkError, Result};
use crate::models::{Webhook, WebhookTrigger};
use crate::repository::{WebhookRepository, WebhookRepositoryTrait};

/// 投递给订阅方的请求体
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub id: String,
    pub event: WebhookTrigger,
    pub created_at: DateTime<Utc>,
    pub data: Value,
}

impl WebhookPayload {
    pub fn new(trigger: WebhookTrigger, data: Value) -> Self {
        Self {
            id: format!("evt_{}", Uuid::new_v4().simple()),
            event: trigger,
            created_at: Utc::now(),
            data,
        }
    }
}

/// Webhook 发布器
pub struct WebhookPublisher<WR = WebhookRepository>
where
    WR: WebhookRepositoryTrait,
{
    repo: Arc<WR>,
    client: reqwest::Client,
    signature_header: String,
}

impl<WR> Clone for WebhookPublisher<WR>
where
    WR: WebhookRepositoryTrait,
{
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            client: self.client.clone(),
            signature_header: self.signature_header.clone(),
        }
    }
}

impl<WR> WebhookPublisher<WR>
where
    WR: WebhookRepositoryTrait + 'static,
{
    pub fn new(repo: Arc<WR>, config: &WebhookConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| LinkError::Internal(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            repo,
            client,
            signature_header: config.signature_header.clone(),
        })
    }

    /// 向工作区内订阅了 `trigger` 的 Webhook 投递，返回成功投递数
    #[instrument(skip(self, data), fields(trigger = %trigger))]
    pub async fn send_workspace_webhook(
        &self,
        trigger: WebhookTrigger,
        workspace_id: &str,
        data: Value,
    ) -> Result<usize> {
        let webhooks: Vec<Webhook> = self
            .repo
            .list_enabled_webhooks(workspace_id)
            .await?
            .into_iter()
            .filter(|hook| hook.subscribes_to(trigger))
            .collect();

        if webhooks.is_empty() {
            debug!(workspace_id = %workspace_id, "no webhook subscribed");
            return Ok(0);
        }

        let payload = WebhookPayload::new(trigger, data);
        let body = serde_json::to_vec(&payload)?;

        let results = join_all(
            webhooks
                .iter()
                .map(|hook| self.deliver(hook, trigger, &body)),
        )
        .await;

        let delivered = results.iter().filter(|r| r.is_ok()).count();
        for (hook, result) in webhooks.iter().zip(results) {
            if let Err(e) = result {
                warn!(webhook_id = %hook.id, url = %hook.url, error = %e, "webhook delivery failed");
            }
        }

        Ok(delivered)
    }

    async fn deliver(&self, hook: &Webhook, trigger: WebhookTrigger, body: &[u8]) -> Result<()> {
        let signature = sign_payload(&hook.secret, body)?;
        let start = Instant::now();

        let result = self
            .client
            .post(&hook.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(self.signature_header.as_str(), signature)
            .body(body.to_vec())
            .send()
            .await
            .and_then(|resp| resp.error_for_status());

        let elapsed = start.elapsed().as_secs_f64();
        match result {
            Ok(_) => {
                app_metrics::record_webhook_delivery(trigger.as_str(), "success", elapsed);
                Ok(())
            }
            Err(e) => {
                app_metrics::record_webhook_delivery(trigger.as_str(), "failure", elapsed);
                Err(LinkError::Webhook(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl<WR> WebhookDispatcher for WebhookPublisher<WR>
where
    WR: WebhookRepositoryTrait + 'static,
{
    async fn send_workspace_webhook(
        &self,
        trigger: WebhookTrigger,
        workspace_id: &str,
        data: Value,
    ) -> Result<usize> {
        WebhookPublisher::send_workspace_webhook(self, trigger, workspace_id, data).await
    }

    fn publish_detached(&self, trigger: WebhookTrigger, workspace_id: String, data: Value) {
        let publisher = self.clone();
        tokio::spawn(async move {
            if let Err(e) = publisher
                .send_workspace_webhook(trigger, &workspace_id, data)
                .await
            {
                warn!(workspace_id = %workspace_id, trigger = %trigger, error = %e, "webhook publish failed");
            }
        });
    }
}

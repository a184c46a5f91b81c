//! Webhook 订阅仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::WebhookRepositoryTrait;
use crate::error::Result;
use crate::models::Webhook;

pub struct WebhookRepository {
    pool: PgPool,
}

impl WebhookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 工作区下未禁用的 Webhook
    pub async fn list_enabled_webhooks(&self, workspace_id: &str) -> Result<Vec<Webhook>> {
        let webhooks = sqlx::query_as::<_, Webhook>(
            r#"
            SELECT id, project_id, name, url, secret, triggers, disabled_at
            FROM webhooks
            WHERE project_id = $1 AND disabled_at IS NULL
            ORDER BY created_at ASC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(webhooks)
    }
}

#[async_trait]
impl WebhookRepositoryTrait for WebhookRepository {
    async fn list_enabled_webhooks(&self, workspace_id: &str) -> Result<Vec<Webhook>> {
        self.list_enabled_webhooks(workspace_id).await
    }
}

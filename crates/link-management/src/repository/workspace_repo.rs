//! 工作区与 API Token 仓储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::traits::WorkspaceRepositoryTrait;
use crate::error::Result;
use crate::models::{ApiToken, Workspace};

/// 工作区仓储
pub struct WorkspaceRepository {
    pool: PgPool,
}

impl WorkspaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_workspace(&self, id: &str) -> Result<Option<Workspace>> {
        let workspace = sqlx::query_as::<_, Workspace>(
            r#"
            SELECT id, name, slug, logo, stripe_connect_id, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(workspace)
    }

    /// 按哈希后的 API Key 查找 Token
    pub async fn find_token_by_hash(&self, hashed_key: &str) -> Result<Option<ApiToken>> {
        let token = sqlx::query_as::<_, ApiToken>(
            r#"
            SELECT id, name, project_id, expires
            FROM tokens
            WHERE hashed_key = $1
            "#,
        )
        .bind(hashed_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    pub async fn touch_token(&self, id: &str, used_at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE tokens SET last_used = $2 WHERE id = $1")
            .bind(id)
            .bind(used_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl WorkspaceRepositoryTrait for WorkspaceRepository {
    async fn find_workspace(&self, id: &str) -> Result<Option<Workspace>> {
        self.find_workspace(id).await
    }

    async fn find_token_by_hash(&self, hashed_key: &str) -> Result<Option<ApiToken>> {
        self.find_token_by_hash(hashed_key).await
    }

    async fn touch_token(&self, id: &str, used_at: DateTime<Utc>) -> Result<()> {
        self.touch_token(id, used_at).await
    }
}

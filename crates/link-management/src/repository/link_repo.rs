//! 短链仓储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::traits::LinkRepositoryTrait;
use crate::error::{LinkError, Result};
use crate::models::{Link, TestCompletionCursor};

const LINK_COLUMNS: &str = r#"
    id, domain, key, url, short_link, archived, expires_at, project_id, title,
    image, geo, test_variants, test_started_at, test_completed_at, clicks, leads,
    sales, sale_amount, created_at, updated_at
"#;

/// 短链仓储
pub struct LinkRepository {
    pool: PgPool,
}

impl LinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_link(&self, id: &str) -> Result<Option<Link>> {
        let sql = format!("SELECT {} FROM links WHERE id = $1", LINK_COLUMNS);
        let link = sqlx::query_as::<_, Link>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(link)
    }

    pub async fn find_link_in_workspace(
        &self,
        workspace_id: &str,
        id: &str,
    ) -> Result<Option<Link>> {
        let sql = format!(
            "SELECT {} FROM links WHERE id = $1 AND project_id = $2",
            LINK_COLUMNS
        );
        let link = sqlx::query_as::<_, Link>(&sql)
            .bind(id)
            .bind(workspace_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(link)
    }

    /// 更新跳转目标并返回更新后的链接
    pub async fn update_url(&self, id: &str, url: &str) -> Result<Link> {
        let sql = format!(
            "UPDATE links SET url = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            LINK_COLUMNS
        );
        sqlx::query_as::<_, Link>(&sql)
            .bind(id)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| LinkError::LinkNotFound(id.to_string()))
    }

    pub async fn list_completed_tests(
        &self,
        after: &TestCompletionCursor,
        until: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Link>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM links
            WHERE test_variants IS NOT NULL
              AND test_completed_at <= $3
              AND (
                test_completed_at > $1
                OR ($2::TEXT IS NOT NULL AND test_completed_at = $1 AND id > $2)
              )
              AND archived = FALSE
            ORDER BY test_completed_at ASC, id ASC
            LIMIT $4
            "#,
            LINK_COLUMNS
        );
        let links = sqlx::query_as::<_, Link>(&sql)
            .bind(after.completed_at)
            .bind(after.link_id.as_deref())
            .bind(until)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(links)
    }
}

#[async_trait]
impl LinkRepositoryTrait for LinkRepository {
    async fn find_link(&self, id: &str) -> Result<Option<Link>> {
        self.find_link(id).await
    }

    async fn find_link_in_workspace(&self, workspace_id: &str, id: &str) -> Result<Option<Link>> {
        self.find_link_in_workspace(workspace_id, id).await
    }

    async fn update_url(&self, id: &str, url: &str) -> Result<Link> {
        self.update_url(id, url).await
    }

    async fn list_completed_tests(
        &self,
        after: &TestCompletionCursor,
        until: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Link>> {
        self.list_completed_tests(after, until, limit).await
    }
}

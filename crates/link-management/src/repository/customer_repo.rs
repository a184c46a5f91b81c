//! 客户仓储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::traits::CustomerRepositoryTrait;
use crate::error::Result;
use crate::models::Customer;

const CUSTOMER_COLUMNS: &str = r#"
    c.id, c.name, c.email, c.avatar, c.external_id, c.project_id,
    c.project_connect_id, c.stripe_customer_id, c.link_id, c.click_id,
    c.clicked_at, c.country, c.created_at, c.updated_at
"#;

/// 客户仓储
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 按工作区查找客户
    pub async fn find_customer(&self, workspace_id: &str, id: &str) -> Result<Option<Customer>> {
        let sql = format!(
            "SELECT {} FROM customers c WHERE c.id = $1 AND c.project_id = $2",
            CUSTOMER_COLUMNS
        );
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .bind(workspace_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// 列出 Connect 账户下待回填的客户
    pub async fn list_by_connect_account(
        &self,
        connect_id: &str,
        created_after: DateTime<Utc>,
        skip: i64,
        take: i64,
    ) -> Result<Vec<Customer>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM customers c
            WHERE c.project_connect_id = $1 AND c.created_at >= $2
            ORDER BY c.created_at ASC
            OFFSET $3 LIMIT $4
            "#,
            CUSTOMER_COLUMNS
        );
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(connect_id)
            .bind(created_after)
            .bind(skip)
            .bind(take)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    pub async fn set_stripe_customer_id(&self, id: &str, stripe_customer_id: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE customers
            SET stripe_customer_id = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(stripe_customer_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CustomerRepositoryTrait for CustomerRepository {
    async fn find_customer(&self, workspace_id: &str, id: &str) -> Result<Option<Customer>> {
        self.find_customer(workspace_id, id).await
    }

    async fn list_by_connect_account(
        &self,
        connect_id: &str,
        created_after: DateTime<Utc>,
        skip: i64,
        take: i64,
    ) -> Result<Vec<Customer>> {
        self.list_by_connect_account(connect_id, created_after, skip, take)
            .await
    }

    async fn set_stripe_customer_id(&self, id: &str, stripe_customer_id: &str) -> Result<()> {
        self.set_stripe_customer_id(id, stripe_customer_id).await
    }
}

//! 用户仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::UserRepositoryTrait;
use crate::error::Result;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_default_partner_id(&self, user_id: &str) -> Result<Option<String>> {
        let partner_id: Option<Option<String>> = sqlx::query_scalar(
            r#"
            SELECT COALESCE(
                u.default_partner_id,
                (SELECT pu.partner_id
                 FROM partner_users pu
                 WHERE pu.user_id = u.id
                 ORDER BY pu.created_at ASC
                 LIMIT 1)
            )
            FROM users u
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(partner_id.flatten())
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn find_default_partner_id(&self, user_id: &str) -> Result<Option<String>> {
        self.find_default_partner_id(user_id).await
    }
}

//! Program 仓储
//!
//! Program 及其折扣、奖励的数据访问

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::ProgramRepositoryTrait;
use crate::error::Result;
use crate::models::{Discount, Program, Reward};

/// Program 仓储
pub struct ProgramRepository {
    pool: PgPool,
}

impl ProgramRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 查找工作区下的 Program
    pub async fn find_program(&self, workspace_id: &str, id: &str) -> Result<Option<Program>> {
        let program = sqlx::query_as::<_, Program>(
            r#"
            SELECT id, workspace_id, name, slug, logo, brand_color, domain, url,
                   cookie_length, holding_period_days, default_reward_id,
                   created_at, updated_at
            FROM programs
            WHERE id = $1 AND workspace_id = $2
            "#,
        )
        .bind(id)
        .bind(workspace_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(program)
    }

    /// 按创建时间升序列出折扣
    pub async fn list_discounts(&self, program_id: &str) -> Result<Vec<Discount>> {
        let discounts = sqlx::query_as::<_, Discount>(
            r#"
            SELECT id, program_id, amount, type, max_duration, coupon_id,
                   coupon_test_id, created_at, updated_at
            FROM discounts
            WHERE program_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(program_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(discounts)
    }

    pub async fn find_reward(&self, id: &str) -> Result<Option<Reward>> {
        let reward = sqlx::query_as::<_, Reward>(
            r#"
            SELECT id, program_id, event, type, amount, max_duration, created_at, updated_at
            FROM rewards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reward)
    }
}

#[async_trait]
impl ProgramRepositoryTrait for ProgramRepository {
    async fn find_program(&self, workspace_id: &str, id: &str) -> Result<Option<Program>> {
        self.find_program(workspace_id, id).await
    }

    async fn list_discounts(&self, program_id: &str) -> Result<Vec<Discount>> {
        self.list_discounts(program_id).await
    }

    async fn find_reward(&self, id: &str) -> Result<Option<Reward>> {
        self.find_reward(id).await
    }
}

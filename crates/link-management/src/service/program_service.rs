//! Program 查询服务

use std::sync::Arc;

use tracing::instrument;

use crate::error::{LinkError, Result};
use crate::models::ProgramWithRelations;
use crate::repository::{ProgramRepository, ProgramRepositoryTrait};
use crate::service::dto::GetProgramOptions;

/// Program 查询服务
pub struct ProgramService<PR = ProgramRepository>
where
    PR: ProgramRepositoryTrait,
{
    programs: Arc<PR>,
}

impl<PR> ProgramService<PR>
where
    PR: ProgramRepositoryTrait,
{
    pub fn new(programs: Arc<PR>) -> Self {
        Self { programs }
    }

    /// 按工作区读取 Program，按需附带折扣和默认奖励
    ///
    /// 请求了默认奖励但奖励记录缺失时返回 `RewardNotFound`
    #[instrument(skip(self))]
    pub async fn get_program_or_throw(
        &self,
        workspace_id: &str,
        program_id: &str,
        options: GetProgramOptions,
    ) -> Result<ProgramWithRelations> {
        let program = self
            .programs
            .find_program(workspace_id, program_id)
            .await?
            .ok_or_else(|| LinkError::ProgramNotFound(program_id.to_string()))?;

        let discounts = if options.include_discounts {
            Some(self.programs.list_discounts(&program.id).await?)
        } else {
            None
        };

        let rewards = match (&program.default_reward_id, options.include_default_reward) {
            (Some(reward_id), true) => {
                let reward = self
                    .programs
                    .find_reward(reward_id)
                    .await?
                    .ok_or_else(|| LinkError::RewardNotFound(reward_id.clone()))?;
                Some(vec![reward])
            }
            _ => None,
        };

        Ok(ProgramWithRelations {
            program,
            discounts,
            rewards,
        })
    }
}

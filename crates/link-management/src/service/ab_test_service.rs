//! A/B 测试完成服务
//!
//! 测试结束后统计各变体在测试期间的线索数，线索最多的变体成为短链的新目标地址。
//!
//! ## 流程
//!
//! 1. 检查链接是否有测试变体和结束时间 -> 2. 统计线索 -> 3. 选出胜出者
//! -> 4. 更新链接 -> 5. 后台发送 `link.updated` Webhook

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use linkhub_shared::observability::metrics as app_metrics;

use crate::error::{LinkError, Result};
use crate::links::{AbTestVariants, CaseSensitivity, select_winner};
use crate::models::{AbTestVariant, Link, TestCompletionCursor, WebhookTrigger};
use crate::repository::{
    EventRepository, EventRepositoryTrait, LinkRepository, LinkRepositoryTrait,
    WorkspaceRepository, WorkspaceRepositoryTrait,
};
use crate::service::dto::AbTestOutcome;
use crate::webhook::{WebhookDispatcher, WebhookPublisher};

/// A/B 测试完成服务
pub struct AbTestService<
    LR = LinkRepository,
    ER = EventRepository,
    WR = WorkspaceRepository,
    D = WebhookPublisher,
> where
    LR: LinkRepositoryTrait,
    ER: EventRepositoryTrait,
    WR: WorkspaceRepositoryTrait,
    D: WebhookDispatcher,
{
    links: Arc<LR>,
    events: Arc<ER>,
    workspaces: Arc<WR>,
    webhooks: Arc<D>,
    case_sensitivity: CaseSensitivity,
}

impl<LR, ER, WR, D> AbTestService<LR, ER, WR, D>
where
    LR: LinkRepositoryTrait,
    ER: EventRepositoryTrait,
    WR: WorkspaceRepositoryTrait,
    D: WebhookDispatcher,
{
    pub fn new(
        links: Arc<LR>,
        events: Arc<ER>,
        workspaces: Arc<WR>,
        webhooks: Arc<D>,
        case_sensitivity: CaseSensitivity,
    ) -> Self {
        Self {
            links,
            events,
            workspaces,
            webhooks,
            case_sensitivity,
        }
    }

    /// 完成工作区内指定链接的 A/B 测试
    pub async fn complete_ab_test_by_id(
        &self,
        workspace_id: &str,
        link_id: &str,
    ) -> Result<AbTestOutcome> {
        let link = self
            .links
            .find_link_in_workspace(workspace_id, link_id)
            .await?
            .ok_or_else(|| LinkError::LinkNotFound(link_id.to_string()))?;

        self.complete_ab_tests(&link).await
    }

    /// 完成单个链接的 A/B 测试
    #[instrument(skip(self, link), fields(link_id = %link.id))]
    pub async fn complete_ab_tests(&self, link: &Link) -> Result<AbTestOutcome> {
        let outcome = self.evaluate(link).await;
        match &outcome {
            Ok(outcome) => app_metrics::record_ab_test_completion(outcome.as_str()),
            Err(_) => app_metrics::record_ab_test_completion("error"),
        }
        outcome
    }

    async fn evaluate(&self, link: &Link) -> Result<AbTestOutcome> {
        let (Some(raw_variants), Some(completed_at), Some(workspace_id)) = (
            link.test_variants.as_ref(),
            link.test_completed_at,
            link.project_id.as_deref(),
        ) else {
            return Ok(AbTestOutcome::Skipped);
        };

        let variants = AbTestVariants::parse(raw_variants)?;
        let started_at = self.test_start(link, workspace_id).await?;

        let counts = self
            .events
            .count_leads_by_url(&link.id, started_at, completed_at)
            .await?;

        // ThreadRng 不是 Send，必须在下一个 await 之前释放
        let winner: Option<AbTestVariant> = {
            let mut rng = rand::rng();
            select_winner(variants.variants(), &counts, &mut rng).cloned()
        };

        let Some(winner) = winner else {
            info!("no leads recorded during the A/B test, keeping current destination");
            return Ok(AbTestOutcome::NoLeads);
        };

        if winner.url == link.url {
            return Ok(AbTestOutcome::AlreadyWinner { url: winner.url });
        }

        let updated = self.links.update_url(&link.id, &winner.url).await?;
        info!(previous_url = %link.url, url = %winner.url, "A/B test winner applied");

        let payload = serde_json::to_value(self.case_sensitivity.decode_link(updated))?;
        self.webhooks
            .publish_detached(WebhookTrigger::LinkUpdated, workspace_id.to_string(), payload);

        Ok(AbTestOutcome::Updated {
            previous_url: link.url.clone(),
            url: winner.url,
        })
    }

    /// 测试开始时间，缺失时以工作区创建时间代替
    async fn test_start(&self, link: &Link, workspace_id: &str) -> Result<DateTime<Utc>> {
        if let Some(started_at) = link.test_started_at {
            return Ok(started_at);
        }
        let workspace = self
            .workspaces
            .find_workspace(workspace_id)
            .await?
            .ok_or_else(|| LinkError::WorkspaceNotFound(workspace_id.to_string()))?;
        Ok(workspace.created_at)
    }

    /// 处理游标之后、`until` 之前（含）结束的测试，单轮最多 `limit` 个
    ///
    /// 单个链接失败只记录日志。取满一批时游标停在最后一个链接上，
    /// 同一时刻结束的其余链接留给下一轮
    pub async fn complete_window(
        &self,
        after: TestCompletionCursor,
        until: DateTime<Utc>,
        limit: i64,
    ) -> Result<WindowReport> {
        let links = self.links.list_completed_tests(&after, until, limit).await?;
        let saturated = i64::try_from(links.len()).is_ok_and(|n| n >= limit);
        let last = links
            .last()
            .and_then(|l| l.test_completed_at.map(|at| (at, l.id.clone())));
        let next = match last {
            Some((at, id)) if saturated => TestCompletionCursor::after_link(at, id),
            _ => TestCompletionCursor::after(until),
        };

        let mut outcomes = Vec::with_capacity(links.len());
        for link in links {
            match self.complete_ab_tests(&link).await {
                Ok(outcome) => outcomes.push((link.id, outcome)),
                Err(e) => warn!(link_id = %link.id, error = %e, "failed to complete A/B test"),
            }
        }

        Ok(WindowReport { outcomes, next })
    }
}

/// 一轮窗口扫描的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowReport {
    /// 成功处理的链接及结果
    pub outcomes: Vec<(String, AbTestOutcome)>,
    /// 下一轮扫描的游标
    pub next: TestCompletionCursor,
}

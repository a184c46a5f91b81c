//! 分析查询服务
//!
//! 把查询参数解析为时间区间和分桶粒度，再交给事件仓储聚合

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::analytics::{AnalyticsInterval, Granularity, bucket_starts, format_date_tooltip};
use crate::error::{LinkError, Result};
use crate::repository::{
    EventFilter, EventRepository, EventRepositoryTrait, WorkspaceRepository,
    WorkspaceRepositoryTrait,
};
use crate::service::dto::{AnalyticsGroupBy, AnalyticsRequest, AnalyticsResponse, TimeseriesPoint};

/// top_urls 返回条数上限
pub const TOP_URLS_LIMIT: i64 = 50;

/// 查询解析后的时间窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub granularity: Granularity,
}

pub struct AnalyticsService<ER = EventRepository, WR = WorkspaceRepository>
where
    ER: EventRepositoryTrait,
    WR: WorkspaceRepositoryTrait,
{
    events: Arc<ER>,
    workspaces: Arc<WR>,
}

impl<ER, WR> AnalyticsService<ER, WR>
where
    ER: EventRepositoryTrait,
    WR: WorkspaceRepositoryTrait,
{
    pub fn new(events: Arc<ER>, workspaces: Arc<WR>) -> Self {
        Self { events, workspaces }
    }

    /// 解析时间窗口，显式 start/end 优先于 interval，二者都缺省时为最近 24 小时
    pub async fn resolve_range(
        &self,
        workspace_id: &str,
        request: &AnalyticsRequest,
        now: DateTime<Utc>,
    ) -> Result<ResolvedRange> {
        if let Some((start, end)) = request.custom_range()? {
            return Ok(ResolvedRange {
                start,
                end,
                granularity: Granularity::for_range(start, end),
            });
        }

        let interval = request.interval.unwrap_or(AnalyticsInterval::Last24Hours);
        let data_available_from = if interval == AnalyticsInterval::All {
            self.workspaces
                .find_workspace(workspace_id)
                .await?
                .ok_or_else(|| LinkError::WorkspaceNotFound(workspace_id.to_string()))?
                .created_at
        } else {
            now
        };

        let (start, end) = interval.range(now, data_available_from);
        Ok(ResolvedRange {
            start,
            end,
            granularity: interval.granularity(),
        })
    }

    #[instrument(skip(self, request), fields(event = ?request.event, group_by = ?request.group_by))]
    pub async fn query(
        &self,
        workspace_id: &str,
        request: &AnalyticsRequest,
        now: DateTime<Utc>,
    ) -> Result<AnalyticsResponse> {
        let range = self.resolve_range(workspace_id, request, now).await?;
        let filter = EventFilter {
            workspace_id: workspace_id.to_string(),
            kind: request.event.into(),
            link_id: request.link_id.clone(),
            start: range.start,
            end: range.end,
        };

        match request.group_by {
            AnalyticsGroupBy::TopUrls => {
                let urls = self.events.top_urls(&filter, TOP_URLS_LIMIT).await?;
                Ok(AnalyticsResponse::TopUrls(urls))
            }
            AnalyticsGroupBy::Timeseries => {
                let rows = self.events.timeseries(&filter, range.granularity).await?;
                let by_bucket: HashMap<DateTime<Utc>, (i64, i64)> = rows
                    .into_iter()
                    .map(|r| (r.bucket, (r.count, r.sale_amount)))
                    .collect();

                let points = bucket_starts(range.start, range.end, range.granularity)
                    .into_iter()
                    .map(|bucket| {
                        let (count, sale_amount) =
                            by_bucket.get(&bucket).copied().unwrap_or((0, 0));
                        TimeseriesPoint {
                            start: bucket,
                            tooltip: format_date_tooltip(
                                bucket,
                                request.interval,
                                request.start,
                                request.end,
                            ),
                            count,
                            sale_amount,
                        }
                    })
                    .collect();

                Ok(AnalyticsResponse::Timeseries(points))
            }
        }
    }
}

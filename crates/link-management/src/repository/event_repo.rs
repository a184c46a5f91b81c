//! 事件仓储
//!
//! 客户时间线、A/B 测试线索统计和分析聚合都读取 events 表

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::traits::{EventFilter, EventRepositoryTrait};
use crate::analytics::Granularity;
use crate::error::Result;
use crate::models::{EventKind, EventRow, TimeseriesRow, UrlCount};

/// 事件仓储
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 客户事件，最新的在前
    pub async fn list_customer_events(
        &self,
        customer_id: &str,
        limit: i64,
    ) -> Result<Vec<EventRow>> {
        let events = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, event, timestamp, link_id, click_id, url, country, city,
                   device, browser, os, referer, referer_url, event_name, metadata,
                   sale_amount, currency, invoice_id, payment_processor
            FROM events
            WHERE customer_id = $1
            ORDER BY timestamp DESC
            LIMIT $2
            "#,
        )
        .bind(customer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    pub async fn count_leads_by_url(
        &self,
        link_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<UrlCount>> {
        let counts = sqlx::query_as::<_, UrlCount>(
            r#"
            SELECT url, COUNT(*) AS count
            FROM events
            WHERE link_id = $1
              AND event = $2
              AND url IS NOT NULL
              AND timestamp >= $3 AND timestamp <= $4
            GROUP BY url
            "#,
        )
        .bind(link_id)
        .bind(EventKind::Lead)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// 按粒度聚合事件数和成交金额，只返回有数据的桶
    pub async fn timeseries(
        &self,
        filter: &EventFilter,
        granularity: Granularity,
    ) -> Result<Vec<TimeseriesRow>> {
        let rows = sqlx::query_as::<_, TimeseriesRow>(
            r#"
            SELECT date_trunc($1, timestamp, 'UTC') AS bucket,
                   COUNT(*) AS count,
                   COALESCE(SUM(sale_amount), 0)::BIGINT AS sale_amount
            FROM events
            WHERE workspace_id = $2
              AND event = $3
              AND ($4::TEXT IS NULL OR link_id = $4)
              AND timestamp >= $5 AND timestamp < $6
            GROUP BY bucket
            ORDER BY bucket ASC
            "#,
        )
        .bind(granularity.as_pg_unit())
        .bind(&filter.workspace_id)
        .bind(filter.kind)
        .bind(filter.link_id.as_deref())
        .bind(filter.start)
        .bind(filter.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn top_urls(&self, filter: &EventFilter, limit: i64) -> Result<Vec<UrlCount>> {
        let rows = sqlx::query_as::<_, UrlCount>(
            r#"
            SELECT url, COUNT(*) AS count
            FROM events
            WHERE workspace_id = $1
              AND event = $2
              AND ($3::TEXT IS NULL OR link_id = $3)
              AND timestamp >= $4 AND timestamp < $5
              AND url IS NOT NULL
            GROUP BY url
            ORDER BY count DESC, url ASC
            LIMIT $6
            "#,
        )
        .bind(&filter.workspace_id)
        .bind(filter.kind)
        .bind(filter.link_id.as_deref())
        .bind(filter.start)
        .bind(filter.end)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl EventRepositoryTrait for EventRepository {
    async fn list_customer_events(&self, customer_id: &str, limit: i64) -> Result<Vec<EventRow>> {
        self.list_customer_events(customer_id, limit).await
    }

    async fn count_leads_by_url(
        &self,
        link_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<UrlCount>> {
        self.count_leads_by_url(link_id, start, end).await
    }

    async fn timeseries(
        &self,
        filter: &EventFilter,
        granularity: Granularity,
    ) -> Result<Vec<TimeseriesRow>> {
        self.timeseries(filter, granularity).await
    }

    async fn top_urls(&self, filter: &EventFilter, limit: i64) -> Result<Vec<UrlCount>> {
        self.top_urls(filter, limit).await
    }
}

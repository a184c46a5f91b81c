//! 转化事件实体
//!
//! 点击、线索、成交三类事件共用一张 events 表，
//! 读出后组装为带点击上下文的 [`CustomerEvent`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::enums::EventKind;

/// events 表行
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    pub id: String,
    pub event: EventKind,
    pub timestamp: DateTime<Utc>,
    pub link_id: String,
    #[sqlx(default)]
    pub click_id: Option<String>,
    #[sqlx(default)]
    pub url: Option<String>,
    #[sqlx(default)]
    pub country: Option<String>,
    #[sqlx(default)]
    pub city: Option<String>,
    #[sqlx(default)]
    pub device: Option<String>,
    #[sqlx(default)]
    pub browser: Option<String>,
    #[sqlx(default)]
    pub os: Option<String>,
    #[sqlx(default)]
    pub referer: Option<String>,
    #[sqlx(default)]
    pub referer_url: Option<String>,
    #[sqlx(default)]
    pub event_name: Option<String>,
    #[sqlx(default)]
    pub metadata: Option<String>,
    #[sqlx(default)]
    pub sale_amount: Option<i64>,
    #[sqlx(default)]
    pub currency: Option<String>,
    #[sqlx(default)]
    pub invoice_id: Option<String>,
    #[sqlx(default)]
    pub payment_processor: Option<String>,
}

/// 事件发生时的点击上下文
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClickDetails {
    pub id: Option<String>,
    pub url: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub device: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    /// 来源域名，直接访问时为 `(direct)`
    pub referer: Option<String>,
    pub referer_url: Option<String>,
}

/// 客户活动时间线中的单个事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerEvent {
    #[validate(length(min = 1))]
    pub id: String,
    pub event: EventKind,
    pub timestamp: DateTime<Utc>,
    #[validate(length(min = 1))]
    pub link_id: String,
    #[validate(nested)]
    pub click: ClickDetails,
    pub event_name: Option<String>,
    /// 业务方上报的原始 JSON 字符串
    pub metadata: Option<String>,
    /// 成交金额（分）
    #[validate(range(min = 0))]
    pub sale_amount: Option<i64>,
    pub currency: Option<String>,
    pub invoice_id: Option<String>,
    pub payment_processor: Option<String>,
}

impl CustomerEvent {
    pub fn is_sale(&self) -> bool {
        self.event == EventKind::Sale
    }
}

impl From<EventRow> for CustomerEvent {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            event: row.event,
            timestamp: row.timestamp,
            link_id: row.link_id,
            click: ClickDetails {
                id: row.click_id,
                url: row.url,
                country: row.country,
                city: row.city,
                device: row.device,
                browser: row.browser,
                os: row.os,
                referer: row.referer,
                referer_url: row.referer_url,
            },
            event_name: row.event_name,
            metadata: row.metadata,
            sale_amount: row.sale_amount,
            currency: row.currency,
            invoice_id: row.invoice_id,
            payment_processor: row.payment_processor,
        }
    }
}

/// 按目标地址聚合的事件数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UrlCount {
    pub url: String,
    pub count: i64,
}

/// 时间序列聚合行
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TimeseriesRow {
    pub bucket: DateTime<Utc>,
    pub count: i64,
    pub sale_amount: i64,
}

//! 服务层数据传输对象

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::analytics::AnalyticsInterval;
use crate::error::LinkError;
use crate::models::{CustomerEvent, EventKind, LinkSummary, UrlCount};

/// 客户活动
///
/// 时间字段均为毫秒
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerActivityResponse {
    /// 生命周期价值（分）
    #[validate(range(min = 0))]
    pub ltv: i64,
    pub time_to_lead: Option<i64>,
    pub time_to_sale: Option<i64>,
    #[validate(nested)]
    pub events: Vec<CustomerEvent>,
    /// 最早事件对应的短链
    #[validate(nested)]
    pub link: Option<LinkSummary>,
}

/// Program 查询选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProgramOptions {
    #[serde(default)]
    pub include_discounts: bool,
    #[serde(default)]
    pub include_default_reward: bool,
}

/// A/B 测试完成结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AbTestOutcome {
    /// 链接没有进行中的测试，或缺少必要字段
    Skipped,
    /// 测试期间没有任何线索
    NoLeads,
    /// 胜出者就是当前目标地址
    AlreadyWinner { url: String },
    #[serde(rename_all = "camelCase")]
    Updated { previous_url: String, url: String },
}

impl AbTestOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::NoLeads => "no_leads",
            Self::AlreadyWinner { .. } => "already_winner",
            Self::Updated { .. } => "updated",
        }
    }
}

/// 分析事件类型（复数形式，与查询参数一致）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsEvent {
    #[default]
    Clicks,
    Leads,
    Sales,
}

impl From<AnalyticsEvent> for EventKind {
    fn from(event: AnalyticsEvent) -> Self {
        match event {
            AnalyticsEvent::Clicks => EventKind::Click,
            AnalyticsEvent::Leads => EventKind::Lead,
            AnalyticsEvent::Sales => EventKind::Sale,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsGroupBy {
    #[default]
    Timeseries,
    TopUrls,
}

/// 分析查询
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsRequest {
    pub event: AnalyticsEvent,
    pub group_by: AnalyticsGroupBy,
    pub link_id: Option<String>,
    pub interval: Option<AnalyticsInterval>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl AnalyticsRequest {
    /// start 与 end 必须同时出现且 start 早于 end
    pub fn custom_range(&self) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, LinkError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start < end => Ok(Some((start, end))),
            (Some(_), Some(_)) => Err(LinkError::Validation(
                "start must be earlier than end".to_string(),
            )),
            (None, None) => Ok(None),
            _ => Err(LinkError::Validation(
                "start and end must be provided together".to_string(),
            )),
        }
    }
}

/// 时间序列中的一个桶
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesPoint {
    pub start: DateTime<Utc>,
    pub tooltip: String,
    pub count: i64,
    pub sale_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnalyticsResponse {
    Timeseries(Vec<TimeseriesPoint>),
    TopUrls(Vec<UrlCount>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_ab_outcome_serialization() {
        let outcome = AbTestOutcome::Updated {
            previous_url: "https://a.example.com".into(),
            url: "https://b.example.com".into(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["outcome"], "updated");
        assert_eq!(value["previousUrl"], "https://a.example.com");
        assert_eq!(outcome.as_str(), "updated");

        let value = serde_json::to_value(AbTestOutcome::NoLeads).unwrap();
        assert_eq!(value["outcome"], "no_leads");
    }

    #[test]
    fn test_custom_range_rules() {
        let now = Utc::now();
        let mut req = AnalyticsRequest::default();
        assert_eq!(req.custom_range().unwrap(), None);

        req.start = Some(now - Duration::days(1));
        assert!(req.custom_range().is_err());

        req.end = Some(now);
        assert!(req.custom_range().unwrap().is_some());

        req.end = req.start.map(|s| s - Duration::hours(1));
        assert!(req.custom_range().is_err());
    }

    #[test]
    fn test_activity_validation_rejects_negative_ltv() {
        let response = CustomerActivityResponse {
            ltv: -1,
            time_to_lead: None,
            time_to_sale: None,
            events: vec![],
            link: None,
        };
        assert!(response.validate().is_err());
    }
}

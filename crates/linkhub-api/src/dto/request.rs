//! 请求参数 DTO

use chrono::{DateTime, Utc};
use serde::Deserialize;

use link_management::analytics::AnalyticsInterval;
use link_management::service::{
    AnalyticsEvent, AnalyticsGroupBy, AnalyticsRequest, GetProgramOptions,
};

use crate::error::ApiError;

/// `GET /api/programs/{id}` 查询参数
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramQuery {
    #[serde(default)]
    pub include_discounts: bool,
    #[serde(default)]
    pub include_default_reward: bool,
}

impl From<ProgramQuery> for GetProgramOptions {
    fn from(query: ProgramQuery) -> Self {
        Self {
            include_discounts: query.include_discounts,
            include_default_reward: query.include_default_reward,
        }
    }
}

/// `GET /api/analytics` 查询参数
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    #[serde(default)]
    pub event: AnalyticsEvent,
    #[serde(default)]
    pub group_by: AnalyticsGroupBy,
    pub link_id: Option<String>,
    pub interval: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TryFrom<AnalyticsQuery> for AnalyticsRequest {
    type Error = ApiError;

    fn try_from(query: AnalyticsQuery) -> Result<Self, Self::Error> {
        let interval = query
            .interval
            .as_deref()
            .map(str::parse::<AnalyticsInterval>)
            .transpose()?;

        Ok(Self {
            event: query.event,
            group_by: query.group_by,
            link_id: query.link_id,
            interval,
            start: query.start,
            end: query.end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analytics_query_conversion() {
        let query = AnalyticsQuery {
            event: AnalyticsEvent::Leads,
            interval: Some("30d".into()),
            ..Default::default()
        };
        let request = AnalyticsRequest::try_from(query).unwrap();
        assert_eq!(request.interval, Some(AnalyticsInterval::Last30Days));
        assert_eq!(request.group_by, AnalyticsGroupBy::Timeseries);

        let bad = AnalyticsQuery {
            interval: Some("fortnight".into()),
            ..Default::default()
        };
        assert!(matches!(
            AnalyticsRequest::try_from(bad),
            Err(ApiError::Validation(_))
        ));
    }
}

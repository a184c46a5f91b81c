//! 分析时间范围与分桶粒度

use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LinkError;

/// 预设时间范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalyticsInterval {
    #[serde(rename = "24h")]
    Last24Hours,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "1y")]
    LastYear,
    #[serde(rename = "all")]
    All,
}

impl AnalyticsInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Last24Hours => "24h",
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
            Self::Last90Days => "90d",
            Self::YearToDate => "ytd",
            Self::LastYear => "1y",
            Self::All => "all",
        }
    }

    /// 预设范围对应的分桶粒度
    pub fn granularity(&self) -> Granularity {
        match self {
            Self::Last24Hours => Granularity::Hour,
            Self::Last7Days | Self::Last30Days | Self::Last90Days => Granularity::Day,
            Self::YearToDate | Self::LastYear | Self::All => Granularity::Month,
        }
    }

    /// 计算 [start, end) 区间
    ///
    /// `data_available_from` 为工作区创建时间，`all` 从该时间开始
    pub fn range(
        &self,
        now: DateTime<Utc>,
        data_available_from: DateTime<Utc>,
    ) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = match self {
            Self::Last24Hours => now - Duration::hours(24),
            Self::Last7Days => now - Duration::days(7),
            Self::Last30Days => now - Duration::days(30),
            Self::Last90Days => now - Duration::days(90),
            Self::YearToDate => NaiveDate::from_ymd_opt(now.year(), 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc())
                .unwrap_or(now),
            Self::LastYear => now - Duration::days(365),
            Self::All => data_available_from,
        };
        (start, now)
    }
}

impl FromStr for AnalyticsInterval {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "24h" => Ok(Self::Last24Hours),
            "7d" => Ok(Self::Last7Days),
            "30d" => Ok(Self::Last30Days),
            "90d" => Ok(Self::Last90Days),
            "ytd" => Ok(Self::YearToDate),
            "1y" => Ok(Self::LastYear),
            "all" => Ok(Self::All),
            other => Err(LinkError::Validation(format!("unknown interval: {}", other))),
        }
    }
}

/// 区间跨度（取绝对值），不足一天的部分也计入
pub fn range_span(start: DateTime<Utc>, end: DateTime<Utc>) -> Duration {
    (end - start).abs()
}

/// 时间序列分桶粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,
    Day,
    Month,
}

impl Granularity {
    /// PostgreSQL date_trunc 的单位
    pub fn as_pg_unit(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Month => "month",
        }
    }

    /// 自定义区间按跨度选择粒度：两天内按小时，90 天内按天，否则按月
    pub fn for_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let span = range_span(start, end);
        if span <= Duration::days(2) {
            Self::Hour
        } else if span <= Duration::days(90) {
            Self::Day
        } else {
            Self::Month
        }
    }

    /// 截断到桶起点
    pub fn truncate(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let hour_start = at
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(at);
        match self {
            Self::Hour => hour_start,
            Self::Day => hour_start.with_hour(0).unwrap_or(hour_start),
            Self::Month => NaiveDate::from_ymd_opt(at.year(), at.month(), 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc())
                .unwrap_or(hour_start),
        }
    }

    fn next(&self, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Hour => Some(at + Duration::hours(1)),
            Self::Day => Some(at + Duration::days(1)),
            Self::Month => at.checked_add_months(Months::new(1)),
        }
    }
}

/// 列出 [start, end) 覆盖的全部桶起点
pub fn bucket_starts(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    granularity: Granularity,
) -> Vec<DateTime<Utc>> {
    let mut buckets = Vec::new();
    let mut cursor = granularity.truncate(start);
    while cursor < end {
        buckets.push(cursor);
        match granularity.next(cursor) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    buckets
}

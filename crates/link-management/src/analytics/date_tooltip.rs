//! 分析图表悬浮提示的日期格式

use chrono::{DateTime, Duration, Utc};

use super::interval::{AnalyticsInterval, range_span};

const TIME_FORMAT: &str = "%-I:%M %p";
const MONTH_YEAR_FORMAT: &str = "%b %Y";
const DAY_FORMAT: &str = "%a, %b %-d";

/// 按查询范围格式化桶时间
///
/// 显式给出 start/end 时按跨度决定：两天内显示时刻，超过 180 天显示月份；
/// 否则按预设范围：`24h` 显示时刻，`ytd`/`1y`/`all` 显示月份；
/// 其余情况显示 `Mon, Jan 5` 形式的日期
pub fn format_date_tooltip(
    date: DateTime<Utc>,
    interval: Option<AnalyticsInterval>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> String {
    if let (Some(start), Some(end)) = (start, end) {
        let span = range_span(start, end);
        if span <= Duration::days(2) {
            return date.format(TIME_FORMAT).to_string();
        }
        if span > Duration::days(180) {
            return date.format(MONTH_YEAR_FORMAT).to_string();
        }
    } else if let Some(interval) = interval {
        match interval {
            AnalyticsInterval::Last24Hours => return date.format(TIME_FORMAT).to_string(),
            AnalyticsInterval::YearToDate
            | AnalyticsInterval::LastYear
            | AnalyticsInterval::All => return date.format(MONTH_YEAR_FORMAT).to_string(),
            _ => {}
        }
    }

    date.format(DAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 5, 15, 5, 0).unwrap()
    }

    #[test]
    fn test_short_custom_range_shows_time() {
        let start = sample() - Duration::hours(20);
        let end = sample() + Duration::hours(4);
        assert_eq!(format_date_tooltip(sample(), None, Some(start), Some(end)), "3:05 PM");
    }

    #[test]
    fn test_long_custom_range_shows_month() {
        let start = sample() - Duration::days(200);
        let end = sample();
        assert_eq!(
            format_date_tooltip(sample(), Some(AnalyticsInterval::Last24Hours), Some(start), Some(end)),
            "Jan 2024"
        );
    }

    #[test]
    fn test_medium_custom_range_ignores_interval() {
        let start = sample() - Duration::days(30);
        let end = sample();
        // start/end 优先，interval 不参与判断
        assert_eq!(
            format_date_tooltip(sample(), Some(AnalyticsInterval::All), Some(start), Some(end)),
            "Fri, Jan 5"
        );
    }

    #[test]
    fn test_interval_formats() {
        assert_eq!(
            format_date_tooltip(sample(), Some(AnalyticsInterval::Last24Hours), None, None),
            "3:05 PM"
        );
        for interval in [
            AnalyticsInterval::YearToDate,
            AnalyticsInterval::LastYear,
            AnalyticsInterval::All,
        ] {
            assert_eq!(format_date_tooltip(sample(), Some(interval), None, None), "Jan 2024");
        }
        assert_eq!(
            format_date_tooltip(sample(), Some(AnalyticsInterval::Last7Days), None, None),
            "Fri, Jan 5"
        );
        assert_eq!(format_date_tooltip(sample(), None, None, None), "Fri, Jan 5");
    }

    #[test]
    fn test_partial_days_count_toward_span() {
        let d = sample();
        // 49 小时仍超过两天，不再显示时刻
        assert_eq!(
            format_date_tooltip(d, None, Some(d), Some(d + Duration::hours(49))),
            "Fri, Jan 5"
        );
        assert_eq!(
            format_date_tooltip(d, None, Some(d), Some(d + Duration::hours(71))),
            "Fri, Jan 5"
        );
        assert_eq!(
            format_date_tooltip(d, None, Some(d), Some(d + Duration::hours(48))),
            "3:05 PM"
        );
    }

    #[test]
    fn test_just_over_180_days_shows_month() {
        let d = sample();
        assert_eq!(
            format_date_tooltip(d, None, Some(d), Some(d + Duration::days(180) + Duration::hours(1))),
            "Jan 2024"
        );
        assert_eq!(
            format_date_tooltip(d, None, Some(d), Some(d + Duration::days(180))),
            "Fri, Jan 5"
        );
        // 反向区间按绝对跨度处理
        assert_eq!(
            format_date_tooltip(d, None, Some(d + Duration::days(200)), Some(d)),
            "Jan 2024"
        );
    }
}

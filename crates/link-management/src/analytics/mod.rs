//! 分析查询辅助：时间范围、分桶、悬浮提示

pub mod date_tooltip;
pub mod interval;

pub use date_tooltip::format_date_tooltip;
pub use interval::{AnalyticsInterval, Granularity, bucket_starts, range_span};

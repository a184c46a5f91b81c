//! CLI 参数定义

use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;

use crate::backfill::BackfillOptions;

/// Stripe 客户回填工具
///
/// 为 Connect 账户下还没有关联 Stripe 客户的线索客户按邮箱补齐 `stripe_customer_id`
#[derive(Parser, Debug)]
#[command(name = "stripe-backfill")]
#[command(version, about = "回填线索客户的 Stripe 客户 ID")]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Stripe Connect 账户 ID
    #[arg(long)]
    pub stripe_account: String,

    /// 只处理该时间之后创建的客户（YYYY-MM-DD 或 RFC 3339）
    #[arg(long, value_parser = parse_created_after)]
    pub created_after: DateTime<Utc>,

    /// 跳过的客户数
    #[arg(long, default_value_t = 0)]
    pub skip: i64,

    /// 本次处理的客户数
    #[arg(long, default_value_t = 10)]
    pub take: i64,

    /// 使用生产环境密钥
    #[arg(long)]
    pub livemode: bool,

    /// 只查询，不写库
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn options(&self) -> BackfillOptions {
        BackfillOptions {
            stripe_account: self.stripe_account.clone(),
            created_after: self.created_after,
            skip: self.skip.max(0),
            take: self.take.max(0),
            dry_run: self.dry_run,
        }
    }
}

/// 日期按 UTC 零点解释
pub fn parse_created_after(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
        .ok_or_else(|| format!("invalid date '{}', expected YYYY-MM-DD or RFC 3339", value))
}

//! 短链实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// 短链
///
/// `test_variants` 以 JSON 形式保存 A/B 测试的候选目标地址，
/// 由 [`crate::links::AbTestVariants::parse`] 负责解析和校验
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: String,
    pub domain: String,
    pub key: String,
    /// 当前跳转目标
    pub url: String,
    pub short_link: String,
    pub archived: bool,
    #[sqlx(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// 所属工作区
    #[sqlx(default)]
    pub project_id: Option<String>,
    #[sqlx(default)]
    pub title: Option<String>,
    #[sqlx(default)]
    pub image: Option<String>,
    /// 按国家定向跳转配置
    #[sqlx(default)]
    pub geo: Option<Value>,
    #[sqlx(default)]
    pub test_variants: Option<Value>,
    #[sqlx(default)]
    pub test_started_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub test_completed_at: Option<DateTime<Utc>>,
    pub clicks: i64,
    pub leads: i64,
    pub sales: i64,
    /// 累计成交金额（分）
    pub sale_amount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 短链摘要
///
/// 客户活动接口只需要展示短链本身
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LinkSummary {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub domain: String,
    #[validate(length(min = 1))]
    pub key: String,
    #[validate(url)]
    pub short_link: String,
}

/// 单个 A/B 测试变体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AbTestVariant {
    #[validate(url)]
    pub url: String,
    /// 流量占比（百分比）
    #[validate(range(min = 10.0, max = 90.0))]
    pub percentage: f64,
}

/// A/B 测试完成扫描的游标
///
/// 按 (test_completed_at, id) 排序翻页；`link_id` 为空时表示严格晚于 `completed_at`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCompletionCursor {
    pub completed_at: DateTime<Utc>,
    pub link_id: Option<String>,
}

impl TestCompletionCursor {
    /// 从某个时间点之后开始
    pub fn after(completed_at: DateTime<Utc>) -> Self {
        Self {
            completed_at,
            link_id: None,
        }
    }

    /// 从已处理的链接之后继续
    pub fn after_link(completed_at: DateTime<Utc>, link_id: impl Into<String>) -> Self {
        Self {
            completed_at,
            link_id: Some(link_id.into()),
        }
    }

    /// 位于游标之后的 (completed_at, link_id)
    pub fn precedes(&self, completed_at: DateTime<Utc>, link_id: &str) -> bool {
        match &self.link_id {
            None => completed_at > self.completed_at,
            Some(last) => {
                completed_at > self.completed_at
                    || (completed_at == self.completed_at && link_id > last.as_str())
            }
        }
    }
}

//! 合作伙伴计划（Program）相关实体
//!
//! Program -> Reward（佣金规则）/ Discount（给被推荐客户的折扣）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{EventKind, RewardType};

/// 合作伙伴计划
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    pub slug: String,
    #[sqlx(default)]
    pub logo: Option<String>,
    #[sqlx(default)]
    pub brand_color: Option<String>,
    /// 合作伙伴链接使用的短链域名
    #[sqlx(default)]
    pub domain: Option<String>,
    /// 合作伙伴链接的默认落地页
    #[sqlx(default)]
    pub url: Option<String>,
    /// 归因 Cookie 有效天数
    pub cookie_length: i32,
    /// 佣金结算前的冻结天数
    pub holding_period_days: i32,
    #[sqlx(default)]
    pub default_reward_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 佣金奖励
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: String,
    pub program_id: String,
    /// 触发奖励的事件
    pub event: EventKind,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub reward_type: RewardType,
    /// 百分比或金额（分），含义取决于 reward_type
    pub amount: i32,
    /// 奖励持续月数，为空表示终身
    #[sqlx(default)]
    pub max_duration: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 折扣
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: String,
    pub program_id: String,
    pub amount: i32,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub discount_type: RewardType,
    #[sqlx(default)]
    pub max_duration: Option<i32>,
    /// Stripe 优惠券 ID
    #[sqlx(default)]
    pub coupon_id: Option<String>,
    #[sqlx(default)]
    pub coupon_test_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Program 及按需加载的关联数据
///
/// 未请求的关联字段不会出现在序列化结果中
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramWithRelations {
    #[serde(flatten)]
    pub program: Program,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discounts: Option<Vec<Discount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewards: Option<Vec<Reward>>,
}

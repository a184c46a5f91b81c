//! 客户实体
//!
//! 客户由线索事件创建，归属于某个工作区，可关联到 Stripe Connect 账户下的客户

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 客户
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    #[sqlx(default)]
    pub email: Option<String>,
    #[sqlx(default)]
    pub avatar: Option<String>,
    /// 业务方系统中的客户 ID
    #[sqlx(default)]
    pub external_id: Option<String>,
    /// 所属工作区
    pub project_id: String,
    /// 工作区绑定的 Stripe Connect 账户
    #[sqlx(default)]
    pub project_connect_id: Option<String>,
    #[sqlx(default)]
    pub stripe_customer_id: Option<String>,
    /// 带来该客户的短链
    #[sqlx(default)]
    pub link_id: Option<String>,
    #[sqlx(default)]
    pub click_id: Option<String>,
    /// 首次点击时间
    #[sqlx(default)]
    pub clicked_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub country: Option<String>,
    /// 成为线索的时间
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

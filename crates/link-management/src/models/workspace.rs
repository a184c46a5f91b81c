//! 工作区（项目）实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 工作区
///
/// 所有短链、客户、Program 都归属于一个工作区
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[sqlx(default)]
    pub logo: Option<String>,
    /// Stripe Connect 账户
    #[sqlx(default)]
    pub stripe_connect_id: Option<String>,
    /// 分析数据的最早可用时间
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 工作区 API Token
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiToken {
    pub id: String,
    pub name: String,
    pub project_id: String,
    #[sqlx(default)]
    pub expires: Option<DateTime<Utc>>,
}

impl ApiToken {
    /// 是否已过期
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|exp| exp < now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_token_expiry() {
        let now = Utc::now();
        let mut token = ApiToken {
            id: "tok_1".into(),
            name: "ci".into(),
            project_id: "ws_1".into(),
            expires: None,
        };
        assert!(!token.is_expired(now));

        token.expires = Some(now - Duration::minutes(1));
        assert!(token.is_expired(now));

        token.expires = Some(now + Duration::days(1));
        assert!(!token.is_expired(now));
    }
}

//! Webhook 订阅实体

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::enums::WebhookTrigger;

/// 工作区的 Webhook 订阅
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Webhook {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub url: String,
    /// HMAC 签名密钥
    pub secret: String,
    /// 订阅的事件名数组，如 `["link.updated"]`
    pub triggers: Value,
    #[sqlx(default)]
    pub disabled_at: Option<DateTime<Utc>>,
}

impl Webhook {
    /// 是否订阅了指定事件且处于启用状态
    pub fn subscribes_to(&self, trigger: WebhookTrigger) -> bool {
        if self.disabled_at.is_some() {
            return false;
        }
        self.triggers
            .as_array()
            .map(|items| items.iter().any(|t| t.as_str() == Some(trigger.as_str())))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn webhook(triggers: Value) -> Webhook {
        Webhook {
            id: "wh_1".into(),
            project_id: "ws_1".into(),
            name: "crm".into(),
            url: "https://example.com/hook".into(),
            secret: "whsec_1".into(),
            triggers,
            disabled_at: None,
        }
    }

    #[test]
    fn test_subscribes_to() {
        let hook = webhook(json!(["link.updated", "lead.created"]));
        assert!(hook.subscribes_to(WebhookTrigger::LinkUpdated));
        assert!(!hook.subscribes_to(WebhookTrigger::SaleCreated));
    }

    #[test]
    fn test_disabled_or_malformed_never_matches() {
        let mut hook = webhook(json!(["link.updated"]));
        hook.disabled_at = Some(Utc::now());
        assert!(!hook.subscribes_to(WebhookTrigger::LinkUpdated));

        let hook = webhook(json!({"link.updated": true}));
        assert!(!hook.subscribes_to(WebhookTrigger::LinkUpdated));
    }
}

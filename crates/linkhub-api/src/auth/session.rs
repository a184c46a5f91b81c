//! 会话 JWT
//!
//! 合作伙伴门户的登录态保存在会话 Cookie 中，内容为 HS256 签名的 JWT

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// 会话载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    /// 用户 ID
    pub sub: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 登录时已知的默认合作伙伴
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_partner_id: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// 会话管理器
#[derive(Clone)]
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionManager {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// 签发会话 Token
    pub fn issue(
        &self,
        user_id: &str,
        email: &str,
        default_partner_id: Option<&str>,
        ttl: Duration,
    ) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: None,
            default_partner_id: default_partner_id.map(String::from),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("会话 Token 生成失败: {}", e)))
    }

    /// 校验会话 Token，过期或签名错误均视为未登录
    pub fn verify(&self, token: &str) -> Result<SessionClaims, ApiError> {
        decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    ApiError::Unauthorized("会话已过期".to_string())
                }
                _ => ApiError::Unauthorized(format!("会话无效: {}", e)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let manager = SessionManager::new("test-secret");
        let token = manager
            .issue("usr_1", "ada@example.com", Some("pn_1"), Duration::hours(1))
            .unwrap();

        let claims = manager.verify(&token).unwrap();
        assert_eq!(claims.sub, "usr_1");
        assert_eq!(claims.default_partner_id.as_deref(), Some("pn_1"));
    }

    #[test]
    fn test_rejects_foreign_and_expired_tokens() {
        let manager = SessionManager::new("test-secret");
        let other = SessionManager::new("other-secret");
        let token = other
            .issue("usr_1", "ada@example.com", None, Duration::hours(1))
            .unwrap();
        assert!(manager.verify(&token).is_err());

        let expired = manager
            .issue("usr_1", "ada@example.com", None, Duration::hours(-2))
            .unwrap();
        assert!(matches!(
            manager.verify(&expired),
            Err(ApiError::Unauthorized(msg)) if msg.contains("过期")
        ));
    }
}

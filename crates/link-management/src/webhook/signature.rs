//! Webhook 请求签名
//!
//! 对请求体做 HMAC-SHA256，结果以小写十六进制放入签名头

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{LinkError, Result};

type HmacSha256 = Hmac<Sha256>;

/// 计算请求体签名
pub fn sign_payload(secret: &str, body: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| LinkError::Webhook(format!("invalid signing key: {}", e)))?;
    mac.update(body);
    Ok(format!("{:x}", mac.finalize().into_bytes()))
}

/// 校验签名，供接收方或测试使用
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    sign_payload(secret, body)
        .map(|expected| expected.eq_ignore_ascii_case(signature))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        let signature =
            sign_payload("key", b"The quick brown fox jumps over the lazy dog").unwrap();
        assert_eq!(
            signature,
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn test_verify_signature() {
        let body = br#"{"event":"link.updated"}"#;
        let signature = sign_payload("whsec_test", body).unwrap();
        assert!(verify_signature("whsec_test", body, &signature));
        assert!(!verify_signature("whsec_other", body, &signature));
        assert!(!verify_signature("whsec_test", b"{}", &signature));
    }
}

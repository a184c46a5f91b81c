//! 大小写敏感域名的短链 key 编解码
//!
//! 数据库中 key 唯一索引不区分大小写，大小写敏感域名下的 key
//! 以 base64url（无填充）编码后存储，读出时需要还原。

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tracing::warn;

use crate::models::{Link, LinkSummary};

/// 由域名和 key 拼出完整短链
pub fn link_constructor_simple(domain: &str, key: &str) -> String {
    format!("https://{}/{}", domain, key)
}

/// 编码 key
pub fn encode_key(key: &str) -> String {
    URL_SAFE_NO_PAD.encode(key.as_bytes())
}

/// 解码 key，非法编码返回 None
pub fn decode_key(encoded: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(encoded.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}

/// 大小写敏感域名集合
#[derive(Debug, Clone, Default)]
pub struct CaseSensitivity {
    domains: Vec<String>,
}

impl CaseSensitivity {
    pub fn new(domains: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            domains: domains
                .into_iter()
                .map(|d| d.into().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn is_case_sensitive_domain(&self, domain: &str) -> bool {
        let domain = domain.to_ascii_lowercase();
        self.domains.iter().any(|d| *d == domain)
    }

    /// 还原 key 及短链；非敏感域名原样返回
    fn decode_parts(&self, domain: &str, key: &str) -> Option<(String, String)> {
        if !self.is_case_sensitive_domain(domain) {
            return None;
        }
        match decode_key(key) {
            Some(original) => {
                let short_link = link_constructor_simple(domain, &original);
                Some((original, short_link))
            }
            None => {
                warn!(domain = %domain, key = %key, "case-sensitive key is not valid base64url, keeping as is");
                None
            }
        }
    }

    pub fn decode_summary(&self, mut link: LinkSummary) -> LinkSummary {
        if let Some((key, short_link)) = self.decode_parts(&link.domain, &link.key) {
            link.key = key;
            link.short_link = short_link;
        }
        link
    }

    pub fn decode_link(&self, mut link: Link) -> Link {
        if let Some((key, short_link)) = self.decode_parts(&link.domain, &link.key) {
            link.key = key;
            link.short_link = short_link;
        }
        link
    }
}

//! Stripe REST 客户端
//!
//! 只覆盖回填需要的接口：按邮箱列出 Connect 账户下的客户

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use linkhub_shared::config::StripeConfig;

use crate::error::{Result, StripeSyncError};

/// 以 Connect 账户身份调用时使用的请求头
pub const STRIPE_ACCOUNT_HEADER: &str = "Stripe-Account";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StripeCustomer {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeList<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Stripe 客户查询接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StripeCustomers: Send + Sync {
    /// 按邮箱列出 Connect 账户下的客户
    async fn list_customers_by_email(
        &self,
        email: &str,
        stripe_account: &str,
    ) -> Result<Vec<StripeCustomer>>;
}

/// Stripe 客户端
pub struct StripeClient {
    http: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripeClient {
    /// 按 livemode 选择密钥创建客户端
    pub fn new(config: &StripeConfig, livemode: bool) -> Result<Self> {
        let secret_key = config
            .secret_key_for(livemode)
            .filter(|k| !k.is_empty())
            .ok_or(StripeSyncError::MissingSecretKey { livemode })?
            .to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key,
        })
    }
}

#[async_trait]
impl StripeCustomers for StripeClient {
    async fn list_customers_by_email(
        &self,
        email: &str,
        stripe_account: &str,
    ) -> Result<Vec<StripeCustomer>> {
        let response = self
            .http
            .get(format!("{}/v1/customers", self.api_base))
            .bearer_auth(&self.secret_key)
            .header(STRIPE_ACCOUNT_HEADER, stripe_account)
            .query(&[("email", email)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or_else(|| status.to_string());
            return Err(StripeSyncError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let list: StripeList<StripeCustomer> = response.json().await?;
        debug!(email = %email, count = list.data.len(), "listed stripe customers");
        Ok(list.data)
    }
}

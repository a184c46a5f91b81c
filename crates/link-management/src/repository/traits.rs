//! 仓储 Trait 定义
//!
//! 服务层依赖这些接口而非具体实现，测试中使用 mockall 生成的 Mock

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::analytics::Granularity;
use crate::error::Result;
use crate::models::{
    ApiToken, Customer, Discount, EventKind, EventRow, Link, Program, Reward,
    TestCompletionCursor, TimeseriesRow, UrlCount, Webhook, Workspace,
};

/// 事件聚合查询条件
#[derive(Debug, Clone, PartialEq)]
pub struct EventFilter {
    pub workspace_id: String,
    pub kind: EventKind,
    pub link_id: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// 客户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerRepositoryTrait: Send + Sync {
    async fn find_customer(&self, workspace_id: &str, id: &str) -> Result<Option<Customer>>;

    /// 某个 Stripe Connect 账户下、指定时间之后创建的客户，按创建时间升序分页
    async fn list_by_connect_account(
        &self,
        connect_id: &str,
        created_after: DateTime<Utc>,
        skip: i64,
        take: i64,
    ) -> Result<Vec<Customer>>;

    async fn set_stripe_customer_id(&self, id: &str, stripe_customer_id: &str) -> Result<()>;
}

/// 事件仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepositoryTrait: Send + Sync {
    /// 客户的事件列表，按时间倒序
    async fn list_customer_events(&self, customer_id: &str, limit: i64) -> Result<Vec<EventRow>>;

    /// 链接在 [start, end] 内按目标地址分组的线索数
    async fn count_leads_by_url(
        &self,
        link_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<UrlCount>>;

    async fn timeseries(
        &self,
        filter: &EventFilter,
        granularity: Granularity,
    ) -> Result<Vec<TimeseriesRow>>;

    async fn top_urls(&self, filter: &EventFilter, limit: i64) -> Result<Vec<UrlCount>>;
}

/// 短链仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepositoryTrait: Send + Sync {
    async fn find_link(&self, id: &str) -> Result<Option<Link>>;
    async fn find_link_in_workspace(&self, workspace_id: &str, id: &str) -> Result<Option<Link>>;
    async fn update_url(&self, id: &str, url: &str) -> Result<Link>;

    /// A/B 测试在游标之后、`until` 之前（含）结束的链接，按 (test_completed_at, id) 升序
    async fn list_completed_tests(
        &self,
        after: &TestCompletionCursor,
        until: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Link>>;
}

/// 工作区仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkspaceRepositoryTrait: Send + Sync {
    async fn find_workspace(&self, id: &str) -> Result<Option<Workspace>>;
    async fn find_token_by_hash(&self, hashed_key: &str) -> Result<Option<ApiToken>>;
    async fn touch_token(&self, id: &str, used_at: DateTime<Utc>) -> Result<()>;
}

/// Program 仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgramRepositoryTrait: Send + Sync {
    async fn find_program(&self, workspace_id: &str, id: &str) -> Result<Option<Program>>;
    async fn list_discounts(&self, program_id: &str) -> Result<Vec<Discount>>;
    async fn find_reward(&self, id: &str) -> Result<Option<Reward>>;
}

/// Webhook 仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookRepositoryTrait: Send + Sync {
    async fn list_enabled_webhooks(&self, workspace_id: &str) -> Result<Vec<Webhook>>;
}

/// 用户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// 用户的默认合作伙伴：优先 users.default_partner_id，其次最早加入的 partner_users 记录
    async fn find_default_partner_id(&self, user_id: &str) -> Result<Option<String>>;
}

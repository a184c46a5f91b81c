//! 应用状态定义
//!
//! 包含 Axum 路由共享的仓储与服务实例

use std::sync::Arc;

use sqlx::PgPool;

use link_management::Result;
use link_management::links::CaseSensitivity;
use link_management::repository::{
    CustomerRepository, EventRepository, LinkRepository, ProgramRepository, WebhookRepository,
    WorkspaceRepository, WorkspaceRepositoryTrait,
};
use link_management::service::{
    AbTestService, AnalyticsService, CustomerActivityService, ProgramService,
};
use link_management::webhook::WebhookPublisher;
use linkhub_shared::config::AppConfig;

/// Axum 应用共享状态
///
/// 服务通过 Arc 在 handler 间共享；工作区仓储以 trait object 保存，
/// 认证中间件只依赖它
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL 连接池
    pub pool: PgPool,
    pub workspaces: Arc<dyn WorkspaceRepositoryTrait>,
    pub activity: Arc<CustomerActivityService>,
    pub programs: Arc<ProgramService>,
    pub ab_tests: Arc<AbTestService>,
    pub analytics: Arc<AnalyticsService>,
}

impl AppState {
    /// 基于连接池和配置组装全部仓储与服务
    pub fn new(pool: PgPool, config: &AppConfig) -> Result<Self> {
        let case_sensitivity = CaseSensitivity::new(config.links.case_sensitive_domains.clone());

        let customers = Arc::new(CustomerRepository::new(pool.clone()));
        let events = Arc::new(EventRepository::new(pool.clone()));
        let links = Arc::new(LinkRepository::new(pool.clone()));
        let workspaces = Arc::new(WorkspaceRepository::new(pool.clone()));
        let programs = Arc::new(ProgramRepository::new(pool.clone()));
        let webhooks = Arc::new(WebhookPublisher::new(
            Arc::new(WebhookRepository::new(pool.clone())),
            &config.webhook,
        )?);

        let activity = CustomerActivityService::new(
            customers,
            events.clone(),
            links.clone(),
            case_sensitivity.clone(),
            config.links.customer_events_limit,
        );
        let ab_tests = AbTestService::new(
            links,
            events.clone(),
            workspaces.clone(),
            webhooks,
            case_sensitivity,
        );
        let analytics = AnalyticsService::new(events, workspaces.clone());

        Ok(Self {
            pool,
            workspaces,
            activity: Arc::new(activity),
            programs: Arc::new(ProgramService::new(programs)),
            ab_tests: Arc::new(ab_tests),
            analytics: Arc::new(analytics),
        })
    }

    /// 替换工作区仓储
    pub fn with_workspaces(mut self, workspaces: Arc<dyn WorkspaceRepositoryTrait>) -> Self {
        self.workspaces = workspaces;
        self
    }
}

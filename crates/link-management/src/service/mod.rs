//! 服务层
//!
//! 组合仓储实现业务流程：客户活动、Program 查询、A/B 测试完成与分析查询

pub mod ab_test_service;
pub mod activity_service;
pub mod analytics_service;
pub mod dto;
pub mod program_service;

pub use ab_test_service::{AbTestService, WindowReport};
pub use activity_service::{CustomerActivityService, compute_ltv, time_to_lead, time_to_sale};
pub use analytics_service::{AnalyticsService, ResolvedRange, TOP_URLS_LIMIT};
pub use dto::*;
pub use program_service::ProgramService;

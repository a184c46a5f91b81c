//! 客户活动服务
//!
//! 汇总单个客户的事件时间线：
//! - 生命周期价值（成交金额之和）
//! - 从点击到成为线索的耗时
//! - 从成为线索到首次成交的耗时
//! - 带来该客户的第一条短链

use std::sync::Arc;

use tracing::{debug, instrument};
use validator::Validate;

use linkhub_shared::observability::metrics as app_metrics;

use crate::error::{LinkError, Result};
use crate::links::CaseSensitivity;
use crate::models::{Customer, CustomerEvent, Link, LinkSummary};
use crate::repository::{
    CustomerRepository, CustomerRepositoryTrait, EventRepository, EventRepositoryTrait,
    LinkRepository, LinkRepositoryTrait,
};
use crate::service::dto::CustomerActivityResponse;

/// 成交事件金额之和，缺失金额的成交不计入
pub fn compute_ltv(events: &[CustomerEvent]) -> i64 {
    events
        .iter()
        .filter(|e| e.is_sale())
        .filter_map(|e| e.sale_amount)
        .sum()
}

/// 点击到成为线索的毫秒数
pub fn time_to_lead(customer: &Customer) -> Option<i64> {
    customer
        .clicked_at
        .map(|clicked_at| (customer.created_at - clicked_at).num_milliseconds())
}

/// 成为线索到首次成交的毫秒数
///
/// `events` 按时间倒序，首次成交是最后一个成交事件
pub fn time_to_sale(customer: &Customer, events: &[CustomerEvent]) -> Option<i64> {
    events
        .iter()
        .rev()
        .find(|e| e.is_sale())
        .map(|sale| (sale.timestamp - customer.created_at).num_milliseconds())
}

/// 客户活动服务
pub struct CustomerActivityService<
    CR = CustomerRepository,
    ER = EventRepository,
    LR = LinkRepository,
> where
    CR: CustomerRepositoryTrait,
    ER: EventRepositoryTrait,
    LR: LinkRepositoryTrait,
{
    customers: Arc<CR>,
    events: Arc<ER>,
    links: Arc<LR>,
    case_sensitivity: CaseSensitivity,
    events_limit: i64,
}

impl<CR, ER, LR> CustomerActivityService<CR, ER, LR>
where
    CR: CustomerRepositoryTrait,
    ER: EventRepositoryTrait,
    LR: LinkRepositoryTrait,
{
    pub fn new(
        customers: Arc<CR>,
        events: Arc<ER>,
        links: Arc<LR>,
        case_sensitivity: CaseSensitivity,
        events_limit: i64,
    ) -> Self {
        Self {
            customers,
            events,
            links,
            case_sensitivity,
            events_limit,
        }
    }

    pub async fn get_customer_or_throw(&self, workspace_id: &str, id: &str) -> Result<Customer> {
        self.customers
            .find_customer(workspace_id, id)
            .await?
            .ok_or_else(|| LinkError::CustomerNotFound(id.to_string()))
    }

    pub async fn find_link_or_throw(&self, workspace_id: &str, link_id: &str) -> Result<Link> {
        self.links
            .find_link_in_workspace(workspace_id, link_id)
            .await?
            .ok_or_else(|| LinkError::LinkNotFound(link_id.to_string()))
    }

    /// 获取客户活动
    #[instrument(skip(self), fields(workspace_id = %workspace_id, customer_id = %customer_id))]
    pub async fn get_customer_activity(
        &self,
        workspace_id: &str,
        customer_id: &str,
    ) -> Result<CustomerActivityResponse> {
        let customer = self.get_customer_or_throw(workspace_id, customer_id).await?;

        let events: Vec<CustomerEvent> = self
            .events
            .list_customer_events(&customer.id, self.events_limit)
            .await?
            .into_iter()
            .map(CustomerEvent::from)
            .collect();

        // 最早的事件在末尾
        let link = match events.last() {
            Some(oldest) => {
                let link = self.find_link_or_throw(workspace_id, &oldest.link_id).await?;
                let link = self.case_sensitivity.decode_link(link);
                Some(LinkSummary {
                    id: link.id,
                    domain: link.domain,
                    key: link.key,
                    short_link: link.short_link,
                })
            }
            None => {
                debug!("customer has no events");
                None
            }
        };

        let response = CustomerActivityResponse {
            ltv: compute_ltv(&events),
            time_to_lead: time_to_lead(&customer),
            time_to_sale: time_to_sale(&customer, &events),
            link,
            events,
        };

        response
            .validate()
            .map_err(|e| LinkError::Internal(format!("invalid customer activity: {}", e)))?;

        app_metrics::record_customer_activity(response.events.len());
        Ok(response)
    }
}

//! 回填流程
//!
//! 1. 读取 Connect 账户下指定日期之后创建的客户（按创建时间升序分页）
//! 2. 打印客户表格
//! 3. 并发处理每个客户，全部结束后汇总

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{info, instrument, warn};

use link_management::models::Customer;
use link_management::repository::{CustomerRepository, CustomerRepositoryTrait};

use crate::client::{StripeClient, StripeCustomers};
use crate::error::Result;

/// 回填参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillOptions {
    pub stripe_account: String,
    pub created_after: DateTime<Utc>,
    pub skip: i64,
    pub take: i64,
    /// 只查询不写库
    pub dry_run: bool,
}

/// 单个客户的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerOutcome {
    MissingEmail,
    AlreadyLinked,
    NoStripeCustomer,
    Linked { stripe_customer_id: String },
    /// dry-run 模式下找到但未写库
    WouldLink { stripe_customer_id: String },
    Failed { reason: String },
}

/// 汇总计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillSummary {
    pub total: usize,
    pub linked: usize,
    pub skipped: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl BackfillSummary {
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a CustomerOutcome>) -> Self {
        outcomes
            .into_iter()
            .fold(Self::default(), |mut summary, outcome| {
                summary.total += 1;
                match outcome {
                    CustomerOutcome::Linked { .. } | CustomerOutcome::WouldLink { .. } => {
                        summary.linked += 1
                    }
                    CustomerOutcome::MissingEmail | CustomerOutcome::AlreadyLinked => {
                        summary.skipped += 1
                    }
                    CustomerOutcome::NoStripeCustomer => summary.not_found += 1,
                    CustomerOutcome::Failed { .. } => summary.failed += 1,
                }
                summary
            })
    }
}

/// 回填结果
#[derive(Debug, Clone)]
pub struct BackfillReport {
    pub customers: Vec<Customer>,
    pub outcomes: Vec<(String, CustomerOutcome)>,
    pub summary: BackfillSummary,
}

/// 回填执行器
pub struct Backfill<CR = CustomerRepository, SC = StripeClient>
where
    CR: CustomerRepositoryTrait,
    SC: StripeCustomers,
{
    customers: Arc<CR>,
    stripe: Arc<SC>,
}

impl<CR, SC> Backfill<CR, SC>
where
    CR: CustomerRepositoryTrait,
    SC: StripeCustomers,
{
    pub fn new(customers: Arc<CR>, stripe: Arc<SC>) -> Self {
        Self { customers, stripe }
    }

    /// 加载客户并逐个回填，单个客户失败不影响其它客户
    #[instrument(skip(self), fields(stripe_account = %options.stripe_account))]
    pub async fn run(&self, options: &BackfillOptions) -> Result<BackfillReport> {
        let customers = self
            .customers
            .list_by_connect_account(
                &options.stripe_account,
                options.created_after,
                options.skip,
                options.take,
            )
            .await?;

        println!("{}", render_table(&customers));

        let outcomes = join_all(
            customers
                .iter()
                .map(|customer| self.backfill_customer(customer, options)),
        )
        .await;

        let outcomes: Vec<(String, CustomerOutcome)> = customers
            .iter()
            .map(|c| c.id.clone())
            .zip(outcomes)
            .collect();

        let summary = BackfillSummary::from_outcomes(outcomes.iter().map(|(_, o)| o));
        info!(
            total = summary.total,
            linked = summary.linked,
            skipped = summary.skipped,
            not_found = summary.not_found,
            failed = summary.failed,
            dry_run = options.dry_run,
            "Stripe customer backfill finished"
        );

        Ok(BackfillReport {
            customers,
            outcomes,
            summary,
        })
    }

    async fn backfill_customer(
        &self,
        customer: &Customer,
        options: &BackfillOptions,
    ) -> CustomerOutcome {
        let Some(email) = customer.email.as_deref().filter(|e| !e.is_empty()) else {
            return CustomerOutcome::MissingEmail;
        };
        if customer.stripe_customer_id.is_some() {
            return CustomerOutcome::AlreadyLinked;
        }

        let found = match self
            .stripe
            .list_customers_by_email(email, &options.stripe_account)
            .await
        {
            Ok(found) => found,
            Err(e) => {
                warn!(customer_id = %customer.id, error = %e, "failed to list stripe customers");
                return CustomerOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let Some(stripe_customer) = found.into_iter().next() else {
            info!(email = %email, "No stripe customer found");
            return CustomerOutcome::NoStripeCustomer;
        };

        if options.dry_run {
            info!(email = %email, stripe_customer_id = %stripe_customer.id, "Would update stripe customer id");
            return CustomerOutcome::WouldLink {
                stripe_customer_id: stripe_customer.id,
            };
        }

        match self
            .customers
            .set_stripe_customer_id(&customer.id, &stripe_customer.id)
            .await
        {
            Ok(()) => {
                info!(email = %email, stripe_customer_id = %stripe_customer.id, "Updated stripe customer id");
                CustomerOutcome::Linked {
                    stripe_customer_id: stripe_customer.id,
                }
            }
            Err(e) => {
                warn!(customer_id = %customer.id, error = %e, "failed to store stripe customer id");
                CustomerOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

const TABLE_COLUMNS: [&str; 4] = ["name", "email", "stripeCustomerId", "createdAt"];

/// 渲染客户表格
pub fn render_table(customers: &[Customer]) -> String {
    let rows: Vec<[String; 4]> = customers
        .iter()
        .map(|c| {
            [
                c.name.clone(),
                c.email.clone().unwrap_or_default(),
                c.stripe_customer_id.clone().unwrap_or_default(),
                c.created_at.to_rfc3339(),
            ]
        })
        .collect();

    let mut widths = TABLE_COLUMNS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: [&str; 4]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let mut lines = vec![format_row(TABLE_COLUMNS)];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &rows {
        lines.push(format_row([
            row[0].as_str(),
            row[1].as_str(),
            row[2].as_str(),
            row[3].as_str(),
        ]));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockStripeCustomers, StripeCustomer};
    use crate::error::StripeSyncError;
    use async_trait::async_trait;
    use chrono::TimeZone;

    /// dry-run 不会写库，列表也不会被读取
    struct EmptyStore;

    #[async_trait]
    impl CustomerRepositoryTrait for EmptyStore {
        async fn find_customer(
            &self,
            _workspace_id: &str,
            _id: &str,
        ) -> link_management::Result<Option<Customer>> {
            Ok(None)
        }

        async fn list_by_connect_account(
            &self,
            _connect_id: &str,
            _created_after: DateTime<Utc>,
            _skip: i64,
            _take: i64,
        ) -> link_management::Result<Vec<Customer>> {
            Ok(Vec::new())
        }

        async fn set_stripe_customer_id(
            &self,
            _id: &str,
            _stripe_customer_id: &str,
        ) -> link_management::Result<()> {
            Ok(())
        }
    }

    fn customer(id: &str, email: Option<&str>, stripe_customer_id: Option<&str>) -> Customer {
        let created = Utc.with_ymd_and_hms(2024, 12, 20, 8, 0, 0).unwrap();
        Customer {
            id: id.into(),
            name: format!("Customer {}", id),
            email: email.map(String::from),
            avatar: None,
            external_id: None,
            project_id: "ws_1".into(),
            project_connect_id: Some("acct_1".into()),
            stripe_customer_id: stripe_customer_id.map(String::from),
            link_id: None,
            click_id: None,
            clicked_at: None,
            country: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_summary_counts() {
        let outcomes = [
            CustomerOutcome::MissingEmail,
            CustomerOutcome::AlreadyLinked,
            CustomerOutcome::NoStripeCustomer,
            CustomerOutcome::Linked {
                stripe_customer_id: "cus_1".into(),
            },
            CustomerOutcome::Failed {
                reason: "boom".into(),
            },
        ];
        let summary = BackfillSummary::from_outcomes(outcomes.iter());
        assert_eq!(
            summary,
            BackfillSummary {
                total: 5,
                linked: 1,
                skipped: 2,
                not_found: 1,
                failed: 1,
            }
        );
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let table = render_table(&[
            customer("c1", Some("long.address@example.com"), None),
            customer("c2", None, Some("cus_9")),
        ]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("name"));
        assert!(lines[0].contains("stripeCustomerId"));
        assert!(lines[2].contains("long.address@example.com"));
        assert!(lines[3].contains("cus_9"));
        // 所有行的分隔符位置一致
        let first_sep = lines[0].find(" | ").unwrap();
        assert_eq!(lines[2].find(" | "), Some(first_sep));
    }

    #[tokio::test]
    async fn test_stripe_errors_are_reported_per_customer() {
        let mut stripe = MockStripeCustomers::new();
        stripe
            .expect_list_customers_by_email()
            .returning(|email, _| match email {
                "ok@example.com" => Ok(vec![StripeCustomer {
                    id: "cus_ok".into(),
                    email: Some(email.to_string()),
                }]),
                _ => Err(StripeSyncError::Api {
                    status: 429,
                    message: "rate limited".into(),
                }),
            });

        let options = BackfillOptions {
            stripe_account: "acct_1".into(),
            created_after: Utc.with_ymd_and_hms(2024, 12, 19, 0, 0, 0).unwrap(),
            skip: 0,
            take: 10,
            dry_run: true,
        };

        let backfill = Backfill::new(Arc::new(EmptyStore), Arc::new(stripe));

        let ok = backfill
            .backfill_customer(&customer("c1", Some("ok@example.com"), None), &options)
            .await;
        assert_eq!(
            ok,
            CustomerOutcome::WouldLink {
                stripe_customer_id: "cus_ok".into()
            }
        );

        let failed = backfill
            .backfill_customer(&customer("c2", Some("busy@example.com"), None), &options)
            .await;
        assert!(matches!(failed, CustomerOutcome::Failed { reason } if reason.contains("429")));
    }
}

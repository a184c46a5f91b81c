//! Stripe 客户回填工具
//!
//! 为 Stripe Connect 账户下尚未关联 Stripe 客户的线索客户，
//! 按邮箱在 Stripe 中查找并回写 `stripe_customer_id`。
//!
//! ## 模块结构
//!
//! - `cli`: 命令行参数
//! - `client`: Stripe REST 客户端
//! - `backfill`: 回填流程
//! - `error`: 错误类型

pub mod backfill;
pub mod cli;
pub mod client;
pub mod error;

pub use backfill::{Backfill, BackfillOptions, BackfillReport, BackfillSummary, CustomerOutcome};
pub use client::{StripeClient, StripeCustomer, StripeCustomers};
pub use error::{Result, StripeSyncError};

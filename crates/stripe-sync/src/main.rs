//! Stripe 客户回填命令行入口

use std::sync::Arc;

use clap::Parser;
use link_management::repository::CustomerRepository;
use linkhub_shared::{
    config::AppConfig,
    database::Database,
    observability::{self, ObservabilityConfig},
};
use stripe_sync::{Backfill, StripeClient, cli::Cli};
use tracing::info;

const SERVICE_NAME: &str = "stripe-backfill";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(SERVICE_NAME)?;
    let _guard = observability::init(&ObservabilityConfig::for_cli(SERVICE_NAME, &cli.log_level)).await?;

    let options = cli.options();
    info!(
        stripe_account = %options.stripe_account,
        created_after = %options.created_after,
        skip = options.skip,
        take = options.take,
        livemode = cli.livemode,
        dry_run = options.dry_run,
        "Starting stripe customer backfill"
    );

    let db = Database::connect(&config.database).await?;
    let customers = Arc::new(CustomerRepository::new(db.pool().clone()));
    let stripe = Arc::new(StripeClient::new(&config.stripe, cli.livemode)?);

    let report = Backfill::new(customers, stripe).run(&options).await?;

    println!(
        "processed {} customers: {} linked, {} skipped, {} not found, {} failed",
        report.summary.total,
        report.summary.linked,
        report.summary.skipped,
        report.summary.not_found,
        report.summary.failed
    );

    db.close().await;
    Ok(())
}

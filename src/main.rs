mod config;
mod error;
mod mapping;
mod pipeline;
mod platform;
mod reports;
mod types;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::Result;
use crate::platform::AdsClient;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    info!(
        "Starting bid modifier run: date_range={} min_impressions={} contains={:?} not_contains={:?}",
        cfg.date_range,
        cfg.minimum_impressions,
        cfg.campaign_name_contains,
        cfg.campaign_name_does_not_contain,
    );

    let client = AdsClient::new(&cfg.ads_api_url)?;
    let stats = pipeline::run(&cfg, &client).await?;

    info!(
        "[RUN] campaigns={} name_filtered={} campaign_scoped={} ad_group_scoped={} applied={}",
        stats.campaigns_total,
        stats.campaigns_name_filtered,
        stats.campaign_scoped,
        stats.ad_group_scoped,
        stats.operations_applied,
    );
    info!(
        "[SKIPPED] no_baseline={} unmapped={} zero_conversions={} zero_cost={}",
        stats.entities_no_baseline,
        stats.audiences_unmapped,
        stats.audiences_zero_conversions,
        stats.audiences_zero_cost,
    );

    Ok(())
}

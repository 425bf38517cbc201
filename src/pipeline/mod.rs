pub mod calculator;
pub mod filters;

use tracing::{debug, info};

use crate::config::{
    Config, ADGROUP_ID_FIELD, ADGROUP_PERFORMANCE_REPORT, CAMPAIGN_ID_FIELD,
    CAMPAIGN_PERFORMANCE_REPORT,
};
use crate::error::Result;
use crate::mapping::load_audience_mapping;
use crate::platform::{AdsClient, Selector};
use crate::reports::fetch_performance;
use crate::types::{BidOperation, EntityScope, RunStats, TargetingEntity};

/// One full batch pass: build the lookup tables, walk the account, derive
/// and apply bid modifiers. Sequential throughout; a failed platform call
/// aborts the run and leaves earlier writes applied.
pub async fn run(cfg: &Config, client: &AdsClient) -> Result<RunStats> {
    let mapping = load_audience_mapping(&cfg.mapping_csv_url).await?;
    info!("Audience mapping loaded: {} in-market criteria", mapping.len());

    let campaign_cpa =
        fetch_performance(client, CAMPAIGN_ID_FIELD, CAMPAIGN_PERFORMANCE_REPORT, cfg).await?;
    let ad_group_cpa =
        fetch_performance(client, ADGROUP_ID_FIELD, ADGROUP_PERFORMANCE_REPORT, cfg).await?;

    let selector = Selector::new(cfg.date_range)
        .with_condition(format!("Impressions > {}", cfg.minimum_impressions));

    let mut stats = RunStats::default();
    let campaigns = client.campaigns(&selector).await?;
    stats.campaigns_total = campaigns.len();

    for campaign in &campaigns {
        if !filters::name_passes(
            &campaign.name,
            &cfg.campaign_name_contains,
            &cfg.campaign_name_does_not_contain,
        ) {
            debug!("campaign {:?} removed by name filters", campaign.name);
            stats.campaigns_name_filtered += 1;
            continue;
        }

        let campaign_audiences = client
            .audiences(EntityScope::Campaign, &campaign.id, &selector)
            .await?;

        if !campaign_audiences.is_empty() {
            // Campaign-level attachment: the platform guarantees none of
            // this campaign's ad groups carry audiences, so they are never
            // enumerated.
            stats.campaign_scoped += 1;
            let entity = TargetingEntity {
                scope: EntityScope::Campaign,
                id: campaign.id.clone(),
                name: campaign.name.clone(),
            };
            let ops = calculator::derive_operations(
                &entity,
                campaign_cpa.get(&campaign.id).map(String::as_str),
                &campaign_audiences,
                &mapping,
                &mut stats,
            );
            apply_operations(client, &entity, &ops, &mut stats).await?;
            continue;
        }

        for ad_group in client.ad_groups(&campaign.id, &selector).await? {
            stats.ad_group_scoped += 1;
            let audiences = client
                .audiences(EntityScope::AdGroup, &ad_group.id, &selector)
                .await?;
            let entity = TargetingEntity {
                scope: EntityScope::AdGroup,
                id: ad_group.id.clone(),
                name: ad_group.name.clone(),
            };
            let ops = calculator::derive_operations(
                &entity,
                ad_group_cpa.get(&ad_group.id).map(String::as_str),
                &audiences,
                &mapping,
                &mut stats,
            );
            apply_operations(client, &entity, &ops, &mut stats).await?;
        }
    }

    Ok(stats)
}

/// Write each operation through the platform, one call per audience.
/// No batching, no retry, no range validation before the write.
async fn apply_operations(
    client: &AdsClient,
    entity: &TargetingEntity,
    operations: &[BidOperation],
    stats: &mut RunStats,
) -> Result<()> {
    for op in operations {
        client.set_bid_modifier(&op.audience, op.modifier).await?;
        stats.operations_applied += 1;
        info!(
            "Applied modifier {:.4} to audience {} ({}) on {} {:?}",
            op.modifier, op.audience.criterion_id, op.category, entity.scope, entity.name,
        );
    }
    Ok(())
}

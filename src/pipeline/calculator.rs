use tracing::debug;

use crate::reports::coerce_cpa;
use crate::types::{
    AudienceMapping, AudienceRef, AudienceSegment, BidOperation, RunStats, TargetingEntity,
};

enum Skip {
    Unmapped,
    ZeroConversions,
    ZeroCost,
}

/// Derive the bid operations for one targeting entity. Pure over its inputs:
/// the same entity, baseline, audiences and mapping always yield the same
/// operations. `baseline_cpa` is the raw report value for the entity; if it
/// is absent or non-numeric the entity's CPA is undefined and no operation
/// is emitted for any of its audiences (a missing baseline must never turn
/// into a NaN modifier on the platform).
pub fn derive_operations(
    entity: &TargetingEntity,
    baseline_cpa: Option<&str>,
    audiences: &[AudienceSegment],
    mapping: &AudienceMapping,
    stats: &mut RunStats,
) -> Vec<BidOperation> {
    let Some(entity_cpa) = coerce_cpa(baseline_cpa) else {
        stats.entities_no_baseline += 1;
        return Vec::new();
    };

    debug!(
        "{} {:?}: {} audiences, {} impressions in window",
        entity.scope,
        entity.name,
        audiences.len(),
        audiences.iter().map(|a| a.impressions).sum::<u64>(),
    );

    let mut operations = Vec::new();
    for segment in audiences {
        match evaluate(entity, entity_cpa, segment, mapping) {
            Ok(op) => operations.push(op),
            Err(Skip::Unmapped) => stats.audiences_unmapped += 1,
            Err(Skip::ZeroConversions) => stats.audiences_zero_conversions += 1,
            Err(Skip::ZeroCost) => stats.audiences_zero_cost += 1,
        }
    }
    operations
}

/// One audience against the entity baseline. Unmapped criteria are not
/// in-market audiences we know; zero conversions leave the audience CPA
/// undefined; zero cost makes it zero and the ratio non-finite. All are
/// exclusions, not errors.
fn evaluate(
    entity: &TargetingEntity,
    entity_cpa: f64,
    segment: &AudienceSegment,
    mapping: &AudienceMapping,
) -> std::result::Result<BidOperation, Skip> {
    let category = mapping.get(&segment.criterion_id).ok_or(Skip::Unmapped)?;
    if segment.conversions <= 0.0 {
        return Err(Skip::ZeroConversions);
    }
    // Converting audiences with no recorded spend would divide the baseline
    // by zero; the resulting inf/NaN must never reach the write path.
    if segment.cost <= 0.0 {
        return Err(Skip::ZeroCost);
    }

    let audience_cpa = segment.cost / segment.conversions;
    Ok(BidOperation {
        audience: AudienceRef {
            scope: entity.scope,
            entity_id: entity.id.clone(),
            criterion_id: segment.criterion_id.clone(),
        },
        category: category.clone(),
        modifier: entity_cpa / audience_cpa,
    })
}

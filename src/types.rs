use serde::Deserialize;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Lookup tables built once per run
// ---------------------------------------------------------------------------

/// Audience criterion id → in-market category label, loaded from the mapping
/// CSV. Immutable after load.
pub type AudienceMapping = HashMap<String, String>;

/// Entity id → raw `CostPerAllConversion` report value. Values stay strings
/// until the coercion boundary in `reports::coerce_cpa`. An absent key means
/// the entity was below the impressions threshold or had no conversions.
pub type PerformanceMap = HashMap<String, String>;

// ---------------------------------------------------------------------------
// Date range
// ---------------------------------------------------------------------------

/// Date range token accepted by report queries and entity selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Today,
    Yesterday,
    Last7Days,
    Last14Days,
    Last30Days,
    ThisMonth,
    LastMonth,
    AllTime,
}

impl DateRange {
    pub fn as_token(&self) -> &'static str {
        match self {
            DateRange::Today => "TODAY",
            DateRange::Yesterday => "YESTERDAY",
            DateRange::Last7Days => "LAST_7_DAYS",
            DateRange::Last14Days => "LAST_14_DAYS",
            DateRange::Last30Days => "LAST_30_DAYS",
            DateRange::ThisMonth => "THIS_MONTH",
            DateRange::LastMonth => "LAST_MONTH",
            DateRange::AllTime => "ALL_TIME",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TODAY" => Some(DateRange::Today),
            "YESTERDAY" => Some(DateRange::Yesterday),
            "LAST_7_DAYS" => Some(DateRange::Last7Days),
            "LAST_14_DAYS" => Some(DateRange::Last14Days),
            "LAST_30_DAYS" => Some(DateRange::Last30Days),
            "THIS_MONTH" => Some(DateRange::ThisMonth),
            "LAST_MONTH" => Some(DateRange::LastMonth),
            "ALL_TIME" => Some(DateRange::AllTime),
            _ => None,
        }
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_token())
    }
}

// ---------------------------------------------------------------------------
// Targeting entities
// ---------------------------------------------------------------------------

/// Audience attachment scope. The platform guarantees a campaign never mixes
/// campaign-level and ad-group-level audience attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityScope {
    Campaign,
    AdGroup,
}

impl std::fmt::Display for EntityScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityScope::Campaign => "campaign",
            EntityScope::AdGroup => "ad_group",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdGroup {
    pub id: String,
    pub name: String,
}

/// The unit the calculator operates on: a campaign or one of its ad groups,
/// depending on where the campaign attaches its audiences.
#[derive(Debug, Clone)]
pub struct TargetingEntity {
    pub scope: EntityScope,
    pub id: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Audiences
// ---------------------------------------------------------------------------

/// An in-market audience attached to a targeting entity, with stats for the
/// run's date window as returned by the enumeration endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceSegment {
    pub criterion_id: String,
    pub impressions: u64,
    /// Fractional conversions are possible (attribution models).
    pub conversions: f64,
    pub cost: f64,
}

/// Addresses one audience criterion for the bid-modifier write.
#[derive(Debug, Clone, PartialEq)]
pub struct AudienceRef {
    pub scope: EntityScope,
    pub entity_id: String,
    pub criterion_id: String,
}

/// One unit of output: apply `modifier` to the referenced audience's bid.
#[derive(Debug, Clone, PartialEq)]
pub struct BidOperation {
    pub audience: AudienceRef,
    /// Mapped in-market category label, carried for logging.
    pub category: String,
    pub modifier: f64,
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RunStats {
    pub campaigns_total: usize,
    pub campaigns_name_filtered: usize,
    pub campaign_scoped: usize,
    pub ad_group_scoped: usize,
    /// Entities whose baseline CPA was absent or non-numeric; all of their
    /// audiences were skipped rather than producing a NaN modifier.
    pub entities_no_baseline: usize,
    pub audiences_unmapped: usize,
    pub audiences_zero_conversions: usize,
    /// Audiences with conversions but no recorded spend; their CPA of zero
    /// would make the modifier ratio non-finite.
    pub audiences_zero_cost: usize,
    pub operations_applied: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_range_tokens_round_trip() {
        for token in [
            "TODAY",
            "YESTERDAY",
            "LAST_7_DAYS",
            "LAST_14_DAYS",
            "LAST_30_DAYS",
            "THIS_MONTH",
            "LAST_MONTH",
            "ALL_TIME",
        ] {
            let range = DateRange::parse(token).unwrap();
            assert_eq!(range.as_token(), token);
        }
    }

    #[test]
    fn unknown_date_range_token_rejected() {
        assert!(DateRange::parse("LAST_90_DAYS").is_none());
        assert!(DateRange::parse("last_7_days").is_none());
    }
}

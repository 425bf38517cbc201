use std::collections::HashMap;

use tracing::info;

use crate::config::{Config, COST_PER_ALL_CONVERSION_FIELD};
use crate::error::{AppError, Result};
use crate::platform::AdsClient;
use crate::types::{DateRange, PerformanceMap};

/// One report row, indexable by field name. All values are strings as
/// delivered by the report interface.
pub type ReportRow = HashMap<String, String>;

/// AWQL report query over one performance report.
#[derive(Debug, Clone)]
pub struct ReportQuery {
    pub id_field: String,
    pub report: String,
    pub minimum_impressions: u64,
    pub date_range: DateRange,
}

impl ReportQuery {
    pub fn new(
        id_field: &str,
        report: &str,
        minimum_impressions: u64,
        date_range: DateRange,
    ) -> Self {
        Self {
            id_field: id_field.to_string(),
            report: report.to_string(),
            minimum_impressions,
            date_range,
        }
    }

    pub fn to_awql(&self) -> String {
        format!(
            "SELECT {}, {} FROM {} WHERE Impressions > {} DURING {}",
            self.id_field,
            COST_PER_ALL_CONVERSION_FIELD,
            self.report,
            self.minimum_impressions,
            self.date_range.as_token(),
        )
    }
}

/// Fetch one performance report and key it by entity id. Values are kept as
/// raw strings; `coerce_cpa` is the only place they become numbers. A row
/// without the cost-per-conversion field contributes no entry (the entity
/// had no conversions), so absent keys mean "no baseline available".
pub async fn fetch_performance(
    client: &AdsClient,
    id_field: &str,
    report: &str,
    cfg: &Config,
) -> Result<PerformanceMap> {
    let query = ReportQuery::new(id_field, report, cfg.minimum_impressions, cfg.date_range);
    let rows = client.query_report(&query).await?;

    let mut map = PerformanceMap::new();
    for row in rows {
        let id = row
            .get(id_field)
            .ok_or_else(|| AppError::Report(format!("{report} row missing {id_field} field")))?;
        if let Some(cpa) = row.get(COST_PER_ALL_CONVERSION_FIELD) {
            map.insert(id.clone(), cpa.clone());
        }
    }

    info!("{report}: {} entities with a CPA baseline", map.len());
    Ok(map)
}

/// Single coercion boundary for report numerics. Report values arrive as
/// strings and may be absent, empty, "--", or carry thousands separators
/// ("1,234.56"); anything that does not parse to a finite float means
/// "no usable baseline" and comes back as None.
pub fn coerce_cpa(raw: Option<&str>) -> Option<f64> {
    let value: f64 = raw?.trim().replace(',', "").parse().ok()?;
    value.is_finite().then_some(value)
}

use crate::error::{AppError, Result};
use crate::types::DateRange;

/// Campaign-level performance report and its entity id field.
pub const CAMPAIGN_PERFORMANCE_REPORT: &str = "CAMPAIGN_PERFORMANCE_REPORT";
pub const CAMPAIGN_ID_FIELD: &str = "CampaignId";

/// Ad-group-level performance report and its entity id field.
pub const ADGROUP_PERFORMANCE_REPORT: &str = "ADGROUP_PERFORMANCE_REPORT";
pub const ADGROUP_ID_FIELD: &str = "AdGroupId";

/// Metric column selected from both performance reports.
pub const COST_PER_ALL_CONVERSION_FIELD: &str = "CostPerAllConversion";

/// Page size for entity/audience enumeration. A short page ends the sequence.
pub const PAGE_SIZE: usize = 500;

/// HTTP timeout for platform API and mapping CSV requests (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the platform account/reporting API (ADS_API_URL).
    pub ads_api_url: String,
    /// CSV mapping source (AUDIENCE_MAPPING_CSV_DOWNLOAD_URL).
    pub mapping_csv_url: String,
    pub log_level: String,
    /// Reporting window for every selector and report query (DATE_RANGE).
    pub date_range: DateRange,
    /// Entities at or below this impression count are excluded everywhere
    /// (MINIMUM_IMPRESSIONS).
    pub minimum_impressions: u64,
    /// Campaign is kept only if its name contains at least one entry;
    /// empty = no restriction (CAMPAIGN_NAME_CONTAINS, comma-separated).
    pub campaign_name_contains: Vec<String>,
    /// Campaign is dropped if its name contains any entry
    /// (CAMPAIGN_NAME_DOES_NOT_CONTAIN, comma-separated).
    pub campaign_name_does_not_contain: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let date_range_raw =
            std::env::var("DATE_RANGE").unwrap_or_else(|_| "LAST_7_DAYS".to_string());
        let date_range = DateRange::parse(&date_range_raw).ok_or_else(|| {
            AppError::Config(format!("DATE_RANGE: unknown token {date_range_raw:?}"))
        })?;

        Ok(Self {
            ads_api_url: std::env::var("ADS_API_URL")
                .map_err(|_| AppError::Config("ADS_API_URL must be set".to_string()))?,
            mapping_csv_url: std::env::var("AUDIENCE_MAPPING_CSV_DOWNLOAD_URL").map_err(|_| {
                AppError::Config("AUDIENCE_MAPPING_CSV_DOWNLOAD_URL must be set".to_string())
            })?,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            date_range,
            minimum_impressions: std::env::var("MINIMUM_IMPRESSIONS")
                .unwrap_or_else(|_| "100".to_string())
                .parse::<u64>()
                .map_err(|_| {
                    AppError::Config("MINIMUM_IMPRESSIONS must be an integer".to_string())
                })?,
            campaign_name_contains: split_list(
                &std::env::var("CAMPAIGN_NAME_CONTAINS").unwrap_or_default(),
            ),
            campaign_name_does_not_contain: split_list(
                &std::env::var("CAMPAIGN_NAME_DOES_NOT_CONTAIN").unwrap_or_default(),
            ),
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_trims_and_drops_empties() {
        assert_eq!(
            split_list(" Brand , _Search_ ,,"),
            vec!["Brand".to_string(), "_Search_".to_string()]
        );
        assert!(split_list("").is_empty());
    }
}

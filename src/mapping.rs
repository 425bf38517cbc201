use std::time::Duration;

use tracing::debug;

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::{AppError, Result};
use crate::types::AudienceMapping;

/// Required header columns, matched exactly (case-sensitive).
pub const CRITERION_ID_COLUMN: &str = "Criterion ID";
pub const CATEGORY_COLUMN: &str = "Category";

/// Download and parse the criterion-id → category mapping CSV.
/// One network fetch per run; the result is immutable afterwards.
pub async fn load_audience_mapping(url: &str) -> Result<AudienceMapping> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()?;

    let body = client.get(url).send().await?.error_for_status()?.text().await?;
    parse_audience_mapping(&body)
}

/// Parse delimited text with a header row into the audience mapping.
/// Missing required columns are fatal (no partial mapping is usable).
/// Duplicate criterion ids: last row wins. Extra columns are ignored.
pub fn parse_audience_mapping(text: &str) -> Result<AudienceMapping> {
    let mut lines = text.lines();
    let header = lines
        .next()
        .ok_or_else(|| AppError::Config("audience mapping CSV is empty".to_string()))?;
    let columns = split_row(header);

    let id_col = require_column(&columns, CRITERION_ID_COLUMN)?;
    let category_col = require_column(&columns, CATEGORY_COLUMN)?;

    let mut mapping = AudienceMapping::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_row(line);
        let (Some(id), Some(category)) = (fields.get(id_col), fields.get(category_col)) else {
            debug!("mapping row too short, skipped: {line:?}");
            continue;
        };
        mapping.insert(id.clone(), category.clone());
    }

    Ok(mapping)
}

fn require_column(columns: &[String], name: &str) -> Result<usize> {
    columns.iter().position(|c| c == name).ok_or_else(|| {
        AppError::Config(format!("audience mapping CSV is missing the {name:?} column"))
    })
}

/// Naive comma split; fields are trimmed and surrounding quotes stripped.
/// Embedded commas inside quoted fields are not supported by the source.
fn split_row(line: &str) -> Vec<String> {
    line.split(',')
        .map(|f| f.trim().trim_matches('"').to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};

    #[test]
    fn builds_mapping_from_valid_csv() {
        let csv = "Criterion ID,Category\n111,Shoppers\n222,Researchers\n";
        let mapping = parse_audience_mapping(csv).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping["111"], "Shoppers");
        assert_eq!(mapping["222"], "Researchers");
    }

    #[test]
    fn later_duplicate_rows_overwrite_earlier() {
        let csv = "Criterion ID,Category\n111,Shoppers\n111,Researchers\n";
        let mapping = parse_audience_mapping(csv).unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping["111"], "Researchers");
    }

    #[test]
    fn extra_columns_and_order_are_irrelevant() {
        let csv = "Notes,Category,Criterion ID\nignored,Shoppers,111\n";
        let mapping = parse_audience_mapping(csv).unwrap();
        assert_eq!(mapping["111"], "Shoppers");
    }

    #[test]
    fn quoted_fields_and_crlf_are_tolerated() {
        let csv = "Criterion ID,Category\r\n\"111\",\"Luxury Shoppers\"\r\n\r\n";
        let mapping = parse_audience_mapping(csv).unwrap();
        assert_eq!(mapping["111"], "Luxury Shoppers");
    }

    #[test]
    fn missing_criterion_id_column_is_fatal() {
        let csv = "Criterion,Category\n111,Shoppers\n";
        let err = parse_audience_mapping(csv).unwrap_err();
        assert!(matches!(err, AppError::Config(_)), "got {err:?}");
        assert!(err.to_string().contains("Criterion ID"));
    }

    #[test]
    fn missing_category_column_is_fatal() {
        let csv = "Criterion ID,category\n111,Shoppers\n";
        let err = parse_audience_mapping(csv).unwrap_err();
        assert!(matches!(err, AppError::Config(_)), "got {err:?}");
        assert!(err.to_string().contains("Category"));
    }

    #[test]
    fn empty_body_is_fatal() {
        assert!(matches!(
            parse_audience_mapping(""),
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn loads_mapping_over_http() {
        let server = MockServer::start_async().await;
        let csv = server
            .mock_async(|when, then| {
                when.method(GET).path("/mapping.csv");
                then.status(200)
                    .body("Criterion ID,Category\n111,Shoppers\n");
            })
            .await;

        let mapping = load_audience_mapping(&server.url("/mapping.csv")).await.unwrap();
        assert_eq!(mapping["111"], "Shoppers");
        csv.assert_async().await;
    }

    #[tokio::test]
    async fn http_failure_propagates() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/mapping.csv");
                then.status(500);
            })
            .await;

        let err = load_audience_mapping(&server.url("/mapping.csv")).await.unwrap_err();
        assert!(matches!(err, AppError::Http(_)), "got {err:?}");
    }
}

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::config::{HTTP_TIMEOUT_SECS, PAGE_SIZE};
use crate::error::{AppError, Result};
use crate::platform::Selector;
use crate::reports::{ReportQuery, ReportRow};
use crate::types::{AdGroup, AudienceRef, AudienceSegment, Campaign, EntityScope};

/// Thin client for the account/reporting/mutation API. Enumeration endpoints
/// return bare JSON arrays and are paged by limit/offset; a short page ends
/// the sequence.
pub struct AdsClient {
    http: reqwest::Client,
    base_url: String,
}

impl AdsClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Enumerate campaigns matching the selector.
    pub async fn campaigns(&self, selector: &Selector) -> Result<Vec<Campaign>> {
        self.get_paged("campaigns", selector).await
    }

    /// Enumerate a campaign's ad groups matching the selector.
    pub async fn ad_groups(&self, campaign_id: &str, selector: &Selector) -> Result<Vec<AdGroup>> {
        self.get_paged(&format!("campaigns/{campaign_id}/adgroups"), selector)
            .await
    }

    /// Enumerate the in-market audiences attached to an entity at the given
    /// scope, with stats for the selector's date range.
    pub async fn audiences(
        &self,
        scope: EntityScope,
        entity_id: &str,
        selector: &Selector,
    ) -> Result<Vec<AudienceSegment>> {
        let path = match scope {
            EntityScope::Campaign => format!("campaigns/{entity_id}/audiences"),
            EntityScope::AdGroup => format!("adgroups/{entity_id}/audiences"),
        };
        self.get_paged(&path, selector).await
    }

    /// Run an AWQL report query. Rows come back as flat string→string
    /// objects indexable by field name.
    pub async fn query_report(&self, query: &ReportQuery) -> Result<Vec<ReportRow>> {
        let awql = query.to_awql();
        debug!("report query: {awql}");

        let url = format!("{}/reports", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("query", awql.as_str())])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AppError::Platform(format!(
                "report {} returned {}",
                query.report,
                resp.status()
            )));
        }
        Ok(resp.json().await?)
    }

    /// Write one audience bid modifier. Fire-and-forget from the pipeline's
    /// perspective; a non-2xx response aborts the run.
    pub async fn set_bid_modifier(&self, audience: &AudienceRef, modifier: f64) -> Result<()> {
        let url = format!("{}/bidModifiers", self.base_url);
        let body = json!({
            "scope": audience.scope.to_string(),
            "entityId": audience.entity_id,
            "criterionId": audience.criterion_id,
            "modifier": modifier,
        });
        let resp = self.http.post(&url).json(&body).send().await?;
        if !resp.status().is_success() {
            return Err(AppError::Platform(format!(
                "bid modifier write for criterion {} returned {}",
                audience.criterion_id,
                resp.status()
            )));
        }
        Ok(())
    }

    async fn get_paged<T: DeserializeOwned>(
        &self,
        path: &str,
        selector: &Selector,
    ) -> Result<Vec<T>> {
        let url = format!("{}/{}", self.base_url, path);
        let mut items = Vec::new();
        let mut offset = 0usize;

        loop {
            let mut params = selector.query_pairs();
            params.push(("limit", PAGE_SIZE.to_string()));
            params.push(("offset", offset.to_string()));

            let resp = self.http.get(&url).query(&params).send().await?;
            if !resp.status().is_success() {
                return Err(AppError::Platform(format!(
                    "GET /{path} returned {}",
                    resp.status()
                )));
            }

            let page: Vec<T> = resp.json().await?;
            let page_len = page.len();
            items.extend(page);

            if page_len < PAGE_SIZE {
                break;
            }
            offset += PAGE_SIZE;
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DateRange;
    use httpmock::{Method::GET, Method::POST, MockServer};
    use serde_json::Value;

    fn selector() -> Selector {
        Selector::new(DateRange::Last7Days).with_condition("Impressions > 100")
    }

    #[tokio::test]
    async fn short_page_ends_enumeration() {
        let server = MockServer::start_async().await;
        let page = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/campaigns")
                    .query_param("condition", "Impressions > 100")
                    .query_param("dateRange", "LAST_7_DAYS")
                    .query_param("offset", "0");
                then.status(200)
                    .json_body(json!([{"id": "C1", "name": "Generic_Search"}]));
            })
            .await;

        let client = AdsClient::new(&server.base_url()).unwrap();
        let campaigns = client.campaigns(&selector()).await.unwrap();
        assert_eq!(campaigns.len(), 1);
        assert_eq!(campaigns[0].id, "C1");
        page.assert_async().await;
    }

    #[tokio::test]
    async fn full_page_triggers_next_offset() {
        let server = MockServer::start_async().await;
        let full: Vec<Value> = (0..PAGE_SIZE)
            .map(|i| json!({"id": format!("C{i}"), "name": format!("Campaign {i}")}))
            .collect();

        let first = server
            .mock_async(|when, then| {
                when.method(GET).path("/campaigns").query_param("offset", "0");
                then.status(200).json_body(Value::Array(full));
            })
            .await;
        let second = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/campaigns")
                    .query_param("offset", PAGE_SIZE.to_string());
                then.status(200).json_body(json!([]));
            })
            .await;

        let client = AdsClient::new(&server.base_url()).unwrap();
        let campaigns = client.campaigns(&selector()).await.unwrap();
        assert_eq!(campaigns.len(), PAGE_SIZE);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn non_2xx_enumeration_is_a_platform_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/campaigns");
                then.status(503);
            })
            .await;

        let client = AdsClient::new(&server.base_url()).unwrap();
        let err = client.campaigns(&selector()).await.unwrap_err();
        assert!(matches!(err, AppError::Platform(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn bid_modifier_write_posts_scope_and_ratio() {
        let server = MockServer::start_async().await;
        let write = server
            .mock_async(|when, then| {
                when.method(POST).path("/bidModifiers").json_body(json!({
                    "scope": "campaign",
                    "entityId": "C1",
                    "criterionId": "111",
                    "modifier": 1.25,
                }));
                then.status(200);
            })
            .await;

        let client = AdsClient::new(&server.base_url()).unwrap();
        let audience = AudienceRef {
            scope: EntityScope::Campaign,
            entity_id: "C1".to_string(),
            criterion_id: "111".to_string(),
        };
        client.set_bid_modifier(&audience, 1.25).await.unwrap();
        write.assert_async().await;
    }
}

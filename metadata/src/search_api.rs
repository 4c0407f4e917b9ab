use crate::error::MetadataError;
use crate::http;
use async_trait::async_trait;
use recommend_common::{Credentials, RecordId, Recommendation};
use serde::{Deserialize, Serialize};

/// Response payload for a recommendation request, in the shape of a record
/// search result so existing clients can render it unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apikey: Option<String>,
    pub success: bool,
    #[serde(rename = "itemsCount")]
    pub items_count: u64,
    #[serde(rename = "totalResults")]
    pub total_results: u64,
    pub items: Vec<serde_json::Value>,
}

impl RecommendResponse {
    /// A successful response carrying no items. Used when the seed is valid
    /// but yields no recommendations.
    pub fn empty(api_key: Option<String>) -> Self {
        Self {
            apikey: api_key,
            success: true,
            items_count: 0,
            total_results: 0,
            items: Vec::new(),
        }
    }
}

/// Raw search result shape from the record search service
#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(rename = "totalResults", default)]
    total_results: u64,
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

/// Access to the record search service
#[async_trait]
pub trait RecordGateway: Send + Sync {
    /// Whether the record exists at all, indexed for similarity or not
    async fn record_exists(
        &self,
        record_id: &RecordId,
        credentials: &Credentials,
    ) -> Result<bool, MetadataError>;

    /// Resolve ranked recommendations into full record summaries. The order
    /// of the input is not preserved by the search service; callers re-sort.
    async fn hydrate(
        &self,
        recommendations: &[Recommendation],
        page_size: usize,
        credentials: &Credentials,
    ) -> Result<RecommendResponse, MetadataError>;
}

/// Configuration for the record search client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchApiConfig {
    /// Base url of the record search service, e.g.
    /// `https://api.example.org/record`
    pub endpoint: String,

    /// Fixed timeout applied to every outbound call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    http::DEFAULT_TIMEOUT_SECS
}

impl SearchApiConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("endpoint must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}

/// HTTP client for the record search service
pub struct SearchApiClient {
    http: reqwest::Client,
    config: SearchApiConfig,
}

impl SearchApiClient {
    pub fn new(config: SearchApiConfig) -> Result<Self, MetadataError> {
        config.validate().map_err(MetadataError::Config)?;
        let http = http::build_client(config.timeout_secs)?;
        Ok(Self { http, config })
    }

    fn search_url(&self) -> String {
        format!("{}/search.json", self.config.endpoint.trim_end_matches('/'))
    }

    async fn search(
        &self,
        query: &str,
        rows: usize,
        credentials: &Credentials,
        what: &str,
    ) -> Result<SearchResult, MetadataError> {
        let rows = rows.to_string();
        let params: &[(&str, &str)] = &[
            ("query", query),
            ("rows", &rows),
            ("profile", "minimal"),
        ];
        http::get_json(&self.http, &self.search_url(), params, credentials, what).await
    }
}

#[async_trait]
impl RecordGateway for SearchApiClient {
    async fn record_exists(
        &self,
        record_id: &RecordId,
        credentials: &Credentials,
    ) -> Result<bool, MetadataError> {
        let query = format!("record_id:{}", record_id.storage_id_quoted());
        let result = self
            .search(&query, 1, credentials, &format!("record {record_id}"))
            .await?;
        Ok(result.total_results >= 1)
    }

    async fn hydrate(
        &self,
        recommendations: &[Recommendation],
        page_size: usize,
        credentials: &Credentials,
    ) -> Result<RecommendResponse, MetadataError> {
        let api_key = credentials.api_key().map(str::to_string);
        if recommendations.is_empty() {
            return Ok(RecommendResponse::empty(api_key));
        }

        let count = recommendations.len().min(page_size);
        let query = recommendations[..count]
            .iter()
            .map(|rec| format!("record_id:{}", rec.record_id().storage_id_quoted()))
            .collect::<Vec<_>>()
            .join(" OR ");
        let result = self
            .search(&query, count, credentials, "recommended records")
            .await?;

        Ok(RecommendResponse {
            apikey: api_key,
            success: true,
            items_count: result.items.len() as u64,
            total_results: result.total_results,
            items: result.items,
        })
    }
}

use crate::error::MetadataError;
use crate::http;
use async_trait::async_trait;
use log::{debug, warn};
use recommend_common::{Collection, CollectionSearch, Credentials};
use serde::{Deserialize, Serialize};

/// Maximum number of items to consider from an entity's best-items set
const MAX_SET_ITEMS: usize = 100;

/// Configuration for the set store client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetApiConfig {
    /// Base url of the set store, e.g. `https://api.example.org/set`
    pub endpoint: String,

    /// Fixed timeout applied to every outbound call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    http::DEFAULT_TIMEOUT_SECS
}

impl SetApiConfig {
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

/// Read-only access to the curated-set store
#[async_trait]
pub trait SetStore: Send + Sync {
    /// Fetch one set by id. A missing set is `MetadataError::NotFound`.
    async fn get_set(
        &self,
        set_id: &str,
        credentials: &Credentials,
    ) -> Result<Collection, MetadataError>;

    /// Find the best-items set associated with an entity uri, if any.
    /// `Ok(None)` means no set is associated, which is a normal outcome.
    async fn get_set_for_entity(
        &self,
        entity_uri: &str,
        credentials: &Credentials,
    ) -> Result<Option<Collection>, MetadataError>;
}

/// HTTP client for the set store
pub struct SetApiClient {
    http: reqwest::Client,
    config: SetApiConfig,
}

impl SetApiClient {
    pub fn new(config: SetApiConfig) -> Result<Self, MetadataError> {
        config.validate().map_err(MetadataError::Config)?;
        let http = http::build_client(config.timeout_secs)?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl SetStore for SetApiClient {
    async fn get_set(
        &self,
        set_id: &str,
        credentials: &Credentials,
    ) -> Result<Collection, MetadataError> {
        http::get_json(
            &self.http,
            &self.url(set_id),
            &[],
            credentials,
            &format!("set {set_id}"),
        )
        .await
    }

    async fn get_set_for_entity(
        &self,
        entity_uri: &str,
        credentials: &Credentials,
    ) -> Result<Option<Collection>, MetadataError> {
        let page_size = MAX_SET_ITEMS.to_string();
        let subject = format!("subject:{entity_uri}");
        let query: &[(&str, &str)] = &[
            ("query", "type:EntityBestItemsSet"),
            ("qf", &subject),
            ("pageSize", &page_size),
            ("profile", "standard"),
        ];

        let mut search: CollectionSearch = http::get_json(
            &self.http,
            &self.url("search.json"),
            query,
            credentials,
            &format!("sets for entity {entity_uri}"),
        )
        .await?;

        if search.total == 0 || search.items.is_empty() {
            debug!("No set associated with entity {entity_uri}");
            return Ok(None);
        }
        if search.total > 1 {
            warn!("Multiple sets associated with entity {entity_uri}, using first");
        }
        Ok(Some(search.items.remove(0)))
    }
}

use crate::error::MetadataError;
use crate::http;
use async_trait::async_trait;
use recommend_common::{Credentials, Entity, EntityType};
use serde::{Deserialize, Serialize};

/// Configuration for the entity store client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityApiConfig {
    /// Base url of the entity store, e.g. `https://api.example.org/entity`
    pub endpoint: String,

    /// Fixed timeout applied to every outbound call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    http::DEFAULT_TIMEOUT_SECS
}

impl EntityApiConfig {
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

/// Read-only access to the entity store
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Fetch one entity's labels by type and id. A missing entity is
    /// `MetadataError::NotFound`.
    async fn get_entity(
        &self,
        kind: EntityType,
        id: u64,
        credentials: &Credentials,
    ) -> Result<Entity, MetadataError>;
}

/// HTTP client for the entity store
pub struct EntityApiClient {
    http: reqwest::Client,
    config: EntityApiConfig,
}

impl EntityApiClient {
    pub fn new(config: EntityApiConfig) -> Result<Self, MetadataError> {
        config.validate().map_err(MetadataError::Config)?;
        let http = http::build_client(config.timeout_secs)?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl EntityStore for EntityApiClient {
    async fn get_entity(
        &self,
        kind: EntityType,
        id: u64,
        credentials: &Credentials,
    ) -> Result<Entity, MetadataError> {
        let url = format!(
            "{}/{kind}/{id}",
            self.config.endpoint.trim_end_matches('/')
        );
        http::get_json(
            &self.http,
            &url,
            &[],
            credentials,
            &format!("entity {kind}/{id}"),
        )
        .await
    }
}

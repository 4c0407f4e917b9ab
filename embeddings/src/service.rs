use crate::error::EmbeddingError;
use async_trait::async_trait;
use log::{debug, warn};
use recommend_common::{
    most_preferred_language, most_preferred_language_list, Collection, Entity, EntityType,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the embeddings client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// Full url of the embed endpoint
    pub endpoint: String,

    /// Fixed timeout applied to every outbound call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl EmbeddingsConfig {
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

/// One record in an embedding request. The service accepts text arrays per
/// seed category; fields that do not apply to the seed are omitted, but the
/// fields that do apply are always present, with empty strings standing in
/// for missing values so the request stays well-formed.
#[derive(Debug, Clone, Serialize)]
struct EmbeddingRecord {
    id: String,
    title: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    agent: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    concept: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    place: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timespan: Option<Vec<String>>,
}

impl EmbeddingRecord {
    fn empty(id: String) -> Self {
        Self {
            id,
            title: Vec::new(),
            description: None,
            agent: None,
            concept: None,
            place: None,
            timespan: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    records: Vec<EmbeddingRecord>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    embedding: Vec<f32>,

    #[serde(default)]
    status: i32,
}

/// Seed-to-vector operations the recommendation engine consumes
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding from a curated set's title and description
    async fn embed_set(&self, set: &Collection) -> Result<Vec<f32>, EmbeddingError>;

    /// Generate an embedding from an entity's preferred and alternate labels
    async fn embed_entity(&self, entity: &Entity) -> Result<Vec<f32>, EmbeddingError>;
}

/// Client for the external text-to-vector service
pub struct EmbeddingsClient {
    http: reqwest::Client,
    config: EmbeddingsConfig,
}

impl EmbeddingsClient {
    pub fn new(config: EmbeddingsConfig) -> Result<Self, EmbeddingError> {
        config.validate().map_err(EmbeddingError::Config)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::Initialization(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Send a single-record request and return its embedding
    async fn request(&self, record: EmbeddingRecord) -> Result<Vec<f32>, EmbeddingError> {
        let seed_id = record.id.clone();
        let request = EmbeddingRequest {
            records: vec![record],
        };

        let response = self
            .http
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(EmbeddingError::Service(format!(
                "embeddings service answered with status {}",
                response.status()
            )));
        }

        let mut response: EmbeddingResponse = response.json().await?;
        if response.data.is_empty() {
            return Err(EmbeddingError::EmptyResponse(seed_id));
        }
        let data = response.data.remove(0);
        if data.status != 0 {
            warn!(
                "Embeddings service reported status {} for {seed_id}",
                data.status
            );
        }
        if data.embedding.is_empty() {
            return Err(EmbeddingError::EmptyResponse(seed_id));
        }
        debug!(
            "Generated {}-dimensional embedding for {seed_id}",
            data.embedding.len()
        );
        Ok(data.embedding)
    }
}

#[async_trait]
impl Embedder for EmbeddingsClient {
    async fn embed_set(&self, set: &Collection) -> Result<Vec<f32>, EmbeddingError> {
        let language = match most_preferred_language(&set.title) {
            Some(lang) => Some(lang),
            None => {
                warn!(
                    "Set {} has no title in any preferred language, falling back to description",
                    set.id
                );
                most_preferred_language(&set.description)
            }
        };

        // A missing value becomes an empty string, never an omitted field
        let (title, description) = match language {
            Some(lang) => (
                set.title.get(lang).cloned().unwrap_or_default(),
                set.description.get(lang).cloned().unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        };

        let mut record = EmbeddingRecord::empty(set.id.clone());
        record.title = vec![title];
        record.description = Some(vec![description]);
        self.request(record).await
    }

    async fn embed_entity(&self, entity: &Entity) -> Result<Vec<f32>, EmbeddingError> {
        let language = most_preferred_language(&entity.pref_label)
            .or_else(|| most_preferred_language_list(&entity.alt_label));

        let mut labels = Vec::new();
        if let Some(lang) = language {
            if let Some(pref) = entity.pref_label.get(lang) {
                labels.push(pref.clone());
            }
            if let Some(alts) = entity.alt_label.get(lang) {
                labels.extend(alts.iter().cloned());
            }
        }

        let mut record = EmbeddingRecord::empty(entity.id.clone());
        match entity.kind {
            EntityType::Agent => record.agent = Some(labels),
            EntityType::Concept => record.concept = Some(labels),
            EntityType::Place => record.place = Some(labels),
            EntityType::Timespan => record.timespan = Some(labels),
        }
        self.request(record).await
    }
}

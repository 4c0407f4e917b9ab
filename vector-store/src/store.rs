use crate::error::VectorStoreError;
use async_trait::async_trait;
use log::{debug, info, warn};
use recommend_common::{Recommendation, RecordId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Primary key field of the backend collection (storage rendering of a
/// record id)
const RECORD_ID_FIELD: &str = "record_id";

/// Field holding the item embedding
const VECTOR_FIELD: &str = "vector";

const LOAD_STATE_PATH: &str = "/v2/vectordb/collections/get_load_state";
const LOAD_PATH: &str = "/v2/vectordb/collections/load";
const GET_PATH: &str = "/v2/vectordb/entities/get";
const SEARCH_PATH: &str = "/v2/vectordb/entities/search";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Highest raw similarity the backend should report. Properly normalised
/// embeddings cannot exceed this, but the backend occasionally returns
/// slightly higher values; hits above the maximum are dropped and logged
/// rather than clamped, since they indicate an untrusted measurement.
pub const MAX_RAW_SIMILARITY: f32 = 1.0;

/// Configuration for the vector store client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// Base url of the backend, e.g. `http://localhost:19530`
    pub endpoint: String,

    /// Name of the collection holding the item vectors
    pub collection: String,

    /// Fixed timeout applied to every outbound call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            collection: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl VectorStoreConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("endpoint must not be empty".to_string());
        }
        if self.collection.trim().is_empty() {
            return Err("collection must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}

/// Read-only similarity index operations the recommendation engine consumes
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Point lookup of the stored vector for one record. `None` means the
    /// record is not indexed, which is a normal outcome, not a failure.
    async fn get_vector(&self, id: &RecordId) -> Result<Option<Vec<f32>>, VectorStoreError>;

    /// Batch lookup. Unindexed ids are simply absent from the result, so
    /// entries are keyed by returned record id, not input position.
    async fn get_vectors(
        &self,
        ids: &[RecordId],
    ) -> Result<Vec<(RecordId, Vec<f32>)>, VectorStoreError>;

    /// Similarity search with one or more query vectors. Returns at most
    /// `top_k` hits per query vector, keyed by record id; collisions across
    /// query vectors are merged additively. `weight` multiplies each
    /// converted score.
    async fn search(
        &self,
        vectors: &[Vec<f32>],
        top_k: usize,
        exclude: &[RecordId],
        weight: f32,
    ) -> Result<HashMap<RecordId, Recommendation>, VectorStoreError>;
}

/// Client for the similarity-search backend
#[derive(Debug)]
pub struct VectorStore {
    http: reqwest::Client,
    config: VectorStoreConfig,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    #[serde(default)]
    code: i64,

    #[serde(default)]
    message: Option<String>,

    data: Option<T>,
}

#[derive(Debug, Serialize)]
struct CollectionRequest<'a> {
    #[serde(rename = "collectionName")]
    collection_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoadStateData {
    #[serde(rename = "loadState")]
    load_state: String,
}

#[derive(Debug, Serialize)]
struct GetVectorsRequest<'a> {
    #[serde(rename = "collectionName")]
    collection_name: &'a str,
    ids: Vec<String>,
    #[serde(rename = "outputFields")]
    output_fields: [&'static str; 2],
}

#[derive(Debug, Deserialize)]
struct VectorRow {
    record_id: String,
    #[serde(default)]
    vector: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    #[serde(rename = "collectionName")]
    collection_name: &'a str,
    data: [&'a [f32]; 1],
    #[serde(rename = "annsField")]
    anns_field: &'static str,
    limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a str>,
    #[serde(rename = "outputFields")]
    output_fields: [&'static str; 1],
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    record_id: String,
    distance: f32,
}

impl VectorStore {
    /// Connect to the backend and verify the configured collection is
    /// available. Loading is requested only when the collection is not
    /// loaded yet; the load operation is idempotent upstream, so there is no
    /// need to guard against concurrent startups.
    pub async fn connect(config: VectorStoreConfig) -> Result<Self, VectorStoreError> {
        config.validate().map_err(VectorStoreError::Config)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VectorStoreError::Initialization(e.to_string()))?;

        let store = Self { http, config };
        store.ensure_collection_loaded().await?;

        info!(
            "Vector store client ready for collection {}",
            store.config.collection
        );
        Ok(store)
    }

    async fn ensure_collection_loaded(&self) -> Result<(), VectorStoreError> {
        let collection = &self.config.collection;
        let state: LoadStateData = self
            .post_required(
                LOAD_STATE_PATH,
                &CollectionRequest {
                    collection_name: collection,
                },
            )
            .await?;

        match state.load_state.as_str() {
            "LoadStateLoaded" => info!("Collection {collection} is loaded"),
            "LoadStateLoading" => info!("Collection {collection} is being loaded"),
            "LoadStateNotLoad" => {
                info!("Sending request to load collection {collection}...");
                let _: Option<serde_json::Value> = self
                    .post(
                        LOAD_PATH,
                        &CollectionRequest {
                            collection_name: collection,
                        },
                    )
                    .await?;
            }
            "LoadStateNotExist" => {
                return Err(VectorStoreError::UnknownCollection(collection.clone()));
            }
            other => {
                return Err(VectorStoreError::UnknownLoadState {
                    collection: collection.clone(),
                    state: other.to_string(),
                });
            }
        }
        Ok(())
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<Option<T>, VectorStoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.config.endpoint.trim_end_matches('/'));
        let response = self.http.post(url).json(body).send().await?;
        if !response.status().is_success() {
            return Err(VectorStoreError::Backend(format!(
                "{path} answered with status {}",
                response.status()
            )));
        }

        let envelope: ApiEnvelope<T> = response.json().await?;
        if envelope.code != 0 {
            return Err(VectorStoreError::Backend(format!(
                "{path} answered with code {}: {}",
                envelope.code,
                envelope.message.unwrap_or_default()
            )));
        }
        Ok(envelope.data)
    }

    async fn post_required<B, T>(&self, path: &str, body: &B) -> Result<T, VectorStoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post(path, body)
            .await?
            .ok_or_else(|| VectorStoreError::Backend(format!("{path} answered without data")))
    }

    pub fn config(&self) -> &VectorStoreConfig {
        &self.config
    }
}

#[async_trait]
impl VectorIndex for VectorStore {
    async fn get_vector(&self, id: &RecordId) -> Result<Option<Vec<f32>>, VectorStoreError> {
        let mut results = self.get_vectors(std::slice::from_ref(id)).await?;
        if results.len() > 1 {
            // Should not happen; kept to verify the index updater deletes
            // old rows before adding new ones
            warn!("{} rows found in vector store for id {id}", results.len());
        }
        Ok(results
            .drain(..)
            .next()
            .map(|(_, vector)| vector)
            .filter(|vector| !vector.is_empty()))
    }

    async fn get_vectors(
        &self,
        ids: &[RecordId],
    ) -> Result<Vec<(RecordId, Vec<f32>)>, VectorStoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let request = GetVectorsRequest {
            collection_name: &self.config.collection,
            ids: ids.iter().map(RecordId::storage_id).collect(),
            output_fields: [RECORD_ID_FIELD, VECTOR_FIELD],
        };
        let rows: Vec<VectorRow> = self.post(GET_PATH, &request).await?.unwrap_or_default();
        if rows.is_empty() {
            debug!("No vectors found for {} requested id(s)", ids.len());
        }

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            match row.record_id.parse::<RecordId>() {
                Ok(id) => result.push((id, row.vector)),
                Err(err) => warn!("Skipping vector row with malformed record id: {err}"),
            }
        }
        Ok(result)
    }

    async fn search(
        &self,
        vectors: &[Vec<f32>],
        top_k: usize,
        exclude: &[RecordId],
        weight: f32,
    ) -> Result<HashMap<RecordId, Recommendation>, VectorStoreError> {
        let filter = exclusion_filter(exclude);
        let mut result: HashMap<RecordId, Recommendation> = HashMap::new();

        for vector in vectors {
            let request = SearchRequest {
                collection_name: &self.config.collection,
                data: [vector.as_slice()],
                anns_field: VECTOR_FIELD,
                limit: top_k,
                filter: filter.as_deref(),
                output_fields: [RECORD_ID_FIELD],
            };
            let hits: Vec<SearchHit> = self.post(SEARCH_PATH, &request).await?.unwrap_or_default();

            for hit in hits {
                let id = match hit.record_id.parse::<RecordId>() {
                    Ok(id) => id,
                    Err(err) => {
                        warn!("Skipping search hit with malformed record id: {err}");
                        continue;
                    }
                };
                let score = (MAX_RAW_SIMILARITY - hit.distance) * weight;
                if score < 0.0 {
                    warn!(
                        "Record {id} has raw similarity {} above the maximum {MAX_RAW_SIMILARITY}, ignoring hit",
                        hit.distance
                    );
                    continue;
                }
                let recommendation = Recommendation::new(id.clone(), score);
                match result.get_mut(&id) {
                    Some(existing) => existing.merge(&recommendation)?,
                    None => {
                        result.insert(id, recommendation);
                    }
                }
            }
        }

        debug!(
            "Similarity search with {} query vector(s) produced {} candidate(s)",
            vectors.len(),
            result.len()
        );
        Ok(result)
    }
}

/// Build the backend filter expression excluding the given record ids,
/// e.g. `record_id not in ["92062/abc","92062/def"]`
fn exclusion_filter(exclude: &[RecordId]) -> Option<String> {
    if exclude.is_empty() {
        return None;
    }
    let ids: Vec<String> = exclude.iter().map(RecordId::storage_id_quoted).collect();
    Some(format!("{RECORD_ID_FIELD} not in [{}]", ids.join(",")))
}

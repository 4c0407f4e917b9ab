use crate::config::EngineConfig;
use crate::error::{RecommendError, Result};
use crate::fusion;
use log::{debug, error, info, warn};
use recommend_common::{entity_uri, Collection, Credentials, EntityType, Recommendation, RecordId};
use recommend_embeddings::Embedder;
use recommend_metadata::{EntityStore, RecommendResponse, RecordGateway, SetStore};
use recommend_vector_store::{VectorIndex, VectorStoreError};
use std::collections::HashMap;
use std::sync::Arc;

/// The recommendation engine.
///
/// Resolves a seed (a record, a curated set or a named entity) into one or
/// more query vectors, runs weighted similarity searches for them, fuses the
/// candidate groups additively and hydrates the ranked ids into a response.
///
/// The collaborators behind the trait objects fail independently. Failures
/// while resolving the seed itself are fatal; failures producing one of
/// several candidate groups degrade to a response built from the groups that
/// did succeed.
pub struct RecommendEngine {
    config: EngineConfig,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    sets: Arc<dyn SetStore>,
    entities: Arc<dyn EntityStore>,
    records: Arc<dyn RecordGateway>,
}

impl RecommendEngine {
    pub fn new(
        config: EngineConfig,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
        sets: Arc<dyn SetStore>,
        entities: Arc<dyn EntityStore>,
        records: Arc<dyn RecordGateway>,
    ) -> Result<Self> {
        config.validate().map_err(RecommendError::Config)?;
        Ok(Self {
            config,
            index,
            embedder,
            sets,
            entities,
            records,
        })
    }

    /// Recommend items similar to one record.
    ///
    /// A record that exists but is not in the similarity index yields an
    /// empty response; a record that does not exist at all is `NotFound`.
    pub async fn recommend_record(
        &self,
        record_id: &RecordId,
        page_size: Option<usize>,
        credentials: &Credentials,
    ) -> Result<RecommendResponse> {
        let page_size = self.page_size(page_size);

        let Some(vector) = self.index.get_vector(record_id).await? else {
            let exists = self
                .records
                .record_exists(record_id, credentials)
                .await
                .map_err(RecommendError::Metadata)?;
            if !exists {
                return Err(RecommendError::NotFound(format!("record {record_id}")));
            }
            debug!("Record {record_id} exists but is not indexed for similarity");
            return self.finish(HashMap::new(), page_size, credentials).await;
        };

        let candidates = self
            .index
            .search(
                &[vector],
                page_size,
                std::slice::from_ref(record_id),
                1.0,
            )
            .await?;
        self.finish(candidates, page_size, credentials).await
    }

    /// Recommend items for a curated set, combining candidates similar to
    /// the set's items with candidates found from its title and description.
    pub async fn recommend_set(
        &self,
        set_id: &str,
        page_size: Option<usize>,
        credentials: &Credentials,
    ) -> Result<RecommendResponse> {
        let page_size = self.page_size(page_size);

        let set = self
            .sets
            .get_set(set_id, credentials)
            .await
            .map_err(RecommendError::from_seed_lookup)?;
        if set.is_open() {
            warn!("Set {set_id} is an open set, returning no recommendations");
            return self.finish(HashMap::new(), page_size, credentials).await;
        }

        let members = set.item_record_ids();
        let (items, metadata) = tokio::join!(
            self.search_similar_to_members(&members, page_size, self.config.set_items_weight),
            self.search_set_metadata(&set, &members, page_size),
        );

        let merged = fusion::merge_candidates(vec![items?, metadata?])?;
        self.finish(merged, page_size, credentials).await
    }

    /// Recommend items for a named entity, combining candidates found from
    /// the entity's labels with candidates similar to the items of its
    /// best-items set, if one is associated with it.
    pub async fn recommend_entity(
        &self,
        kind: EntityType,
        id: u64,
        page_size: Option<usize>,
        credentials: &Credentials,
    ) -> Result<RecommendResponse> {
        let page_size = self.page_size(page_size);

        let entity = self
            .entities
            .get_entity(kind, id, credentials)
            .await
            .map_err(RecommendError::from_seed_lookup)?;
        let uri = entity_uri(&self.config.entity_uri_base, kind, id);

        // The best-items set is an optional enrichment: failing to look it
        // up degrades to label-only recommendations
        let associated_set = async {
            match self.sets.get_set_for_entity(&uri, credentials).await {
                Ok(found) => found,
                Err(err) => {
                    error!("Failed to look up best-items set for {uri}, continuing without it: {err}");
                    None
                }
            }
        };
        let (associated, embedded) =
            tokio::join!(associated_set, self.embedder.embed_entity(&entity));

        let members = associated
            .as_ref()
            .map(Collection::item_record_ids)
            .unwrap_or_default();

        let metadata = async {
            match embedded {
                Ok(vector) => {
                    self.index
                        .search(
                            &[vector],
                            page_size,
                            &members,
                            self.config.entity_metadata_weight,
                        )
                        .await
                }
                Err(err) => {
                    error!("Failed to embed entity {uri}, continuing without label candidates: {err}");
                    Ok(HashMap::new())
                }
            }
        };
        let (items, metadata) = tokio::join!(
            self.search_similar_to_members(
                &members,
                page_size,
                self.config.entity_set_items_weight
            ),
            metadata,
        );

        let merged = fusion::merge_candidates(vec![items?, metadata?])?;
        self.finish(merged, page_size, credentials).await
    }

    /// Search for items similar to the given member records, excluding the
    /// members themselves. Members without an indexed vector contribute no
    /// query vector.
    async fn search_similar_to_members(
        &self,
        members: &[RecordId],
        page_size: usize,
        weight: f32,
    ) -> std::result::Result<HashMap<RecordId, Recommendation>, VectorStoreError> {
        if members.is_empty() {
            return Ok(HashMap::new());
        }
        let vectors: Vec<Vec<f32>> = self
            .index
            .get_vectors(members)
            .await?
            .into_iter()
            .map(|(_, vector)| vector)
            .collect();
        self.index.search(&vectors, page_size, members, weight).await
    }

    /// Search for items similar to a set's title and description. An
    /// embedding failure degrades to an empty candidate group.
    async fn search_set_metadata(
        &self,
        set: &Collection,
        members: &[RecordId],
        page_size: usize,
    ) -> std::result::Result<HashMap<RecordId, Recommendation>, VectorStoreError> {
        match self.embedder.embed_set(set).await {
            Ok(vector) => {
                self.index
                    .search(
                        &[vector],
                        page_size,
                        members,
                        self.config.set_metadata_weight,
                    )
                    .await
            }
            Err(err) => {
                error!(
                    "Failed to embed set {}, continuing without metadata candidates: {err}",
                    set.id
                );
                Ok(HashMap::new())
            }
        }
    }

    async fn finish(
        &self,
        candidates: HashMap<RecordId, Recommendation>,
        page_size: usize,
        credentials: &Credentials,
    ) -> Result<RecommendResponse> {
        let ranked = fusion::rank_and_truncate(candidates, page_size);
        info!("Returning {} recommendation(s)", ranked.len());
        self.records
            .hydrate(&ranked, page_size, credentials)
            .await
            .map_err(RecommendError::Metadata)
    }

    fn page_size(&self, requested: Option<usize>) -> usize {
        match requested {
            None => self.config.default_page_size,
            Some(n) => n.clamp(1, self.config.max_page_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use recommend_common::Entity;
    use recommend_embeddings::EmbeddingError;
    use recommend_metadata::MetadataError;
    use std::sync::Mutex;

    fn id(dataset: &str, local: &str) -> RecordId {
        RecordId::new(dataset, local).unwrap()
    }

    /// In-memory index. Search results are keyed by the weight of the call,
    /// since each candidate source in a request uses a distinct weight.
    #[derive(Default)]
    struct StubIndex {
        vectors: HashMap<RecordId, Vec<f32>>,
        hits_by_weight: HashMap<u32, Vec<(RecordId, f32)>>,
        searches: Mutex<Vec<SearchCall>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct SearchCall {
        query_vectors: usize,
        exclude: Vec<RecordId>,
        weight: f32,
    }

    impl StubIndex {
        fn with_vector(mut self, record_id: RecordId, vector: Vec<f32>) -> Self {
            self.vectors.insert(record_id, vector);
            self
        }

        fn with_hits(mut self, weight: f32, hits: Vec<(RecordId, f32)>) -> Self {
            self.hits_by_weight.insert(weight.to_bits(), hits);
            self
        }

        fn searches(&self) -> Vec<SearchCall> {
            self.searches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VectorIndex for StubIndex {
        async fn get_vector(
            &self,
            record_id: &RecordId,
        ) -> std::result::Result<Option<Vec<f32>>, VectorStoreError> {
            Ok(self.vectors.get(record_id).cloned())
        }

        async fn get_vectors(
            &self,
            ids: &[RecordId],
        ) -> std::result::Result<Vec<(RecordId, Vec<f32>)>, VectorStoreError> {
            Ok(ids
                .iter()
                .filter_map(|record_id| {
                    self.vectors
                        .get(record_id)
                        .map(|vector| (record_id.clone(), vector.clone()))
                })
                .collect())
        }

        async fn search(
            &self,
            vectors: &[Vec<f32>],
            _top_k: usize,
            exclude: &[RecordId],
            weight: f32,
        ) -> std::result::Result<HashMap<RecordId, Recommendation>, VectorStoreError> {
            self.searches.lock().unwrap().push(SearchCall {
                query_vectors: vectors.len(),
                exclude: exclude.to_vec(),
                weight,
            });
            if vectors.is_empty() {
                return Ok(HashMap::new());
            }
            let hits = self
                .hits_by_weight
                .get(&weight.to_bits())
                .cloned()
                .unwrap_or_default();
            Ok(hits
                .into_iter()
                .map(|(record_id, score)| {
                    (record_id.clone(), Recommendation::new(record_id, score))
                })
                .collect())
        }
    }

    /// Embedder returning fixed vectors, or failing when none is configured
    #[derive(Default)]
    struct StubEmbedder {
        set_vector: Option<Vec<f32>>,
        entity_vector: Option<Vec<f32>>,
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed_set(
            &self,
            set: &Collection,
        ) -> std::result::Result<Vec<f32>, EmbeddingError> {
            self.set_vector
                .clone()
                .ok_or_else(|| EmbeddingError::EmptyResponse(set.id.clone()))
        }

        async fn embed_entity(
            &self,
            entity: &Entity,
        ) -> std::result::Result<Vec<f32>, EmbeddingError> {
            self.entity_vector
                .clone()
                .ok_or_else(|| EmbeddingError::EmptyResponse(entity.id.clone()))
        }
    }

    #[derive(Default)]
    struct StubSets {
        set: Option<Collection>,
        entity_set: Option<Collection>,
    }

    #[async_trait]
    impl SetStore for StubSets {
        async fn get_set(
            &self,
            set_id: &str,
            _credentials: &Credentials,
        ) -> std::result::Result<Collection, MetadataError> {
            self.set
                .clone()
                .ok_or_else(|| MetadataError::NotFound(format!("set {set_id}")))
        }

        async fn get_set_for_entity(
            &self,
            _entity_uri: &str,
            _credentials: &Credentials,
        ) -> std::result::Result<Option<Collection>, MetadataError> {
            Ok(self.entity_set.clone())
        }
    }

    #[derive(Default)]
    struct StubEntities {
        entity: Option<Entity>,
    }

    #[async_trait]
    impl EntityStore for StubEntities {
        async fn get_entity(
            &self,
            kind: EntityType,
            entity_id: u64,
            _credentials: &Credentials,
        ) -> std::result::Result<Entity, MetadataError> {
            self.entity
                .clone()
                .ok_or_else(|| MetadataError::NotFound(format!("entity {kind}/{entity_id}")))
        }
    }

    /// Record gateway that answers existence from a fixed list and captures
    /// what gets hydrated instead of calling out
    #[derive(Default)]
    struct StubRecords {
        existing: Vec<RecordId>,
        hydrated: Mutex<Vec<(Vec<Recommendation>, usize)>>,
    }

    impl StubRecords {
        fn hydrated(&self) -> Vec<(Vec<Recommendation>, usize)> {
            self.hydrated.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RecordGateway for StubRecords {
        async fn record_exists(
            &self,
            record_id: &RecordId,
            _credentials: &Credentials,
        ) -> std::result::Result<bool, MetadataError> {
            Ok(self.existing.contains(record_id))
        }

        async fn hydrate(
            &self,
            recommendations: &[Recommendation],
            page_size: usize,
            _credentials: &Credentials,
        ) -> std::result::Result<RecommendResponse, MetadataError> {
            self.hydrated
                .lock()
                .unwrap()
                .push((recommendations.to_vec(), page_size));
            let items = recommendations
                .iter()
                .map(|rec| serde_json::Value::String(rec.record_id().public_id()))
                .collect::<Vec<_>>();
            Ok(RecommendResponse {
                apikey: None,
                success: true,
                items_count: items.len() as u64,
                total_results: items.len() as u64,
                items,
            })
        }
    }

    struct Fixture {
        index: Arc<StubIndex>,
        embedder: Arc<StubEmbedder>,
        sets: Arc<StubSets>,
        entities: Arc<StubEntities>,
        records: Arc<StubRecords>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                index: Arc::new(StubIndex::default()),
                embedder: Arc::new(StubEmbedder::default()),
                sets: Arc::new(StubSets::default()),
                entities: Arc::new(StubEntities::default()),
                records: Arc::new(StubRecords::default()),
            }
        }

        fn engine(&self) -> RecommendEngine {
            RecommendEngine::new(
                EngineConfig::default(),
                self.index.clone(),
                self.embedder.clone(),
                self.sets.clone(),
                self.entities.clone(),
                self.records.clone(),
            )
            .unwrap()
        }
    }

    fn closed_set(set_id: &str, items: &[&str]) -> Collection {
        Collection {
            id: set_id.to_string(),
            items: items
                .iter()
                .map(|item| format!("http://data.example.org/item{item}"))
                .collect(),
            ..Default::default()
        }
    }

    fn agent(entity_id: u64) -> Entity {
        Entity {
            id: format!("http://data.example.org/agent/{entity_id}"),
            kind: EntityType::Agent,
            pref_label: HashMap::from([("en".to_string(), "Johannes Vermeer".to_string())]),
            alt_label: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_record_seed_searches_with_weight_one_excluding_itself() {
        let seed = id("92062", "item_1");
        let mut fixture = Fixture::new();
        fixture.index = Arc::new(
            StubIndex::default()
                .with_vector(seed.clone(), vec![0.1, 0.2])
                .with_hits(1.0, vec![(id("92062", "similar"), 0.7)]),
        );
        let engine = fixture.engine();

        let response = engine
            .recommend_record(&seed, None, &Credentials::default())
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.items_count, 1);
        assert_eq!(
            fixture.index.searches(),
            vec![SearchCall {
                query_vectors: 1,
                exclude: vec![seed],
                weight: 1.0,
            }]
        );
    }

    #[tokio::test]
    async fn test_unindexed_but_existing_record_yields_empty_response() {
        let seed = id("92062", "item_1");
        let mut fixture = Fixture::new();
        fixture.records = Arc::new(StubRecords {
            existing: vec![seed.clone()],
            ..Default::default()
        });
        let engine = fixture.engine();

        let response = engine
            .recommend_record(&seed, None, &Credentials::default())
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.items_count, 0);
        assert!(fixture.index.searches().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_record_is_not_found() {
        let fixture = Fixture::new();
        let engine = fixture.engine();

        let err = engine
            .recommend_record(&id("92062", "missing"), None, &Credentials::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_set_combines_item_and_metadata_candidates() {
        let mut fixture = Fixture::new();
        fixture.sets = Arc::new(StubSets {
            set: Some(closed_set("42", &["/a/one", "/a/two"])),
            ..Default::default()
        });
        fixture.embedder = Arc::new(StubEmbedder {
            set_vector: Some(vec![0.5]),
            ..Default::default()
        });
        // the shared candidate gets 0.2 from the items source and 0.6 from
        // the metadata source
        fixture.index = Arc::new(
            StubIndex::default()
                .with_vector(id("a", "one"), vec![0.1])
                .with_vector(id("a", "two"), vec![0.2])
                .with_hits(1.0, vec![(id("b", "shared"), 0.2), (id("b", "items_only"), 0.9)])
                .with_hits(3.0, vec![(id("b", "shared"), 0.6)]),
        );
        let engine = fixture.engine();

        let response = engine
            .recommend_set("42", None, &Credentials::default())
            .await
            .unwrap();
        assert_eq!(response.items_count, 2);

        let hydrated = fixture.records.hydrated();
        assert_eq!(hydrated.len(), 1);
        let (ranked, _) = &hydrated[0];
        assert_eq!(ranked[0].record_id(), &id("b", "items_only"));
        assert!((ranked[1].score() - 0.8).abs() < 1e-6);

        // both searches exclude the set members
        let searches = fixture.index.searches();
        assert_eq!(searches.len(), 2);
        for call in &searches {
            assert_eq!(call.exclude, vec![id("a", "one"), id("a", "two")]);
        }
    }

    #[tokio::test]
    async fn test_set_embedding_failure_degrades_to_item_candidates() {
        let mut fixture = Fixture::new();
        fixture.sets = Arc::new(StubSets {
            set: Some(closed_set("42", &["/a/one"])),
            ..Default::default()
        });
        fixture.index = Arc::new(
            StubIndex::default()
                .with_vector(id("a", "one"), vec![0.1])
                .with_hits(1.0, vec![(id("b", "similar"), 0.4)]),
        );
        let engine = fixture.engine();

        let response = engine
            .recommend_set("42", None, &Credentials::default())
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.items_count, 1);
        // only the items search ran
        let weights: Vec<f32> = fixture
            .index
            .searches()
            .iter()
            .map(|call| call.weight)
            .collect();
        assert_eq!(weights, vec![1.0]);
    }

    #[tokio::test]
    async fn test_open_set_yields_empty_response() {
        let mut fixture = Fixture::new();
        fixture.sets = Arc::new(StubSets {
            set: Some(Collection {
                id: "42".to_string(),
                is_defined_by: Some("query=everything".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        });
        let engine = fixture.engine();

        let response = engine
            .recommend_set("42", None, &Credentials::default())
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(response.items_count, 0);
        assert!(fixture.index.searches().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_set_is_not_found() {
        let fixture = Fixture::new();
        let engine = fixture.engine();

        let err = engine
            .recommend_set("42", None, &Credentials::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_entity_combines_label_and_set_item_candidates() {
        let mut fixture = Fixture::new();
        fixture.entities = Arc::new(StubEntities {
            entity: Some(agent(123)),
        });
        fixture.sets = Arc::new(StubSets {
            entity_set: Some(closed_set("best_of_123", &["/a/one"])),
            ..Default::default()
        });
        fixture.embedder = Arc::new(StubEmbedder {
            entity_vector: Some(vec![0.5]),
            ..Default::default()
        });
        fixture.index = Arc::new(
            StubIndex::default()
                .with_vector(id("a", "one"), vec![0.1])
                .with_hits(1.0, vec![(id("b", "from_items"), 0.3)])
                .with_hits(10.0, vec![(id("b", "from_labels"), 4.0)]),
        );
        let engine = fixture.engine();

        let response = engine
            .recommend_entity(EntityType::Agent, 123, None, &Credentials::default())
            .await
            .unwrap();
        assert_eq!(response.items_count, 2);

        let hydrated = fixture.records.hydrated();
        let (ranked, _) = &hydrated[0];
        assert_eq!(ranked[0].record_id(), &id("b", "from_labels"));

        // the label search excludes the associated set's members too
        let searches = fixture.index.searches();
        assert_eq!(searches.len(), 2);
        for call in &searches {
            assert_eq!(call.exclude, vec![id("a", "one")]);
        }
    }

    #[tokio::test]
    async fn test_entity_without_set_and_failing_embedding_yields_empty_response() {
        let mut fixture = Fixture::new();
        fixture.entities = Arc::new(StubEntities {
            entity: Some(agent(123)),
        });
        let engine = fixture.engine();

        let response = engine
            .recommend_entity(EntityType::Agent, 123, None, &Credentials::default())
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(response.items_count, 0);
    }

    #[tokio::test]
    async fn test_unknown_entity_is_not_found() {
        let fixture = Fixture::new();
        let engine = fixture.engine();

        let err = engine
            .recommend_entity(EntityType::Concept, 9, None, &Credentials::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_page_size_defaults_and_clamps() {
        let seed = id("92062", "item_1");
        let mut fixture = Fixture::new();
        fixture.records = Arc::new(StubRecords {
            existing: vec![seed.clone()],
            ..Default::default()
        });
        let engine = fixture.engine();

        engine
            .recommend_record(&seed, None, &Credentials::default())
            .await
            .unwrap();
        engine
            .recommend_record(&seed, Some(999), &Credentials::default())
            .await
            .unwrap();
        engine
            .recommend_record(&seed, Some(0), &Credentials::default())
            .await
            .unwrap();

        let page_sizes: Vec<usize> = fixture
            .records
            .hydrated()
            .iter()
            .map(|(_, page_size)| *page_size)
            .collect();
        assert_eq!(page_sizes, vec![10, 50, 1]);
    }

    #[tokio::test]
    async fn test_ranked_list_is_truncated_to_page_size() {
        let seed = id("92062", "item_1");
        let mut fixture = Fixture::new();
        fixture.index = Arc::new(
            StubIndex::default()
                .with_vector(seed.clone(), vec![0.1])
                .with_hits(
                    1.0,
                    vec![
                        (id("b", "third"), 0.3),
                        (id("b", "first"), 0.9),
                        (id("b", "second"), 0.5),
                    ],
                ),
        );
        let engine = fixture.engine();

        let response = engine
            .recommend_record(&seed, Some(2), &Credentials::default())
            .await
            .unwrap();
        assert_eq!(response.items_count, 2);

        let hydrated = fixture.records.hydrated();
        let (ranked, _) = &hydrated[0];
        let ids: Vec<&str> = ranked.iter().map(|r| r.record_id().local_id()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }
}

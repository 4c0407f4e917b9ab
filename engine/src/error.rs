use recommend_common::{InvalidRecordId, MergeMismatch};
use recommend_metadata::MetadataError;
use recommend_vector_store::VectorStoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecommendError>;

#[derive(Debug, Error)]
pub enum RecommendError {
    /// The seed of the request does not exist. Distinct from a seed that
    /// exists but yields no recommendations, which is a successful empty
    /// response.
    #[error("{0} not found")]
    NotFound(String),

    /// Invalid engine configuration
    #[error("invalid engine configuration: {0}")]
    Config(String),

    #[error(transparent)]
    InvalidRecordId(#[from] InvalidRecordId),

    #[error(transparent)]
    VectorStore(#[from] VectorStoreError),

    /// Intentionally not `#[from]`: callers decide per call site whether an
    /// upstream `NotFound` maps to `RecommendError::NotFound` or stays a
    /// metadata failure.
    #[error(transparent)]
    Metadata(MetadataError),

    #[error(transparent)]
    Merge(#[from] MergeMismatch),
}

impl RecommendError {
    /// Map an error from resolving the seed itself: a missing seed is
    /// `NotFound`, anything else is a metadata failure.
    pub(crate) fn from_seed_lookup(err: MetadataError) -> Self {
        match err {
            MetadataError::NotFound(what) => RecommendError::NotFound(what),
            other => RecommendError::Metadata(other),
        }
    }
}

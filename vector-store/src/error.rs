use recommend_common::MergeMismatch;
use thiserror::Error;

/// Errors talking to the similarity-search backend. All of these are fatal
/// to the request that triggered them; there is no fallback for this backend.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    /// Invalid client configuration
    #[error("invalid vector store configuration: {0}")]
    Config(String),

    /// Failed to set up the backend client
    #[error("failed to initialize vector store client: {0}")]
    Initialization(String),

    /// The configured collection does not exist on the backend
    #[error("collection {0} not found in vector store")]
    UnknownCollection(String),

    /// The backend reported a load state this client does not know
    #[error("collection {collection} is in unknown load state: {state}")]
    UnknownLoadState { collection: String, state: String },

    /// The backend answered with a non-success status or error code
    #[error("vector store backend error: {0}")]
    Backend(String),

    /// Transport-level failure (connection refused, timeout, malformed body)
    #[error("vector store transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Candidate merge invariant violation while combining per-vector results
    #[error(transparent)]
    Merge(#[from] MergeMismatch),
}

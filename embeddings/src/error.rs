use thiserror::Error;

/// Errors that can occur while generating an embedding for a seed.
/// Callers treat these as degraded enrichment, not request failure.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Invalid client configuration
    #[error("invalid embeddings configuration: {0}")]
    Config(String),

    /// Failed to set up the client
    #[error("failed to initialize embeddings client: {0}")]
    Initialization(String),

    /// The service answered with a non-success status
    #[error("embeddings service error: {0}")]
    Service(String),

    /// The service answered without any embedding data
    #[error("no embedding in response for {0}")]
    EmptyResponse(String),

    /// Transport-level failure
    #[error("embeddings transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

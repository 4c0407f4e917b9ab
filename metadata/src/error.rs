use thiserror::Error;

/// Errors talking to the metadata services (set store, entity store, record
/// search). `NotFound` is a distinguishable outcome so callers can decide
/// whether a missing resource is fatal or a missing optional enrichment.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The requested resource does not exist upstream
    #[error("{0} not found")]
    NotFound(String),

    /// Invalid client configuration
    #[error("invalid metadata configuration: {0}")]
    Config(String),

    /// Failed to set up the client
    #[error("failed to initialize metadata client: {0}")]
    Initialization(String),

    /// The service answered with a non-success status
    #[error("metadata service error: {0}")]
    Service(String),

    /// Transport-level failure
    #[error("metadata transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

//! # Recommend Embeddings
//!
//! Client for the external service that turns seed metadata text into an
//! embedding vector for similarity search. Given a curated set or a named
//! entity, the client selects text in the most preferred available language
//! and sends exactly one typed record per call.
//!
//! Failures of this service are expected to be treated as non-fatal by
//! callers: a request that cannot be embedded simply contributes zero
//! candidates.

mod error;
mod service;

pub use error::EmbeddingError;
pub use service::Embedder;
pub use service::EmbeddingsClient;
pub use service::EmbeddingsConfig;

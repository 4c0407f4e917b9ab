//! # Recommend Common
//!
//! Shared model types for the recommendation workspace: record identifiers,
//! scored recommendation candidates, seed metadata (curated sets and named
//! entities), language-preference selection and request credentials.
//!
//! Everything in this crate is transport-free; the client crates
//! (`recommend-vector-store`, `recommend-embeddings`, `recommend-metadata`)
//! build on these types, and `recommend-engine` merges them.

mod credentials;
mod lang;
mod record_id;
mod recommendation;
mod seed;

pub use credentials::Credentials;
pub use lang::most_preferred_language;
pub use lang::most_preferred_language_list;
pub use lang::PREFERRED_LANGUAGES;
pub use record_id::InvalidRecordId;
pub use record_id::RecordId;
pub use recommendation::MergeMismatch;
pub use recommendation::Recommendation;
pub use seed::entity_uri;
pub use seed::Collection;
pub use seed::CollectionSearch;
pub use seed::Entity;
pub use seed::EntityType;
pub use seed::UnsupportedEntityType;

//! # Recommend Metadata
//!
//! Read-only clients for the external metadata services the recommendation
//! engine depends on:
//!
//! - the **set store** holding curated collections (title, description,
//!   item list) and the best-items sets associated with entities,
//! - the **entity store** holding named entities and their localized labels,
//! - the **record search service**, used both to check that a record exists
//!   and to hydrate a ranked id list into the public response payload.
//!
//! Every client distinguishes "not found" from transport failure; the engine
//! decides per call site whether "not found" is fatal (the seed itself) or a
//! missing optional enrichment.

mod entity_api;
mod error;
mod http;
mod search_api;
mod set_api;

pub use entity_api::EntityApiClient;
pub use entity_api::EntityApiConfig;
pub use entity_api::EntityStore;
pub use error::MetadataError;
pub use search_api::RecommendResponse;
pub use search_api::RecordGateway;
pub use search_api::SearchApiClient;
pub use search_api::SearchApiConfig;
pub use set_api::SetApiClient;
pub use set_api::SetApiConfig;
pub use set_api::SetStore;

//! # Recommend Vector Store
//!
//! Client for the similarity-search backend holding precomputed item
//! embeddings. Supports point lookup of stored vectors by record id, batch
//! lookup, and weighted top-K similarity search with an exclusion filter.
//!
//! The backend requires its collection to be loaded before it will serve
//! queries. [`VectorStore::connect`] verifies the load state once at startup
//! and only issues a load request when the collection is not loaded yet;
//! request-path code assumes the collection is available.
//!
//! ## Example
//!
//! ```no_run
//! use recommend_vector_store::{VectorIndex, VectorStore, VectorStoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = VectorStoreConfig {
//!         endpoint: "http://localhost:19530".to_string(),
//!         collection: "item_vectors".to_string(),
//!         ..Default::default()
//!     };
//!     let store = VectorStore::connect(config).await?;
//!
//!     let id = "/92062/BibRes_100".parse()?;
//!     if let Some(vector) = store.get_vector(&id).await? {
//!         println!("vector has {} dimensions", vector.len());
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod store;

pub use error::VectorStoreError;
pub use store::VectorIndex;
pub use store::VectorStore;
pub use store::VectorStoreConfig;
pub use store::MAX_RAW_SIMILARITY;

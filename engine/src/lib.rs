//! # Recommend Engine
//!
//! The recommendation core. A request names a seed, one of:
//!
//! - a **record**, recommended from its own stored vector,
//! - a **curated set**, recommended from its items and from an embedding of
//!   its title and description,
//! - a **named entity**, recommended from an embedding of its labels and
//!   from the items of its best-items set, if one is associated with it.
//!
//! Each source of candidates carries a weight; candidate groups are merged
//! additively, ranked by fused score and hydrated into record summaries.
//! When a seed produces more than one candidate group, losing one group to
//! an upstream failure degrades the response instead of failing it.

mod config;
mod engine;
mod error;
mod fusion;

pub use config::EngineConfig;
pub use engine::RecommendEngine;
pub use error::RecommendError;
pub use error::Result;
pub use fusion::merge_candidates;
pub use fusion::rank_and_truncate;

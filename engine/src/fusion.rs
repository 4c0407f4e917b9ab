//! Candidate fusion: merging the candidate groups produced by the different
//! query sources into one ranked list.

use recommend_common::{MergeMismatch, Recommendation, RecordId};
use std::collections::HashMap;

/// Merge candidate groups additively: a record recommended by more than one
/// source ends up with the sum of its per-source scores. The operation is
/// commutative and associative, so the order the upstream searches finish in
/// never changes the result.
pub fn merge_candidates(
    groups: Vec<HashMap<RecordId, Recommendation>>,
) -> Result<HashMap<RecordId, Recommendation>, MergeMismatch> {
    let mut merged: HashMap<RecordId, Recommendation> = HashMap::new();
    for group in groups {
        for (id, recommendation) in group {
            match merged.get_mut(&id) {
                Some(existing) => existing.merge(&recommendation)?,
                None => {
                    merged.insert(id, recommendation);
                }
            }
        }
    }
    Ok(merged)
}

/// Order candidates by score descending and cut the list at `page_size`.
/// Ties are broken by record id so equal-scored candidates always come out
/// in the same order.
pub fn rank_and_truncate(
    candidates: HashMap<RecordId, Recommendation>,
    page_size: usize,
) -> Vec<Recommendation> {
    let mut ranked: Vec<Recommendation> = candidates.into_values().collect();
    ranked.sort_by(|a, b| {
        b.score()
            .total_cmp(&a.score())
            .then_with(|| a.record_id().cmp(b.record_id()))
    });
    ranked.truncate(page_size);
    ranked
}

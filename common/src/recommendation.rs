use crate::record_id::RecordId;
use thiserror::Error;

/// Raised when two recommendations for different records are merged
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot merge recommendation for {right} into {left}: different record ids")]
pub struct MergeMismatch {
    pub left: RecordId,
    pub right: RecordId,
}

/// Recommended item: a record id and its similarity score.
///
/// The vector store reports scores from 0 to 1 (0 not relevant, 1 most
/// relevant) but a weight factor is applied per query source, so merged
/// scores can be larger than 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    record_id: RecordId,
    score: f32,
}

impl Recommendation {
    pub fn new(record_id: RecordId, score: f32) -> Self {
        Self { record_id, score }
    }

    pub fn record_id(&self) -> &RecordId {
        &self.record_id
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    /// Merge another recommendation for the same record into this one by
    /// summing the scores. Merging recommendations with different record ids
    /// is an invariant violation, never a silent no-op.
    pub fn merge(&mut self, other: &Recommendation) -> Result<(), MergeMismatch> {
        if self.record_id != other.record_id {
            return Err(MergeMismatch {
                left: self.record_id.clone(),
                right: other.record_id.clone(),
            });
        }
        self.score += other.score;
        Ok(())
    }
}

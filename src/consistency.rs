//! Batch-level consistency: semantic drift, confidence spread, verdict
//! harmony and a one-line description of the outcome.

use std::collections::HashSet;
use std::sync::Arc;

use crate::collaborators::scorer::SemanticScorer;
use crate::retry::RetryPolicy;
use crate::types::{BatchRecord, BatchSummary, ConsistencyReport, StatusCounts, round_to};

/// Confidence spread below which a batch counts as consistent.
pub const CONFIDENCE_SPREAD_BOUND: f32 = 0.3;

/// Distance assumed for a pair the scorer cannot answer.
pub const NEUTRAL_DISTANCE: f32 = 0.5;

/// Whether the confidences of a batch lie within the spread bound.
///
/// Confidences carry two decimals, so the spread is compared in whole
/// hundredths. An empty batch is consistent.
#[must_use]
pub fn confidence_consistent(records: &[BatchRecord]) -> bool {
    let mut confidences = records.iter().map(|r| r.confidence);
    let Some(first) = confidences.next() else {
        return true;
    };
    let (min, max) = confidences.fold((first, first), |(lo, hi), c| (lo.min(c), hi.max(c)));
    round_to(max - min, 2) < CONFIDENCE_SPREAD_BOUND
}

/// Whether every record in a batch shares one status.
///
/// An empty batch has no status and is not in harmony.
#[must_use]
pub fn verdict_harmony(records: &[BatchRecord]) -> bool {
    records.iter().map(|r| r.status).collect::<HashSet<_>>().len() == 1
}

/// Describe a batch outcome from its status counts.
#[must_use]
pub fn describe(counts: &StatusCounts) -> String {
    let StatusCounts {
        confirmed,
        refuted,
        uncertain,
    } = *counts;
    let total = counts.total();

    if total == 0 {
        "No assertions to check.".to_string()
    } else if confirmed == total {
        format!("Everything checks out: all {total} assertions confirmed.")
    } else if refuted == total {
        format!("All {total} assertions appear to be false.")
    } else if confirmed > 0 && refuted == 0 {
        "Mostly right, with some uncertainty.".to_string()
    } else if refuted > 0 && confirmed == 0 {
        "Good logic, but a fatal early error.".to_string()
    } else if refuted == 1 && confirmed >= 2 {
        "Nearly everything checks out.".to_string()
    } else if confirmed == 1 && refuted >= 2 {
        "One solid claim; the rest need review.".to_string()
    } else {
        format!("Mixed results: {confirmed} confirmed, {refuted} refuted, {uncertain} uncertain.")
    }
}

/// Computes consistency metrics over a completed batch.
pub struct ConsistencyEngine {
    scorer: Arc<dyn SemanticScorer>,
    retry: RetryPolicy,
}

impl ConsistencyEngine {
    /// Create an engine over a semantic scorer.
    #[must_use]
    pub fn new(scorer: Arc<dyn SemanticScorer>) -> Self {
        Self {
            scorer,
            retry: RetryPolicy::no_retry(),
        }
    }

    /// Set the retry policy for scorer calls.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Mean pairwise semantic distance, rounded to three decimals.
    ///
    /// Fewer than two assertions have no drift.
    #[allow(clippy::cast_precision_loss)]
    pub async fn drift<S: AsRef<str>>(&self, assertions: &[S]) -> f32 {
        let mut total = 0.0_f32;
        let mut pairs = 0_usize;
        for (i, a) in assertions.iter().enumerate() {
            for b in &assertions[i + 1..] {
                total += self.distance(a.as_ref(), b.as_ref()).await;
                pairs += 1;
            }
        }
        if pairs == 0 {
            return 0.0;
        }
        round_to(total / pairs as f32, 3)
    }

    async fn distance(&self, a: &str, b: &str) -> f32 {
        match self.retry.retry(|| self.scorer.distance(a, b)).await {
            Ok(distance) => distance.clamp(0.0, 1.0),
            Err(e) => {
                tracing::warn!(
                    scorer = self.scorer.name(),
                    error = %e,
                    "Distance unavailable, using neutral score"
                );
                NEUTRAL_DISTANCE
            }
        }
    }

    /// Full consistency report for a batch.
    pub async fn report(&self, records: &[BatchRecord]) -> ConsistencyReport {
        let texts: Vec<&str> = records.iter().map(|r| r.assertion.as_str()).collect();
        ConsistencyReport {
            drift: self.drift(&texts).await,
            confidence_consistent: confidence_consistent(records),
            verdict_harmony: verdict_harmony(records),
        }
    }

    /// Counts, description and consistency report for a batch.
    pub async fn summarize(&self, records: &[BatchRecord]) -> BatchSummary {
        let counts = StatusCounts::tally(records);
        BatchSummary {
            counts,
            description: describe(&counts),
            consistency: self.report(records).await,
        }
    }
}

impl std::fmt::Debug for ConsistencyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsistencyEngine")
            .field("scorer", &self.scorer.name())
            .field("retry", &self.retry)
            .finish()
    }
}

//! Capability registry: picks a backend per task from a static priority table.
//!
//! Backends are registered explicitly, so availability is a presence check
//! rather than a probe. Among registered backends the one with the highest
//! table priority wins; backends missing from the table rank last at 0.0.

use std::fmt;
use std::sync::Arc;

use crate::collaborators::scorer::{HashedEmbeddingScorer, LexicalScorer, SemanticScorer};
use crate::collaborators::tone::{LexiconToneEstimator, NeutralToneEstimator, ToneEstimator};

/// A task a backend can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Semantic similarity scoring.
    Similarity,
    /// Tone and confidence estimation.
    Tone,
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Similarity => "similarity",
            Self::Tone => "tone",
        })
    }
}

/// Backend priorities per task.
pub const PRIORITY_TABLE: &[(Task, &str, f32)] = &[
    (Task::Similarity, "hashed-embedding", 0.85),
    (Task::Similarity, "lexical", 0.7),
    (Task::Tone, "lexicon", 0.8),
    (Task::Tone, "neutral", 0.1),
];

/// Priority of a backend for a task; 0.0 if it is not listed.
#[must_use]
pub fn priority(task: Task, backend: &str) -> f32 {
    PRIORITY_TABLE
        .iter()
        .find(|(t, name, _)| *t == task && *name == backend)
        .map_or(0.0, |(_, _, p)| *p)
}

/// Registered backends for one task.
pub struct CapabilityRegistry<T: ?Sized> {
    task: Task,
    backends: Vec<(String, Arc<T>)>,
}

impl<T: ?Sized> CapabilityRegistry<T> {
    /// Create an empty registry for a task.
    #[must_use]
    pub fn new(task: Task) -> Self {
        Self {
            task,
            backends: Vec::new(),
        }
    }

    /// The task this registry serves.
    #[must_use]
    pub const fn task(&self) -> Task {
        self.task
    }

    /// Register a backend, replacing any previous one of the same name.
    #[must_use]
    pub fn register(mut self, name: impl Into<String>, backend: Arc<T>) -> Self {
        let name = name.into();
        self.backends.retain(|(n, _)| *n != name);
        self.backends.push((name, backend));
        self
    }

    /// Whether a backend is registered.
    #[must_use]
    pub fn is_available(&self, name: &str) -> bool {
        self.backends.iter().any(|(n, _)| n == name)
    }

    /// Registered backend names with priorities, best first.
    ///
    /// Equal priorities keep registration order.
    #[must_use]
    pub fn ranked(&self) -> Vec<(&str, f32)> {
        let mut ranked: Vec<(&str, f32)> = self
            .backends
            .iter()
            .map(|(name, _)| (name.as_str(), priority(self.task, name)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// The best registered backend, if any.
    #[must_use]
    pub fn select(&self) -> Option<Arc<T>> {
        let (best, score) = self.ranked().first().copied()?;
        tracing::debug!(task = %self.task, backend = best, priority = score, "Backend selected");
        self.backends
            .iter()
            .find(|(name, _)| name == best)
            .map(|(_, backend)| Arc::clone(backend))
    }
}

impl<T: ?Sized> fmt::Debug for CapabilityRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("task", &self.task)
            .field(
                "backends",
                &self.backends.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Similarity backends shipped with the crate.
#[must_use]
pub fn standard_scorers() -> CapabilityRegistry<dyn SemanticScorer> {
    CapabilityRegistry::new(Task::Similarity)
        .register("lexical", Arc::new(LexicalScorer::new()) as Arc<dyn SemanticScorer>)
        .register(
            "hashed-embedding",
            Arc::new(HashedEmbeddingScorer::default()) as Arc<dyn SemanticScorer>,
        )
}

/// Tone backends shipped with the crate.
#[must_use]
pub fn standard_tone_estimators() -> CapabilityRegistry<dyn ToneEstimator> {
    CapabilityRegistry::new(Task::Tone)
        .register("neutral", Arc::new(NeutralToneEstimator) as Arc<dyn ToneEstimator>)
        .register(
            "lexicon",
            Arc::new(LexiconToneEstimator::new()) as Arc<dyn ToneEstimator>,
        )
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_lookup() {
        assert_eq!(priority(Task::Similarity, "hashed-embedding"), 0.85);
        assert_eq!(priority(Task::Tone, "lexical"), 0.0);
    }

    #[test]
    fn test_standard_scorer_selection() {
        let registry = standard_scorers();
        assert!(registry.is_available("lexical"));
        assert!(!registry.is_available("transformer"));
        assert_eq!(
            registry.ranked(),
            vec![("hashed-embedding", 0.85), ("lexical", 0.7)]
        );
        let scorer = registry.select().unwrap();
        assert_eq!(scorer.name(), "hashed-embedding");
    }

    #[test]
    fn test_standard_tone_selection() {
        let estimator = standard_tone_estimators().select().unwrap();
        assert_eq!(estimator.name(), "lexicon");
    }

    #[test]
    fn test_unlisted_backend_ranks_last() {
        let registry = CapabilityRegistry::<dyn SemanticScorer>::new(Task::Similarity)
            .register("custom", Arc::new(LexicalScorer::new()) as Arc<dyn SemanticScorer>)
            .register("lexical", Arc::new(LexicalScorer::new()) as Arc<dyn SemanticScorer>);
        assert_eq!(registry.ranked()[0].0, "lexical");
        assert_eq!(registry.ranked()[1], ("custom", 0.0));
    }

    #[test]
    fn test_empty_registry_selects_nothing() {
        let registry = CapabilityRegistry::<dyn ToneEstimator>::new(Task::Tone);
        assert!(registry.select().is_none());
    }
}

//! Semantic similarity scoring.
//!
//! A [`SemanticScorer`] maps a pair of texts to a similarity in [0, 1].
//! Implementations must be deterministic: the verifier relies on repeated
//! calls with the same inputs producing the same verdict.

use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::ScorerError;
use crate::text::tokenize;

/// Scores how close two texts are in meaning.
#[async_trait]
pub trait SemanticScorer: Send + Sync {
    /// Similarity in [0, 1]; 1 means equivalent.
    async fn similarity(&self, a: &str, b: &str) -> Result<f32, ScorerError>;

    /// Distance in [0, 1]; the complement of [`similarity`](Self::similarity).
    async fn distance(&self, a: &str, b: &str) -> Result<f32, ScorerError> {
        let similarity = self.similarity(a, b).await?;
        Ok((1.0 - similarity).clamp(0.0, 1.0))
    }

    /// Backend name, as listed in the capability registry.
    fn name(&self) -> &str;
}

/// Jaccard overlap of token sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalScorer;

impl LexicalScorer {
    /// Create a new lexical scorer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Synchronous similarity, used directly by the benchmarks.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score(a: &str, b: &str) -> f32 {
        let left: std::collections::HashSet<String> = tokenize(a).into_iter().collect();
        let right: std::collections::HashSet<String> = tokenize(b).into_iter().collect();
        if left.is_empty() || right.is_empty() {
            return 0.0;
        }
        let shared = left.intersection(&right).count();
        let union = left.union(&right).count();
        shared as f32 / union as f32
    }
}

#[async_trait]
impl SemanticScorer for LexicalScorer {
    async fn similarity(&self, a: &str, b: &str) -> Result<f32, ScorerError> {
        Ok(Self::score(a, b))
    }

    fn name(&self) -> &str {
        "lexical"
    }
}

/// Cosine similarity over feature-hashed bag-of-words vectors.
#[derive(Debug, Clone)]
pub struct HashedEmbeddingScorer {
    dimension: usize,
}

impl Default for HashedEmbeddingScorer {
    fn default() -> Self {
        Self::new(256)
    }
}

impl HashedEmbeddingScorer {
    /// Create a scorer with the given vector dimension.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Vector dimension.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Hash each token into a bucket and L2-normalize the counts.
    ///
    /// # Errors
    ///
    /// Returns [`ScorerError::EmptyInput`] if the text has no tokens.
    #[allow(clippy::cast_possible_truncation)]
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, ScorerError> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Err(ScorerError::EmptyInput);
        }

        let mut embedding = vec![0.0_f32; self.dimension];
        for token in &tokens {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimension as u64) as usize;
            embedding[bucket] += 1.0;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }
        Ok(embedding)
    }
}

/// Cosine similarity between two vectors of equal length.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[async_trait]
impl SemanticScorer for HashedEmbeddingScorer {
    async fn similarity(&self, a: &str, b: &str) -> Result<f32, ScorerError> {
        let (Ok(left), Ok(right)) = (self.embed(a), self.embed(b)) else {
            return Ok(0.0);
        };
        // Counts are non-negative, so cosine already lies in [0, 1].
        Ok(cosine_similarity(&left, &right).clamp(0.0, 1.0))
    }

    fn name(&self) -> &str {
        "hashed-embedding"
    }
}

/// A scripted scorer for testing.
///
/// Returns a fixed similarity unless a pair override matches. Overrides are
/// symmetric.
#[derive(Debug, Default)]
pub struct MockSemanticScorer {
    default_similarity: f32,
    overrides: HashMap<(String, String), f32>,
    failure: Option<ScorerError>,
    calls: AtomicUsize,
}

impl MockSemanticScorer {
    /// Create a mock that always answers `similarity`.
    #[must_use]
    pub fn new(similarity: f32) -> Self {
        Self {
            default_similarity: similarity,
            ..Default::default()
        }
    }

    /// Answer `similarity` for one specific pair.
    #[must_use]
    pub fn with_pair(mut self, a: &str, b: &str, similarity: f32) -> Self {
        self.overrides
            .insert((a.to_string(), b.to_string()), similarity);
        self
    }

    /// Fail every call with the given error.
    #[must_use]
    pub fn failing(error: ScorerError) -> Self {
        Self {
            failure: Some(error),
            ..Default::default()
        }
    }

    /// Number of similarity calls made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SemanticScorer for MockSemanticScorer {
    async fn similarity(&self, a: &str, b: &str) -> Result<f32, ScorerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        let value = self
            .overrides
            .get(&(a.to_string(), b.to_string()))
            .or_else(|| self.overrides.get(&(b.to_string(), a.to_string())))
            .copied()
            .unwrap_or(self.default_similarity);
        if !(0.0..=1.0).contains(&value) {
            return Err(ScorerError::OutOfRange(value.to_string()));
        }
        Ok(value)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lexical_similarity() {
        let scorer = LexicalScorer::new();
        assert_eq!(scorer.similarity("the sky is blue", "The sky is blue").await.unwrap(), 1.0);
        assert_eq!(scorer.similarity("sky blue", "grass green").await.unwrap(), 0.0);
        assert_eq!(scorer.similarity("", "grass").await.unwrap(), 0.0);

        let partial = scorer.similarity("sky is blue", "sky is grey").await.unwrap();
        assert!((partial - 0.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_default_distance() {
        let scorer = LexicalScorer::new();
        assert_eq!(scorer.distance("a b", "a b").await.unwrap(), 0.0);
        assert_eq!(scorer.distance("a b", "c d").await.unwrap(), 1.0);
    }

    #[tokio::test]
    async fn test_hashed_embedding_identical_texts() {
        let scorer = HashedEmbeddingScorer::default();
        let s = scorer
            .similarity("Water boils at 100C", "water boils at 100c")
            .await
            .unwrap();
        assert!((s - 1.0).abs() < 1e-5);
        assert_eq!(scorer.similarity("", "water").await.unwrap(), 0.0);
    }

    #[test]
    fn test_hashed_embedding_empty_input() {
        let scorer = HashedEmbeddingScorer::new(64);
        assert_eq!(scorer.embed("?!"), Err(ScorerError::EmptyInput));
        assert_eq!(scorer.embed("gravity").unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_mock_scorer() {
        let scorer = MockSemanticScorer::new(0.5).with_pair("a", "b", 0.9);
        assert_eq!(scorer.similarity("a", "b").await.unwrap(), 0.9);
        assert_eq!(scorer.similarity("b", "a").await.unwrap(), 0.9);
        assert_eq!(scorer.similarity("a", "c").await.unwrap(), 0.5);
        assert_eq!(scorer.call_count(), 3);

        let broken = MockSemanticScorer::failing(ScorerError::Unavailable("down".into()));
        assert!(broken.similarity("a", "b").await.is_err());

        let wild = MockSemanticScorer::new(1.5);
        assert!(matches!(
            wild.similarity("a", "b").await,
            Err(ScorerError::OutOfRange(_))
        ));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Lexical similarity is symmetric and bounded
            #[test]
            fn lexical_in_unit_range(a in "[a-z ]{0,40}", b in "[a-z ]{0,40}") {
                let s = LexicalScorer::score(&a, &b);
                prop_assert!((0.0..=1.0).contains(&s));
                prop_assert_eq!(s, LexicalScorer::score(&b, &a));
            }

            /// Hashed cosine similarity stays in [0, 1]
            #[test]
            fn hashed_in_unit_range(a in "[a-z ]{0,40}", b in "[a-z ]{0,40}") {
                let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
                let scorer = HashedEmbeddingScorer::new(32);
                let s = rt.block_on(scorer.similarity(&a, &b)).unwrap();
                prop_assert!((0.0..=1.0).contains(&s));
            }
        }
    }
}

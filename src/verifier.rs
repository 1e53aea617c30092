//! Verifier: similarity and trust combined into a ternary verdict.

use std::sync::Arc;

use crate::collaborators::scorer::SemanticScorer;
use crate::config::VerifierConfig;
use crate::error::Result;
use crate::retry::RetryPolicy;
use crate::router::{RankedSource, SourceRouter};
use crate::types::{
    ClassifiedAssertion, Persona, SourceCategory, Verdict, VerificationResult, round_to,
};

/// Similarity assumed when the scorer cannot answer.
pub const NEUTRAL_SIMILARITY: f32 = 0.5;

/// Decide a verdict from similarity and trust.
///
/// Acceptance needs both signals strictly above their bounds; either signal
/// strictly below its rejection bound refutes.
#[must_use]
pub fn decide(similarity: f32, trust: f32, config: &VerifierConfig) -> Verdict {
    if similarity > config.accept_similarity && trust > config.accept_trust {
        Verdict::True
    } else if similarity < config.reject_similarity || trust < config.reject_trust {
        Verdict::False
    } else {
        Verdict::Uncertain
    }
}

/// Checks assertions against the most trusted source for their topic.
pub struct Verifier {
    config: VerifierConfig,
    router: Arc<SourceRouter>,
    scorer: Arc<dyn SemanticScorer>,
    retry: RetryPolicy,
}

impl Verifier {
    /// Create a verifier.
    #[must_use]
    pub fn new(
        config: VerifierConfig,
        router: Arc<SourceRouter>,
        scorer: Arc<dyn SemanticScorer>,
    ) -> Self {
        Self {
            config,
            router,
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

    /// The active thresholds.
    #[must_use]
    pub const fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify an assertion against its primary topic's best source.
    ///
    /// # Errors
    ///
    /// Returns a registry error when the topic's sources are malformed.
    pub async fn verify(
        &self,
        assertion: &ClassifiedAssertion,
        category: SourceCategory,
        persona: &Persona,
    ) -> Result<VerificationResult> {
        let best = self
            .router
            .best_source(assertion.primary_topic(), persona)
            .await?;
        Ok(self
            .verify_against(&assertion.assertion.text, best.as_ref(), category)
            .await)
    }

    /// Verify a claim against an already selected source.
    pub async fn verify_against(
        &self,
        text: &str,
        source: Option<&RankedSource>,
        category: SourceCategory,
    ) -> VerificationResult {
        let Some(ranked) = source else {
            tracing::debug!(assertion = text, "No candidate source");
            return VerificationResult::no_source(text, category);
        };

        let reference = ranked.source.reference_text();
        let similarity = match self
            .retry
            .retry(|| self.scorer.similarity(text, reference))
            .await
        {
            Ok(similarity) => similarity.clamp(0.0, 1.0),
            Err(e) => {
                tracing::warn!(
                    scorer = self.scorer.name(),
                    error = %e,
                    "Similarity unavailable, using neutral score"
                );
                NEUTRAL_SIMILARITY
            }
        };

        let verdict = decide(similarity, ranked.trust, &self.config);
        let confidence = round_to((similarity + ranked.trust) / 2.0, 3);
        tracing::debug!(
            assertion = text,
            source = %ranked.source.name,
            similarity,
            trust = ranked.trust,
            ?verdict,
            "Assertion verified"
        );

        VerificationResult {
            assertion: text.to_string(),
            verdict,
            confidence,
            source_category: category,
            source_name: Some(ranked.source.name.clone()),
            similarity: Some(similarity),
            trust: Some(ranked.trust),
        }
    }
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("config", &self.config)
            .field("scorer", &self.scorer.name())
            .finish_non_exhaustive()
    }
}

//! Batch orchestrator: segment, classify, route, verify and phrase every
//! assertion in a text, then summarize the batch.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::classifier::AssertionClassifier;
use crate::collaborators::backends::{standard_scorers, standard_tone_estimators};
use crate::collaborators::registry::SourceRegistry;
use crate::collaborators::scorer::SemanticScorer;
use crate::collaborators::tone::{NEUTRAL_CONFIDENCE, ToneEstimator};
use crate::collaborators::topic_tree::{InMemoryTopicTree, TopicTree};
use crate::config::{ConfigStore, FactCheckConfig, MalformedEntryPolicy};
use crate::consistency::ConsistencyEngine;
use crate::error::{FactCheckError, PipelineError, RegistryError, Result};
use crate::logic::{LogicReport, evaluate_logic};
use crate::phraser::{phrase, phrase_by_score};
use crate::retry::RetryPolicy;
use crate::router::{RankedSource, SourceRouter, is_viable, route};
use crate::segmenter::Segmenter;
use crate::types::{
    Assertion, BatchRecord, BatchResult, ClassifiedAssertion, Persona, Phrasing, RecordStatus,
    TopicScores, Tone, Verdict, VerificationResult, round_to,
};
use crate::verifier::Verifier;

/// Truth score lost per detected fallacy in [`Pipeline::analyze`].
pub const FALLACY_PENALTY: f32 = 0.2;

/// The fact-checking pipeline interface.
#[async_trait]
pub trait FactCheckPipeline: Send + Sync {
    /// Check every assertion in a text.
    async fn process(&self, text: &str, persona: &Persona) -> Result<BatchResult>;

    /// Check several texts, returning results in input order.
    async fn process_batch(&self, texts: Vec<String>, persona: &Persona) -> Vec<Result<BatchResult>>;

    /// Get the pipeline configuration.
    fn config(&self) -> &FactCheckConfig;
}

/// Integrated analysis of a single assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// The analyzed assertion.
    pub assertion: String,
    /// Topic relevance.
    pub topics: TopicScores,
    /// Most trusted source for the primary topic.
    pub source: Option<RankedSource>,
    /// Logic findings.
    pub logic: LogicReport,
    /// Emotional tone.
    pub tone: Tone,
    /// How assertively the claim is stated.
    pub confidence: f32,
    /// Phrasing derived from the logic findings.
    pub phrasing: Phrasing,
}

/// The assertion pipeline.
pub struct Pipeline {
    config: FactCheckConfig,
    segmenter: Segmenter,
    classifier: AssertionClassifier,
    router: Arc<SourceRouter>,
    verifier: Verifier,
    consistency: ConsistencyEngine,
    tone: Arc<dyn ToneEstimator>,
    retry_policy: RetryPolicy,
}

impl Pipeline {
    /// Create a pipeline over explicit collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if the segmenter patterns fail to compile.
    pub fn new(
        config: FactCheckConfig,
        topics: Arc<dyn TopicTree>,
        registry: Arc<dyn SourceRegistry>,
        scorer: Arc<dyn SemanticScorer>,
        tone: Arc<dyn ToneEstimator>,
    ) -> Result<Self> {
        let retry_policy = RetryPolicy::from_config(config.pipeline.retry_config.as_ref());
        let router = Arc::new(
            SourceRouter::new(config.router.clone(), registry, Arc::clone(&topics))
                .with_retry_policy(retry_policy.clone()),
        );
        let verifier = Verifier::new(config.verifier.clone(), Arc::clone(&router), Arc::clone(&scorer))
            .with_retry_policy(retry_policy.clone());
        let consistency = ConsistencyEngine::new(scorer).with_retry_policy(retry_policy.clone());

        Ok(Self {
            segmenter: Segmenter::new(config.segmenter.clone())?,
            classifier: AssertionClassifier::new(config.classifier.clone(), topics),
            router,
            verifier,
            consistency,
            tone,
            retry_policy,
            config,
        })
    }

    /// Get the segmenter.
    #[must_use]
    pub const fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    /// Get the classifier.
    #[must_use]
    pub const fn classifier(&self) -> &AssertionClassifier {
        &self.classifier
    }

    /// Get the source router.
    #[must_use]
    pub fn router(&self) -> &SourceRouter {
        &self.router
    }

    /// Get the verifier.
    #[must_use]
    pub const fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    /// Get the consistency engine.
    #[must_use]
    pub const fn consistency(&self) -> &ConsistencyEngine {
        &self.consistency
    }

    /// Get the retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Process a text with the configured default persona.
    ///
    /// # Errors
    ///
    /// See [`FactCheckPipeline::process`].
    pub async fn process_default(&self, text: &str) -> Result<BatchResult> {
        self.process(text, &self.config.pipeline.default_persona).await
    }

    /// Classify, route, verify and phrase one assertion.
    async fn evaluate(&self, assertion: Assertion, persona: &Persona) -> Result<BatchRecord> {
        let classified = self.classifier.classify(assertion);
        let topic = classified.primary_topic().to_string();
        let sensitive = self.classifier.topic_tree().is_sensitive(&topic);

        if !is_viable(classified.kind(), &topic) {
            tracing::debug!(
                assertion = %classified.assertion.text,
                kind = %classified.kind(),
                topic = %topic,
                "Skipping verification: unsupported topic"
            );
            let phrasing = phrase(&classified.assertion.text, 0.0, persona, Verdict::Uncertain);
            return Ok(record(classified, topic, sensitive, None, phrasing));
        }

        let category = route(&topic);
        let result = match self.verifier.verify(&classified, category, persona).await {
            Ok(result) => result,
            Err(FactCheckError::Registry(error @ RegistryError::MalformedEntry { .. }))
                if self.config.pipeline.malformed_entry_policy == MalformedEntryPolicy::Skip =>
            {
                tracing::warn!(
                    assertion = %classified.assertion.text,
                    error = %error,
                    "Malformed registry entry, recording assertion as uncertain"
                );
                VerificationResult::no_source(classified.assertion.text.clone(), category)
            }
            Err(e) => return Err(e),
        };

        let confidence = round_to(result.confidence, 2);
        let phrasing = phrase(&classified.assertion.text, confidence, persona, result.verdict);
        Ok(record(classified, topic, sensitive, Some(result), phrasing))
    }

    async fn evaluate_all(
        &self,
        assertions: Vec<Assertion>,
        persona: &Persona,
    ) -> Result<Vec<BatchRecord>> {
        #[cfg(feature = "native")]
        if self.config.pipeline.parallel_execution {
            use futures::future::join_all;

            tracing::debug!(count = assertions.len(), "Evaluating assertions concurrently");
            let futures: Vec<_> = assertions
                .into_iter()
                .map(|a| self.evaluate(a, persona))
                .collect();
            return join_all(futures).await.into_iter().collect();
        }

        let mut records = Vec::with_capacity(assertions.len());
        for assertion in assertions {
            records.push(self.evaluate(assertion, persona).await?);
        }
        Ok(records)
    }

    /// Full editorial analysis of a single assertion.
    ///
    /// The phrasing truth score starts at 1.0 and loses
    /// [`FALLACY_PENALTY`] per detected fallacy.
    ///
    /// # Errors
    ///
    /// Returns a registry error when the primary topic's sources are
    /// malformed.
    pub async fn analyze<S: AsRef<str> + Sync>(
        &self,
        assertion: &str,
        known_facts: &[S],
        persona: &Persona,
    ) -> Result<AnalysisReport> {
        let logic = evaluate_logic(assertion, known_facts);
        let topics = self.classifier.classify_topic(assertion);
        let source = self
            .router
            .best_source(&topics.primary().topic, persona)
            .await?;

        let tone = match self.retry_policy.retry(|| self.tone.tone(assertion)).await {
            Ok(tone) => tone,
            Err(e) => {
                tracing::warn!(estimator = self.tone.name(), error = %e, "Tone unavailable, using neutral");
                Tone::neutral()
            }
        };
        let confidence = match self
            .retry_policy
            .retry(|| self.tone.confidence(assertion))
            .await
        {
            Ok(confidence) => confidence.clamp(0.0, 1.0),
            Err(e) => {
                tracing::warn!(
                    estimator = self.tone.name(),
                    error = %e,
                    "Confidence unavailable, using neutral"
                );
                NEUTRAL_CONFIDENCE
            }
        };

        #[allow(clippy::cast_precision_loss)]
        let truth_score = (1.0 - FALLACY_PENALTY * logic.fallacies.len() as f32).max(0.0);
        let phrasing = phrase_by_score(assertion, truth_score, confidence, persona);

        Ok(AnalysisReport {
            assertion: assertion.to_string(),
            topics,
            source,
            logic,
            tone,
            confidence,
            phrasing,
        })
    }
}

fn record(
    classified: ClassifiedAssertion,
    topic: String,
    sensitive: bool,
    result: Option<VerificationResult>,
    phrasing: Phrasing,
) -> BatchRecord {
    let assertion_type = classified.kind();
    let Assertion {
        text,
        sentence_index,
        ..
    } = classified.assertion;
    let (status, source, source_name) = match result {
        Some(result) => (
            RecordStatus::from(result.verdict),
            Some(result.source_category),
            result.source_name,
        ),
        None => (RecordStatus::Uncertain, None, None),
    };
    BatchRecord {
        sentence_index,
        assertion: text,
        assertion_type,
        topic,
        sensitive,
        status,
        confidence: phrasing.confidence,
        source,
        source_name,
        phrasing,
    }
}

#[async_trait]
impl FactCheckPipeline for Pipeline {
    async fn process(&self, text: &str, persona: &Persona) -> Result<BatchResult> {
        let start = Instant::now();
        let assertions = self.segmenter.segment(text);
        let records = self.evaluate_all(assertions, persona).await?;
        let summary = self.consistency.summarize(&records).await;

        let result = BatchResult {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            persona: persona.clone(),
            records,
            summary,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        tracing::info!(
            batch_id = %result.id,
            persona = %persona,
            assertions = result.len(),
            confirmed = result.summary.counts.confirmed,
            refuted = result.summary.counts.refuted,
            uncertain = result.summary.counts.uncertain,
            duration_ms = result.duration_ms,
            "Batch processed"
        );
        Ok(result)
    }

    async fn process_batch(&self, texts: Vec<String>, persona: &Persona) -> Vec<Result<BatchResult>> {
        if texts.is_empty() {
            return Vec::new();
        }

        #[cfg(feature = "native")]
        {
            use futures::future::join_all;

            let futures: Vec<_> = texts.iter().map(|t| self.process(t, persona)).collect();
            join_all(futures).await
        }

        #[cfg(not(feature = "native"))]
        {
            let mut results = Vec::with_capacity(texts.len());
            for text in &texts {
                results.push(self.process(text, persona).await);
            }
            results
        }
    }

    fn config(&self) -> &FactCheckConfig {
        &self.config
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("classifier", &self.classifier)
            .field("verifier", &self.verifier)
            .field("tone", &self.tone.name())
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a [`Pipeline`].
///
/// Only the source registry is mandatory. The topic tree defaults to the
/// built-in tree; scorer and tone backends default to the highest-priority
/// backend shipped with the crate.
#[derive(Default)]
pub struct PipelineBuilder {
    topics: Option<Arc<dyn TopicTree>>,
    registry: Option<Arc<dyn SourceRegistry>>,
    scorer: Option<Arc<dyn SemanticScorer>>,
    tone: Option<Arc<dyn ToneEstimator>>,
    config: FactCheckConfig,
}

impl PipelineBuilder {
    /// Create a new pipeline builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the topic tree.
    #[must_use]
    pub fn with_topic_tree(mut self, topics: Arc<dyn TopicTree>) -> Self {
        self.topics = Some(topics);
        self
    }

    /// Set the source registry.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<dyn SourceRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the semantic scorer.
    #[must_use]
    pub fn with_scorer(mut self, scorer: Arc<dyn SemanticScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Set the tone estimator.
    #[must_use]
    pub fn with_tone_estimator(mut self, tone: Arc<dyn ToneEstimator>) -> Self {
        self.tone = Some(tone);
        self
    }

    /// Set the configuration.
    #[must_use]
    pub fn with_config(mut self, config: FactCheckConfig) -> Self {
        self.config = config;
        self
    }

    /// Read the configuration from a key/value store.
    #[must_use]
    pub fn with_config_store(mut self, store: &dyn ConfigStore) -> Self {
        self.config = FactCheckConfig::from_store(store);
        self
    }

    fn validate(config: &FactCheckConfig) -> std::result::Result<(), PipelineError> {
        let verifier = &config.verifier;
        let bounded = [
            ("topic_match_threshold", config.classifier.topic_match_threshold),
            ("accept_similarity", verifier.accept_similarity),
            ("accept_trust", verifier.accept_trust),
            ("reject_similarity", verifier.reject_similarity),
            ("reject_trust", verifier.reject_trust),
        ];
        if let Some((name, value)) = bounded
            .iter()
            .find(|(_, value)| !(0.0..=1.0).contains(value))
        {
            return Err(PipelineError::InvalidThreshold(format!(
                "{name} must be within [0, 1], got {value}"
            )));
        }
        if verifier.reject_similarity > verifier.accept_similarity
            || verifier.reject_trust > verifier.accept_trust
        {
            return Err(PipelineError::InvalidThreshold(
                "rejection bounds must not exceed acceptance bounds".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if no registry is configured, no backend is
    /// available for a task, or a threshold is out of range.
    pub fn build(self) -> Result<Pipeline> {
        Self::validate(&self.config)?;

        let registry = self.registry.ok_or_else(|| {
            PipelineError::ComponentNotConfigured("source registry".to_string())
        })?;
        let scorer = match self.scorer {
            Some(scorer) => scorer,
            None => standard_scorers().select().ok_or_else(|| {
                PipelineError::ComponentNotConfigured("similarity backend".to_string())
            })?,
        };
        let tone = match self.tone {
            Some(tone) => tone,
            None => standard_tone_estimators().select().ok_or_else(|| {
                PipelineError::ComponentNotConfigured("tone backend".to_string())
            })?,
        };
        let topics = self
            .topics
            .unwrap_or_else(|| Arc::new(InMemoryTopicTree::default()));

        Pipeline::new(self.config, topics, registry, scorer, tone)
    }
}

//! `factcheck` - An editorial fact-checking pipeline.
//!
//! `factcheck` takes free-form text, splits it into checkable assertions and
//! renders a persona-styled verdict for each one:
//!
//! - **Segmenter**: sentences and clauses, with compound-subject expansion
//! - **Classifier**: rhetorical type and topic relevance
//! - **Router**: viability, source category and trust-ranked sources
//! - **Verifier**: similarity and trust combined into a ternary verdict
//! - **Phraser**: verdict rendered in a persona's voice
//! - **Consistency**: drift, confidence spread and verdict harmony per batch
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use factcheck::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), FactCheckError> {
//!     let registry = InMemorySourceRegistry::new().with_source(
//!         "science",
//!         SourceDescriptor::new("Nature", "https://nature.com")
//!             .with_reliability(Reliability::High),
//!     )?;
//!
//!     let pipeline = PipelineBuilder::new()
//!         .with_registry(Arc::new(registry))
//!         .build()?;
//!
//!     let result = pipeline
//!         .process("Gravity bends light. Everyone loves jazz.", &Persona::Clinical)
//!         .await?;
//!
//!     for record in &result.records {
//!         println!("{}", record.phrasing.text);
//!     }
//!     println!("{}", result.summary.description);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `native` (default): concurrent evaluation via `futures`
//!
//! # Architecture
//!
//! ```text
//! Text
//!   │
//!   ▼
//! ┌────────────┐
//! │ Segmenter  │  ← sentences, clauses, compound subjects
//! └─────┬──────┘
//!       ▼
//! ┌────────────┐
//! │ Classifier │  ← type + topics (TopicTree)
//! └─────┬──────┘
//!       ▼
//! ┌────────────┐
//! │ Router     │  ← viability, category, trust (SourceRegistry)
//! └─────┬──────┘
//!       ▼
//! ┌────────────┐
//! │ Verifier   │  ← similarity (SemanticScorer) + trust
//! └─────┬──────┘
//!       ▼
//! ┌────────────┐
//! │ Phraser    │  ← persona voice
//! └─────┬──────┘
//!       ▼
//!  BatchResult + consistency summary
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classifier;
pub mod collaborators;
pub mod config;
pub mod consistency;
pub mod error;
pub mod logic;
pub mod phraser;
pub mod pipeline;
pub mod retry;
pub mod router;
pub mod segmenter;
pub mod text;
pub mod types;
pub mod verifier;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::classifier::{AssertionClassifier, classify_type, score_topics};
    pub use crate::collaborators::{
        CapabilityRegistry, HashedEmbeddingScorer, InMemorySourceRegistry, InMemoryTopicTree,
        LexicalScorer, LexiconToneEstimator, MergeReport, MockSemanticScorer,
        NeutralToneEstimator, RegistrySnapshot, SemanticScorer, SourceRegistry, Task,
        ToneEstimator, TopicEntry, TopicTree, TopicUpdate, standard_scorers,
        standard_tone_estimators,
    };
    pub use crate::config::{
        ClassifierConfig, ConfigStore, FactCheckConfig, InMemoryConfigStore,
        MalformedEntryPolicy, PipelineConfig, RetryConfig, RouterConfig, SegmenterConfig,
        VerifierConfig,
    };
    pub use crate::consistency::{
        ConsistencyEngine, confidence_consistent, describe, verdict_harmony,
    };
    pub use crate::error::{
        FactCheckError, PipelineError, RegistryError, ScorerError, ToneError,
    };
    pub use crate::logic::{Contradiction, Fallacy, LogicReport, RhetoricalTag, evaluate_logic};
    pub use crate::phraser::{phrase, phrase_by_score};
    pub use crate::pipeline::{AnalysisReport, FactCheckPipeline, Pipeline, PipelineBuilder};
    pub use crate::retry::RetryPolicy;
    pub use crate::router::{RankedSource, SourceRouter, base_trust, is_viable, route};
    pub use crate::segmenter::{Segmenter, split_sentences};
    pub use crate::types::{
        Assertion, AssertionType, BatchRecord, BatchResult, BatchSummary, ClassifiedAssertion,
        ConsistencyReport, Persona, Phrasing, PhrasingStyle, RecordStatus, Reliability,
        ResultSummaryEntry, SourceCategory, SourceDescriptor, SourceUpdate, StatusCounts,
        TopicScore, TopicScores, Tone, TypeClassification, TypeScores, Verdict,
        VerificationResult,
    };
    pub use crate::verifier::{Verifier, decide};
}

pub use error::{FactCheckError, Result};

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::prelude::*;
    use std::sync::Arc;

    fn registry() -> InMemorySourceRegistry {
        InMemorySourceRegistry::new()
            .with_source(
                "science",
                SourceDescriptor::new("Nature", "Gravity bends light")
                    .with_reliability(Reliability::High)
                    .with_tone("academic"),
            )
            .expect("valid source")
            .with_source(
                "history",
                SourceDescriptor::new("Tabloid", "The war ended in 1945")
                    .with_reliability(Reliability::Low)
                    .with_bias("conservative"),
            )
            .expect("valid source")
    }

    #[tokio::test]
    async fn test_full_pipeline_integration() {
        let scorer = MockSemanticScorer::new(0.6)
            .with_pair("Gravity bends light", "Gravity bends light", 1.0);
        let pipeline = PipelineBuilder::new()
            .with_registry(Arc::new(registry()))
            .with_scorer(Arc::new(scorer))
            .with_tone_estimator(Arc::new(NeutralToneEstimator))
            .build()
            .expect("Failed to build pipeline");

        let result = pipeline
            .process(
                "Gravity bends light. The war ended in 1945. I think jazz is great?",
                &Persona::Default,
            )
            .await
            .expect("Failed to process text");

        assert_eq!(result.len(), 3);
        let statuses: Vec<RecordStatus> = result.records.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                RecordStatus::Confirmed,
                RecordStatus::Refuted,
                RecordStatus::Uncertain
            ]
        );
        let sentences: Vec<usize> = result.records.iter().map(|r| r.sentence_index).collect();
        assert_eq!(sentences, vec![0, 1, 2]);
        for record in &result.records {
            assert!((0.0..=1.0).contains(&record.confidence));
            assert_eq!((record.confidence * 100.0).round() / 100.0, record.confidence);
        }
        assert!(!result.summary.consistency.verdict_harmony);
        assert_eq!(
            result.summary.description,
            "Mixed results: 1 confirmed, 1 refuted, 1 uncertain."
        );

        let summary = result.summarize();
        assert_eq!(summary[0].main_source, Some(SourceCategory::InternalKnowledge));
        assert_eq!(summary[2].main_source, None);
    }

    #[tokio::test]
    async fn test_documented_examples() {
        let pipeline = PipelineBuilder::new()
            .with_registry(Arc::new(InMemorySourceRegistry::new()))
            .build()
            .expect("Failed to build pipeline");

        let result = pipeline
            .process("The sky is blue and the moon is made of cheese.", &Persona::Default)
            .await
            .expect("Failed to process text");
        assert_eq!(result.len(), 2);
        assert!(
            result
                .records
                .iter()
                .all(|r| r.phrasing.style == PhrasingStyle::Hedge && r.confidence == 0.0)
        );

        let phrasing = phrase_by_score("water boils at 100C", 0.9, 0.8, &Persona::from("default"));
        assert_eq!(phrasing.style, PhrasingStyle::Confirmation);
        assert!((phrasing.confidence - 0.8).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_registry_edits_are_seen_by_pipeline() {
        let registry = Arc::new(InMemorySourceRegistry::new());
        let pipeline = PipelineBuilder::new()
            .with_registry(registry.clone())
            .with_scorer(Arc::new(MockSemanticScorer::new(0.9)))
            .build()
            .expect("Failed to build pipeline");

        let before = pipeline
            .process("Gravity bends light.", &Persona::Default)
            .await
            .expect("Failed to process text");
        assert_eq!(before.records[0].status, RecordStatus::Uncertain);

        registry
            .add(
                "science",
                SourceDescriptor::new("Nature", "n").with_reliability(Reliability::High),
            )
            .await
            .expect("Failed to add source");

        let after = pipeline
            .process("Gravity bends light.", &Persona::Default)
            .await
            .expect("Failed to process text");
        assert_eq!(after.records[0].status, RecordStatus::Confirmed);
    }

    #[test]
    fn test_batch_result_serialization() {
        let json = serde_json::json!({
            "id": "6f1c9a52-2f7e-4b7a-9a43-6b1f1c0f2d11",
            "created_at": "2024-05-01T12:00:00Z",
            "persona": "pirate",
            "records": [],
            "summary": {
                "counts": {"confirmed": 0, "refuted": 0, "uncertain": 0},
                "description": "No assertions to check.",
                "consistency": {
                    "drift": 0.0,
                    "confidence_consistent": true,
                    "verdict_harmony": false
                }
            },
            "duration_ms": 3
        });
        let parsed: BatchResult = serde_json::from_value(json).expect("Failed to deserialize");
        assert_eq!(parsed.persona, Persona::Custom("pirate".to_string()));
        assert!(parsed.is_empty());
    }
}

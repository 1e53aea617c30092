//! Segmenter: text → sentences → atomic assertions.
//!
//! Sentences are split first, then each sentence is split into clauses on
//! coordinating and subordinating conjunctions. Short fragments are dropped
//! and compound subjects ("Alice and Bob are doctors") are expanded into one
//! assertion per subject.

pub mod clauses;
pub mod sentences;

pub use clauses::ClauseSplitter;
pub use sentences::split_sentences;

use crate::config::SegmenterConfig;
use crate::error::Result;
use crate::types::Assertion;

/// Splits free-form text into assertions.
#[derive(Debug, Clone)]
pub struct Segmenter {
    config: SegmenterConfig,
    clauses: ClauseSplitter,
}

impl Segmenter {
    /// Create a segmenter.
    ///
    /// # Errors
    ///
    /// Returns an error if the clause patterns fail to compile.
    pub fn new(config: SegmenterConfig) -> Result<Self> {
        Ok(Self {
            config,
            clauses: ClauseSplitter::new()?,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Extract assertions in sentence order, then extraction order.
    ///
    /// Empty or whitespace-only text yields no assertions.
    #[must_use]
    pub fn segment(&self, text: &str) -> Vec<Assertion> {
        let mut assertions = Vec::new();
        for (sentence_index, sentence) in split_sentences(text).into_iter().enumerate() {
            let mut position = 0;
            for fragment in self.extract(sentence) {
                assertions.push(Assertion::new(fragment, sentence_index, position));
                position += 1;
            }
        }
        tracing::debug!(count = assertions.len(), "Text segmented");
        assertions
    }

    /// Assertion texts for a single sentence.
    #[must_use]
    pub fn extract(&self, sentence: &str) -> Vec<String> {
        let expand = self.config.expand_compound_subjects;
        self.clauses
            .split(sentence, expand)
            .into_iter()
            .filter(|clause| clause.chars().count() >= self.config.min_fragment_len)
            .flat_map(|clause| {
                if expand {
                    self.clauses.expand(&clause)
                } else {
                    vec![clause]
                }
            })
            .collect()
    }
}

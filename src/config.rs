//! Configuration management for `factcheck`.
//!
//! Configuration is plain serde data with documented defaults. It can be
//! loaded from JSON, or assembled from a key/value [`ConfigStore`] where
//! missing or mistyped keys fall back to the defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::types::Persona;

/// Keys read by [`FactCheckConfig::from_store`].
pub mod keys {
    /// Minimum topic score kept by the classifier (number, default 0.1).
    pub const TOPIC_MATCH_THRESHOLD: &str = "topic_match_threshold";
    /// Persona used when the caller does not pass one (string, default "default").
    pub const DEFAULT_PERSONA: &str = "default_persona";
    /// Trust a source needs for a true verdict (number, default 0.75).
    pub const TRUST_THRESHOLD: &str = "trust_threshold";
    /// Retries for collaborator calls (integer, default 3).
    pub const MAX_RETRIES: &str = "max_retries";
    /// Evaluate assertions concurrently (bool, default false).
    pub const PARALLEL_EXECUTION: &str = "parallel_execution";
}

/// Global configuration for `factcheck`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FactCheckConfig {
    /// Segmenter configuration.
    pub segmenter: SegmenterConfig,
    /// Classifier configuration.
    pub classifier: ClassifierConfig,
    /// Router configuration.
    pub router: RouterConfig,
    /// Verifier configuration.
    pub verifier: VerifierConfig,
    /// Pipeline configuration.
    pub pipeline: PipelineConfig,
}

/// Configuration for the segmenter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Fragments with fewer trimmed characters are discarded.
    pub min_fragment_len: usize,
    /// Whether compound subjects are expanded into separate assertions.
    pub expand_compound_subjects: bool,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_fragment_len: 5,
            expand_compound_subjects: true,
        }
    }
}

/// Configuration for the assertion classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum score a topic needs to be kept.
    pub topic_match_threshold: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            topic_match_threshold: 0.1,
        }
    }
}

/// Configuration for the source router.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Per-persona tone bonus overrides: persona name → tone tag → bonus.
    ///
    /// Tags not listed for a persona use the base tone table.
    pub persona_tone_bonus: HashMap<String, HashMap<String, f32>>,
}

/// Configuration for the verifier thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Similarity must exceed this for a true verdict.
    pub accept_similarity: f32,
    /// Trust must exceed this for a true verdict.
    pub accept_trust: f32,
    /// Similarity below this gives a false verdict.
    pub reject_similarity: f32,
    /// Trust below this gives a false verdict.
    pub reject_trust: f32,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            accept_similarity: 0.85,
            accept_trust: 0.75,
            reject_similarity: 0.4,
            reject_trust: 0.5,
        }
    }
}

/// How the orchestrator reacts to a malformed registry entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedEntryPolicy {
    /// Fail the whole batch.
    #[default]
    Abort,
    /// Record the affected assertion as uncertain and continue.
    Skip,
}

/// Configuration for the batch orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Persona used by [`crate::pipeline::Pipeline::process_default`].
    pub default_persona: Persona,
    /// Whether to evaluate assertions concurrently.
    pub parallel_execution: bool,
    /// Reaction to malformed registry entries.
    pub malformed_entry_policy: MalformedEntryPolicy,
    /// Retry configuration for collaborator calls.
    pub retry_config: Option<RetryConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_persona: Persona::Default,
            parallel_execution: false,
            malformed_entry_policy: MalformedEntryPolicy::Abort,
            retry_config: Some(RetryConfig::default()),
        }
    }
}

/// Configuration for retry logic with exponential backoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_retries: usize,
    /// Initial delay between retries in milliseconds.
    pub initial_delay_ms: u64,
    /// Maximum delay between retries in milliseconds.
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 50,
            max_delay_ms: 2000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Create a new `RetryConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of retries.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the initial delay in milliseconds.
    #[must_use]
    pub const fn with_initial_delay_ms(mut self, initial_delay_ms: u64) -> Self {
        self.initial_delay_ms = initial_delay_ms;
        self
    }

    /// Set the maximum delay in milliseconds.
    #[must_use]
    pub const fn with_max_delay_ms(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    /// Set the backoff multiplier.
    #[must_use]
    pub const fn with_backoff_multiplier(mut self, backoff_multiplier: f64) -> Self {
        self.backoff_multiplier = backoff_multiplier;
        self
    }
}

impl FactCheckConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a configuration from a key/value store.
    ///
    /// Keys are listed in [`keys`]. Missing keys keep their defaults;
    /// keys holding a value of the wrong type are ignored with a warning.
    #[must_use]
    pub fn from_store(store: &dyn ConfigStore) -> Self {
        let mut config = Self::default();

        if let Some(threshold) = read_f32(store, keys::TOPIC_MATCH_THRESHOLD) {
            config.classifier.topic_match_threshold = threshold;
        }
        if let Some(trust) = read_f32(store, keys::TRUST_THRESHOLD) {
            config.verifier.accept_trust = trust;
        }
        match store.get(keys::DEFAULT_PERSONA) {
            Some(serde_json::Value::String(persona)) => {
                config.pipeline.default_persona = Persona::from(persona);
            }
            Some(other) => warn_mistyped(keys::DEFAULT_PERSONA, &other),
            None => {}
        }
        match store.get(keys::MAX_RETRIES) {
            Some(value) => match value.as_u64().and_then(|n| usize::try_from(n).ok()) {
                Some(max_retries) => {
                    let retry = config.pipeline.retry_config.get_or_insert_with(RetryConfig::default);
                    retry.max_retries = max_retries;
                }
                None => warn_mistyped(keys::MAX_RETRIES, &value),
            },
            None => {}
        }
        match store.get(keys::PARALLEL_EXECUTION) {
            Some(serde_json::Value::Bool(parallel)) => config.pipeline.parallel_execution = parallel,
            Some(other) => warn_mistyped(keys::PARALLEL_EXECUTION, &other),
            None => {}
        }

        config
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn to_file(&self, path: impl AsRef<std::path::Path>) -> crate::error::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Serialize configuration to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> crate::error::Result<String> {
        let content = serde_json::to_string_pretty(self)?;
        Ok(content)
    }

    /// Set segmenter configuration.
    #[must_use]
    pub fn with_segmenter(mut self, segmenter: SegmenterConfig) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Set classifier configuration.
    #[must_use]
    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    /// Set router configuration.
    #[must_use]
    pub fn with_router(mut self, router: RouterConfig) -> Self {
        self.router = router;
        self
    }

    /// Set verifier configuration.
    #[must_use]
    pub fn with_verifier(mut self, verifier: VerifierConfig) -> Self {
        self.verifier = verifier;
        self
    }

    /// Set pipeline configuration.
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }
}

#[allow(clippy::cast_possible_truncation)]
fn read_f32(store: &dyn ConfigStore, key: &str) -> Option<f32> {
    let value = store.get(key)?;
    match value.as_f64() {
        Some(n) => Some(n as f32),
        None => {
            warn_mistyped(key, &value);
            None
        }
    }
}

fn warn_mistyped(key: &str, value: &serde_json::Value) {
    tracing::warn!(key, %value, "Ignoring config value of unexpected type");
}

/// A key/value configuration source.
pub trait ConfigStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: serde_json::Value);

    /// Remove a value. Returns true if it existed.
    fn remove(&self, key: &str) -> bool;

    /// All keys currently set, sorted.
    fn keys(&self) -> Vec<String>;
}

/// A thread-safe in-memory [`ConfigStore`].
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    values: RwLock<HashMap<String, serde_json::Value>>,
}

impl InMemoryConfigStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the documented defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        let store = Self::new();
        store.set(keys::TOPIC_MATCH_THRESHOLD, serde_json::json!(0.1));
        store.set(keys::DEFAULT_PERSONA, serde_json::json!("default"));
        store.set(keys::TRUST_THRESHOLD, serde_json::json!(0.75));
        store.set(keys::MAX_RETRIES, serde_json::json!(3));
        store.set(keys::PARALLEL_EXECUTION, serde_json::json!(false));
        store
    }

    /// Set a value, builder style.
    #[must_use]
    pub fn with(self, key: &str, value: serde_json::Value) -> Self {
        self.set(key, value);
        self
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: serde_json::Value) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) -> bool {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

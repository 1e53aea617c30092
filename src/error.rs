//! Unified error types for `factcheck`.

use thiserror::Error;

/// The main error type for `factcheck` operations.
#[derive(Debug, Error)]
pub enum FactCheckError {
    /// Source registry errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Semantic scorer errors
    #[error("Scorer error: {0}")]
    Scorer(#[from] ScorerError),

    /// Tone estimator errors
    #[error("Tone error: {0}")]
    Tone(#[from] ToneError),

    /// Pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid text pattern
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

/// Errors raised by a source registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry backend could not be reached.
    #[error("Registry unavailable: {0}")]
    Unavailable(String),

    /// A stored source descriptor is structurally invalid.
    #[error("Malformed registry entry in topic '{topic}': {reason}")]
    MalformedEntry {
        /// Topic the entry was filed under.
        topic: String,
        /// What is wrong with the entry.
        reason: String,
    },

    /// A source with this name already exists under the topic.
    #[error("Duplicate source '{name}' in topic '{topic}'")]
    DuplicateSource {
        /// Topic the source was filed under.
        topic: String,
        /// Source name.
        name: String,
    },
}

/// Errors raised by a semantic scorer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScorerError {
    /// The scoring backend is not available.
    #[error("Scoring backend unavailable: {0}")]
    Unavailable(String),

    /// The backend did not answer in time.
    #[error("Scoring timed out after {0}ms")]
    Timeout(u64),

    /// Empty input provided.
    #[error("Empty input provided")]
    EmptyInput,

    /// The backend returned a value outside [0, 1].
    #[error("Score out of range: {0}")]
    OutOfRange(String),
}

/// Errors raised by a tone/confidence estimator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToneError {
    /// The estimator backend is not available.
    #[error("Tone backend unavailable: {0}")]
    Unavailable(String),

    /// Estimation failed.
    #[error("Tone estimation failed: {0}")]
    Estimation(String),
}

/// Errors related to pipeline construction and execution.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Component not configured
    #[error("Component not configured: {0}")]
    ComponentNotConfigured(String),

    /// Pipeline build error
    #[error("Pipeline build error: {0}")]
    BuildError(String),

    /// Invalid threshold
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),
}

/// A type alias for Results with [`FactCheckError`].
pub type Result<T> = std::result::Result<T, FactCheckError>;

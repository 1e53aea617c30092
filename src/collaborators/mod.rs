//! Collaborators reached through narrow traits: source storage, topic
//! storage, similarity scoring, tone estimation, and backend selection.

pub mod backends;
pub mod registry;
pub mod scorer;
pub mod tone;
pub mod topic_tree;

pub use backends::{
    CapabilityRegistry, PRIORITY_TABLE, Task, priority, standard_scorers,
    standard_tone_estimators,
};
pub use registry::{
    InMemorySourceRegistry, MergeReport, RegistrySnapshot, SourceRegistry, validate_source,
};
pub use scorer::{HashedEmbeddingScorer, LexicalScorer, MockSemanticScorer, SemanticScorer};
pub use tone::{LexiconToneEstimator, NEUTRAL_CONFIDENCE, NeutralToneEstimator, ToneEstimator};
pub use topic_tree::{DEFAULT_CLUSTER, InMemoryTopicTree, TopicEntry, TopicTree, TopicUpdate};

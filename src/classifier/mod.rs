//! Assertion classifier: rhetorical type and topic relevance.

pub mod rhetoric;
pub mod topics;

pub use rhetoric::classify_type;
pub use topics::score_topics;

use std::sync::Arc;

use crate::collaborators::topic_tree::TopicTree;
use crate::config::ClassifierConfig;
use crate::types::{Assertion, ClassifiedAssertion, TopicScores, TypeClassification};

/// Classifies assertions against a topic tree.
pub struct AssertionClassifier {
    config: ClassifierConfig,
    topics: Arc<dyn TopicTree>,
}

impl AssertionClassifier {
    /// Create a classifier over a topic tree.
    #[must_use]
    pub fn new(config: ClassifierConfig, topics: Arc<dyn TopicTree>) -> Self {
        Self { config, topics }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// The topic tree in use.
    #[must_use]
    pub fn topic_tree(&self) -> &Arc<dyn TopicTree> {
        &self.topics
    }

    /// Rhetorical type with per-type scores.
    #[must_use]
    pub fn classify_type(&self, text: &str) -> TypeClassification {
        classify_type(text)
    }

    /// Topic relevance against the current topic tree snapshot.
    #[must_use]
    pub fn classify_topic(&self, text: &str) -> TopicScores {
        let snapshot = self.topics.get_topics();
        score_topics(text, &snapshot, self.config.topic_match_threshold)
    }

    /// Attach type and topics to an assertion.
    #[must_use]
    pub fn classify(&self, assertion: Assertion) -> ClassifiedAssertion {
        let classification = self.classify_type(&assertion.text);
        let topics = self.classify_topic(&assertion.text);
        tracing::debug!(
            assertion = %assertion.text,
            kind = %classification.kind,
            topic = %topics.primary().topic,
            "Assertion classified"
        );
        ClassifiedAssertion {
            assertion,
            classification,
            topics,
        }
    }
}

impl std::fmt::Debug for AssertionClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssertionClassifier")
            .field("config", &self.config)
            .field("topics", &self.topics.get_topics().len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::collaborators::topic_tree::{InMemoryTopicTree, TopicEntry};
    use crate::types::AssertionType;

    #[test]
    fn test_classify_assertion() {
        let classifier =
            AssertionClassifier::new(ClassifierConfig::default(), Arc::new(InMemoryTopicTree::default()));
        let classified = classifier.classify(Assertion::new("The vaccine prevents disease", 0, 0));
        assert_eq!(classified.kind(), AssertionType::Factual);
        assert_eq!(classified.primary_topic(), "health");
        assert_eq!(classified.topics.primary().score, 0.4);
    }

    #[test]
    fn test_topic_tree_edits_are_seen() {
        let tree = Arc::new(InMemoryTopicTree::empty());
        let classifier = AssertionClassifier::new(ClassifierConfig::default(), tree.clone());
        assert!(classifier.classify_topic("The league final").is_general());

        tree.add_topic(TopicEntry::new("sports", ["league", "final"]));
        let scores = classifier.classify_topic("The league final");
        assert_eq!(scores.primary().topic, "sports");
        assert_eq!(scores.primary().score, 1.0);
    }
}

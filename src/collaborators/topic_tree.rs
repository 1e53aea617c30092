//! Topic tree: topic → keywords, source cluster and sensitivity.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// Cluster name used for topics without a configured cluster.
pub const DEFAULT_CLUSTER: &str = "general";

/// One topic in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEntry {
    /// Topic name.
    pub name: String,
    /// Keywords or phrases that signal the topic.
    pub keywords: Vec<String>,
    /// Registry cluster the topic's sources live in.
    #[serde(default = "default_cluster")]
    pub source_cluster: String,
    /// Whether claims on this topic need editorial caution.
    #[serde(default)]
    pub sensitive: bool,
}

fn default_cluster() -> String {
    DEFAULT_CLUSTER.to_string()
}

impl TopicEntry {
    /// Create a topic entry in the default cluster.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
            source_cluster: default_cluster(),
            sensitive: false,
        }
    }

    /// Set the source cluster.
    #[must_use]
    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.source_cluster = cluster.into();
        self
    }

    /// Mark the topic as sensitive.
    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// Partial update applied to a topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicUpdate {
    /// Replacement keyword list.
    pub keywords: Option<Vec<String>>,
    /// New source cluster.
    pub source_cluster: Option<String>,
    /// New sensitivity flag.
    pub sensitive: Option<bool>,
}

/// Read access to the topic tree.
pub trait TopicTree: Send + Sync {
    /// All topics, in tree order.
    fn get_topics(&self) -> Arc<Vec<TopicEntry>>;

    /// Registry cluster for a topic; [`DEFAULT_CLUSTER`] if unknown.
    fn source_cluster(&self, topic: &str) -> String {
        self.get_topics()
            .iter()
            .find(|t| t.name == topic)
            .map_or_else(default_cluster, |t| t.source_cluster.clone())
    }

    /// Whether a topic is flagged sensitive; false if unknown.
    fn is_sensitive(&self, topic: &str) -> bool {
        self.get_topics()
            .iter()
            .any(|t| t.name == topic && t.sensitive)
    }
}

/// An editable in-memory topic tree with snapshot reads.
#[derive(Debug)]
pub struct InMemoryTopicTree {
    topics: RwLock<Arc<Vec<TopicEntry>>>,
}

impl Default for InMemoryTopicTree {
    fn default() -> Self {
        Self::new(vec![
            TopicEntry::new(
                "politics",
                ["president", "election", "congress", "senator", "policy"],
            )
            .with_cluster("gov_sources")
            .sensitive(),
            TopicEntry::new(
                "science",
                ["gravity", "atom", "experiment", "physics", "biology"],
            )
            .with_cluster("peer_reviewed"),
            TopicEntry::new(
                "history",
                ["war", "treaty", "empire", "revolution", "historical"],
            )
            .with_cluster("academic"),
            TopicEntry::new(
                "health",
                ["disease", "symptom", "treatment", "vaccine", "mental health"],
            )
            .with_cluster("medical")
            .sensitive(),
            TopicEntry::new(
                "technology",
                ["ai", "software", "internet", "device", "algorithm"],
            )
            .with_cluster("tech_news"),
            TopicEntry::new("culture", ["movie", "music", "celebrity", "art", "fashion"])
                .with_cluster("media"),
            TopicEntry::new(
                "finance",
                ["stock", "market", "inflation", "interest rate", "economy"],
            )
            .with_cluster("financial")
            .sensitive(),
        ])
    }
}

impl InMemoryTopicTree {
    /// Create a tree from entries, in the given order.
    #[must_use]
    pub fn new(topics: Vec<TopicEntry>) -> Self {
        Self {
            topics: RwLock::new(Arc::new(topics)),
        }
    }

    /// Create an empty tree.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    fn write<R>(&self, mutate: impl FnOnce(&mut Vec<TopicEntry>) -> R) -> R {
        let mut guard = self.topics.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = Vec::clone(&guard);
        let result = mutate(&mut next);
        *guard = Arc::new(next);
        result
    }

    /// Add a topic. Returns false if the name is taken.
    pub fn add_topic(&self, entry: TopicEntry) -> bool {
        self.write(|topics| {
            if topics.iter().any(|t| t.name == entry.name) {
                return false;
            }
            topics.push(entry);
            true
        })
    }

    /// Update a topic. Returns false if it does not exist.
    pub fn update_topic(&self, name: &str, update: TopicUpdate) -> bool {
        self.write(|topics| {
            let Some(topic) = topics.iter_mut().find(|t| t.name == name) else {
                return false;
            };
            if let Some(keywords) = update.keywords {
                topic.keywords = keywords;
            }
            if let Some(cluster) = update.source_cluster {
                topic.source_cluster = cluster;
            }
            if let Some(sensitive) = update.sensitive {
                topic.sensitive = sensitive;
            }
            true
        })
    }

    /// Remove a topic. Returns false if it does not exist.
    pub fn remove_topic(&self, name: &str) -> bool {
        self.write(|topics| {
            let before = topics.len();
            topics.retain(|t| t.name != name);
            before != topics.len()
        })
    }

    /// Topic names in tree order.
    #[must_use]
    pub fn list_topics(&self) -> Vec<String> {
        self.get_topics().iter().map(|t| t.name.clone()).collect()
    }
}

impl TopicTree for InMemoryTopicTree {
    fn get_topics(&self) -> Arc<Vec<TopicEntry>> {
        Arc::clone(&self.topics.read().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tree() {
        let tree = InMemoryTopicTree::default();
        assert_eq!(
            tree.list_topics(),
            vec![
                "politics",
                "science",
                "history",
                "health",
                "technology",
                "culture",
                "finance"
            ]
        );
        assert_eq!(tree.source_cluster("science"), "peer_reviewed");
        assert_eq!(tree.source_cluster("astrology"), DEFAULT_CLUSTER);
        assert!(tree.is_sensitive("health"));
        assert!(!tree.is_sensitive("science"));
        assert!(!tree.is_sensitive("astrology"));
    }

    #[test]
    fn test_topic_editing() {
        let tree = InMemoryTopicTree::empty();
        assert!(tree.add_topic(TopicEntry::new("sports", ["goal", "league"])));
        assert!(!tree.add_topic(TopicEntry::new("sports", ["match"])));

        assert!(tree.update_topic(
            "sports",
            TopicUpdate {
                sensitive: Some(true),
                source_cluster: Some("sports_desk".to_string()),
                ..Default::default()
            }
        ));
        assert!(!tree.update_topic("weather", TopicUpdate::default()));
        assert!(tree.is_sensitive("sports"));
        assert_eq!(tree.source_cluster("sports"), "sports_desk");

        assert!(tree.remove_topic("sports"));
        assert!(!tree.remove_topic("sports"));
        assert!(tree.list_topics().is_empty());
    }

    #[test]
    fn test_snapshot_survives_edit() {
        let tree = InMemoryTopicTree::default();
        let snapshot = tree.get_topics();
        tree.remove_topic("culture");
        assert_eq!(snapshot.len(), 7);
        assert_eq!(tree.get_topics().len(), 6);
    }

    #[test]
    fn test_entry_deserialize_defaults() {
        let entry: TopicEntry =
            serde_json::from_str(r#"{"name": "weather", "keywords": ["rain"]}"#).unwrap();
        assert_eq!(entry.source_cluster, DEFAULT_CLUSTER);
        assert!(!entry.sensitive);
    }
}

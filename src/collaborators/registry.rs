//! Source registry: topic → ordered list of evidentiary sources.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::RegistryError;
use crate::types::{SourceDescriptor, SourceUpdate};

/// A point-in-time copy of a registry, keyed by topic.
pub type RegistrySnapshot = BTreeMap<String, Vec<SourceDescriptor>>;

/// Storage for source descriptors.
///
/// Readers must see a consistent snapshot; writers serialize against each
/// other.
#[async_trait]
pub trait SourceRegistry: Send + Sync {
    /// Sources filed under a topic, in registry order.
    ///
    /// An unknown topic yields an empty list.
    async fn get_sources(&self, topic: &str) -> Result<Vec<SourceDescriptor>, RegistryError>;

    /// File a new source under a topic.
    async fn add(&self, topic: &str, source: SourceDescriptor) -> Result<(), RegistryError>;

    /// Apply a partial update. Returns false if the source does not exist.
    async fn update(
        &self,
        topic: &str,
        name: &str,
        update: &SourceUpdate,
    ) -> Result<bool, RegistryError>;

    /// Remove a source. Returns false if it did not exist.
    async fn remove(&self, topic: &str, name: &str) -> Result<bool, RegistryError>;

    /// Copy of the whole registry.
    async fn snapshot(&self) -> Result<RegistrySnapshot, RegistryError>;

    /// Merge another registry into this one.
    ///
    /// Local entries win: a remote source is only added when no source of
    /// the same name exists under its topic.
    async fn merge(&self, remote: RegistrySnapshot) -> Result<MergeReport, RegistryError>;
}

/// Outcome of a registry merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Topics that did not exist locally.
    pub topics_added: usize,
    /// Sources copied from the remote registry.
    pub sources_added: usize,
    /// Remote sources ignored because the name already existed locally.
    pub sources_skipped: usize,
    /// Remote sources ignored because they were malformed.
    pub sources_rejected: usize,
}

/// Check that a descriptor is structurally usable.
///
/// # Errors
///
/// Returns [`RegistryError::MalformedEntry`] if the name is blank.
pub fn validate_source(topic: &str, source: &SourceDescriptor) -> Result<(), RegistryError> {
    if source.name.trim().is_empty() {
        return Err(RegistryError::MalformedEntry {
            topic: topic.to_string(),
            reason: "source name is empty".to_string(),
        });
    }
    Ok(())
}

/// An in-memory registry with copy-on-write snapshots.
#[derive(Debug, Default)]
pub struct InMemorySourceRegistry {
    state: RwLock<Arc<RegistrySnapshot>>,
}

impl InMemorySourceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from existing data without validating it.
    ///
    /// Malformed entries are reported when they are read.
    #[must_use]
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        Self {
            state: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Add a source, builder style.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is malformed or a duplicate.
    pub fn with_source(
        self,
        topic: &str,
        source: SourceDescriptor,
    ) -> Result<Self, RegistryError> {
        self.insert(topic, source)?;
        Ok(self)
    }

    fn read(&self) -> Arc<RegistrySnapshot> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Run a mutation on a private copy and publish it.
    fn write<R>(&self, mutate: impl FnOnce(&mut RegistrySnapshot) -> R) -> R {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = RegistrySnapshot::clone(&guard);
        let result = mutate(&mut next);
        *guard = Arc::new(next);
        result
    }

    fn insert(&self, topic: &str, source: SourceDescriptor) -> Result<(), RegistryError> {
        validate_source(topic, &source)?;
        self.write(|registry| {
            let sources = registry.entry(topic.to_string()).or_default();
            if sources.iter().any(|s| s.name == source.name) {
                return Err(RegistryError::DuplicateSource {
                    topic: topic.to_string(),
                    name: source.name.clone(),
                });
            }
            sources.push(source);
            Ok(())
        })
    }

    /// Number of sources across all topics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().values().map(Vec::len).sum()
    }

    /// Whether the registry holds no sources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SourceRegistry for InMemorySourceRegistry {
    async fn get_sources(&self, topic: &str) -> Result<Vec<SourceDescriptor>, RegistryError> {
        let snapshot = self.read();
        let Some(sources) = snapshot.get(topic) else {
            return Ok(Vec::new());
        };
        for source in sources {
            validate_source(topic, source)?;
        }
        Ok(sources.clone())
    }

    async fn add(&self, topic: &str, source: SourceDescriptor) -> Result<(), RegistryError> {
        self.insert(topic, source)?;
        tracing::debug!(topic, "Source added to registry");
        Ok(())
    }

    async fn update(
        &self,
        topic: &str,
        name: &str,
        update: &SourceUpdate,
    ) -> Result<bool, RegistryError> {
        let updated = self.write(|registry| {
            match registry
                .get_mut(topic)
                .and_then(|sources| sources.iter_mut().find(|s| s.name == name))
            {
                Some(source) => {
                    update.apply(source);
                    true
                }
                None => false,
            }
        });
        if updated {
            tracing::debug!(topic, name, "Source updated");
        }
        Ok(updated)
    }

    async fn remove(&self, topic: &str, name: &str) -> Result<bool, RegistryError> {
        let removed = self.write(|registry| {
            let Some(sources) = registry.get_mut(topic) else {
                return false;
            };
            let before = sources.len();
            sources.retain(|s| s.name != name);
            before != sources.len()
        });
        if removed {
            tracing::debug!(topic, name, "Source removed");
        }
        Ok(removed)
    }

    async fn snapshot(&self) -> Result<RegistrySnapshot, RegistryError> {
        Ok(RegistrySnapshot::clone(&self.read()))
    }

    async fn merge(&self, remote: RegistrySnapshot) -> Result<MergeReport, RegistryError> {
        let report = self.write(|registry| {
            let mut report = MergeReport::default();
            for (topic, sources) in remote {
                let is_new = !registry.contains_key(&topic);
                let mut accepted: Vec<SourceDescriptor> = Vec::new();
                for source in sources {
                    let known = registry
                        .get(&topic)
                        .is_some_and(|local| local.iter().any(|s| s.name == source.name))
                        || accepted.iter().any(|s| s.name == source.name);
                    if validate_source(&topic, &source).is_err() {
                        report.sources_rejected += 1;
                    } else if known {
                        report.sources_skipped += 1;
                    } else {
                        accepted.push(source);
                    }
                }
                if accepted.is_empty() {
                    continue;
                }
                if is_new {
                    report.topics_added += 1;
                }
                report.sources_added += accepted.len();
                registry.entry(topic).or_default().extend(accepted);
            }
            report
        });
        tracing::info!(
            topics_added = report.topics_added,
            sources_added = report.sources_added,
            sources_skipped = report.sources_skipped,
            sources_rejected = report.sources_rejected,
            "Registry merge complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Reliability;

    fn nature() -> SourceDescriptor {
        SourceDescriptor::new("Nature", "https://nature.com").with_reliability(Reliability::High)
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let registry = InMemorySourceRegistry::new();
        registry.add("science", nature()).await.unwrap();

        let sources = registry.get_sources("science").await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "Nature");
        assert!(registry.get_sources("history").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_rejected() {
        let registry = InMemorySourceRegistry::new();
        registry.add("science", nature()).await.unwrap();
        let err = registry.add("science", nature()).await.unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateSource { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_add_rejected() {
        let registry = InMemorySourceRegistry::new();
        let err = registry
            .add("science", SourceDescriptor::new("  ", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::MalformedEntry { .. }));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_entry_surfaces_on_read() {
        let mut snapshot = RegistrySnapshot::new();
        snapshot.insert(
            "science".to_string(),
            vec![nature(), SourceDescriptor::new("", "orphan")],
        );
        let registry = InMemorySourceRegistry::from_snapshot(snapshot);

        let err = registry.get_sources("science").await.unwrap_err();
        assert_eq!(
            err,
            RegistryError::MalformedEntry {
                topic: "science".to_string(),
                reason: "source name is empty".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let registry = InMemorySourceRegistry::new().with_source("science", nature()).unwrap();

        let update = SourceUpdate {
            tone: Some("academic".to_string()),
            ..Default::default()
        };
        assert!(registry.update("science", "Nature", &update).await.unwrap());
        assert!(!registry.update("science", "Missing", &update).await.unwrap());
        let sources = registry.get_sources("science").await.unwrap();
        assert_eq!(sources[0].tone.as_deref(), Some("academic"));

        assert!(registry.remove("science", "Nature").await.unwrap());
        assert!(!registry.remove("science", "Nature").await.unwrap());
        assert!(!registry.remove("history", "Nature").await.unwrap());
    }

    #[tokio::test]
    async fn test_snapshot_isolated_from_later_writes() {
        let registry = InMemorySourceRegistry::new().with_source("science", nature()).unwrap();
        let snapshot = registry.snapshot().await.unwrap();

        registry
            .add("science", SourceDescriptor::new("Science", "https://science.org"))
            .await
            .unwrap();

        assert_eq!(snapshot["science"].len(), 1);
        assert_eq!(registry.get_sources("science").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_merge_local_wins() {
        let registry = InMemorySourceRegistry::new().with_source("science", nature()).unwrap();

        let mut remote = RegistrySnapshot::new();
        remote.insert(
            "science".to_string(),
            vec![
                SourceDescriptor::new("Nature", "https://mirror.example")
                    .with_reliability(Reliability::Low),
                SourceDescriptor::new("Cell", "https://cell.com"),
            ],
        );
        remote.insert(
            "history".to_string(),
            vec![
                SourceDescriptor::new("Archive", "https://archive.org"),
                SourceDescriptor::new("", "nameless"),
            ],
        );

        let report = registry.merge(remote).await.unwrap();
        assert_eq!(
            report,
            MergeReport {
                topics_added: 1,
                sources_added: 2,
                sources_skipped: 1,
                sources_rejected: 1,
            }
        );

        let science = registry.get_sources("science").await.unwrap();
        assert_eq!(science.len(), 2);
        assert_eq!(science[0].reliability, Reliability::High);
        assert_eq!(registry.get_sources("history").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_merge_skips_topic_with_only_malformed_sources() {
        let registry = InMemorySourceRegistry::new();

        let mut remote = RegistrySnapshot::new();
        remote.insert(
            "finance".to_string(),
            vec![SourceDescriptor::new("", "nameless")],
        );

        let report = registry.merge(remote).await.unwrap();
        assert_eq!(report.topics_added, 0);
        assert_eq!(report.sources_rejected, 1);
        assert!(!registry.snapshot().await.unwrap().contains_key("finance"));
        assert!(registry.is_empty());
    }
}

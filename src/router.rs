//! Source router: viability, source category and trust-ranked sources.
//!
//! Trust is derived from a descriptor on every query and never stored:
//!
//! | signal      | values                                                   |
//! |-------------|----------------------------------------------------------|
//! | reliability | high 1.0, medium 0.7, low 0.4, unknown 0.5               |
//! | tone bonus  | clinical/academic +0.1, playful +0.05, other 0           |
//! | bias        | neutral 0, slightly progressive -0.1, conservative -0.2  |
//!
//! The sum is clamped to [0, 1]. Tags are compared case-insensitively with
//! `-` and `_` read as spaces. A persona may override the tone bonuses via
//! [`RouterConfig::persona_tone_bonus`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::collaborators::registry::SourceRegistry;
use crate::collaborators::topic_tree::TopicTree;
use crate::config::RouterConfig;
use crate::error::RegistryError;
use crate::retry::RetryPolicy;
use crate::types::{AssertionType, Persona, Reliability, SourceCategory, SourceDescriptor};

/// Topics the verifier can check.
pub const SUPPORTED_TOPICS: &[&str] = &[
    "politics",
    "science",
    "history",
    "health",
    "technology",
    "finance",
];

/// Topics answered from internal knowledge.
pub const INTERNAL_TOPICS: &[&str] = &["history", "science"];

/// Topics answered from the live web.
pub const WEB_TOPICS: &[&str] = &["politics", "finance", "technology", "health"];

/// Trust used for sources with an unrated reliability tier.
pub const UNKNOWN_RELIABILITY_TRUST: f32 = 0.5;

const TONE_BONUS: &[(&str, f32)] = &[("clinical", 0.1), ("academic", 0.1), ("playful", 0.05)];

const BIAS_PENALTY: &[(&str, f32)] = &[
    ("neutral", 0.0),
    ("slightly progressive", -0.1),
    ("conservative", -0.2),
];

/// Whether an assertion can be verified at all.
#[must_use]
pub fn is_viable(kind: AssertionType, topic: &str) -> bool {
    kind == AssertionType::Factual && SUPPORTED_TOPICS.contains(&topic)
}

/// Source category a topic is answered from.
#[must_use]
pub fn route(topic: &str) -> SourceCategory {
    if INTERNAL_TOPICS.contains(&topic) {
        SourceCategory::InternalKnowledge
    } else if WEB_TOPICS.contains(&topic) {
        SourceCategory::ExternalWeb
    } else {
        SourceCategory::KnowledgeBase
    }
}

/// Normalize a descriptor tag for table lookups.
#[must_use]
pub fn normalize_tag(tag: &str) -> String {
    tag.to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn lookup(table: &[(&str, f32)], tag: Option<&str>) -> f32 {
    let Some(tag) = tag.map(normalize_tag) else {
        return 0.0;
    };
    table
        .iter()
        .find(|(name, _)| *name == tag)
        .map_or(0.0, |(_, value)| *value)
}

fn reliability_weight(reliability: Reliability) -> f32 {
    match reliability {
        Reliability::High => 1.0,
        Reliability::Medium => 0.7,
        Reliability::Low => 0.4,
        Reliability::Unknown => UNKNOWN_RELIABILITY_TRUST,
    }
}

/// Persona-neutral trust score in [0, 1].
#[must_use]
pub fn base_trust(source: &SourceDescriptor) -> f32 {
    let score = reliability_weight(source.reliability)
        + lookup(TONE_BONUS, source.tone.as_deref())
        + lookup(BIAS_PENALTY, source.bias.as_deref());
    score.clamp(0.0, 1.0)
}

/// A source with its trust score for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSource {
    /// The source.
    pub source: SourceDescriptor,
    /// Trust in [0, 1].
    pub trust: f32,
}

/// Routes topics to source categories and ranks registry sources.
pub struct SourceRouter {
    config: RouterConfig,
    registry: Arc<dyn SourceRegistry>,
    topics: Arc<dyn TopicTree>,
    retry: RetryPolicy,
}

impl SourceRouter {
    /// Create a router.
    #[must_use]
    pub fn new(
        config: RouterConfig,
        registry: Arc<dyn SourceRegistry>,
        topics: Arc<dyn TopicTree>,
    ) -> Self {
        Self {
            config,
            registry,
            topics,
            retry: RetryPolicy::no_retry(),
        }
    }

    /// Set the retry policy for registry reads.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The registry in use.
    #[must_use]
    pub fn registry(&self) -> &Arc<dyn SourceRegistry> {
        &self.registry
    }

    /// Trust score of a source for a persona.
    ///
    /// A persona override replaces the tone bonus for the tags it lists.
    #[must_use]
    pub fn trust_score(&self, source: &SourceDescriptor, persona: &Persona) -> f32 {
        let overrides = self.config.persona_tone_bonus.get(persona.as_str());
        let tone = source.tone.as_deref().map(normalize_tag);
        let override_bonus = overrides.zip(tone.as_ref()).and_then(|(table, tone)| {
            table
                .iter()
                .find(|(tag, _)| normalize_tag(tag) == *tone)
                .map(|(_, bonus)| *bonus)
        });

        match override_bonus {
            Some(bonus) => (reliability_weight(source.reliability)
                + bonus
                + lookup(BIAS_PENALTY, source.bias.as_deref()))
            .clamp(0.0, 1.0),
            None => base_trust(source),
        }
    }

    /// Sources for a topic, falling back to the topic's source cluster.
    ///
    /// An unreachable registry yields no sources after the retries run out.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MalformedEntry`] when the registry holds a
    /// structurally invalid descriptor.
    pub async fn candidate_sources(
        &self,
        topic: &str,
    ) -> Result<Vec<SourceDescriptor>, RegistryError> {
        let sources = self.fetch(topic).await?;
        if !sources.is_empty() {
            return Ok(sources);
        }
        let cluster = self.topics.source_cluster(topic);
        if cluster == topic {
            return Ok(sources);
        }
        self.fetch(&cluster).await
    }

    async fn fetch(&self, key: &str) -> Result<Vec<SourceDescriptor>, RegistryError> {
        match self.retry.retry(|| self.registry.get_sources(key)).await {
            Ok(sources) => Ok(sources),
            Err(RegistryError::Unavailable(reason)) => {
                tracing::warn!(topic = key, %reason, "Registry unavailable, treating as no sources");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Candidate sources sorted by trust, highest first.
    ///
    /// Equal trust keeps registry order.
    ///
    /// # Errors
    ///
    /// See [`candidate_sources`](Self::candidate_sources).
    pub async fn rank_sources(
        &self,
        topic: &str,
        persona: &Persona,
    ) -> Result<Vec<RankedSource>, RegistryError> {
        let mut ranked: Vec<RankedSource> = self
            .candidate_sources(topic)
            .await?
            .into_iter()
            .map(|source| {
                let trust = self.trust_score(&source, persona);
                RankedSource { source, trust }
            })
            .collect();
        ranked.sort_by(|a, b| b.trust.total_cmp(&a.trust));
        Ok(ranked)
    }

    /// The most trusted source for a topic, if any.
    ///
    /// # Errors
    ///
    /// See [`candidate_sources`](Self::candidate_sources).
    pub async fn best_source(
        &self,
        topic: &str,
        persona: &Persona,
    ) -> Result<Option<RankedSource>, RegistryError> {
        Ok(self.rank_sources(topic, persona).await?.into_iter().next())
    }
}

impl std::fmt::Debug for SourceRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRouter")
            .field("config", &self.config)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::collaborators::registry::{InMemorySourceRegistry, RegistrySnapshot};
    use crate::collaborators::topic_tree::{InMemoryTopicTree, TopicEntry};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn router(registry: InMemorySourceRegistry) -> SourceRouter {
        SourceRouter::new(
            RouterConfig::default(),
            Arc::new(registry),
            Arc::new(InMemoryTopicTree::default()),
        )
    }

    #[test]
    fn test_viability() {
        assert!(is_viable(AssertionType::Factual, "science"));
        assert!(is_viable(AssertionType::Factual, "finance"));
        assert!(!is_viable(AssertionType::Factual, "culture"));
        assert!(!is_viable(AssertionType::Factual, "general"));
        assert!(!is_viable(AssertionType::Opinion, "science"));
    }

    #[test]
    fn test_routing_partition() {
        assert_eq!(route("history"), SourceCategory::InternalKnowledge);
        assert_eq!(route("science"), SourceCategory::InternalKnowledge);
        assert_eq!(route("health"), SourceCategory::ExternalWeb);
        assert_eq!(route("technology"), SourceCategory::ExternalWeb);
        assert_eq!(route("culture"), SourceCategory::KnowledgeBase);
        assert_eq!(route("general"), SourceCategory::KnowledgeBase);
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("Slightly-Progressive"), "slightly progressive");
        assert_eq!(normalize_tag("slightly_progressive"), "slightly progressive");
        assert_eq!(normalize_tag("  ACADEMIC "), "academic");
    }

    #[test]
    fn test_base_trust() {
        let high = SourceDescriptor::new("A", "a").with_reliability(Reliability::High);
        assert_eq!(base_trust(&high), 1.0);

        let clinical = SourceDescriptor::new("B", "b")
            .with_reliability(Reliability::Medium)
            .with_tone("Clinical");
        assert!((base_trust(&clinical) - 0.8).abs() < 1e-6);

        let biased = SourceDescriptor::new("C", "c")
            .with_reliability(Reliability::Low)
            .with_bias("conservative");
        assert!((base_trust(&biased) - 0.2).abs() < 1e-6);

        let unknown = SourceDescriptor::new("D", "d")
            .with_tone("sarcastic")
            .with_bias("Slightly-Progressive");
        assert!((base_trust(&unknown) - 0.4).abs() < 1e-6);

        let capped = SourceDescriptor::new("E", "e")
            .with_reliability(Reliability::High)
            .with_tone("academic");
        assert_eq!(base_trust(&capped), 1.0);
    }

    #[test]
    fn test_persona_tone_override() {
        let mut playful = HashMap::new();
        playful.insert("Playful".to_string(), 0.2);
        let mut table = HashMap::new();
        table.insert("playful".to_string(), playful);
        let router = SourceRouter::new(
            RouterConfig {
                persona_tone_bonus: table,
            },
            Arc::new(InMemorySourceRegistry::new()),
            Arc::new(InMemoryTopicTree::default()),
        );

        let source = SourceDescriptor::new("Jokes", "j")
            .with_reliability(Reliability::Medium)
            .with_tone("playful");
        assert!((router.trust_score(&source, &Persona::Playful) - 0.9).abs() < 1e-6);
        assert!((router.trust_score(&source, &Persona::Default) - 0.75).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_rank_sources_stable() {
        let registry = InMemorySourceRegistry::new()
            .with_source(
                "science",
                SourceDescriptor::new("Blog", "b").with_reliability(Reliability::Low),
            )
            .unwrap()
            .with_source(
                "science",
                SourceDescriptor::new("Nature", "n").with_reliability(Reliability::High),
            )
            .unwrap()
            .with_source(
                "science",
                SourceDescriptor::new("Science", "s").with_reliability(Reliability::High),
            )
            .unwrap();
        let ranked = router(registry)
            .rank_sources("science", &Persona::Default)
            .await
            .unwrap();
        let names: Vec<&str> = ranked.iter().map(|r| r.source.name.as_str()).collect();
        assert_eq!(names, vec!["Nature", "Science", "Blog"]);
    }

    #[tokio::test]
    async fn test_cluster_fallback() {
        let registry = InMemorySourceRegistry::new()
            .with_source("peer_reviewed", SourceDescriptor::new("Nature", "n"))
            .unwrap();
        let best = router(registry)
            .best_source("science", &Persona::Default)
            .await
            .unwrap();
        assert_eq!(best.unwrap().source.name, "Nature");
    }

    #[tokio::test]
    async fn test_no_sources() {
        let best = router(InMemorySourceRegistry::new())
            .best_source("science", &Persona::Default)
            .await
            .unwrap();
        assert!(best.is_none());
    }

    #[tokio::test]
    async fn test_malformed_entry_surfaces() {
        let mut snapshot = RegistrySnapshot::new();
        snapshot.insert("science".to_string(), vec![SourceDescriptor::new("", "x")]);
        let err = router(InMemorySourceRegistry::from_snapshot(snapshot))
            .rank_sources("science", &Persona::Default)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::MalformedEntry { .. }));
    }

    struct DownRegistry {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SourceRegistry for DownRegistry {
        async fn get_sources(&self, _topic: &str) -> Result<Vec<SourceDescriptor>, RegistryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(RegistryError::Unavailable("connection refused".into()))
        }
        async fn add(&self, _: &str, _: SourceDescriptor) -> Result<(), RegistryError> {
            Err(RegistryError::Unavailable("down".into()))
        }
        async fn update(
            &self,
            _: &str,
            _: &str,
            _: &crate::types::SourceUpdate,
        ) -> Result<bool, RegistryError> {
            Err(RegistryError::Unavailable("down".into()))
        }
        async fn remove(&self, _: &str, _: &str) -> Result<bool, RegistryError> {
            Err(RegistryError::Unavailable("down".into()))
        }
        async fn snapshot(&self) -> Result<RegistrySnapshot, RegistryError> {
            Err(RegistryError::Unavailable("down".into()))
        }
        async fn merge(
            &self,
            _: RegistrySnapshot,
        ) -> Result<crate::collaborators::registry::MergeReport, RegistryError> {
            Err(RegistryError::Unavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn test_unavailable_registry_degrades_to_no_sources() {
        let registry = Arc::new(DownRegistry {
            calls: AtomicUsize::new(0),
        });
        let tree = InMemoryTopicTree::empty();
        tree.add_topic(TopicEntry::new("science", ["gravity"]).with_cluster("science"));
        let router = SourceRouter::new(RouterConfig::default(), registry.clone(), Arc::new(tree))
            .with_retry_policy(RetryPolicy::new(
                crate::config::RetryConfig::new()
                    .with_max_retries(2)
                    .with_initial_delay_ms(1)
                    .with_max_delay_ms(1),
            ));

        let ranked = router.rank_sources("science", &Persona::Default).await.unwrap();
        assert!(ranked.is_empty());
        assert_eq!(registry.calls.load(Ordering::SeqCst), 3);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn reliability() -> impl Strategy<Value = Reliability> {
            prop_oneof![
                Just(Reliability::High),
                Just(Reliability::Medium),
                Just(Reliability::Low),
                Just(Reliability::Unknown),
            ]
        }

        proptest! {
            /// Trust stays within [0, 1] for any tag combination.
            #[test]
            fn trust_is_bounded(
                reliability in reliability(),
                tone in "[A-Za-z_ -]{0,16}",
                bias in "[A-Za-z_ -]{0,24}",
            ) {
                let source = SourceDescriptor::new("S", "s")
                    .with_reliability(reliability)
                    .with_tone(tone)
                    .with_bias(bias);
                let trust = base_trust(&source);
                prop_assert!((0.0..=1.0).contains(&trust));
            }
        }
    }
}

//! Core data structures for `factcheck`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Name of the synthetic topic used when no configured topic matches.
pub const GENERAL_TOPIC: &str = "general";

/// Score assigned to the synthetic [`GENERAL_TOPIC`].
pub const GENERAL_TOPIC_SCORE: f32 = 0.1;

/// Round a score to a fixed number of decimal places.
#[must_use]
pub fn round_to(value: f32, decimals: i32) -> f32 {
    let factor = 10f32.powi(decimals);
    (value * factor).round() / factor
}

/// The editorial voice used when phrasing verdicts.
///
/// Unknown persona names are preserved as [`Persona::Custom`] and rendered
/// with the catch-all template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Persona {
    /// Plain voice with status markers.
    #[default]
    Default,
    /// Formal, evidence-oriented voice.
    Clinical,
    /// Light-hearted voice.
    Playful,
    /// Any other persona name.
    Custom(String),
}

impl Persona {
    /// Get the persona name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Default => "default",
            Self::Clinical => "clinical",
            Self::Playful => "playful",
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for Persona {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "default" => Self::Default,
            "clinical" => Self::Clinical,
            "playful" => Self::Playful,
            _ => Self::Custom(s.trim().to_string()),
        }
    }
}

impl From<String> for Persona {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Persona> for String {
    fn from(p: Persona) -> Self {
        p.as_str().to_string()
    }
}

impl FromStr for Persona {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An atomic claim extracted from input text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assertion {
    /// The claim text, trimmed.
    pub text: String,
    /// Index of the sentence the claim came from.
    pub sentence_index: usize,
    /// Extraction order within the sentence.
    pub position: usize,
}

impl Assertion {
    /// Create a new assertion.
    #[must_use]
    pub fn new(text: impl Into<String>, sentence_index: usize, position: usize) -> Self {
        Self {
            text: text.into(),
            sentence_index,
            position,
        }
    }
}

/// Rhetorical type of an assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssertionType {
    /// A checkable statement of fact.
    Factual,
    /// A hedged or hypothetical statement.
    Speculative,
    /// A statement of belief or preference.
    Opinion,
    /// A question.
    Question,
}

impl AssertionType {
    /// Get the type name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Factual => "factual",
            Self::Speculative => "speculative",
            Self::Opinion => "opinion",
            Self::Question => "question",
        }
    }
}

impl fmt::Display for AssertionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-type scores produced by rhetorical classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypeScores {
    /// Factual score.
    pub factual: f32,
    /// Speculative score.
    pub speculative: f32,
    /// Opinion score.
    pub opinion: f32,
    /// Question score.
    pub question: f32,
}

impl TypeScores {
    /// Score for a given type.
    #[must_use]
    pub fn get(&self, kind: AssertionType) -> f32 {
        match kind {
            AssertionType::Factual => self.factual,
            AssertionType::Speculative => self.speculative,
            AssertionType::Opinion => self.opinion,
            AssertionType::Question => self.question,
        }
    }
}

/// Result of rhetorical type classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypeClassification {
    /// The winning type.
    pub kind: AssertionType,
    /// Scores for every type.
    pub scores: TypeScores,
}

/// Relevance of one topic to an assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicScore {
    /// Topic name.
    pub topic: String,
    /// Relevance in [0, 1].
    pub score: f32,
}

impl TopicScore {
    /// Create a topic score, clamped to [0, 1].
    #[must_use]
    pub fn new(topic: impl Into<String>, score: f32) -> Self {
        Self {
            topic: topic.into(),
            score: score.clamp(0.0, 1.0),
        }
    }
}

/// Topic relevance map for an assertion.
///
/// Never empty and never negative: an empty input collapses to the
/// [`GENERAL_TOPIC`] at [`GENERAL_TOPIC_SCORE`]. Entries are kept in
/// descending score order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<TopicScore>", into = "Vec<TopicScore>")]
pub struct TopicScores(Vec<TopicScore>);

impl TopicScores {
    /// Build a topic map from raw scores.
    #[must_use]
    pub fn from_scores(mut scores: Vec<TopicScore>) -> Self {
        for s in &mut scores {
            s.score = s.score.clamp(0.0, 1.0);
        }
        if scores.is_empty() {
            return Self::general();
        }
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        Self(scores)
    }

    /// The fallback map with a single low-confidence general topic.
    #[must_use]
    pub fn general() -> Self {
        Self(vec![TopicScore::new(GENERAL_TOPIC, GENERAL_TOPIC_SCORE)])
    }

    /// The highest-scoring topic.
    #[must_use]
    pub fn primary(&self) -> &TopicScore {
        &self.0[0]
    }

    /// Score for a topic, if present.
    #[must_use]
    pub fn get(&self, topic: &str) -> Option<f32> {
        self.0.iter().find(|s| s.topic == topic).map(|s| s.score)
    }

    /// Iterate over entries in descending score order.
    pub fn iter(&self) -> impl Iterator<Item = &TopicScore> {
        self.0.iter()
    }

    /// Number of topics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when only the synthetic general topic is present.
    #[must_use]
    pub fn is_general(&self) -> bool {
        self.0.len() == 1 && self.0[0].topic == GENERAL_TOPIC
    }
}

impl From<Vec<TopicScore>> for TopicScores {
    fn from(scores: Vec<TopicScore>) -> Self {
        Self::from_scores(scores)
    }
}

impl From<TopicScores> for Vec<TopicScore> {
    fn from(scores: TopicScores) -> Self {
        scores.0
    }
}

/// An assertion together with its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedAssertion {
    /// The assertion.
    pub assertion: Assertion,
    /// Rhetorical classification.
    pub classification: TypeClassification,
    /// Topic relevance.
    pub topics: TopicScores,
}

impl ClassifiedAssertion {
    /// The assertion's primary topic name.
    #[must_use]
    pub fn primary_topic(&self) -> &str {
        &self.topics.primary().topic
    }

    /// The assertion's rhetorical type.
    #[must_use]
    pub fn kind(&self) -> AssertionType {
        self.classification.kind
    }
}

/// Kind of evidence store a topic is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    /// Knowledge held by the system itself.
    InternalKnowledge,
    /// Live web sources.
    ExternalWeb,
    /// A curated knowledge base.
    KnowledgeBase,
}

impl SourceCategory {
    /// Get the category name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InternalKnowledge => "internal_knowledge",
            Self::ExternalWeb => "external_web",
            Self::KnowledgeBase => "knowledge_base",
        }
    }
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reliability tier of a source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reliability {
    /// Highly reliable.
    High,
    /// Moderately reliable.
    Medium,
    /// Low reliability.
    Low,
    /// Not rated.
    #[default]
    #[serde(other)]
    Unknown,
}

/// A registered evidentiary source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Unique name within its topic.
    pub name: String,
    /// URL or reference text.
    #[serde(default)]
    pub reference: String,
    /// Reliability tier.
    #[serde(default)]
    pub reliability: Reliability,
    /// Bias tag, e.g. "neutral" or "conservative".
    #[serde(default)]
    pub bias: Option<String>,
    /// Tone tag, e.g. "academic" or "playful".
    #[serde(default)]
    pub tone: Option<String>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl SourceDescriptor {
    /// Create a new source descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reference: reference.into(),
            reliability: Reliability::Unknown,
            bias: None,
            tone: None,
            notes: None,
        }
    }

    /// Set the reliability tier.
    #[must_use]
    pub fn with_reliability(mut self, reliability: Reliability) -> Self {
        self.reliability = reliability;
        self
    }

    /// Set the bias tag.
    #[must_use]
    pub fn with_bias(mut self, bias: impl Into<String>) -> Self {
        self.bias = Some(bias.into());
        self
    }

    /// Set the tone tag.
    #[must_use]
    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = Some(tone.into());
        self
    }

    /// Set the notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Text compared against assertions: the reference, or the notes when
    /// the reference is blank.
    #[must_use]
    pub fn reference_text(&self) -> &str {
        if self.reference.trim().is_empty() {
            self.notes.as_deref().unwrap_or("")
        } else {
            &self.reference
        }
    }
}

/// Partial update applied to a registered source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceUpdate {
    /// New reference.
    pub reference: Option<String>,
    /// New reliability tier.
    pub reliability: Option<Reliability>,
    /// New bias tag.
    pub bias: Option<String>,
    /// New tone tag.
    pub tone: Option<String>,
    /// New notes.
    pub notes: Option<String>,
}

impl SourceUpdate {
    /// Apply this update to a descriptor in place.
    pub fn apply(&self, source: &mut SourceDescriptor) {
        if let Some(reference) = &self.reference {
            source.reference.clone_from(reference);
        }
        if let Some(reliability) = self.reliability {
            source.reliability = reliability;
        }
        if let Some(bias) = &self.bias {
            source.bias = Some(bias.clone());
        }
        if let Some(tone) = &self.tone {
            source.tone = Some(tone.clone());
        }
        if let Some(notes) = &self.notes {
            source.notes = Some(notes.clone());
        }
    }
}

/// Truth verdict for an assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Supported by the source.
    True,
    /// Contradicted by, or unsupported by a trusted, source.
    False,
    /// Inconclusive.
    Uncertain,
}

/// Outcome of verifying one assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// The assertion text that was verified.
    pub assertion: String,
    /// The verdict.
    pub verdict: Verdict,
    /// Confidence in [0, 1], three decimals.
    pub confidence: f32,
    /// Source category used.
    pub source_category: SourceCategory,
    /// Name of the source consulted, if any.
    pub source_name: Option<String>,
    /// Similarity between the assertion and the source reference.
    pub similarity: Option<f32>,
    /// Trust score of the source.
    pub trust: Option<f32>,
}

impl VerificationResult {
    /// The result used when no candidate source exists.
    #[must_use]
    pub fn no_source(assertion: impl Into<String>, source_category: SourceCategory) -> Self {
        Self {
            assertion: assertion.into(),
            verdict: Verdict::Uncertain,
            confidence: 0.0,
            source_category,
            source_name: None,
            similarity: None,
            trust: None,
        }
    }
}

/// Phrasing style derived from a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhrasingStyle {
    /// The assertion holds.
    Confirmation,
    /// The assertion does not hold.
    Refutation,
    /// The assertion could not be settled.
    Hedge,
}

impl From<Verdict> for PhrasingStyle {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::True => Self::Confirmation,
            Verdict::False => Self::Refutation,
            Verdict::Uncertain => Self::Hedge,
        }
    }
}

/// Persona-styled rendering of a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phrasing {
    /// Rendered text.
    pub text: String,
    /// Style tag.
    pub style: PhrasingStyle,
    /// Persona used.
    pub persona: Persona,
    /// Confidence interpolated into the text.
    pub confidence: f32,
}

/// Status of a record in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Verdict was true.
    Confirmed,
    /// Verdict was false.
    Refuted,
    /// Verdict was uncertain or the assertion was not checkable.
    Uncertain,
}

impl From<Verdict> for RecordStatus {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::True => Self::Confirmed,
            Verdict::False => Self::Refuted,
            Verdict::Uncertain => Self::Uncertain,
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Confirmed => "confirmed",
            Self::Refuted => "refuted",
            Self::Uncertain => "uncertain",
        })
    }
}

/// Per-assertion entry of a batch result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    /// Sentence the assertion came from.
    pub sentence_index: usize,
    /// Assertion text.
    pub assertion: String,
    /// Rhetorical type.
    pub assertion_type: AssertionType,
    /// Primary topic.
    pub topic: String,
    /// Whether the topic is flagged as sensitive.
    pub sensitive: bool,
    /// Status.
    pub status: RecordStatus,
    /// Confidence in [0, 1], two decimals.
    pub confidence: f32,
    /// Source category used; `None` when verification was skipped.
    pub source: Option<SourceCategory>,
    /// Name of the consulted source, if any.
    pub source_name: Option<String>,
    /// Rendered verdict.
    pub phrasing: Phrasing,
}

/// Record counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Confirmed records.
    pub confirmed: usize,
    /// Refuted records.
    pub refuted: usize,
    /// Uncertain records.
    pub uncertain: usize,
}

impl StatusCounts {
    /// Count statuses over a record set.
    #[must_use]
    pub fn tally(records: &[BatchRecord]) -> Self {
        let mut counts = Self::default();
        for record in records {
            match record.status {
                RecordStatus::Confirmed => counts.confirmed += 1,
                RecordStatus::Refuted => counts.refuted += 1,
                RecordStatus::Uncertain => counts.uncertain += 1,
            }
        }
        counts
    }

    /// Total number of records.
    #[must_use]
    pub fn total(&self) -> usize {
        self.confirmed + self.refuted + self.uncertain
    }
}

/// Cross-assertion consistency metrics for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    /// Mean pairwise semantic distance between assertions.
    pub drift: f32,
    /// Whether the confidence spread is below the consistency bound.
    pub confidence_consistent: bool,
    /// Whether every record shares one status.
    pub verdict_harmony: bool,
}

/// Aggregate view of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Counts per status.
    pub counts: StatusCounts,
    /// Human-readable description of the batch outcome.
    pub description: String,
    /// Consistency metrics.
    pub consistency: ConsistencyReport,
}

/// Flat per-assertion view used for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummaryEntry {
    /// Assertion text.
    pub assertion: String,
    /// Status.
    pub status: RecordStatus,
    /// Confidence.
    pub certainty: f32,
    /// Main source category, if any.
    pub main_source: Option<SourceCategory>,
}

/// Result of processing one input text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// Unique batch identifier.
    pub id: Uuid,
    /// When the batch was produced.
    pub created_at: DateTime<Utc>,
    /// Persona used for phrasing.
    pub persona: Persona,
    /// Records in sentence order, then extraction order.
    pub records: Vec<BatchRecord>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Processing time in milliseconds.
    pub duration_ms: u64,
}

impl BatchResult {
    /// Flatten the records into summary entries.
    #[must_use]
    pub fn summarize(&self) -> Vec<ResultSummaryEntry> {
        self.records
            .iter()
            .map(|r| ResultSummaryEntry {
                assertion: r.assertion.clone(),
                status: r.status,
                certainty: r.confidence,
                main_source: r.source,
            })
            .collect()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Emotional tone of a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    /// Tone label, e.g. "neutral" or "angry".
    pub label: String,
    /// Intensity in [0, 1].
    pub intensity: f32,
}

impl Tone {
    /// The neutral default.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            label: "neutral".to_string(),
            intensity: 0.0,
        }
    }
}

impl Default for Tone {
    fn default() -> Self {
        Self::neutral()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.12345, 2), 0.12);
        assert_eq!(round_to(0.8765, 3), 0.877);
        assert_eq!(round_to(0.0, 2), 0.0);
    }

    #[test]
    fn test_persona_parsing() {
        assert_eq!(Persona::from("default"), Persona::Default);
        assert_eq!(Persona::from("Clinical"), Persona::Clinical);
        assert_eq!(Persona::from(" playful "), Persona::Playful);
        assert_eq!(
            Persona::from("pirate"),
            Persona::Custom("pirate".to_string())
        );
        assert_eq!(Persona::from("pirate").as_str(), "pirate");
    }

    #[test]
    fn test_persona_serde_as_string() {
        let json = serde_json::to_string(&Persona::Clinical).unwrap();
        assert_eq!(json, "\"clinical\"");
        let parsed: Persona = serde_json::from_str("\"noir\"").unwrap();
        assert_eq!(parsed, Persona::Custom("noir".to_string()));
    }

    #[test]
    fn test_topic_scores_never_empty() {
        let scores = TopicScores::from_scores(Vec::new());
        assert_eq!(scores.len(), 1);
        assert!(scores.is_general());
        assert_eq!(scores.primary().score, GENERAL_TOPIC_SCORE);
    }

    #[test]
    fn test_topic_scores_sorted_and_clamped() {
        let scores = TopicScores::from_scores(vec![
            TopicScore::new("history", 0.2),
            TopicScore {
                topic: "science".to_string(),
                score: 1.4,
            },
            TopicScore {
                topic: "culture".to_string(),
                score: -0.3,
            },
        ]);
        assert_eq!(scores.primary().topic, "science");
        assert_eq!(scores.get("science"), Some(1.0));
        assert_eq!(scores.get("culture"), Some(0.0));
        assert!(scores.iter().all(|s| s.score >= 0.0));
    }

    #[test]
    fn test_topic_scores_deserialize_empty_falls_back() {
        let scores: TopicScores = serde_json::from_str("[]").unwrap();
        assert!(scores.is_general());
    }

    #[test]
    fn test_reliability_unknown_tier() {
        let r: Reliability = serde_json::from_str("\"excellent\"").unwrap();
        assert_eq!(r, Reliability::Unknown);
        let r: Reliability = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(r, Reliability::High);
    }

    #[test]
    fn test_reference_text_falls_back_to_notes() {
        let source = SourceDescriptor::new("Almanac", "  ").with_notes("Water boils at 100C");
        assert_eq!(source.reference_text(), "Water boils at 100C");

        let source = SourceDescriptor::new("Almanac", "https://example.org");
        assert_eq!(source.reference_text(), "https://example.org");
    }

    #[test]
    fn test_source_update_apply() {
        let mut source = SourceDescriptor::new("Wire", "https://wire.example");
        SourceUpdate {
            reliability: Some(Reliability::High),
            tone: Some("clinical".to_string()),
            ..Default::default()
        }
        .apply(&mut source);
        assert_eq!(source.reliability, Reliability::High);
        assert_eq!(source.tone.as_deref(), Some("clinical"));
        assert_eq!(source.reference, "https://wire.example");
    }

    #[test]
    fn test_verdict_mappings() {
        assert_eq!(RecordStatus::from(Verdict::True), RecordStatus::Confirmed);
        assert_eq!(RecordStatus::from(Verdict::False), RecordStatus::Refuted);
        assert_eq!(
            PhrasingStyle::from(Verdict::Uncertain),
            PhrasingStyle::Hedge
        );
        assert_eq!(serde_json::to_string(&Verdict::True).unwrap(), "\"true\"");
    }
}

//! Logic checks: fallacies, contradictions with known facts and rhetorical
//! misdirection.

use serde::{Deserialize, Serialize};

use crate::text::{contains_phrase, phrase_positions, tokenize};

/// A trigger phrase and the finding it produces.
#[derive(Debug, Clone, Copy)]
pub struct PhraseRule {
    /// Phrase that triggers the rule, matched on whole words.
    pub trigger: &'static str,
    /// Finding name.
    pub name: &'static str,
    /// Why the phrase is a problem.
    pub explanation: &'static str,
    /// Weight of the finding in [0, 1].
    pub weight: f32,
}

/// Fallacy rules.
pub const FALLACY_RULES: &[PhraseRule] = &[
    PhraseRule {
        trigger: "everyone knows",
        name: "Appeal to Popularity",
        explanation: "Claim relies on consensus rather than evidence.",
        weight: 0.6,
    },
    PhraseRule {
        trigger: "if we don't act now",
        name: "False Dilemma",
        explanation: "Presents only two options when more exist.",
        weight: 0.7,
    },
];

/// Rhetorical misdirection rules.
pub const MISDIRECTION_RULES: &[PhraseRule] = &[
    PhraseRule {
        trigger: "clearly",
        name: "Loaded Language",
        explanation: "Implies certainty without justification.",
        weight: 0.5,
    },
    PhraseRule {
        trigger: "some say",
        name: "Vague Attribution",
        explanation: "Avoids source responsibility.",
        weight: 0.4,
    },
];

/// Severity of a contradiction with a known fact.
pub const CONTRADICTION_SEVERITY: f32 = 0.8;

const NEGATION: &str = "not";
const COPULAS: &[&str] = &["is", "are", "was", "were"];

/// A detected logical fallacy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fallacy {
    /// Fallacy name.
    pub name: String,
    /// Explanation.
    pub explanation: String,
    /// Weight in [0, 1].
    pub weight: f32,
}

/// A known fact the text negates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contradiction {
    /// The contradicted fact.
    pub fact: String,
    /// Explanation.
    pub explanation: String,
    /// Severity in [0, 1].
    pub severity: f32,
}

/// A rhetorical device that obscures the argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhetoricalTag {
    /// Device name.
    pub name: String,
    /// Explanation.
    pub explanation: String,
    /// How much the device undermines the argument, in [0, 1].
    pub sabotage_score: f32,
}

/// Findings of a logic evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogicReport {
    /// Detected fallacies.
    pub fallacies: Vec<Fallacy>,
    /// Contradicted facts.
    pub contradictions: Vec<Contradiction>,
    /// Rhetorical devices.
    pub rhetorical_tags: Vec<RhetoricalTag>,
}

impl LogicReport {
    /// True when nothing was flagged.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.fallacies.is_empty() && self.contradictions.is_empty() && self.rhetorical_tags.is_empty()
    }
}

fn matching_rules<'a>(
    tokens: &'a [String],
    rules: &'a [PhraseRule],
) -> impl Iterator<Item = &'a PhraseRule> + 'a {
    rules.iter().filter(move |rule| contains_phrase(tokens, rule.trigger))
}

/// Detect fallacies in a text.
#[must_use]
pub fn detect_fallacies(text: &str) -> Vec<Fallacy> {
    let tokens = tokenize(text);
    matching_rules(&tokens, FALLACY_RULES)
        .map(|rule| Fallacy {
            name: rule.name.to_string(),
            explanation: rule.explanation.to_string(),
            weight: rule.weight,
        })
        .collect()
}

/// Flag rhetorical misdirection in a text.
#[must_use]
pub fn tag_rhetorical_misdirection(text: &str) -> Vec<RhetoricalTag> {
    let tokens = tokenize(text);
    matching_rules(&tokens, MISDIRECTION_RULES)
        .map(|rule| RhetoricalTag {
            name: rule.name.to_string(),
            explanation: rule.explanation.to_string(),
            sabotage_score: rule.weight,
        })
        .collect()
}

/// Negated forms of a fact: "not <fact>", plus "<subject> <copula> not
/// <rest>" when the fact has a copula.
fn negated_forms(fact_tokens: &[String]) -> Vec<String> {
    let mut forms = vec![format!("{NEGATION} {}", fact_tokens.join(" "))];
    if let Some(at) = fact_tokens
        .iter()
        .position(|t| COPULAS.contains(&t.as_str()))
    {
        let mut negated = fact_tokens.to_vec();
        negated.insert(at + 1, NEGATION.to_string());
        forms.push(negated.join(" "));
    }
    forms
}

fn contradicts(tokens: &[String], fact: &str) -> bool {
    let fact_tokens = tokenize(fact);
    if fact_tokens.is_empty() {
        return false;
    }
    let affirmed = phrase_positions(tokens, fact)
        .into_iter()
        .any(|i| i == 0 || tokens[i - 1] != NEGATION);
    if affirmed {
        return false;
    }
    negated_forms(&fact_tokens)
        .iter()
        .any(|form| contains_phrase(tokens, form))
}

/// Known facts the text negates without also affirming them.
#[must_use]
pub fn detect_contradictions<S: AsRef<str>>(text: &str, known_facts: &[S]) -> Vec<Contradiction> {
    let tokens = tokenize(text);
    known_facts
        .iter()
        .map(AsRef::as_ref)
        .filter(|fact| contradicts(&tokens, fact))
        .map(|fact| Contradiction {
            fact: fact.to_string(),
            explanation: "Contradicts known fact.".to_string(),
            severity: CONTRADICTION_SEVERITY,
        })
        .collect()
}

/// Run every logic check over a text.
#[must_use]
pub fn evaluate_logic<S: AsRef<str>>(text: &str, known_facts: &[S]) -> LogicReport {
    let report = LogicReport {
        fallacies: detect_fallacies(text),
        contradictions: detect_contradictions(text, known_facts),
        rhetorical_tags: tag_rhetorical_misdirection(text),
    };
    tracing::debug!(
        fallacies = report.fallacies.len(),
        contradictions = report.contradictions.len(),
        rhetorical_tags = report.rhetorical_tags.len(),
        "Logic evaluated"
    );
    report
}

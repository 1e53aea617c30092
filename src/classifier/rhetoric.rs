//! Rhetorical type classification: factual, speculative, opinion or question.

use crate::text::{phrase_occurrences, tokenize};
use crate::types::{AssertionType, TypeClassification, TypeScores, round_to};

/// Score every statement starts from before marker bumps.
pub const FACTUAL_BASELINE: f32 = 0.85;

/// Markers of hedged or hypothetical statements.
pub const SPECULATIVE_MARKERS: &[&str] =
    &["might", "could", "possibly", "maybe", "i think", "it seems"];

/// Markers of belief or preference.
pub const OPINION_MARKERS: &[&str] = &["i believe", "in my opinion", "i feel", "should", "ought"];

/// Interrogative words.
pub const INTERROGATIVES: &[&str] = &["who", "what", "why", "how", "when", "where"];

const MARKER_BUMP: f32 = 0.2;
const MARKER_FACTUAL_PENALTY: f32 = 0.1;
const QUESTION_BUMP: f32 = 0.5;
const QUESTION_FACTUAL_PENALTY: f32 = 0.2;

/// Types in tie-break order.
const PRIORITY: [AssertionType; 4] = [
    AssertionType::Question,
    AssertionType::Opinion,
    AssertionType::Speculative,
    AssertionType::Factual,
];

/// Classify the rhetorical type of an assertion.
///
/// Every occurrence of a speculative or opinion marker shifts 0.2 onto its
/// type and takes 0.1 off factual. Each interrogative adds 0.5 to question
/// and takes 0.2 off factual when the text opens with that word or ends
/// with "?", so a trailing question mark counts once per interrogative.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn classify_type(text: &str) -> TypeClassification {
    let tokens = tokenize(text);
    let mut factual = FACTUAL_BASELINE;
    let mut speculative = 0.0_f32;
    let mut opinion = 0.0_f32;
    let mut question = 0.0_f32;

    for marker in SPECULATIVE_MARKERS {
        let hits = phrase_occurrences(&tokens, marker) as f32;
        speculative += MARKER_BUMP * hits;
        factual -= MARKER_FACTUAL_PENALTY * hits;
    }
    for marker in OPINION_MARKERS {
        let hits = phrase_occurrences(&tokens, marker) as f32;
        opinion += MARKER_BUMP * hits;
        factual -= MARKER_FACTUAL_PENALTY * hits;
    }

    let ends_with_question = text.trim_end().ends_with('?');
    let first = tokens.first().map(String::as_str);
    for word in INTERROGATIVES {
        if ends_with_question || first == Some(*word) {
            question += QUESTION_BUMP;
            factual -= QUESTION_FACTUAL_PENALTY;
        }
    }

    let finish = |score: f32| round_to(score.max(0.0), 2);
    let scores = TypeScores {
        factual: finish(factual),
        speculative: finish(speculative),
        opinion: finish(opinion),
        question: finish(question),
    };

    let mut kind = PRIORITY[0];
    for candidate in PRIORITY {
        if scores.get(candidate) > scores.get(kind) {
            kind = candidate;
        }
    }

    TypeClassification { kind, scores }
}

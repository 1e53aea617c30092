//! Persona-styled rendering of verdicts.
//!
//! Rendering is a pure function of its inputs and never fails: personas
//! without a dedicated voice fall back to a neutral "likely" template.

use crate::types::{Persona, Phrasing, PhrasingStyle, Verdict};

/// Truth score at or above which a claim is phrased as confirmed.
pub const CONFIRM_SCORE: f32 = 0.85;

/// Truth score at or below which a claim is phrased as refuted.
pub const REFUTE_SCORE: f32 = 0.15;

/// Render the phrasing text for a style and persona.
#[must_use]
pub fn render(style: PhrasingStyle, persona: &Persona, assertion: &str, confidence: f32) -> String {
    let c = format_confidence(confidence);
    let a = assertion;
    match (style, persona) {
        (PhrasingStyle::Confirmation, Persona::Default) => {
            format!("✅ Confirmed: \"{a}\" appears accurate (confidence: {c}).")
        }
        (PhrasingStyle::Confirmation, Persona::Clinical) => format!(
            "Confirmed: The statement \"{a}\" is supported by reliable sources (confidence: {c})."
        ),
        (PhrasingStyle::Confirmation, Persona::Playful) => format!(
            "Yep, that checks out! \"{a}\" is true-ish and backed up (confidence: {c})."
        ),
        (PhrasingStyle::Confirmation, Persona::Custom(_)) => {
            format!("Confirmed: \"{a}\" is likely true (confidence: {c}).")
        }
        (PhrasingStyle::Refutation, Persona::Default) => {
            format!("❌ Refuted: \"{a}\" appears false or misleading (confidence: {c}).")
        }
        (PhrasingStyle::Refutation, Persona::Clinical) => format!(
            "Refuted: The statement \"{a}\" does not align with verified sources (confidence: {c})."
        ),
        (PhrasingStyle::Refutation, Persona::Playful) => format!(
            "That makes about as much sense as a cross-eyed cyclops. \"{a}\" doesn\u{2019}t hold up (confidence: {c})."
        ),
        (PhrasingStyle::Refutation, Persona::Custom(_)) => {
            format!("Refuted: \"{a}\" is likely inaccurate (confidence: {c}).")
        }
        (PhrasingStyle::Hedge, Persona::Default) => format!(
            "⚠️ Uncertain: \"{a}\" could not be verified reliably (confidence: {c})."
        ),
        (PhrasingStyle::Hedge, Persona::Clinical) => format!(
            "Uncertain: The statement \"{a}\" lacks sufficient evidence for verification (confidence: {c})."
        ),
        (PhrasingStyle::Hedge, Persona::Playful) => format!(
            "Could be true, could be Tuesday. \"{a}\" is floating in the maybe zone (confidence: {c})."
        ),
        (PhrasingStyle::Hedge, Persona::Custom(_)) => {
            format!("Uncertain: \"{a}\" remains unverified (confidence: {c}).")
        }
    }
}

// Debug keeps a trailing ".0" on whole numbers, so 0 renders as "0.0".
fn format_confidence(confidence: f32) -> String {
    format!("{confidence:?}")
}

fn build(style: PhrasingStyle, assertion: &str, confidence: f32, persona: &Persona) -> Phrasing {
    Phrasing {
        text: render(style, persona, assertion, confidence),
        style,
        persona: persona.clone(),
        confidence,
    }
}

/// Phrase a verdict for an assertion.
#[must_use]
pub fn phrase(assertion: &str, confidence: f32, persona: &Persona, verdict: Verdict) -> Phrasing {
    build(PhrasingStyle::from(verdict), assertion, confidence, persona)
}

/// Phrase an assertion from a continuous truth score.
///
/// Scores of at least [`CONFIRM_SCORE`] confirm, scores of at most
/// [`REFUTE_SCORE`] refute, anything between hedges. The phrasing carries
/// `certainty` as its confidence.
#[must_use]
pub fn phrase_by_score(
    assertion: &str,
    truth_score: f32,
    certainty: f32,
    persona: &Persona,
) -> Phrasing {
    let style = if truth_score >= CONFIRM_SCORE {
        PhrasingStyle::Confirmation
    } else if truth_score <= REFUTE_SCORE {
        PhrasingStyle::Refutation
    } else {
        PhrasingStyle::Hedge
    };
    build(style, assertion, certainty, persona)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_default_confirmation() {
        let p = phrase("Water boils at 100C", 0.92, &Persona::Default, Verdict::True);
        assert_eq!(p.style, PhrasingStyle::Confirmation);
        assert_eq!(
            p.text,
            "✅ Confirmed: \"Water boils at 100C\" appears accurate (confidence: 0.92)."
        );
    }

    #[test]
    fn test_clinical_refutation() {
        let p = phrase("The earth is flat", 0.3, &Persona::Clinical, Verdict::False);
        assert_eq!(p.style, PhrasingStyle::Refutation);
        assert!(p.text.starts_with("Refuted: The statement \"The earth is flat\""));
    }

    #[test]
    fn test_playful_hedge() {
        let p = phrase("Cats rule", 0.0, &Persona::Playful, Verdict::Uncertain);
        assert_eq!(
            p.text,
            "Could be true, could be Tuesday. \"Cats rule\" is floating in the maybe zone (confidence: 0.0)."
        );
    }

    #[test]
    fn test_unknown_persona_uses_catch_all() {
        let pirate = Persona::from("pirate");
        let p = phrase("Rum is tasty", 0.5, &pirate, Verdict::Uncertain);
        assert_eq!(p.text, "Uncertain: \"Rum is tasty\" remains unverified (confidence: 0.5).");
        assert_eq!(p.persona, pirate);

        let p = phrase("Rum is tasty", 0.5, &pirate, Verdict::True);
        assert!(p.text.contains("is likely true"));
        let p = phrase("Rum is tasty", 0.5, &pirate, Verdict::False);
        assert!(p.text.contains("is likely inaccurate"));
    }

    #[test]
    fn test_phrase_by_score_thresholds() {
        let p = phrase_by_score("water boils at 100C", 0.9, 0.8, &Persona::Default);
        assert_eq!(p.style, PhrasingStyle::Confirmation);
        assert_eq!(p.confidence, 0.8);
        assert!(p.text.contains("(confidence: 0.8)"));

        assert_eq!(
            phrase_by_score("x", 0.85, 0.5, &Persona::Default).style,
            PhrasingStyle::Confirmation
        );
        assert_eq!(
            phrase_by_score("x", 0.15, 0.5, &Persona::Default).style,
            PhrasingStyle::Refutation
        );
        assert_eq!(
            phrase_by_score("x", 0.5, 0.5, &Persona::Default).style,
            PhrasingStyle::Hedge
        );
    }
}

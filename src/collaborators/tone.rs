//! Tone and confidence estimation.

use async_trait::async_trait;

use crate::error::ToneError;
use crate::text::tokenize;
use crate::types::{Tone, round_to};

/// Confidence reported when no evidence either way is found.
pub const NEUTRAL_CONFIDENCE: f32 = 0.5;

/// Estimates the emotional tone of a text and how confidently it is stated.
#[async_trait]
pub trait ToneEstimator: Send + Sync {
    /// Dominant tone and its intensity.
    async fn tone(&self, text: &str) -> Result<Tone, ToneError>;

    /// How assertively the text is stated, in [0, 1].
    async fn confidence(&self, text: &str) -> Result<f32, ToneError>;

    /// Backend name, as listed in the capability registry.
    fn name(&self) -> &str;
}

/// Word-list tone estimator.
#[derive(Debug, Clone)]
pub struct LexiconToneEstimator {
    lexicon: Vec<(String, Vec<String>)>,
    certainty_markers: Vec<String>,
    hedge_markers: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| (*w).to_string()).collect()
}

impl Default for LexiconToneEstimator {
    fn default() -> Self {
        Self {
            lexicon: vec![
                (
                    "angry".to_string(),
                    words(&["outrage", "outrageous", "furious", "angry", "hate", "disgrace"]),
                ),
                (
                    "joyful".to_string(),
                    words(&["great", "love", "wonderful", "amazing", "happy", "delighted"]),
                ),
                (
                    "fearful".to_string(),
                    words(&["afraid", "scary", "fear", "panic", "danger", "threat"]),
                ),
                (
                    "sad".to_string(),
                    words(&["sad", "tragic", "loss", "grief", "mourn", "sorry"]),
                ),
            ],
            certainty_markers: words(&[
                "definitely",
                "certainly",
                "clearly",
                "always",
                "proven",
                "undeniably",
            ]),
            hedge_markers: words(&["might", "maybe", "possibly", "perhaps", "could", "seems"]),
        }
    }
}

impl LexiconToneEstimator {
    /// Create an estimator with the built-in lexicon.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or extend a tone label.
    #[must_use]
    pub fn with_tone_words<I, S>(mut self, label: &str, new_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let new_words = new_words.into_iter().map(Into::into);
        if let Some((_, existing)) = self.lexicon.iter_mut().find(|(l, _)| l == label) {
            existing.extend(new_words);
        } else {
            self.lexicon.push((label.to_string(), new_words.collect()));
        }
        self
    }

    /// Synchronous tone detection.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn detect(&self, text: &str) -> Tone {
        let tokens = tokenize(text);
        let best = self
            .lexicon
            .iter()
            .map(|(label, list)| {
                let hits = tokens.iter().filter(|t| list.contains(t)).count();
                (label, hits)
            })
            .fold(None::<(&String, usize)>, |best, (label, hits)| match best {
                Some((_, top)) if top >= hits => best,
                _ if hits > 0 => Some((label, hits)),
                _ => best,
            });

        match best {
            Some((label, hits)) => Tone {
                label: label.clone(),
                intensity: round_to((hits as f32 * 0.25).min(1.0), 2),
            },
            None => Tone::neutral(),
        }
    }

    /// Synchronous confidence estimation.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn estimate_confidence(&self, text: &str) -> f32 {
        let tokens = tokenize(text);
        let certain = tokens
            .iter()
            .filter(|t| self.certainty_markers.contains(t))
            .count();
        let hedged = tokens
            .iter()
            .filter(|t| self.hedge_markers.contains(t))
            .count();
        let raw = NEUTRAL_CONFIDENCE + 0.1 * certain as f32 - 0.1 * hedged as f32;
        round_to(raw.clamp(0.0, 1.0), 2)
    }
}

#[async_trait]
impl ToneEstimator for LexiconToneEstimator {
    async fn tone(&self, text: &str) -> Result<Tone, ToneError> {
        Ok(self.detect(text))
    }

    async fn confidence(&self, text: &str) -> Result<f32, ToneError> {
        Ok(self.estimate_confidence(text))
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

/// Always reports a neutral tone and [`NEUTRAL_CONFIDENCE`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralToneEstimator;

#[async_trait]
impl ToneEstimator for NeutralToneEstimator {
    async fn tone(&self, _text: &str) -> Result<Tone, ToneError> {
        Ok(Tone::neutral())
    }

    async fn confidence(&self, _text: &str) -> Result<f32, ToneError> {
        Ok(NEUTRAL_CONFIDENCE)
    }

    fn name(&self) -> &str {
        "neutral"
    }
}

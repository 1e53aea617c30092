//! Word-level text helpers shared by the classifier, scorers and logic checks.
//!
//! Keywords and phrases match on whole lowercase words, so "art" does not
//! match inside "start" and "mental health" only matches the two words in
//! sequence.

/// Lowercased alphanumeric tokens of a text.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Token offsets at which a phrase starts in pre-tokenized text.
#[must_use]
pub fn phrase_positions(tokens: &[String], phrase: &str) -> Vec<usize> {
    let needle = tokenize(phrase);
    if needle.is_empty() || needle.len() > tokens.len() {
        return Vec::new();
    }
    tokens
        .windows(needle.len())
        .enumerate()
        .filter(|(_, window)| *window == needle.as_slice())
        .map(|(i, _)| i)
        .collect()
}

/// Number of times a phrase occurs as a word sequence in pre-tokenized text.
#[must_use]
pub fn phrase_occurrences(tokens: &[String], phrase: &str) -> usize {
    phrase_positions(tokens, phrase).len()
}

/// Whether a phrase occurs as a word sequence in pre-tokenized text.
#[must_use]
pub fn contains_phrase(tokens: &[String], phrase: &str) -> bool {
    phrase_occurrences(tokens, phrase) > 0
}

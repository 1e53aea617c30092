//! Abbreviation-aware sentence splitting.

const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Characters that may trail a terminator and still belong to the sentence.
const CLOSERS: [char; 6] = ['"', '\'', '\u{201d}', '\u{2019}', ')', ']'];

/// Words that end in a period without ending the sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "rev", "hon", "gen", "col", "capt", "lt",
    "sgt", "gov", "sen", "rep", "pres", "vs", "etc", "eg", "ie", "cf", "al", "approx", "inc",
    "ltd", "co", "corp", "dept", "est", "fig", "vol", "mt", "ave",
];

/// Whether a word (without its trailing period) is an abbreviation.
///
/// Covers the fixed list above, dotted acronyms such as "U.S" or "e.g", and
/// single uppercase initials other than the pronoun "I".
pub(crate) fn is_abbreviation(word: &str) -> bool {
    let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());
    if word.is_empty() {
        return false;
    }

    let lowered = word.to_lowercase();
    if ABBREVIATIONS.contains(&lowered.as_str()) {
        return true;
    }

    if word.contains('.') {
        return word
            .split('.')
            .all(|part| part.chars().count() == 1 && part.chars().all(char::is_alphabetic));
    }

    let mut chars = word.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_uppercase() && c != 'I')
}

/// Split text into trimmed, non-empty sentences.
///
/// A terminator run ends a sentence only when it is followed by whitespace
/// or the end of the text, the next word does not start in lowercase, and a
/// lone period does not close an abbreviation. Decimal points never split
/// because no whitespace follows them.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        if !TERMINATORS.contains(&chars[i].1) {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < chars.len() && (TERMINATORS.contains(&chars[j].1) || CLOSERS.contains(&chars[j].1))
        {
            j += 1;
        }
        let end = chars.get(j).map_or(text.len(), |(offset, _)| *offset);

        if is_boundary(text, &chars, i, j, start) {
            push_trimmed(&mut sentences, &text[start..end]);
            start = end;
        }
        i = j;
    }

    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn is_boundary(text: &str, chars: &[(usize, char)], at: usize, after: usize, start: usize) -> bool {
    if let Some((_, next)) = chars.get(after)
        && !next.is_whitespace()
    {
        return false;
    }

    let next_word = chars[after..]
        .iter()
        .map(|(_, c)| *c)
        .find(|c| !c.is_whitespace());
    if next_word.is_some_and(char::is_lowercase) {
        return false;
    }

    if chars[at].1 == '.' && after == at + 1 {
        let before = &text[start..chars[at].0];
        let word = before.rsplit(char::is_whitespace).next().unwrap_or("");
        if is_abbreviation(word) {
            return false;
        }
    }

    true
}

fn push_trimmed<'a>(sentences: &mut Vec<&'a str>, candidate: &'a str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
}

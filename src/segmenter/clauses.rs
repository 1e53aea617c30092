//! Clause splitting and compound-subject expansion.

use regex::Regex;

use crate::error::Result;
use crate::segmenter::sentences::is_abbreviation;

const CONJUNCTIONS: &str = r"(?i)\b(and|but|or|so|because|although|while|however)\b";
const COPULA: &str = r"(?i)\b(is|are|was|were|will be|seem to be)\b";
const SUBJECT_PLURAL_COPULA: &str =
    r"(?i)^(\S+(?:\s+\S+){0,2}?)\s+(?:are|were|will be|seem to be)\s+\S";
const COMPOUND: &str = r"(?i)^(.+?)\s+and\s+(.+?)\s+(are|were|will be|seem to be)\s+(.+)$";

/// Pronouns that open a full clause rather than a bare subject.
const PRONOUNS: &[&str] = &["i", "we", "you", "he", "she", "they", "it"];

/// Longest bare subject, in words, that may be rejoined with the next clause.
const MAX_SUBJECT_WORDS: usize = 3;

/// Compiled clause patterns.
#[derive(Debug, Clone)]
pub struct ClauseSplitter {
    conjunctions: Regex,
    copula: Regex,
    subject_plural_copula: Regex,
    compound: Regex,
}

impl ClauseSplitter {
    /// Compile the clause patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            conjunctions: Regex::new(CONJUNCTIONS)?,
            copula: Regex::new(COPULA)?,
            subject_plural_copula: Regex::new(SUBJECT_PLURAL_COPULA)?,
            compound: Regex::new(COMPOUND)?,
        })
    }

    /// Split a sentence on conjunctions.
    ///
    /// When `rejoin_subjects` is set, a bare subject followed by "and" and a
    /// clause that opens with a subject of the same length and a plural
    /// copula is kept together so that [`expand`](Self::expand) can see the
    /// compound subject.
    #[must_use]
    pub fn split(&self, sentence: &str, rejoin_subjects: bool) -> Vec<String> {
        let mut parts = Vec::new();
        let mut joiners = Vec::new();
        let mut last = 0;
        for m in self.conjunctions.find_iter(sentence) {
            parts.push(&sentence[last..m.start()]);
            joiners.push(m.as_str());
            last = m.end();
        }
        parts.push(&sentence[last..]);

        let mut clauses = Vec::with_capacity(parts.len());
        let mut i = 0;
        while i < parts.len() {
            let current = clean(parts[i]);
            if rejoin_subjects
                && i + 1 < parts.len()
                && joiners[i].eq_ignore_ascii_case("and")
                && self.is_compound_subject(&current, &clean(parts[i + 1]))
            {
                clauses.push(format!("{current} {} {}", joiners[i], clean(parts[i + 1])));
                i += 2;
            } else {
                clauses.push(current);
                i += 1;
            }
        }
        clauses
    }

    /// Whether `bare` and the subject opening `next` form one compound
    /// subject.
    fn is_compound_subject(&self, bare: &str, next: &str) -> bool {
        let Some(caps) = self.subject_plural_copula.captures(next) else {
            return false;
        };
        self.is_bare_subject(bare)
            && caps[1].split_whitespace().count() == bare.split_whitespace().count()
    }

    fn is_bare_subject(&self, fragment: &str) -> bool {
        let words: Vec<&str> = fragment.split_whitespace().collect();
        let Some(first) = words.first() else {
            return false;
        };
        words.len() <= MAX_SUBJECT_WORDS
            && !PRONOUNS.contains(&first.to_lowercase().as_str())
            && !self.copula.is_match(fragment)
    }

    /// Expand `<s1> and <s2> <copula> <predicate>` into one clause per
    /// subject, copying the copula and predicate verbatim.
    #[must_use]
    pub fn expand(&self, fragment: &str) -> Vec<String> {
        match self.compound.captures(fragment) {
            Some(caps) => {
                let (first, second, copula, predicate) = (&caps[1], &caps[2], &caps[3], &caps[4]);
                vec![
                    format!("{} {copula} {predicate}", first.trim()),
                    format!("{} {copula} {predicate}", second.trim()),
                ]
            }
            None => vec![fragment.to_string()],
        }
    }
}

/// Trim separators around a clause and drop a closing period that does not
/// belong to an abbreviation.
fn clean(fragment: &str) -> String {
    let trimmed = fragment
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-'));
    if let Some(stripped) = trimmed.strip_suffix('.') {
        let last_word = stripped.rsplit(char::is_whitespace).next().unwrap_or("");
        if !is_abbreviation(last_word) {
            return stripped.trim_end().to_string();
        }
    }
    trimmed.to_string()
}

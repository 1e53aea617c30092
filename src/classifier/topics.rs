//! Keyword-based topic scoring.

use crate::collaborators::topic_tree::TopicEntry;
use crate::text::{contains_phrase, tokenize};
use crate::types::{TopicScore, TopicScores, round_to};

/// Score topics against a text.
///
/// A topic scores `min(1, hits / keywords)` rounded to two decimals and is
/// kept when it has at least one hit and reaches `threshold`. Ties keep tree
/// order. With no surviving topic the result is the general fallback.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score_topics(text: &str, topics: &[TopicEntry], threshold: f32) -> TopicScores {
    let tokens = tokenize(text);
    let scores = topics
        .iter()
        .filter(|topic| !topic.keywords.is_empty())
        .filter_map(|topic| {
            let hits = topic
                .keywords
                .iter()
                .filter(|keyword| contains_phrase(&tokens, keyword))
                .count();
            if hits == 0 {
                return None;
            }
            let score = round_to((hits as f32 / topic.keywords.len() as f32).min(1.0), 2);
            (score >= threshold).then(|| TopicScore::new(topic.name.clone(), score))
        })
        .collect();
    TopicScores::from_scores(scores)
}

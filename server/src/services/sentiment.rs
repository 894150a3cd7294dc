//! Lexicon sentiment classifier for status summaries.
//!
//! Counts positive and negative cue words; whichever side has more wins,
//! ties are neutral. The result is stored as `metadata.sentiment` and is
//! what `POST /statuses/search` matches against.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

const POSITIVE: &[&str] = &[
    "approved", "complete", "completed", "success", "successful", "successfully", "good", "great", "excellent",
    "on track", "ahead", "finalized", "resolved", "pleased", "happy", "satisfied", "improved", "growth",
];

const NEGATIVE: &[&str] = &[
    "rejected", "denied", "declined", "failed", "failure", "delayed", "delay", "overdue", "blocked", "missing",
    "insufficient", "problem", "issue", "error", "concern", "unhappy", "complaint", "loss", "cancelled",
];

/// Classify `text`. Empty text is neutral.
#[must_use]
pub fn analyze(text: &str) -> Sentiment {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let joined = words.join(" ");

    let positive = count_cues(&words, &joined, POSITIVE);
    let negative = count_cues(&words, &joined, NEGATIVE);

    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

/// Single-word cues match whole words; multi-word cues match the joined text.
fn count_cues(words: &[&str], joined: &str, cues: &[&str]) -> usize {
    cues.iter()
        .map(|cue| {
            if cue.contains(' ') {
                joined.matches(cue).count()
            } else {
                words.iter().filter(|w| *w == cue).count()
            }
        })
        .sum()
}

//! Keyword-based sentiment scoring for product reviews.
//!
//! Two fixed word lists are checked for substring presence in the lower-cased
//! review. Every matched word pushes its side up by 0.2 and whatever is left of
//! 1.0 counts as neutrality. No trained model is involved.
//!
//! The reported positive/negative scores (and the confidence of a NEUTRAL
//! verdict) carry a small uniform jitter. Callers that need reproducible output
//! pass their own RNG to [`analyze_with_rng`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

const KEYWORD_WEIGHT: f64 = 0.2;
const BASE_CONFIDENCE: f64 = 0.6;
const NEUTRAL_CONFIDENCE_SPREAD: f64 = 0.2;
const SCORE_JITTER: f64 = 0.1;
const MAX_SCORE: f64 = 0.99;

/// Words that signal a positive review.
pub const POSITIVE_LEXICON: Lexicon = Lexicon::new(&[
    "good", "great", "amazing", "excellent", "love", "fast", "best", "recommend",
]);

/// Words that signal a negative review.
pub const NEGATIVE_LEXICON: Lexicon = Lexicon::new(&[
    "bad", "terrible", "slow", "rude", "poor", "hate", "worst", "avoid",
]);

/// Fixed, ordered list of trigger words checked for substring presence.
#[derive(Debug, Clone, Copy)]
pub struct Lexicon(&'static [&'static str]);

impl Lexicon {
    pub const fn new(words: &'static [&'static str]) -> Self {
        Lexicon(words)
    }

    /// Words of this lexicon present in `lowercased`, each at most once.
    pub fn matches(&self, lowercased: &str) -> Vec<&'static str> {
        self.0
            .iter()
            .copied()
            .filter(|word| lowercased.contains(word))
            .collect()
    }

    /// 0.2 per matched word. Membership only: repeats of a word don't add up.
    pub fn score(&self, lowercased: &str) -> f64 {
        self.matches(lowercased)
            .iter()
            .fold(0.0, |acc, _| acc + KEYWORD_WEIGHT)
    }
}

/// Classification label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
            Sentiment::Neutral => "NEUTRAL",
        };
        f.write_str(label)
    }
}

/// Per-class scores, each rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScoreBreakdown {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

/// Result of sentiment analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResult {
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub scores: ScoreBreakdown,
}

/// Analyzes `text` using the thread-local RNG for jitter.
pub fn analyze(text: &str) -> AnalysisResult {
    analyze_with_rng(text, &mut rand::thread_rng())
}

/// Analyzes `text`, drawing jitter from `rng`.
///
/// Draw order is fixed: the NEUTRAL confidence (only on that path), then the
/// positive jitter, then the negative jitter. Any string is valid input.
pub fn analyze_with_rng<R: Rng>(text: &str, rng: &mut R) -> AnalysisResult {
    let lowered = text.to_lowercase();

    let pos_score = POSITIVE_LEXICON.score(&lowered);
    let neg_score = NEGATIVE_LEXICON.score(&lowered);
    let neutral_score = 1.0 - (pos_score + neg_score).min(1.0);

    let (sentiment, confidence) = if pos_score > neg_score && pos_score > neutral_score {
        (Sentiment::Positive, (BASE_CONFIDENCE + pos_score).min(MAX_SCORE))
    } else if neg_score > pos_score && neg_score > neutral_score {
        (Sentiment::Negative, (BASE_CONFIDENCE + neg_score).min(MAX_SCORE))
    } else {
        let spread = rng.gen::<f64>() * NEUTRAL_CONFIDENCE_SPREAD;
        (Sentiment::Neutral, BASE_CONFIDENCE + spread)
    };

    let positive = (pos_score + rng.gen::<f64>() * SCORE_JITTER).min(MAX_SCORE);
    let negative = (neg_score + rng.gen::<f64>() * SCORE_JITTER).min(MAX_SCORE);

    tracing::debug!(
        chars = text.chars().count(),
        pos_score,
        neg_score,
        %sentiment,
        "🧠 Sentiment scored"
    );

    AnalysisResult {
        sentiment,
        confidence: round2(confidence),
        scores: ScoreBreakdown {
            positive: round2(positive),
            negative: round2(negative),
            neutral: round2(neutral_score),
        },
    }
}

/// Rounds to 2 decimal places, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

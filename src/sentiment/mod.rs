//! Sentiment labels and the analysis record returned to clients.

pub mod extractor;
pub mod normalizer;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use extractor::{extract_analysis, ExtractError};
pub use normalizer::normalize_scores;

/// Explanation used whenever an analysis could not be produced.
pub const FALLBACK_EXPLANATION: &str = "An error occurred during analysis";

/// Three-way sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single sentiment analysis.
///
/// Built fresh per request and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub sentiment: Sentiment,
    /// Always within `[0, 1]`
    pub confidence: f64,
    pub explanation: String,
}

impl SentimentAnalysis {
    /// Neutral, zero-confidence record rendered alongside error responses.
    pub fn fallback() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            confidence: 0.0,
            explanation: FALLBACK_EXPLANATION.to_string(),
        }
    }

    /// Force confidence into `[0, 1]`, mapping NaN to 0.
    pub fn clamped(mut self) -> Self {
        self.confidence = if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }
}

//! Maps a pair of classifier probabilities onto the three-way label.

use super::{Sentiment, SentimentAnalysis};

/// Score gap below which the text counts as neutral.
pub const NEUTRAL_MARGIN: f64 = 0.2;

/// Absorbs binary rounding so a decimal gap of exactly 0.2 is not neutral.
const SCORE_EPSILON: f64 = 1e-9;

/// Classify a positive/negative score pair.
///
/// Close scores are neutral with the closeness as confidence; otherwise the
/// larger score wins and becomes the confidence. Confidence is rounded to two
/// decimals, the explanation percentage to a whole number.
pub fn normalize_scores(positive: f64, negative: f64) -> SentimentAnalysis {
    let positive = sanitize(positive);
    let negative = sanitize(negative);
    let diff = (positive - negative).abs();

    let (sentiment, confidence) = if diff < NEUTRAL_MARGIN - SCORE_EPSILON {
        (Sentiment::Neutral, 1.0 - diff)
    } else if positive > negative {
        (Sentiment::Positive, positive)
    } else {
        (Sentiment::Negative, negative)
    };

    SentimentAnalysis {
        sentiment,
        confidence: (confidence * 100.0).round() / 100.0,
        explanation: format!(
            "The text expresses a {} sentiment with {}% confidence.",
            sentiment,
            (confidence * 100.0).round() as u32
        ),
    }
}

fn sanitize(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

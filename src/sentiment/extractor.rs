//! Recovers the JSON analysis object from free-form model output.
//!
//! Chat models are asked for a bare JSON object but often wrap it in a
//! markdown fence or surround it with prose. Three strategies are tried in
//! order and the first one that yields valid JSON wins:
//!
//! 1. the whole completion parsed as JSON
//! 2. the interior of a ` ``` ` / ` ```json ` fenced block
//! 3. the first `{ ... }` span containing the `"sentiment"` key

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use super::SentimentAnalysis;

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```(?:json)?\s*(\{[\s\S]*?\})\s*```").expect("fenced block pattern is valid")
});

static SENTIMENT_OBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\{[\s\S]*?"sentiment"[\s\S]*?\}"#).expect("sentiment object pattern is valid")
});

/// The completion held no recoverable analysis.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Could not parse sentiment analysis response")]
    NoJson,

    /// JSON was found but is not an analysis; the decoder detail is only logged
    #[error("Could not parse sentiment analysis response")]
    Shape(String),
}

type Strategy = fn(&str) -> Option<Value>;

const STRATEGIES: [(&str, Strategy); 3] = [
    ("direct", parse_direct),
    ("fenced", parse_fenced),
    ("brace-scan", parse_brace_scan),
];

/// Find the first JSON value the strategies can recover.
pub fn extract_json(completion: &str) -> Result<Value, ExtractError> {
    STRATEGIES
        .iter()
        .find_map(|(name, strategy)| {
            let value = strategy(completion)?;
            tracing::debug!(strategy = name, "recovered JSON from completion");
            Some(value)
        })
        .ok_or(ExtractError::NoJson)
}

/// Recover and decode a [`SentimentAnalysis`] from model output.
///
/// Only the decoding itself constrains the object: the label must be one of
/// the three known values and confidence must be numeric. Confidence is then
/// clamped into `[0, 1]`.
pub fn extract_analysis(completion: &str) -> Result<SentimentAnalysis, ExtractError> {
    let value = extract_json(completion)?;
    let analysis: SentimentAnalysis =
        serde_json::from_value(value).map_err(|e| {
            tracing::debug!(error = %e, "recovered JSON is not a sentiment analysis");
            ExtractError::Shape(e.to_string())
        })?;
    Ok(analysis.clamped())
}

fn parse_direct(text: &str) -> Option<Value> {
    serde_json::from_str(text.trim()).ok()
}

fn parse_fenced(text: &str) -> Option<Value> {
    let captures = FENCED_BLOCK.captures(text)?;
    serde_json::from_str(captures.get(1)?.as_str()).ok()
}

fn parse_brace_scan(text: &str) -> Option<Value> {
    let found = SENTIMENT_OBJECT.find(text)?;
    serde_json::from_str(found.as_str()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::Sentiment;
    use serde_json::json;

    #[test]
    fn test_bare_json_is_returned_unchanged() {
        let input = r#"{"sentiment":"positive","confidence":0.9,"explanation":"ok"}"#;
        let value = extract_json(input).unwrap();
        assert_eq!(
            value,
            json!({"sentiment": "positive", "confidence": 0.9, "explanation": "ok"})
        );

        let analysis = extract_analysis(input).unwrap();
        assert_eq!(analysis.sentiment, Sentiment::Positive);
        assert_eq!(analysis.confidence, 0.9);
        assert_eq!(analysis.explanation, "ok");
    }

    #[test]
    fn test_fenced_block() {
        let input = "```json\n{\"sentiment\":\"negative\",\"confidence\":0.7,\"explanation\":\"bad\"}\n```";
        let analysis = extract_analysis(input).unwrap();
        assert_eq!(analysis.sentiment, Sentiment::Negative);
        assert_eq!(analysis.confidence, 0.7);
        assert_eq!(analysis.explanation, "bad");
    }

    #[test]
    fn test_untagged_fence_with_prose() {
        let input = "Here you go:\n```\n{\"sentiment\": \"neutral\", \"confidence\": 0.5, \"explanation\": \"meh\"}\n```\nHope that helps.";
        let analysis = extract_analysis(input).unwrap();
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn test_object_embedded_in_prose() {
        let input = r#"I think this is great. {"sentiment":"positive","confidence":0.8,"explanation":"x"} end."#;
        let analysis = extract_analysis(input).unwrap();
        assert_eq!(analysis.sentiment, Sentiment::Positive);
        assert_eq!(analysis.confidence, 0.8);
        assert_eq!(analysis.explanation, "x");
    }

    #[test]
    fn test_no_json_fails() {
        assert_eq!(extract_json("no json here at all"), Err(ExtractError::NoJson));
        assert_eq!(
            extract_analysis("no json here at all").unwrap_err().to_string(),
            "Could not parse sentiment analysis response"
        );
    }

    #[test]
    fn test_braces_without_sentiment_key_fail() {
        assert!(extract_json("maybe {\"mood\": \"good\"} or not").is_err());
    }

    #[test]
    fn test_direct_parse_wins_even_for_wrong_shape() {
        let value = extract_json(r#"{"verdict":"good"}"#).unwrap();
        assert_eq!(value, json!({"verdict": "good"}));
        assert!(matches!(
            extract_analysis(r#"{"verdict":"good"}"#),
            Err(ExtractError::Shape(_))
        ));
    }

    #[test]
    fn test_shape_error_message_is_generic() {
        let err = extract_analysis(r#"{"sentiment":"positive","confidence":0.4}"#).unwrap_err();
        assert!(matches!(err, ExtractError::Shape(_)));
        assert_eq!(err.to_string(), "Could not parse sentiment analysis response");
    }

    #[test]
    fn test_non_numeric_confidence_rejected() {
        let input = r#"{"sentiment":"positive","confidence":"high","explanation":"x"}"#;
        assert!(matches!(extract_analysis(input), Err(ExtractError::Shape(_))));
    }

    #[test]
    fn test_confidence_clamped() {
        let input = r#"{"sentiment":"negative","confidence":3,"explanation":"x"}"#;
        assert_eq!(extract_analysis(input).unwrap().confidence, 1.0);
    }
}

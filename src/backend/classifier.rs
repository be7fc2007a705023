//! Hugging Face text-classification backend
//!
//! The model answers with a POSITIVE and a NEGATIVE probability which are
//! folded into three labels by [`normalize_scores`].

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{read_body, BackendError, SentimentBackend};
use crate::sentiment::{normalize_scores, SentimentAnalysis};

const MODEL_LOADING: &str = "AI model is loading. Please try again in a moment.";

/// One labelled probability from the classifier
#[derive(Debug, Clone, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// The inference API nests results per input; some deployments return them flat.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifierResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassifierResponse {
    fn into_scores(self) -> Vec<LabelScore> {
        match self {
            ClassifierResponse::Nested(mut batches) => {
                if batches.is_empty() {
                    Vec::new()
                } else {
                    batches.swap_remove(0)
                }
            }
            ClassifierResponse::Flat(scores) => scores,
        }
    }
}

pub struct ClassifierBackend {
    http: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl ClassifierBackend {
    pub fn new(http: reqwest::Client, url: String, token: Option<String>) -> Self {
        Self { http, url, token }
    }
}

#[async_trait]
impl SentimentBackend for ClassifierBackend {
    fn name(&self) -> &'static str {
        "classifier"
    }

    async fn analyze(&self, text: &str) -> Result<SentimentAnalysis, BackendError> {
        let mut request = self.http.post(&self.url).json(&json!({ "inputs": text }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let body = read_body("classifier", request.send().await?, |status| match status {
            429 | 503 => Some((503, MODEL_LOADING)),
            _ => None,
        })
        .await?;

        let scores = serde_json::from_str::<ClassifierResponse>(&body)
            .map_err(|e| BackendError::Malformed(e.to_string()))?
            .into_scores();

        let positive = score_for(&scores, "POSITIVE");
        let negative = score_for(&scores, "NEGATIVE");
        let analysis = normalize_scores(positive, negative);

        info!(
            positive,
            negative,
            sentiment = %analysis.sentiment,
            confidence = analysis.confidence,
            "classified text"
        );

        Ok(analysis)
    }
}

/// Score for `label`, or 0 when the classifier did not report it.
fn score_for(scores: &[LabelScore], label: &str) -> f64 {
    scores
        .iter()
        .find(|s| s.label.eq_ignore_ascii_case(label))
        .map(|s| s.score)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_response() {
        let body = r#"[[{"label":"POSITIVE","score":0.95},{"label":"NEGATIVE","score":0.05}]]"#;
        let scores = serde_json::from_str::<ClassifierResponse>(body)
            .unwrap()
            .into_scores();
        assert_eq!(score_for(&scores, "POSITIVE"), 0.95);
        assert_eq!(score_for(&scores, "NEGATIVE"), 0.05);
    }

    #[test]
    fn test_flat_response_and_lowercase_labels() {
        let body = r#"[{"label":"negative","score":0.8},{"label":"positive","score":0.2}]"#;
        let scores = serde_json::from_str::<ClassifierResponse>(body)
            .unwrap()
            .into_scores();
        assert_eq!(score_for(&scores, "POSITIVE"), 0.2);
        assert_eq!(score_for(&scores, "NEGATIVE"), 0.8);
    }

    #[test]
    fn test_missing_label_scores_zero() {
        let body = r#"[[{"label":"POSITIVE","score":0.7}]]"#;
        let scores = serde_json::from_str::<ClassifierResponse>(body)
            .unwrap()
            .into_scores();
        assert_eq!(score_for(&scores, "NEGATIVE"), 0.0);
    }

    #[test]
    fn test_empty_nested_response() {
        let scores = serde_json::from_str::<ClassifierResponse>("[]")
            .unwrap()
            .into_scores();
        assert!(scores.is_empty());
    }

    #[test]
    fn test_error_object_is_not_a_response() {
        assert!(serde_json::from_str::<ClassifierResponse>(r#"{"error":"boom"}"#).is_err());
    }
}

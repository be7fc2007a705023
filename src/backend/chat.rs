//! Chat-completion backend (OpenAI-compatible API)
//!
//! The model is instructed to answer with a bare JSON object; the reply is
//! passed through [`extract_analysis`] since it frequently is not bare.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{read_body, truncate, BackendError, SentimentBackend};
use crate::sentiment::{extract_analysis, SentimentAnalysis};

const SYSTEM_PROMPT: &str = "\
You are an expert sentiment analysis system. Analyze the sentiment of the given text \
and respond ONLY with a JSON object in this exact format: \
{\"sentiment\": \"positive|negative|neutral\", \"confidence\": 0.0-1.0, \"explanation\": \"brief explanation\"}. \
Do not include any other text or formatting.";

const RATE_LIMITED: &str = "Rate limit exceeded. Please try again later.";
const SERVICE_UNAVAILABLE: &str = "AI service is temporarily unavailable. Please try again in a moment.";

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct ChatBackend {
    http: reqwest::Client,
    url: String,
    model: String,
    api_key: String,
}

impl ChatBackend {
    pub fn new(http: reqwest::Client, url: String, model: String, api_key: String) -> Self {
        Self {
            http,
            url,
            model,
            api_key,
        }
    }
}

#[async_trait]
impl SentimentBackend for ChatBackend {
    fn name(&self) -> &'static str {
        "chat"
    }

    async fn analyze(&self, text: &str) -> Result<SentimentAnalysis, BackendError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": format!("Analyze the sentiment of this text: \"{}\"", text)
                }
            ]
        });

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let body = read_body("chat", response, |status| match status {
            429 => Some((429, RATE_LIMITED)),
            503 => Some((503, SERVICE_UNAVAILABLE)),
            _ => None,
        })
        .await?;

        let completion: ChatCompletion =
            serde_json::from_str(&body).map_err(|e| BackendError::Malformed(e.to_string()))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| BackendError::Malformed("no message content in completion".into()))?;

        info!(model = %self.model, reply = %truncate(&content, 200), "chat model replied");

        let analysis = extract_analysis(&content)?;
        info!(
            sentiment = %analysis.sentiment,
            confidence = analysis.confidence,
            "parsed chat analysis"
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"sentiment\":\"positive\"}"}}]}"#;
        let completion: ChatCompletion = serde_json::from_str(body).unwrap();
        assert_eq!(
            completion.choices[0].message.content.as_deref(),
            Some(r#"{"sentiment":"positive"}"#)
        );
    }

    #[test]
    fn test_prompt_names_every_field() {
        for key in ["sentiment", "confidence", "explanation"] {
            assert!(SYSTEM_PROMPT.contains(key));
        }
    }
}

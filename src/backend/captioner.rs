//! Image captioning backends
//!
//! The caption is returned verbatim as the text extracted from the image;
//! sentiment is not applied here.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{read_body, truncate, BackendError, CaptionBackend, ImagePayload};

/// Returned when the captioner produced no text
pub const NO_CAPTION: &str = "Unable to extract meaningful content from the image.";

const TEMPORARILY_UNAVAILABLE: &str =
    "Service temporarily unavailable. Please try again in a moment.";

const CAPTION_PROMPT: &str = "Describe this image in detail. Provide a clear, descriptive caption.";

fn unavailable(status: u16) -> Option<(u16, &'static str)> {
    match status {
        429 | 503 => Some((503, TEMPORARILY_UNAVAILABLE)),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: Option<String>,
}

/// Hugging Face image-to-text model fed raw image bytes
pub struct HuggingFaceCaptioner {
    http: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HuggingFaceCaptioner {
    pub fn new(http: reqwest::Client, url: String, token: Option<String>) -> Self {
        Self { http, url, token }
    }
}

#[async_trait]
impl CaptionBackend for HuggingFaceCaptioner {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    async fn caption(&self, image: &ImagePayload) -> Result<String, BackendError> {
        let mut request = self
            .http
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image.bytes.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let body = read_body("captioner", request.send().await?, unavailable).await?;
        let results: Vec<GeneratedText> =
            serde_json::from_str(&body).map_err(|e| BackendError::Malformed(e.to_string()))?;

        let caption = results
            .into_iter()
            .next()
            .and_then(|r| r.generated_text)
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| NO_CAPTION.to_string());

        info!(caption = %truncate(&caption, 100), "captioned image");
        Ok(caption)
    }
}

/// Google Gemini `generateContent` with an inline image part
pub struct GeminiCaptioner {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiCaptioner {
    pub fn new(http: reqwest::Client, base_url: String, model: String, api_key: String) -> Self {
        Self {
            http,
            base_url,
            model,
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl CaptionBackend for GeminiCaptioner {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn caption(&self, image: &ImagePayload) -> Result<String, BackendError> {
        let payload = serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": CAPTION_PROMPT },
                    {
                        "inline_data": {
                            "mime_type": image.mime_type_or_default(),
                            "data": general_purpose::STANDARD.encode(&image.bytes)
                        }
                    }
                ]
            }]
        });

        info!(model = %self.model, bytes = image.bytes.len(), "sending image to Gemini");

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&payload)
            .send()
            .await?;

        let body = read_body("gemini", response, unavailable).await?;
        let result: Value =
            serde_json::from_str(&body).map_err(|e| BackendError::Malformed(e.to_string()))?;

        let caption = result["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or(NO_CAPTION)
            .to_string();

        info!(caption = %truncate(&caption, 100), "captioned image");
        Ok(caption)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_endpoint() {
        let captioner = GeminiCaptioner::new(
            reqwest::Client::new(),
            "https://example.test/v1beta/models/".to_string(),
            "gemini-2.5-flash".to_string(),
            "key".to_string(),
        );
        assert_eq!(
            captioner.endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_unavailable_statuses() {
        assert_eq!(unavailable(429), Some((503, TEMPORARILY_UNAVAILABLE)));
        assert_eq!(unavailable(503), Some((503, TEMPORARILY_UNAVAILABLE)));
        assert_eq!(unavailable(500), None);
    }
}

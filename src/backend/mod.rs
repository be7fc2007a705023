//! Inference backends
//!
//! Sentiment and captioning are each a strategy trait with interchangeable
//! implementations chosen from [`Config`] at startup. All implementations
//! share one `reqwest::Client`.

pub mod captioner;
pub mod chat;
pub mod classifier;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{CaptionBackendKind, Config, SentimentBackendKind};
use crate::sentiment::{ExtractError, SentimentAnalysis};

pub use captioner::{GeminiCaptioner, HuggingFaceCaptioner};
pub use chat::ChatBackend;
pub use classifier::ClassifierBackend;

/// Longest slice of an upstream error body written to the log
const LOGGED_BODY_LIMIT: usize = 500;

/// Backend errors
#[derive(Debug, Error)]
pub enum BackendError {
    /// Upstream is loading or throttling; `status` is what the caller should see
    #[error("{message}")]
    Unavailable { status: u16, message: &'static str },

    /// Any other non-success upstream status
    #[error("Upstream error {status}: {body}")]
    Status { status: u16, body: String },

    /// Success status but an unexpected body
    #[error("Unexpected upstream response: {0}")]
    Malformed(String),

    /// Model text held no recoverable analysis
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Connection, timeout or body read failure. The request URL is kept
    /// here and must be stripped before the message reaches a client.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Decoded image handed to a caption backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    /// e.g. `image/png`; `None` when the client sent bare base64
    pub mime_type: Option<String>,
}

impl ImagePayload {
    pub fn mime_type_or_default(&self) -> &str {
        self.mime_type.as_deref().unwrap_or("image/jpeg")
    }
}

/// Produces a [`SentimentAnalysis`] for a piece of text.
#[async_trait]
pub trait SentimentBackend: Send + Sync {
    fn name(&self) -> &'static str;
    async fn analyze(&self, text: &str) -> Result<SentimentAnalysis, BackendError>;
}

/// Describes an image in plain text.
#[async_trait]
pub trait CaptionBackend: Send + Sync {
    fn name(&self) -> &'static str;
    async fn caption(&self, image: &ImagePayload) -> Result<String, BackendError>;
}

/// Build the shared HTTP client used by every backend.
pub fn http_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(concat!("ai-sentiment-analyzer/", env!("CARGO_PKG_VERSION")))
        .timeout(config.upstream_timeout())
        .build()
}

/// Construct the configured sentiment backend.
pub fn sentiment_backend(config: &Config, http: reqwest::Client) -> Arc<dyn SentimentBackend> {
    match config.sentiment_backend {
        SentimentBackendKind::Classifier => Arc::new(ClassifierBackend::new(
            http,
            config.classifier_url.clone(),
            config.huggingface_token.clone(),
        )),
        SentimentBackendKind::Chat => Arc::new(ChatBackend::new(
            http,
            config.chat_url.clone(),
            config.chat_model.clone(),
            config.chat_api_key.clone().unwrap_or_default(),
        )),
    }
}

/// Construct the configured caption backend.
pub fn caption_backend(config: &Config, http: reqwest::Client) -> Arc<dyn CaptionBackend> {
    match config.caption_backend {
        CaptionBackendKind::Huggingface => Arc::new(HuggingFaceCaptioner::new(
            http,
            config.caption_url.clone(),
            config.huggingface_token.clone(),
        )),
        CaptionBackendKind::Gemini => Arc::new(GeminiCaptioner::new(
            http,
            config.gemini_url.clone(),
            config.gemini_model.clone(),
            config.gemini_api_key.clone().unwrap_or_default(),
        )),
    }
}

/// Read an upstream response body, turning failures into [`BackendError`].
///
/// `unavailable` decides which statuses mean "try again later" and what the
/// caller is told; every other non-success status becomes
/// [`BackendError::Status`].
pub(crate) async fn read_body(
    service: &'static str,
    response: reqwest::Response,
    unavailable: fn(u16) -> Option<(u16, &'static str)>,
) -> Result<String, BackendError> {
    let status = response.status().as_u16();
    let body = response.text().await?;

    if (200..300).contains(&status) {
        tracing::debug!(service, body = %truncate(&body, LOGGED_BODY_LIMIT), "upstream response");
        return Ok(body);
    }

    tracing::error!(
        service,
        status,
        body = %truncate(&body, LOGGED_BODY_LIMIT),
        "upstream returned an error"
    );

    match unavailable(status) {
        Some((status, message)) => Err(BackendError::Unavailable { status, message }),
        None => Err(BackendError::Status { status, body }),
    }
}

/// Cut `text` to at most `max_chars` characters, marking the cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 50), "short");
        assert_eq!(truncate("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn test_default_mime_type() {
        let payload = ImagePayload {
            bytes: vec![1, 2, 3],
            mime_type: None,
        };
        assert_eq!(payload.mime_type_or_default(), "image/jpeg");
    }
}

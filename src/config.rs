//! Command-line and environment configuration
//!
//! Values come from flags, then environment variables (a `.env` file is
//! loaded first by `main`), then the defaults below.

use clap::{Parser, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CLASSIFIER_URL: &str =
    "https://api-inference.huggingface.co/models/distilbert-base-uncased-finetuned-sst-2-english";
pub const DEFAULT_CHAT_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
pub const DEFAULT_CAPTION_URL: &str =
    "https://api-inference.huggingface.co/models/nlpconnect/vit-gpt2-image-captioning";
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{flag} (or {env}) must be set when the {backend} backend is selected")]
    MissingKey {
        flag: &'static str,
        env: &'static str,
        backend: &'static str,
    },
}

/// Which service produces sentiment analyses
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SentimentBackendKind {
    /// Binary text classifier returning POSITIVE/NEGATIVE scores
    Classifier,
    /// General-purpose chat completion model asked for a JSON verdict
    Chat,
}

impl SentimentBackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classifier => "classifier",
            Self::Chat => "chat",
        }
    }
}

/// Which service captions images
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CaptionBackendKind {
    Huggingface,
    Gemini,
}

impl CaptionBackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Huggingface => "huggingface",
            Self::Gemini => "gemini",
        }
    }
}

/// Server configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "ai-sentiment-analyzer")]
#[command(about = "Sentiment analysis gateway for text and images")]
#[command(version)]
pub struct Config {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "PORT")]
    pub port: u16,

    #[arg(long, value_enum, default_value = "classifier", env = "SENTIMENT_BACKEND")]
    pub sentiment_backend: SentimentBackendKind,

    #[arg(long, default_value = DEFAULT_CLASSIFIER_URL, env = "CLASSIFIER_URL")]
    pub classifier_url: String,

    /// Bearer token for the Hugging Face inference API
    #[arg(long, env = "HUGGINGFACE_API_TOKEN", hide_env_values = true)]
    pub huggingface_token: Option<String>,

    #[arg(long, default_value = DEFAULT_CHAT_URL, env = "CHAT_COMPLETIONS_URL")]
    pub chat_url: String,

    #[arg(long, default_value = "google/gemini-2.5-flash", env = "CHAT_MODEL")]
    pub chat_model: String,

    #[arg(long, env = "LOVABLE_API_KEY", hide_env_values = true)]
    pub chat_api_key: Option<String>,

    #[arg(long, value_enum, default_value = "huggingface", env = "CAPTION_BACKEND")]
    pub caption_backend: CaptionBackendKind,

    #[arg(long, default_value = DEFAULT_CAPTION_URL, env = "CAPTION_URL")]
    pub caption_url: String,

    #[arg(long, default_value = DEFAULT_GEMINI_URL, env = "GEMINI_URL")]
    pub gemini_url: String,

    #[arg(long, default_value = "gemini-2.5-flash", env = "GEMINI_MODEL")]
    pub gemini_model: String,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// SQLite URL for upload metadata; in-memory when unset
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Timeout for each call to an inference service
    #[arg(long, default_value_t = 30, env = "UPSTREAM_TIMEOUT_SECS")]
    pub upstream_timeout_secs: u64,

    /// Maximum request body size in megabytes
    #[arg(long, default_value_t = 10, env = "BODY_LIMIT_MB")]
    pub body_limit_mb: usize,
}

impl Config {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb.saturating_mul(1024 * 1024)
    }

    /// Check that the selected backends have the keys they need.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sentiment_backend == SentimentBackendKind::Chat && !has_value(&self.chat_api_key) {
            return Err(ConfigError::MissingKey {
                flag: "--chat-api-key",
                env: "LOVABLE_API_KEY",
                backend: "chat",
            });
        }
        if self.caption_backend == CaptionBackendKind::Gemini && !has_value(&self.gemini_api_key) {
            return Err(ConfigError::MissingKey {
                flag: "--gemini-api-key",
                env: "GEMINI_API_KEY",
                backend: "gemini",
            });
        }
        Ok(())
    }
}

fn has_value(key: &Option<String>) -> bool {
    key.as_deref().is_some_and(|k| !k.trim().is_empty())
}

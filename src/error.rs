//! Error types for the HTTP surface
//!
//! Every failure is converted to a JSON body at the handler boundary.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::backend::BackendError;
use crate::sentiment::{ExtractError, SentimentAnalysis};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or empty required input (400)
    #[error("{0}")]
    Validation(String),

    /// Body refused before it could be read as JSON (e.g. 413, 415)
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Upstream is loading or rate limited (429/503)
    #[error("{message}")]
    UpstreamUnavailable { status: u16, message: String },

    /// Upstream answered with any other non-success status (500)
    #[error("{0}")]
    UpstreamFailure(String),

    /// Model output could not be recovered as an analysis (500)
    #[error(transparent)]
    Parse(#[from] ExtractError),

    /// Upload store failure (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Anything else (500)
    #[error("{0}")]
    Unknown(String),
}

impl ApiError {
    /// Translate a backend failure, using `failure_message` for upstream
    /// statuses that are neither 429 nor 503.
    pub fn from_backend(err: BackendError, failure_message: &str) -> Self {
        match err {
            BackendError::Unavailable { status, message } => ApiError::UpstreamUnavailable {
                status,
                message: message.to_string(),
            },
            BackendError::Status { .. } | BackendError::Malformed(_) => {
                ApiError::UpstreamFailure(failure_message.to_string())
            }
            BackendError::Extract(e) => ApiError::Parse(e),
            BackendError::Transport(e) => ApiError::Unknown(e.without_url().to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
            }
            ApiError::UpstreamUnavailable { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::SERVICE_UNAVAILABLE)
            }
            ApiError::UpstreamFailure(_)
            | ApiError::Parse(_)
            | ApiError::Database(_)
            | ApiError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Malformed or mistyped JSON is a validation error; size and content-type
/// rejections keep their own status.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                ApiError::Validation(rejection.body_text())
            }
            other => ApiError::Rejected {
                status: other.status().as_u16(),
                message: other.body_text(),
            },
        }
    }
}

/// Error from the sentiment endpoints.
///
/// Server errors carry the neutral fallback analysis next to the `error`
/// field so clients can still render a result.
#[derive(Debug)]
pub struct AnalysisFailure(pub ApiError);

impl From<ApiError> for AnalysisFailure {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AnalysisFailure {
    fn into_response(self) -> Response {
        let status = self.0.status();
        if !status.is_server_error() {
            return self.0.into_response();
        }

        tracing::error!(status = status.as_u16(), error = %self.0, "sentiment analysis failed");
        let fallback = SentimentAnalysis::fallback();
        let body = json!({
            "error": self.0.to_string(),
            "sentiment": fallback.sentiment,
            "confidence": 0,
            "explanation": fallback.explanation,
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_is_bad_request() {
        let response = ApiError::Validation("Text is required for analysis".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Text is required for analysis"})
        );
    }

    #[tokio::test]
    async fn test_unavailable_keeps_upstream_status() {
        let err = ApiError::from_backend(
            BackendError::Unavailable {
                status: 429,
                message: "Rate limit exceeded. Please try again later.",
            },
            "Failed to analyze sentiment",
        );
        let response = AnalysisFailure(err).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Rate limit exceeded. Please try again later."})
        );
    }

    #[tokio::test]
    async fn test_upstream_status_uses_generic_message() {
        let err = ApiError::from_backend(
            BackendError::Status {
                status: 502,
                body: "bad gateway".into(),
            },
            "Failed to analyze image",
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({"error": "Failed to analyze image"}));
    }

    #[tokio::test]
    async fn test_analysis_failure_carries_fallback() {
        let response = AnalysisFailure(ApiError::Parse(ExtractError::NoJson)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({
                "error": "Could not parse sentiment analysis response",
                "sentiment": "neutral",
                "confidence": 0,
                "explanation": "An error occurred during analysis",
            })
        );
    }
}

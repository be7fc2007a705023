//! Sentiment analysis endpoint
//!
//! Served at both `/analyze-sentiment` and `/api/analyze-sentiment`.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use super::preflight;
use crate::backend::truncate;
use crate::error::{AnalysisFailure, ApiError, ApiResult};
use crate::sentiment::SentimentAnalysis;
use crate::AppState;

/// Characters of input text written to the log
const LOGGED_TEXT_CHARS: usize = 50;

#[derive(Debug, Deserialize)]
pub struct AnalyzeSentimentRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// POST /analyze-sentiment
///
/// Every failure is rendered as JSON; server errors also carry a neutral
/// fallback analysis.
pub async fn analyze_sentiment(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeSentimentRequest>, JsonRejection>,
) -> Result<Json<SentimentAnalysis>, AnalysisFailure> {
    let analysis = run_analysis(&state, payload).await?;
    Ok(Json(analysis))
}

async fn run_analysis(
    state: &AppState,
    payload: Result<Json<AnalyzeSentimentRequest>, JsonRejection>,
) -> ApiResult<SentimentAnalysis> {
    let Json(request) = payload?;

    let text = request
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Text is required for analysis".to_string()))?;

    info!(
        backend = state.sentiment.name(),
        chars = text.chars().count(),
        "Analyzing sentiment for text: {}",
        truncate(&text, LOGGED_TEXT_CHARS)
    );

    let analysis = state
        .sentiment
        .analyze(&text)
        .await
        .map_err(|e| ApiError::from_backend(e, "Failed to analyze sentiment"))?;

    info!(
        sentiment = %analysis.sentiment,
        confidence = analysis.confidence,
        "Successfully analyzed sentiment"
    );

    Ok(analysis)
}

/// Build sentiment routes
pub fn sentiment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/analyze-sentiment",
            post(analyze_sentiment).options(preflight),
        )
        .route(
            "/api/analyze-sentiment",
            post(analyze_sentiment).options(preflight),
        )
}

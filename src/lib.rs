//! ai-sentiment-analyzer library interface
//!
//! Exposes the router and state so the binary and integration tests build
//! the same application.

pub mod api;
pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod sentiment;

pub use crate::error::{ApiError, ApiResult};

use axum::{extract::DefaultBodyLimit, Router};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::backend::{CaptionBackend, SentimentBackend};
use crate::db::UploadStore;

/// Default request body limit (10 MB)
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Active sentiment strategy
    pub sentiment: Arc<dyn SentimentBackend>,
    /// Active captioning strategy
    pub captioner: Arc<dyn CaptionBackend>,
    /// Upload metadata store
    pub uploads: UploadStore,
    pub startup_time: DateTime<Utc>,
    /// Largest accepted request body in bytes
    pub body_limit: usize,
}

impl AppState {
    pub fn new(
        sentiment: Arc<dyn SentimentBackend>,
        captioner: Arc<dyn CaptionBackend>,
        uploads: UploadStore,
    ) -> Self {
        Self {
            sentiment,
            captioner,
            uploads,
            startup_time: Utc::now(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.body_limit;

    Router::new()
        .merge(api::ui_routes())
        .merge(api::sentiment_routes())
        .merge(api::image_routes())
        .merge(api::upload_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(api::cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

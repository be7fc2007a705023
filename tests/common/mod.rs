//! Shared helpers for integration tests
#![allow(dead_code)]

use ai_sentiment_analyzer::backend::{
    CaptionBackend, ClassifierBackend, HuggingFaceCaptioner, SentimentBackend,
};
use ai_sentiment_analyzer::db::{init_database_pool, UploadStore};
use ai_sentiment_analyzer::{build_router, AppState};
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Request, StatusCode, Uri},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use std::sync::{Arc, Mutex};

/// Address nothing listens on
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

/// A request seen by a fake upstream
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub uri: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub api_key: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Clone, Default)]
pub struct Recorder {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl Recorder {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// Start an inference stand-in that answers every request with `status` and `body`.
pub async fn fake_upstream(status: u16, body: &'static str) -> (String, Recorder) {
    let recorder = Recorder::default();

    let app = Router::new()
        .fallback(
            move |State(recorder): State<Recorder>, uri: Uri, headers: HeaderMap, bytes: Bytes| async move {
                let header_value = |name: header::HeaderName| {
                    headers
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string)
                };
                recorder.requests.lock().unwrap().push(RecordedRequest {
                    uri: uri.to_string(),
                    authorization: header_value(header::AUTHORIZATION),
                    content_type: header_value(header::CONTENT_TYPE),
                    api_key: header_value(header::HeaderName::from_static("x-goog-api-key")),
                    body: bytes.to_vec(),
                });

                Response::builder()
                    .status(StatusCode::from_u16(status).unwrap())
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap()
            },
        )
        .with_state(recorder.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), recorder)
}

pub fn classifier(url: &str) -> Arc<dyn SentimentBackend> {
    Arc::new(ClassifierBackend::new(
        reqwest::Client::new(),
        url.to_string(),
        None,
    ))
}

pub fn hf_captioner(url: &str) -> Arc<dyn CaptionBackend> {
    Arc::new(HuggingFaceCaptioner::new(
        reqwest::Client::new(),
        url.to_string(),
        None,
    ))
}

pub async fn test_app(
    sentiment: Arc<dyn SentimentBackend>,
    captioner: Arc<dyn CaptionBackend>,
) -> Router {
    let pool = init_database_pool(None)
        .await
        .expect("Failed to create in-memory database");
    build_router(AppState::new(sentiment, captioner, UploadStore::new(pool)))
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

//! Upload metadata endpoints

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use tracing::info;

use super::preflight;
use crate::db::{NewUpload, UploadRecord};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /api/uploads
pub async fn create_upload(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: Result<Json<NewUpload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UploadRecord>)> {
    let Json(mut upload) = payload?;

    upload.file_name = upload.file_name.trim().to_string();
    if upload.file_name.is_empty() {
        return Err(ApiError::Validation("file_name is required".to_string()));
    }
    if upload.file_size < 0 {
        return Err(ApiError::Validation(
            "file_size must not be negative".to_string(),
        ));
    }

    let source_ip = client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    let record = state.uploads.insert(upload, source_ip).await?;

    info!(
        id = %record.id,
        file_name = %record.file_name,
        file_size = record.file_size,
        "Recorded upload"
    );

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/uploads
pub async fn list_uploads(State(state): State<AppState>) -> ApiResult<Json<Vec<UploadRecord>>> {
    Ok(Json(state.uploads.list().await?))
}

/// First `X-Forwarded-For` entry, else the socket peer.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

/// Build upload routes
pub fn upload_routes() -> Router<AppState> {
    Router::new().route(
        "/api/uploads",
        get(list_uploads).post(create_upload).options(preflight),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwarded_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        assert_eq!(
            client_ip(&headers, Some(peer)).as_deref(),
            Some("203.0.113.9")
        );
    }

    #[test]
    fn test_peer_address_fallback() {
        let peer: SocketAddr = "192.168.1.5:4000".parse().unwrap();
        assert_eq!(
            client_ip(&HeaderMap::new(), Some(peer)).as_deref(),
            Some("192.168.1.5")
        );
        assert_eq!(client_ip(&HeaderMap::new(), None), None);
    }
}

//! Image-to-text endpoint
//!
//! Decodes a base64 (optionally data-URL) image, forwards the bytes to the
//! caption backend and returns the caption as `extractedText`.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::preflight;
use crate::backend::ImagePayload;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

static DATA_URL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:image/(\w+);base64,").expect("data URL pattern is valid")
});

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageRequest {
    #[serde(default)]
    pub image_base64: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageResponse {
    pub extracted_text: String,
}

/// POST /analyze-image
pub async fn analyze_image(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeImageRequest>, JsonRejection>,
) -> ApiResult<Json<AnalyzeImageResponse>> {
    let Json(request) = payload?;

    let encoded = request
        .image_base64
        .filter(|data| !data.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Image data is required".to_string()))?;

    let image = decode_image(&encoded)?;
    info!(
        backend = state.captioner.name(),
        bytes = image.bytes.len(),
        mime_type = image.mime_type_or_default(),
        "Analyzing image"
    );

    let extracted_text = state
        .captioner
        .caption(&image)
        .await
        .map_err(|e| ApiError::from_backend(e, "Failed to analyze image"))?;

    info!("Successfully analyzed image");
    Ok(Json(AnalyzeImageResponse { extracted_text }))
}

/// Strip an optional `data:image/<subtype>;base64,` prefix and decode.
pub fn decode_image(encoded: &str) -> ApiResult<ImagePayload> {
    let encoded = encoded.trim();
    let (mime_type, data) = match DATA_URL_PREFIX.captures(encoded) {
        Some(captures) => {
            let prefix_len = captures.get(0).map_or(0, |m| m.end());
            let mime_type = captures.get(1).map(|m| format!("image/{}", m.as_str()));
            (mime_type, &encoded[prefix_len..])
        }
        None => (None, encoded),
    };

    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = general_purpose::STANDARD
        .decode(&compact)
        .or_else(|_| general_purpose::STANDARD_NO_PAD.decode(&compact))
        .map_err(|e| ApiError::Validation(format!("Image data is not valid base64: {}", e)))?;

    if bytes.is_empty() {
        return Err(ApiError::Validation("Image data is required".to_string()));
    }

    Ok(ImagePayload { bytes, mime_type })
}

/// Build image routes
pub fn image_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze-image", post(analyze_image).options(preflight))
        .route("/api/analyze-image", post(analyze_image).options(preflight))
}

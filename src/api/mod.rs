//! HTTP API handlers

pub mod health;
pub mod image;
pub mod sentiment;
pub mod ui;
pub mod uploads;

pub use health::health_routes;
pub use image::image_routes;
pub use sentiment::sentiment_routes;
pub use ui::ui_routes;
pub use uploads::upload_routes;

use axum::http::{header, HeaderName, Method, StatusCode};
use tower_http::cors::{Any, CorsLayer};

/// OPTIONS on any API route; the CORS layer adds the headers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any origin, with the methods and headers browsers may send.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}

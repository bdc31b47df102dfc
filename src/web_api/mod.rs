//! WebAPI - HTTP endpoints
//!
//! ## Responsibilities
//!
//! - HTTP routes for snapshot / qrcode / flip
//! - Request parameter validation
//! - CORS policy for the configured origin

mod routes;

pub use routes::{create_router, CameraQuery};

use axum::http::{HeaderValue, Method};
use axum::response::IntoResponse;
use axum::Json;
use tower_http::cors::CorsLayer;

use crate::error::{Error, Result};
use crate::models::HealthResponse;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// CORS layer allowing GET requests from exactly one origin
pub fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|_| Error::Config(format!("CORS_ORIGIN '{}' is not a valid origin", origin)))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET])
        .allow_credentials(true))
}

//! API Routes

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::Response,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::camera_address::CameraAddress;
use crate::camera_client::CameraClient;
use crate::error::{Error, Result};
use crate::models::QrCodeResponse;
use crate::state::AppState;
use crate::stream_proxy::{StreamProxy, UpstreamAction};

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(super::health_check).fallback(method_not_allowed))
        // Camera
        .route("/:ip/snapshot", get(get_snapshot).fallback(method_not_allowed))
        .route("/:ip/qrcode", get(read_qrcode).fallback(method_not_allowed))
        .route("/:ip/flip", get(flip_camera).fallback(method_not_allowed))
        .fallback(not_found)
        .with_state(state)
}

/// Query parameters shared by the camera endpoints
///
/// `port` is kept as text so a bad value is reported in the error envelope
/// rather than as a bare extractor rejection.
#[derive(Debug, Deserialize)]
pub struct CameraQuery {
    pub port: Option<String>,
}

type IpPath = std::result::Result<Path<String>, PathRejection>;
type PortQuery = std::result::Result<Query<CameraQuery>, QueryRejection>;

/// Validate parameters and wire a proxy for this request
fn proxy_for(state: &AppState, path: IpPath, query: PortQuery) -> Result<StreamProxy> {
    let Path(ip) = path?;
    let Query(query) = query?;
    let address = CameraAddress::from_params(&ip, query.port.as_deref())?;

    let camera = &state.config.camera;
    let client = CameraClient::new(camera)?;
    Ok(StreamProxy::new(client, address, camera.probe_timeout))
}

/// GET /:ip/snapshot
/// Stream the current frame
async fn get_snapshot(
    State(state): State<AppState>,
    path: IpPath,
    query: PortQuery,
) -> Result<Response> {
    let proxy = proxy_for(&state, path, query)?;
    proxy.stream(UpstreamAction::Snapshot).await
}

/// GET /:ip/qrcode
/// Read the QR code visible in the current frame
async fn read_qrcode(
    State(state): State<AppState>,
    path: IpPath,
    query: PortQuery,
) -> Result<Json<QrCodeResponse>> {
    let proxy = proxy_for(&state, path, query)?;
    let payload = proxy.fetch_qr(UpstreamAction::Snapshot).await?;
    Ok(Json(payload.into()))
}

/// GET /:ip/flip
/// Flip the image orientation, then read the QR code from the camera's reply
async fn flip_camera(
    State(state): State<AppState>,
    path: IpPath,
    query: PortQuery,
) -> Result<Json<QrCodeResponse>> {
    let proxy = proxy_for(&state, path, query)?;
    let payload = proxy.fetch_qr(UpstreamAction::Flip).await?;
    Ok(Json(payload.into()))
}

async fn not_found() -> Error {
    Error::NotFound
}

async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}

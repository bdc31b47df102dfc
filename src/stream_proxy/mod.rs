//! StreamProxy - drives one camera CGI action on behalf of a request
//!
//! ## Responsibilities
//!
//! - Build the upstream URL for an [`UpstreamAction`] and a [`CameraAddress`]
//! - Snapshot path: probe the camera, then stream the JPEG body through
//! - QR path: buffer the body, sanitize it and decode the QR payload

use crate::camera_address::CameraAddress;
use crate::camera_client::CameraClient;
use crate::error::{Error, Result};
use crate::jpeg_sanitizer;
use crate::qr_decoder::{self, QrPayload};
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use futures::StreamExt;
use reqwest::Url;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Filename offered to the browser for streamed snapshots
pub const SNAPSHOT_DISPOSITION: &str = "attachment; filename=snapshot.jpeg";

/// Camera CGI actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamAction {
    /// Read the current frame
    Snapshot,
    /// Flip the video orientation
    Flip,
}

impl UpstreamAction {
    /// Path and query of the CGI endpoint
    pub fn path_and_query(&self) -> &'static str {
        match self {
            UpstreamAction::Snapshot => "/cgi-bin/snapshot.cgi?chn=1",
            UpstreamAction::Flip => {
                "/cgi-bin/configManager.cgi?action=setConfig&VideoImageControl[0].Flip=true"
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamAction::Snapshot => "snapshot",
            UpstreamAction::Flip => "flip",
        }
    }

    /// Full upstream URL for a camera
    pub fn url(&self, address: &CameraAddress) -> Result<Url> {
        let raw = format!("http://{}{}", address, self.path_and_query());
        Url::parse(&raw).map_err(|e| Error::validation(format!("path.ip: {}", e)))
    }
}

/// StreamProxy instance
pub struct StreamProxy {
    client: CameraClient,
    address: CameraAddress,
    probe_timeout: Duration,
}

impl StreamProxy {
    pub fn new(client: CameraClient, address: CameraAddress, probe_timeout: Duration) -> Self {
        Self {
            client,
            address,
            probe_timeout,
        }
    }

    /// Stream the action's body to the caller as `image/jpeg`
    ///
    /// Consumes the proxy: the camera client lives inside the response body
    /// and is released when the body finishes or the caller goes away.
    pub async fn stream(self, action: UpstreamAction) -> Result<Response> {
        self.probe().await?;

        let url = action.url(&self.address)?;
        let resp = self.client.stream_get(&url).await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(upstream_error(status, &text));
        }

        let client = self.client;
        let camera = self.address;
        let mut chunks = resp.bytes_stream();
        let body = async_stream::stream! {
            let _client = client;
            let mut total = 0usize;
            while let Some(chunk) = chunks.next().await {
                match chunk {
                    Ok(bytes) => {
                        total += bytes.len();
                        yield Ok(bytes);
                    }
                    Err(e) => {
                        tracing::warn!(camera = %camera, error = %e, "Snapshot stream aborted");
                        yield Err(e);
                        return;
                    }
                }
            }
            tracing::debug!(camera = %camera, size = total, "Snapshot stream finished");
        };

        let mut response = Response::new(Body::from_stream(body));
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg"));
        headers.insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static(SNAPSHOT_DISPOSITION),
        );
        Ok(response)
    }

    /// Run the action and decode the QR code in its (buffered) response
    pub async fn fetch_qr(&self, action: UpstreamAction) -> Result<QrPayload> {
        let url = action.url(&self.address)?;
        let resp = self.client.get(&url).await?;

        if !resp.status.is_success() {
            return Err(upstream_error(resp.status, &resp.text()));
        }

        let image = jpeg_sanitizer::sanitize(&resp.body);
        if image.len() != resp.body.len() {
            tracing::debug!(
                camera = %self.address,
                original = resp.body.len(),
                trimmed = image.len(),
                "Trimmed bytes around JPEG payload"
            );
        }

        let payload = qr_decoder::decode(image)?;
        tracing::info!(
            camera = %self.address,
            action = action.as_str(),
            alias = %payload.alias,
            code = payload.code,
            "QR code decoded"
        );
        Ok(payload)
    }

    /// Bare TCP connect to the camera before committing to a stream
    async fn probe(&self) -> Result<()> {
        let addr = self.address.socket_addr();
        match timeout(self.probe_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => {
                tracing::debug!(addr = %addr, error = %e, "Camera probe failed");
                Err(Error::Connect)
            }
            Err(_) => {
                tracing::debug!(
                    addr = %addr,
                    timeout_ms = self.probe_timeout.as_millis() as u64,
                    "Camera probe timed out"
                );
                Err(Error::Connect)
            }
        }
    }
}

fn upstream_error(status: StatusCode, text: &str) -> Error {
    let text = text.trim();
    let message = if text.is_empty() {
        status.canonical_reason().unwrap_or("Upstream error").to_string()
    } else {
        text.to_string()
    };
    Error::UpstreamHttp { status, message }
}

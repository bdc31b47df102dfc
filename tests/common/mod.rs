//! Shared fixtures for the gateway integration tests

#![allow(dead_code)]

use std::io::Cursor;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use camgate::models::ErrorEnvelope;
use camgate::state::CameraConfig;
use camgate::{AppConfig, AppState};
use image::{GrayImage, ImageFormat, Luma};
use qrcodegen::{QrCode, QrCodeEcc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceExt;
use wiremock::matchers::{any, header_regex, method};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "s3cret";
pub const CHALLENGE: &str =
    r#"Digest realm="Login to camera", qop="auth", nonce="5f2c9a1e8b", opaque="7d1b""#;

pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origin: "http://localhost:3000".to_string(),
        camera: CameraConfig {
            username: USERNAME.to_string(),
            password: PASSWORD.to_string(),
            probe_timeout: Duration::from_millis(500),
            connect_timeout: Duration::from_millis(500),
        },
    }
}

pub fn test_router() -> Router {
    camgate::web_api::create_router(AppState::new(test_config()))
}

/// Start a mock camera that challenges every unauthenticated request
pub async fn mock_camera() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(401).insert_header("WWW-Authenticate", CHALLENGE),
        )
        .with_priority(10)
        .mount(&server)
        .await;
    server
}

/// Matcher prefix for requests carrying our Digest answer
pub fn authenticated() -> MockBuilder {
    Mock::given(method("GET")).and(header_regex(
        "authorization",
        r#"^Digest .*username="admin""#,
    ))
}

/// Port of a local address nobody listens on
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Bytes a truncated camera sends before stalling or hanging up
pub const PARTIAL_BODY: &[u8] = b"\xff\xd8\xff\xe0partial-frame";

/// Camera that promises a long snapshot body but only sends `PARTIAL_BODY`
///
/// With `hang_up` the socket is closed right after the partial body,
/// otherwise it stays open until the gateway side closes it. Every request
/// connection reports on the returned channel once the gateway disconnects.
pub async fn truncating_camera(hang_up: bool) -> (u16, mpsc::UnboundedReceiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (closed_tx, closed_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let closed_tx = closed_tx.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                    if request.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let head = concat!(
                    "HTTP/1.1 200 OK\r\n",
                    "Content-Type: image/jpeg\r\n",
                    "Content-Length: 4096\r\n\r\n",
                );
                socket.write_all(head.as_bytes()).await.unwrap();
                socket.write_all(PARTIAL_BODY).await.unwrap();
                socket.flush().await.unwrap();
                if hang_up {
                    return;
                }

                while let Ok(n) = socket.read(&mut buf).await {
                    if n == 0 {
                        break;
                    }
                }
                let _ = closed_tx.send(());
            });
        }
    });

    (port, closed_rx)
}

pub async fn send(router: Router, uri: &str) -> axum::response::Response {
    router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn envelope(resp: axum::response::Response) -> (StatusCode, ErrorEnvelope) {
    let status = resp.status();
    let body = body_bytes(resp).await;
    (status, serde_json::from_slice(&body).unwrap())
}

/// Render `text` as a QR code and encode it as JPEG
pub fn qr_jpeg(text: &str) -> Vec<u8> {
    const MODULE_PX: u32 = 8;
    const QUIET_ZONE: i32 = 4;

    let qr = QrCode::encode_text(text, QrCodeEcc::Medium).unwrap();
    let side = (qr.size() as u32 + 2 * QUIET_ZONE as u32) * MODULE_PX;

    let img = GrayImage::from_fn(side, side, |x, y| {
        let mx = (x / MODULE_PX) as i32 - QUIET_ZONE;
        let my = (y / MODULE_PX) as i32 - QUIET_ZONE;
        if qr.get_module(mx, my) {
            Luma([0])
        } else {
            Luma([255])
        }
    });
    encode_jpeg(img)
}

pub fn blank_jpeg() -> Vec<u8> {
    encode_jpeg(GrayImage::from_pixel(64, 48, Luma([200])))
}

fn encode_jpeg(img: GrayImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .unwrap();
    buf
}

//! camgate Library
//!
//! Local HTTP gateway in front of an IP camera's CGI interface.
//!
//! ## Architecture
//!
//! 1. CameraAddress - IPv4 + optional port validation
//! 2. CameraClient - Digest-authenticated, request-scoped HTTP client
//! 3. JpegSanitizer - trims framing around the JPEG payload
//! 4. QrDecoder - image decode + QR detection + `alias-code` parsing
//! 5. StreamProxy - snapshot streaming and buffered QR read-out
//! 6. WebAPI - HTTP endpoints
//!
//! Every failure is an [`Error`] and is rendered as one JSON envelope.

pub mod camera_address;
pub mod camera_client;
pub mod jpeg_sanitizer;
pub mod qr_decoder;
pub mod stream_proxy;
pub mod web_api;
pub mod models;
pub mod error;
pub mod state;

pub use error::{Error, Result};
pub use state::{AppConfig, AppState};

//! Shared models and types for camgate
//!
//! Wire shapes returned to inbound callers.

use crate::qr_decoder::QrPayload;
use serde::{Deserialize, Serialize};

/// Error envelope metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMeta {
    pub code: u16,
    pub title: String,
    pub message: String,
}

/// Error envelope: the only body ever returned for a failed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub meta: ErrorMeta,
    /// Always an empty object
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl ErrorEnvelope {
    pub fn new(code: u16, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            meta: ErrorMeta {
                code,
                title: title.into(),
                message: message.into(),
            },
            data: serde_json::Map::new(),
        }
    }
}

/// Decoded QR code response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrCodeResponse {
    pub alias: String,
    #[serde(rename = "qrCode")]
    pub qr_code: i64,
}

impl From<QrPayload> for QrCodeResponse {
    fn from(payload: QrPayload) -> Self {
        Self {
            alias: payload.alias,
            qr_code: payload.code,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

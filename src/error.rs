//! Error handling for camgate
//!
//! Every failure in the pipeline ends up here and is rendered as the
//! `{meta, data}` envelope defined in [`crate::models::ErrorEnvelope`].

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ErrorEnvelope;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Message reported for any outbound connection failure
pub const CONNECT_FAILURE_MESSAGE: &str = "Failed connecting to server";

/// Title used for inbound request validation failures
pub const INVALID_REQUEST_TITLE: &str = "Invalid Request";

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Camera could not be reached (refused, unreachable, probe failed)
    #[error("Failed connecting to server")]
    Connect,

    /// Camera answered with a non-success status
    #[error("{message}")]
    UpstreamHttp { status: StatusCode, message: String },

    /// Upstream body is not a decodable image
    #[error("{0}")]
    Decode(String),

    /// Image decoded but carries no readable QR code
    #[error("No QR Code Found")]
    QrNotFound,

    /// QR code text is not an `alias-code` pair
    #[error("{0}")]
    InvalidPayload(String),

    /// Malformed path or query parameters
    #[error("{}", .0.join(";"))]
    Validation(Vec<String>),

    /// Transport error after the connection was established
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),

    /// No route matches the request path
    #[error("Not Found")]
    NotFound,

    /// Route exists but not for this method
    #[error("Method Not Allowed")]
    MethodNotAllowed,
}

impl Error {
    /// Shorthand for a single-message validation failure
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(vec![msg.into()])
    }

    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Connect => StatusCode::INTERNAL_SERVER_ERROR,
            Error::UpstreamHttp { status, .. } => *status,
            Error::Decode(_) => StatusCode::BAD_REQUEST,
            Error::QrNotFound => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidPayload(_) | Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Http(_) => StatusCode::BAD_GATEWAY,
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Envelope title; only inbound validation failures carry one
    pub fn title(&self) -> &'static str {
        match self {
            Error::Validation(_) => INVALID_REQUEST_TITLE,
            _ => "",
        }
    }

    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope::new(self.status().as_u16(), self.title(), self.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            tracing::debug!(error = %e, "Camera connection failed");
            Error::Connect
        } else {
            Error::Http(e)
        }
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::validation(format!("path: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::validation(format!("query: {}", rejection.body_text()))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let envelope = self.to_envelope();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                message = %envelope.meta.message,
                "Request error"
            );
        } else {
            tracing::warn!(
                status = %status,
                message = %envelope.meta.message,
                "Request rejected"
            );
        }

        (status, Json(envelope)).into_response()
    }
}

//! CameraClient - Digest-authenticated HTTP client for the camera CGI
//!
//! One client is built per inbound request and dropped when the request is
//! done. Connection pooling is disabled, so dropping the client (and any
//! response it produced) closes the upstream connection.

use crate::error::{Error, Result};
use crate::state::CameraConfig;
use bytes::Bytes;
use reqwest::header::{HeaderMap, AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::{Client, StatusCode, Url};

/// Fully buffered upstream response
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Body as text, used for upstream error messages
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Request-scoped camera client
pub struct CameraClient {
    client: Client,
    username: String,
    password: String,
}

impl CameraClient {
    /// Create a client carrying the configured camera credentials
    pub fn new(config: &CameraConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!(username = %config.username, "Camera client acquired");

        Ok(Self {
            client,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// GET and buffer the whole body
    pub async fn get(&self, url: &Url) -> Result<UpstreamResponse> {
        let resp = self.send(url).await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;

        tracing::debug!(
            url = %url,
            status = %status,
            size = body.len(),
            "Camera response buffered"
        );

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }

    /// GET without consuming the body
    ///
    /// Status and headers are available on the returned response; the body
    /// is pulled chunk by chunk via `bytes_stream()`.
    pub async fn stream_get(&self, url: &Url) -> Result<reqwest::Response> {
        let resp = self.send(url).await?;
        tracing::debug!(url = %url, status = %resp.status(), "Camera stream opened");
        Ok(resp)
    }

    /// Send a GET, answering a Digest challenge once if the camera asks for it
    async fn send(&self, url: &Url) -> Result<reqwest::Response> {
        let resp = self.client.get(url.clone()).send().await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        let Some(challenge) = digest_challenge(resp.headers()) else {
            return Ok(resp);
        };
        drop(resp);

        let authorization = self.answer_challenge(url, &challenge)?;
        let resp = self
            .client
            .get(url.clone())
            .header(AUTHORIZATION, authorization)
            .send()
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(url = %url, "Camera rejected digest credentials");
        }

        Ok(resp)
    }

    /// Build the `Authorization` header value for a Digest challenge
    fn answer_challenge(&self, url: &Url, challenge: &str) -> Result<String> {
        let uri = request_uri(url);
        let context = digest_auth::AuthContext::new(
            self.username.as_str(),
            self.password.as_str(),
            uri.as_str(),
        );

        let mut prompt = digest_auth::parse(challenge).map_err(digest_error)?;
        let answer = prompt.respond(&context).map_err(digest_error)?;
        Ok(answer.to_header_string())
    }
}

impl Drop for CameraClient {
    fn drop(&mut self) {
        tracing::debug!("Camera client released");
    }
}

/// `WWW-Authenticate` value if it is a Digest challenge
fn digest_challenge(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| {
            v.trim_start()
                .get(..6)
                .is_some_and(|scheme| scheme.eq_ignore_ascii_case("digest"))
        })
        .map(str::to_string)
}

/// Path and query, as hashed into the Digest response
fn request_uri(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

fn digest_error(e: digest_auth::Error) -> Error {
    Error::UpstreamHttp {
        status: StatusCode::UNAUTHORIZED,
        message: format!("Digest authentication failed: {}", e),
    }
}

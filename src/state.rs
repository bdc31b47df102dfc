//! Application state
//!
//! Configuration is read once at start-up and shared read-only with handlers.

use crate::error::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

/// Camera credentials and transport bounds
#[derive(Clone)]
pub struct CameraConfig {
    /// Digest username
    pub username: String,
    /// Digest password (no default)
    pub password: String,
    /// Bound for the bare TCP liveness probe before streaming
    pub probe_timeout: Duration,
    /// Connect timeout for the upstream HTTP client
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for CameraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .field("probe_timeout", &self.probe_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// The single origin allowed by CORS
    pub cors_origin: String,
    /// Upstream camera settings
    pub camera: CameraConfig,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let password = lookup("CAMERA_PASSWORD")
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::Config("CAMERA_PASSWORD must be set".to_string()))?;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 8081)?,
            cors_origin: lookup("CORS_ORIGIN")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            camera: CameraConfig {
                username: lookup("CAMERA_USERNAME").unwrap_or_else(|| "admin".to_string()),
                password,
                probe_timeout: Duration::from_millis(parse_or(
                    &lookup,
                    "CAMERA_PROBE_TIMEOUT_MS",
                    3000,
                )?),
                connect_timeout: Duration::from_millis(parse_or(
                    &lookup,
                    "CAMERA_CONNECT_TIMEOUT_MS",
                    5000,
                )?),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{key} has invalid value '{raw}'"))),
        None => Ok(default),
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[("CAMERA_PASSWORD", "secret")])).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8081);
        assert_eq!(config.camera.username, "admin");
        assert_eq!(config.camera.password, "secret");
        assert_eq!(config.camera.probe_timeout, Duration::from_millis(3000));
    }

    #[test]
    fn test_password_required() {
        let result = AppConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_port() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("CAMERA_PASSWORD", "secret"),
            ("PORT", "eighty"),
        ]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_password_not_in_debug_output() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("CAMERA_PASSWORD", "hunter2")])).unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}

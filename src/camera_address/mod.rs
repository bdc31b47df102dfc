//! CameraAddress - camera network location
//!
//! ## Responsibilities
//!
//! - Validate the `{ip}` path segment as an IPv4 literal
//! - Validate the optional `port` query parameter
//! - Render the `host[:port]` network location used in upstream URLs

use crate::error::{Error, Result};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// Port assumed by the liveness probe when none is given (plain HTTP)
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Validated camera address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraAddress {
    pub host: Ipv4Addr,
    pub port: Option<u16>,
}

impl CameraAddress {
    /// Resolve an address from an ip string and an already-parsed port
    pub fn resolve(ip: &str, port: Option<i64>) -> Result<Self> {
        let host = parse_host(ip);
        let port = port.map(check_port).transpose();
        collect(host, port)
    }

    /// Resolve an address from raw request parameters
    ///
    /// Both parameters are checked so every problem is reported at once.
    pub fn from_params(ip: &str, port: Option<&str>) -> Result<Self> {
        let host = parse_host(ip);
        let port = port
            .map(|raw| {
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| format!("query.port: value '{raw}' is not a valid integer"))
                    .and_then(check_port)
            })
            .transpose();
        collect(host, port)
    }

    /// Socket address for a bare TCP connection to the camera
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(
            self.host,
            self.port.unwrap_or(DEFAULT_HTTP_PORT),
        ))
    }
}

impl fmt::Display for CameraAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => write!(f, "{}", self.host),
        }
    }
}

fn parse_host(ip: &str) -> std::result::Result<Ipv4Addr, String> {
    ip.parse::<Ipv4Addr>()
        .map_err(|_| format!("path.ip: value '{ip}' is not a valid IPv4 address"))
}

fn check_port(port: i64) -> std::result::Result<u16, String> {
    if port < 1 {
        return Err(format!("query.port: value {port} must be greater than 0"));
    }
    u16::try_from(port).map_err(|_| format!("query.port: value {port} must be at most 65535"))
}

fn collect(
    host: std::result::Result<Ipv4Addr, String>,
    port: std::result::Result<Option<u16>, String>,
) -> Result<CameraAddress> {
    match (host, port) {
        (Ok(host), Ok(port)) => Ok(CameraAddress { host, port }),
        (host, port) => Err(Error::Validation(
            [host.err(), port.err()].into_iter().flatten().collect(),
        )),
    }
}

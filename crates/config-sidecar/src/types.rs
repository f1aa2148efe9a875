//! Core types for the config sidecar

use std::net::IpAddr;

pub const DEFAULT_ENDPOINT: &str = "https://api.viteset.com";
pub const DEFAULT_FRESH_SECS: u64 = 15;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 80;

/// Which refresh strategy drives the sidecar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fetch on request, revalidate when stale.
    OnDemand,
    /// Poll one pinned blob in the background, serve the latest value.
    Subscribe,
}

impl Mode {
    /// Parse a mode name as given in the environment.
    pub fn parse(name: &str) -> Option<Mode> {
        match name {
            "on-demand" => Some(Mode::OnDemand),
            "subscribe" => Some(Mode::Subscribe),
            _ => None,
        }
    }
}

/// Configuration for the sidecar, built once at startup and passed down.
#[derive(Debug, Clone)]
pub struct SidecarConfig {
    pub mode: Mode,
    pub secret: String,
    pub endpoint: String,
    /// Freshness window (on-demand) or polling interval (subscribe), seconds.
    pub fresh_secs: u64,
    /// If set, the request path is ignored and this blob is always served.
    pub only_key: Option<String>,
    pub host: IpAddr,
    pub port: u16,
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            mode: Mode::OnDemand,
            secret: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            fresh_secs: DEFAULT_FRESH_SECS,
            only_key: None,
            host: DEFAULT_HOST.parse().expect("default host is a valid address"),
            port: DEFAULT_PORT,
        }
    }
}

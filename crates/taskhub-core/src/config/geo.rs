//! Geolocation provider configuration.

use serde::{Deserialize, Serialize};

/// Which geolocation provider backs the risk signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoProviderKind {
    /// External HTTP lookup service.
    Http,
    /// Static in-process lists (development and tests).
    Static,
    /// No provider; every signal resolves to unknown/false.
    Disabled,
}

impl Default for GeoProviderKind {
    fn default() -> Self {
        Self::Disabled
    }
}

/// Geolocation provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoConfig {
    /// Provider selection.
    #[serde(default)]
    pub provider: GeoProviderKind,
    /// Base URL of the HTTP lookup service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// IPs the static provider reports as VPN/proxy exits.
    #[serde(default)]
    pub static_vpn_ips: Vec<String>,
    /// IPs the static provider reports as suspicious locations.
    #[serde(default)]
    pub static_suspicious_ips: Vec<String>,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            provider: GeoProviderKind::default(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            static_vpn_ips: Vec::new(),
            static_suspicious_ips: Vec::new(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8200".to_string()
}

fn default_timeout() -> u64 {
    2
}

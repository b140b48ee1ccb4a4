//! Session lifecycle configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::window::SlidingWindow;

/// Session issuance, expiry, and concurrency configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum simultaneously active sessions per user. Creating one more
    /// evicts the least-recently-active session.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_sessions: u32,
    /// Sliding inactivity timeout in minutes. Every validated access moves
    /// the expiry forward by this much.
    #[serde(default = "default_session_timeout")]
    pub session_timeout_minutes: u64,
    /// Window for the suspicious creation-burst check, in seconds.
    #[serde(default = "default_burst_window")]
    pub creation_burst_window_seconds: u64,
    /// Session creations within the burst window that flag the new session.
    #[serde(default = "default_burst_threshold")]
    pub creation_burst_threshold: u32,
    /// Interval for expired session cleanup in minutes.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_minutes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sessions: default_max_concurrent(),
            session_timeout_minutes: default_session_timeout(),
            creation_burst_window_seconds: default_burst_window(),
            creation_burst_threshold: default_burst_threshold(),
            cleanup_interval_minutes: default_cleanup_interval(),
        }
    }
}

impl SessionConfig {
    /// The sliding expiry span.
    pub fn session_timeout(&self) -> Duration {
        Duration::minutes(self.session_timeout_minutes as i64)
    }

    /// Window/threshold pair for the creation-burst suspicion check.
    pub fn creation_burst_window(&self) -> SlidingWindow {
        SlidingWindow::new(
            Duration::seconds(self.creation_burst_window_seconds as i64),
            self.creation_burst_threshold,
        )
    }
}

fn default_max_concurrent() -> u32 {
    5
}

fn default_session_timeout() -> u64 {
    120
}

fn default_burst_window() -> u64 {
    60
}

fn default_burst_threshold() -> u32 {
    3
}

fn default_cleanup_interval() -> u64 {
    15
}

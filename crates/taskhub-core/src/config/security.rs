//! Failed-login tracking and account-lockout configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::window::SlidingWindow;

/// Brute-force detection and lockout policy configuration.
///
/// Every threshold and window the failed-login tracker consults lives here
/// so tests can exercise edge thresholds without waiting real time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Failed attempts within the attempt window that trigger a lockout.
    #[serde(default = "default_max_failed")]
    pub max_failed_attempts: u32,
    /// How long a lockout holds after the most recent qualifying attempt,
    /// in minutes.
    #[serde(default = "default_lockout_duration")]
    pub lockout_duration_minutes: u64,
    /// Trailing window over which failed attempts are counted, in minutes.
    #[serde(default = "default_attempt_window")]
    pub attempt_window_minutes: u64,
    /// Total attempts from one IP in the IP-activity window that make the
    /// IP (and its attempts) suspicious.
    #[serde(default = "default_suspicious_ip")]
    pub suspicious_ip_threshold: u32,
    /// Window for the rapid-successive-attempts risk factor, in seconds.
    #[serde(default = "default_rapid_window")]
    pub rapid_attempt_window_seconds: u64,
    /// Attempt count for the rapid-successive-attempts risk factor.
    #[serde(default = "default_rapid_threshold")]
    pub rapid_attempt_threshold: u32,
    /// Window for the multiple-accounts-from-one-IP risk factor, in minutes.
    #[serde(default = "default_multi_account_window")]
    pub multi_account_window_minutes: u64,
    /// Distinct identities from one IP for the multiple-accounts factor.
    #[serde(default = "default_multi_account_threshold")]
    pub multi_account_threshold: u32,
    /// Trailing window for per-IP activity aggregation, in hours.
    #[serde(default = "default_ip_activity_window")]
    pub ip_activity_window_hours: u64,
    /// Days after which old attempt rows are pruned by the worker.
    #[serde(default = "default_attempt_retention")]
    pub attempt_retention_days: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: default_max_failed(),
            lockout_duration_minutes: default_lockout_duration(),
            attempt_window_minutes: default_attempt_window(),
            suspicious_ip_threshold: default_suspicious_ip(),
            rapid_attempt_window_seconds: default_rapid_window(),
            rapid_attempt_threshold: default_rapid_threshold(),
            multi_account_window_minutes: default_multi_account_window(),
            multi_account_threshold: default_multi_account_threshold(),
            ip_activity_window_hours: default_ip_activity_window(),
            attempt_retention_days: default_attempt_retention(),
        }
    }
}

impl SecurityConfig {
    /// Window/threshold pair for lockout counting.
    pub fn attempt_window(&self) -> SlidingWindow {
        SlidingWindow::new(
            Duration::minutes(self.attempt_window_minutes as i64),
            self.max_failed_attempts,
        )
    }

    /// Window/threshold pair for the rapid-successive-attempts factor.
    pub fn rapid_attempt_window(&self) -> SlidingWindow {
        SlidingWindow::new(
            Duration::seconds(self.rapid_attempt_window_seconds as i64),
            self.rapid_attempt_threshold,
        )
    }

    /// Window/threshold pair for the multiple-accounts-from-one-IP factor.
    pub fn multi_account_window(&self) -> SlidingWindow {
        SlidingWindow::new(
            Duration::minutes(self.multi_account_window_minutes as i64),
            self.multi_account_threshold,
        )
    }

    /// Window/threshold pair for per-IP activity (suspicious-IP detection).
    pub fn ip_activity_window(&self) -> SlidingWindow {
        SlidingWindow::new(
            Duration::hours(self.ip_activity_window_hours as i64),
            self.suspicious_ip_threshold,
        )
    }

    /// How long a lockout holds after the most recent qualifying attempt.
    pub fn lockout_duration(&self) -> Duration {
        Duration::minutes(self.lockout_duration_minutes as i64)
    }

    /// How far back the store must look to derive lockout status.
    ///
    /// An attempt can anchor a lockout for `lockout_duration` after it was
    /// made, and the counting window trails that anchor by
    /// `attempt_window`, so both spans are needed.
    pub fn lockout_lookback(&self) -> Duration {
        self.lockout_duration() + Duration::minutes(self.attempt_window_minutes as i64)
    }
}

fn default_max_failed() -> u32 {
    5
}

fn default_lockout_duration() -> u64 {
    30
}

fn default_attempt_window() -> u64 {
    15
}

fn default_suspicious_ip() -> u32 {
    10
}

fn default_rapid_window() -> u64 {
    60
}

fn default_rapid_threshold() -> u32 {
    3
}

fn default_multi_account_window() -> u64 {
    60
}

fn default_multi_account_threshold() -> u32 {
    5
}

fn default_ip_activity_window() -> u64 {
    24
}

fn default_attempt_retention() -> u64 {
    90
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_policy() {
        let cfg = SecurityConfig::default();
        assert_eq!(cfg.max_failed_attempts, 5);
        assert_eq!(cfg.lockout_duration_minutes, 30);
        assert_eq!(cfg.attempt_window_minutes, 15);
        assert_eq!(cfg.suspicious_ip_threshold, 10);
    }

    #[test]
    fn test_lockout_lookback_covers_both_spans() {
        let cfg = SecurityConfig::default();
        assert_eq!(cfg.lockout_lookback(), Duration::minutes(45));
    }
}

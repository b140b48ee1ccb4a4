//! Failed-login reporting types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::model::FailedLoginAttempt;

/// Attempt count for one targeted identity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IdentityCount {
    /// The targeted identity.
    pub identity: String,
    /// Failed attempts against it in the report range.
    pub count: i64,
}

/// Attempt count for one source IP.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IpCount {
    /// The source IP address.
    pub ip_address: String,
    /// Failed attempts from it in the report range.
    pub count: i64,
}

/// An IP whose activity crossed the suspicious threshold.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SuspiciousIp {
    /// The source IP address.
    pub ip_address: String,
    /// Total attempts from it inside the activity window.
    pub attempts: i64,
    /// Most recent attempt from it.
    pub last_attempt: DateTime<Utc>,
}

/// Aggregate report over failed-login activity in a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedLoginSummary {
    /// Start of the report range (inclusive).
    pub from: DateTime<Utc>,
    /// End of the report range (exclusive).
    pub to: DateTime<Utc>,
    /// Total failed attempts in the range.
    pub total_attempts: i64,
    /// Distinct source IPs in the range.
    pub unique_ips: i64,
    /// Attempts the risk policy flagged as suspicious.
    pub suspicious_attempts: i64,
    /// Most-targeted identities, descending.
    pub top_identities: Vec<IdentityCount>,
    /// Most-active source IPs, descending.
    pub top_ips: Vec<IpCount>,
    /// Most recent attempts in the range, newest first.
    pub recent_attempts: Vec<FailedLoginAttempt>,
}

//! Session security reporting types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Session count for one resolved location.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LocationCount {
    /// "City, Country" label.
    pub location: String,
    /// Sessions created from it in the report window.
    pub count: i64,
}

/// Session count for one device class.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeviceTypeCount {
    /// Device class label.
    pub device_type: String,
    /// Sessions created on it in the report window.
    pub count: i64,
}

/// Aggregate security view over sessions created in a trailing window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSecuritySummary {
    /// Start of the report window (inclusive).
    pub from: DateTime<Utc>,
    /// End of the report window (exclusive).
    pub to: DateTime<Utc>,
    /// Sessions created in the window.
    pub total_sessions: i64,
    /// Sessions flagged suspicious.
    pub suspicious_sessions: i64,
    /// Distinct resolved locations.
    pub unique_locations: i64,
    /// Locations of suspicious sessions, for review.
    pub unusual_locations: Vec<String>,
    /// Session counts per device class, descending.
    pub device_breakdown: Vec<DeviceTypeCount>,
}

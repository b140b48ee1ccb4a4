//! Failed-login attempt entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use taskhub_core::types::geo::GeoLocation;

/// One failed credential check, recorded as an append-only fact.
///
/// Rows are never updated after insert. An administrative unlock stamps
/// `cleared_at` on the rows inside the lockout lookback window instead of
/// deleting them, so the audit trail survives the unlock.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FailedLoginAttempt {
    /// Unique attempt identifier.
    pub id: Uuid,
    /// The identity (email or username) that was attempted. The identity
    /// does not have to exist; attempts against unknown accounts are
    /// recorded the same way.
    pub identity: String,
    /// Source IP address.
    pub ip_address: String,
    /// User-Agent header value, if the client sent one.
    pub user_agent: Option<String>,
    /// Failure reason reported by the credential check.
    pub failure_reason: Option<String>,

    // -- Resolved geolocation (unknown when the provider had no answer) --
    /// Country name.
    pub country: Option<String>,
    /// City name.
    pub city: Option<String>,
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: Option<String>,
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,

    // -- Risk assessment, computed before the row is written --
    /// Whether the risk policy flagged this attempt for review.
    pub suspicious: bool,
    /// Labels of the risk factors present on this attempt.
    pub risk_factors: Vec<String>,

    /// Set by an administrative unlock; cleared rows no longer count
    /// toward lockout derivation but remain visible to IP aggregates.
    pub cleared_at: Option<DateTime<Utc>>,
    /// When the attempt happened.
    pub attempted_at: DateTime<Utc>,
}

impl FailedLoginAttempt {
    /// The resolved location, if the provider knew one.
    pub fn location(&self) -> Option<GeoLocation> {
        match (
            &self.country,
            &self.city,
            &self.country_code,
            self.latitude,
            self.longitude,
        ) {
            (Some(country), Some(city), Some(code), Some(lat), Some(lon)) => Some(GeoLocation {
                country: country.clone(),
                city: city.clone(),
                country_code: code.clone(),
                latitude: lat,
                longitude: lon,
            }),
            _ => None,
        }
    }
}

/// Data required to record a new failed-login attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordFailedLoginAttempt {
    /// The identity that was attempted.
    pub identity: String,
    /// Source IP address.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// Failure reason reported by the credential check.
    pub failure_reason: Option<String>,
    /// Resolved geolocation, if available.
    pub location: Option<GeoLocation>,
    /// Whether the risk policy flagged this attempt.
    pub suspicious: bool,
    /// Labels of the risk factors present on this attempt.
    pub risk_factors: Vec<String>,
}

//! User session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::device::DeviceInfo;

/// An authenticated user session.
///
/// Sessions are created on login and terminated by expiry, explicit logout,
/// concurrency eviction, or security action. Termination is absorbing: once
/// `is_active` goes false it never returns to true, and the row keeps its
/// full history as an audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSession {
    /// Unique session identifier.
    pub id: Uuid,
    /// Opaque, unguessable session token presented by the client.
    pub token: String,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// IP address from which the session was created.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,

    // -- Parsed device information --
    /// Device class: `Mobile`, `Tablet`, `Desktop`, or `Unknown`.
    pub device_type: String,
    /// Browser family, or `Unknown`.
    pub browser: String,
    /// Operating system family, or `Unknown`.
    pub os: String,

    // -- Resolved geolocation --
    /// Country name, if resolved.
    pub country: Option<String>,
    /// City name, if resolved.
    pub city: Option<String>,

    // -- Suspicion --
    /// Whether this session was flagged suspicious (at creation or later).
    pub suspicious: bool,
    /// Why it was flagged.
    pub suspicious_notes: Option<String>,

    // -- Lifecycle --
    /// Whether the session is currently active.
    pub is_active: bool,
    /// When the session was terminated, if it was.
    pub terminated_at: Option<DateTime<Utc>>,
    /// Reason the session was terminated.
    pub termination_reason: Option<String>,
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
    /// Last validated activity.
    pub last_activity: DateTime<Utc>,
    /// Sliding expiry; always `last_activity + session_timeout` while active.
    pub expires_at: DateTime<Utc>,
}

impl UserSession {
    /// Whether the sliding expiry has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whether the session is active and within its expiry.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now)
    }

    /// "City, Country" label, if the location was resolved.
    pub fn location_label(&self) -> Option<String> {
        match (&self.city, &self.country) {
            (Some(city), Some(country)) => Some(format!("{city}, {country}")),
            _ => None,
        }
    }
}

/// Data required to persist a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserSession {
    /// The session token to store.
    pub token: String,
    /// The user logging in.
    pub user_id: Uuid,
    /// Client IP address.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// Parsed device information.
    pub device: DeviceInfo,
    /// Resolved country, if any.
    pub country: Option<String>,
    /// Resolved city, if any.
    pub city: Option<String>,
    /// Whether creation-time checks flagged the session.
    pub suspicious: bool,
    /// Why it was flagged.
    pub suspicious_notes: Option<String>,
    /// Initial expiry (`now + session_timeout`).
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(now: DateTime<Utc>) -> UserSession {
        UserSession {
            id: Uuid::new_v4(),
            token: "tok".into(),
            user_id: Uuid::new_v4(),
            ip_address: "10.0.0.1".into(),
            user_agent: None,
            device_type: "Desktop".into(),
            browser: "Firefox".into(),
            os: "Linux".into(),
            country: None,
            city: None,
            suspicious: false,
            suspicious_notes: None,
            is_active: true,
            terminated_at: None,
            termination_reason: None,
            created_at: now,
            last_activity: now,
            expires_at: now + Duration::minutes(120),
        }
    }

    #[test]
    fn test_live_until_expiry() {
        let now = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let s = session(now);
        assert!(s.is_live(now));
        assert!(s.is_live(now + Duration::minutes(119)));
        assert!(!s.is_live(now + Duration::minutes(120)));
    }

    #[test]
    fn test_terminated_is_never_live() {
        let now = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let mut s = session(now);
        s.is_active = false;
        s.terminated_at = Some(now);
        s.termination_reason = Some("User logout".into());
        assert!(!s.is_live(now));
    }

    #[test]
    fn test_location_label_requires_both_parts() {
        let now = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let mut s = session(now);
        assert_eq!(s.location_label(), None);
        s.city = Some("Osaka".into());
        assert_eq!(s.location_label(), None);
        s.country = Some("Japan".into());
        assert_eq!(s.location_label().as_deref(), Some("Osaka, Japan"));
    }
}

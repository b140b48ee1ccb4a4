//! Derived account lockout status.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use taskhub_core::types::window::SlidingWindow;

/// Lockout status for an identity, derived on demand from the attempt log.
///
/// This value is never persisted. There is no cached "locked" flag anywhere
/// in the system; every caller recomputes from the append-only log so the
/// status can never desynchronize from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountLockoutStatus {
    /// The identity the status describes.
    pub identity: String,
    /// Whether credential verification should currently be refused.
    pub is_locked: bool,
    /// Failed attempts inside the counting window.
    pub failed_attempts: u64,
    /// Timestamp of the most recent attempt considered.
    pub last_attempt: Option<DateTime<Utc>>,
    /// When the lockout lifts. Present only while locked.
    pub lockout_until: Option<DateTime<Utc>>,
}

impl AccountLockoutStatus {
    /// An unlocked status with no recorded attempts.
    pub fn clear(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            is_locked: false,
            failed_attempts: 0,
            last_attempt: None,
            lockout_until: None,
        }
    }

    /// Derive the status from raw attempt timestamps.
    ///
    /// The counting window is anchored at the most recent attempt rather
    /// than at `now`: a burst of failures keeps the account locked for
    /// exactly `lockout_duration` after the last one, even once the burst
    /// has aged past the counting window relative to `now`. `timestamps`
    /// must cover the lockout lookback span (counting window plus lockout
    /// duration); order does not matter.
    pub fn derive(
        identity: impl Into<String>,
        timestamps: &[DateTime<Utc>],
        now: DateTime<Utc>,
        window: SlidingWindow,
        lockout_duration: Duration,
    ) -> Self {
        let identity = identity.into();
        let Some(last) = timestamps.iter().max().copied() else {
            return Self::clear(identity);
        };

        let failed_attempts = window.count_within(timestamps, last);
        let threshold_met = window.is_met(failed_attempts);
        let until = last + lockout_duration;
        let is_locked = threshold_met && now < until;

        Self {
            identity,
            is_locked,
            failed_attempts,
            last_attempt: Some(last),
            lockout_until: is_locked.then_some(until),
        }
    }
}

//! Failed-login tracker: attempt logging, derived lockout, IP reputation,
//! and reporting.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use taskhub_core::config::security::SecurityConfig;
use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_database::repositories::login_attempt::LoginAttemptRepository;
use taskhub_entity::login_attempt::lockout::AccountLockoutStatus;
use taskhub_entity::login_attempt::model::{FailedLoginAttempt, RecordFailedLoginAttempt};
use taskhub_entity::login_attempt::summary::{FailedLoginSummary, SuspiciousIp};

use crate::geo::GeoResolver;

use super::risk::{self, RiskSignals};

/// Identities ranked in the failed-login summary.
const TOP_COUNT: i64 = 5;
/// Recent attempts included in the failed-login summary.
const RECENT_COUNT: i64 = 10;

/// Tracks failed credential checks and derives account lockout status.
///
/// Lockout is a pure function of the append-only attempt log; nothing here
/// caches a "locked" flag. The authentication flow must call
/// [`Self::is_account_locked`] *before* comparing credentials (a post-check
/// leaks a timing oracle distinguishing "locked" from "wrong password"),
/// and [`Self::log_attempt`] on every failed check.
#[derive(Clone)]
pub struct FailedLoginTracker {
    /// Attempt log repository.
    attempts: Arc<LoginAttemptRepository>,
    /// Geolocation resolver (degrading).
    geo: GeoResolver,
    /// Security policy configuration.
    config: SecurityConfig,
}

impl std::fmt::Debug for FailedLoginTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailedLoginTracker")
            .field("config", &self.config)
            .finish()
    }
}

impl FailedLoginTracker {
    /// Creates a new tracker.
    pub fn new(
        attempts: Arc<LoginAttemptRepository>,
        geo: GeoResolver,
        config: SecurityConfig,
    ) -> Self {
        Self {
            attempts,
            geo,
            config,
        }
    }

    /// Records one failed credential check.
    ///
    /// The sequence is one logical unit: geolocation and risk factors are
    /// resolved first, the attempt row is written carrying its complete
    /// assessment, and the lockout check runs last. A failure anywhere
    /// leaves either no row or a fully-assessed row, never a partial one.
    pub async fn log_attempt(
        &self,
        identity: &str,
        ip: IpAddr,
        user_agent: Option<&str>,
        failure_reason: Option<&str>,
    ) -> AppResult<FailedLoginAttempt> {
        validate_identity(identity)?;

        let now = Utc::now();
        let ip_address = ip.to_string();

        // Geolocation signals, degraded to unknown/false on provider failure.
        let geo = self.geo.assess(ip, None).await;

        // Prior-row counts for each window; the evaluator adds the attempt
        // being logged.
        let prior_identity_attempts = self
            .attempts
            .count_for_identity(identity, self.config.rapid_attempt_window().cutoff(now))
            .await?;
        let other_identities_from_ip = self
            .attempts
            .count_other_identities_from_ip(
                &ip_address,
                identity,
                self.config.multi_account_window().cutoff(now),
            )
            .await?;
        let prior_ip_attempts = self
            .attempts
            .count_from_ip(&ip_address, self.config.ip_activity_window().cutoff(now))
            .await?;

        let assessment = risk::evaluate(
            &RiskSignals {
                prior_identity_attempts: prior_identity_attempts.max(0) as u64,
                other_identities_from_ip: other_identities_from_ip.max(0) as u64,
                prior_ip_attempts: prior_ip_attempts.max(0) as u64,
                location_suspicious: geo.location_suspicious,
                vpn_or_proxy: geo.vpn_or_proxy,
                user_agent,
            },
            &self.config,
        );

        let attempt = self
            .attempts
            .record(&RecordFailedLoginAttempt {
                identity: identity.to_string(),
                ip_address: ip_address.clone(),
                user_agent: user_agent.map(String::from),
                failure_reason: failure_reason.map(String::from),
                location: geo.location,
                suspicious: assessment.suspicious,
                risk_factors: assessment.labels(),
            })
            .await?;

        info!(
            identity = %identity,
            ip = %ip_address,
            suspicious = assessment.suspicious,
            risk_factors = assessment.factors.len(),
            "Failed login attempt recorded"
        );

        let status = self.lockout_status(identity).await?;
        if status.is_locked {
            warn!(
                identity = %identity,
                failed_attempts = status.failed_attempts,
                lockout_until = ?status.lockout_until,
                "Account lockout threshold reached"
            );
        }

        Ok(attempt)
    }

    /// Derives the current lockout status for an identity.
    ///
    /// Pure read: no side effects, recomputed from the log on every call.
    pub async fn lockout_status(&self, identity: &str) -> AppResult<AccountLockoutStatus> {
        validate_identity(identity)?;

        let now = Utc::now();
        let since = now - self.config.lockout_lookback();
        let timestamps = self
            .attempts
            .attempt_times_for_identity(identity, since)
            .await?;

        Ok(AccountLockoutStatus::derive(
            identity,
            &timestamps,
            now,
            self.config.attempt_window(),
            self.config.lockout_duration(),
        ))
    }

    /// Whether credential verification should currently be refused.
    pub async fn is_account_locked(&self, identity: &str) -> AppResult<bool> {
        Ok(self.lockout_status(identity).await?.is_locked)
    }

    /// Whether the attempt log currently justifies a lockout.
    pub async fn should_lock_account(&self, identity: &str) -> AppResult<bool> {
        Ok(self.lockout_status(identity).await?.is_locked)
    }

    /// Administratively lifts a lockout.
    ///
    /// Attempts inside the lookback window are stamped as cleared rather
    /// than deleted, which lifts the derived lockout immediately while
    /// keeping the rows visible to IP aggregates and investigations.
    /// Returns how many rows were cleared.
    pub async fn unlock_account(&self, identity: &str) -> AppResult<u64> {
        validate_identity(identity)?;

        let now = Utc::now();
        let since = now - self.config.lockout_lookback();
        let cleared = self
            .attempts
            .clear_for_identity(identity, since, now)
            .await?;

        info!(
            identity = %identity,
            cleared = cleared,
            "Account unlocked; recent attempts marked cleared"
        );

        Ok(cleared)
    }

    /// IPs whose attempt volume inside the activity window crossed the
    /// suspicious threshold, most active first.
    pub async fn suspicious_ips(&self, limit: i64) -> AppResult<Vec<SuspiciousIp>> {
        let window = self.config.ip_activity_window();
        let since = window.cutoff(Utc::now());
        self.attempts
            .suspicious_ips(since, i64::from(window.threshold), limit)
            .await
    }

    /// Whether an IP's attempt volume crossed the suspicious threshold.
    pub async fn is_ip_suspicious(&self, ip: IpAddr) -> AppResult<bool> {
        let window = self.config.ip_activity_window();
        let count = self
            .attempts
            .count_from_ip(&ip.to_string(), window.cutoff(Utc::now()))
            .await?;
        Ok(window.is_met(count.max(0) as u64))
    }

    /// Aggregate report over a date range, defaulting to the last 24 hours.
    pub async fn failed_login_summary(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<FailedLoginSummary> {
        let to = to.unwrap_or_else(Utc::now);
        let from = from.unwrap_or(to - Duration::hours(24));
        if from >= to {
            return Err(AppError::validation("Summary range start must precede end"));
        }

        Ok(FailedLoginSummary {
            from,
            to,
            total_attempts: self.attempts.count_in_range(from, to).await?,
            unique_ips: self.attempts.count_unique_ips_in_range(from, to).await?,
            suspicious_attempts: self.attempts.count_suspicious_in_range(from, to).await?,
            top_identities: self.attempts.top_identities(from, to, TOP_COUNT).await?,
            top_ips: self.attempts.top_ips(from, to, TOP_COUNT).await?,
            recent_attempts: self.attempts.recent_in_range(from, to, RECENT_COUNT).await?,
        })
    }
}

/// Rejects malformed identities before any store write.
fn validate_identity(identity: &str) -> AppResult<()> {
    let trimmed = identity.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Identity must not be empty"));
    }
    if identity.len() > 320 {
        return Err(AppError::validation("Identity exceeds maximum length"));
    }
    if identity.chars().any(char::is_control) {
        return Err(AppError::validation("Identity contains control characters"));
    }
    Ok(())
}

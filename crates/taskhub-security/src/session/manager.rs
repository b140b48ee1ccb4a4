//! Session lifecycle manager — issuance, validation, termination, queries.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use taskhub_core::config::session::SessionConfig;
use taskhub_core::result::AppResult;
use taskhub_database::repositories::session::SessionRepository;
use taskhub_entity::session::device::DeviceInfo;
use taskhub_entity::session::model::{CreateUserSession, UserSession};
use taskhub_entity::session::summary::SessionSecuritySummary;

use crate::geo::GeoResolver;
use crate::login::risk::is_unusual_user_agent;

use super::token::generate_session_token;

/// Termination reason recorded on concurrency eviction.
pub const REASON_LIMIT_EXCEEDED: &str = "Session limit exceeded";
/// Termination reason recorded on sliding-expiry lapse.
pub const REASON_EXPIRED: &str = "Session expired";
/// Termination reason recorded by the scheduled cleanup sweep.
pub const REASON_CLEANUP: &str = "Automatic cleanup";
/// Termination reason recorded on explicit logout.
pub const REASON_LOGOUT: &str = "User logout";

/// Cap on the all-users active-session listing.
const ACTIVE_LIST_LIMIT: i64 = 500;
/// Cap on a user's session-history listing.
const HISTORY_LIMIT: i64 = 100;

/// Manages the complete session lifecycle.
///
/// State machine per session: created active, re-entered through sliding
/// renewal on every successful validation, and terminated by expiry,
/// explicit logout, concurrency eviction, or security action. Termination
/// is absorbing.
#[derive(Clone)]
pub struct SessionManager {
    /// Session persistence.
    sessions: Arc<SessionRepository>,
    /// Geolocation resolver (degrading).
    geo: GeoResolver,
    /// Session configuration.
    config: SessionConfig,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .finish()
    }
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(sessions: Arc<SessionRepository>, geo: GeoResolver, config: SessionConfig) -> Self {
        Self {
            sessions,
            geo,
            config,
        }
    }

    /// Issues a session for a freshly authenticated user.
    ///
    /// 1. Resolve geolocation and parse the user agent
    /// 2. Evaluate the suspicious-creation checks
    /// 3. Generate the token
    /// 4. Insert under the per-user concurrency cap, evicting the
    ///    least-recently-active session if the user is at the cap
    ///
    /// The count-evict-insert sequence is serialized per user at the store
    /// boundary, so concurrent logins across service instances cannot
    /// exceed the cap.
    pub async fn create_session(
        &self,
        user_id: Uuid,
        ip: IpAddr,
        user_agent: Option<&str>,
    ) -> AppResult<UserSession> {
        let now = Utc::now();

        let geo = self.geo.assess(ip, Some(user_id)).await;
        let device = DeviceInfo::parse(user_agent);

        // Suspicious-creation checks; the burst count includes this session.
        let burst_window = self.config.creation_burst_window();
        let prior_created = self
            .sessions
            .count_created_since(user_id, burst_window.cutoff(now))
            .await?;
        let burst = burst_window.is_met(prior_created.max(0) as u64 + 1);
        let weak_agent = is_unusual_user_agent(user_agent);

        let mut notes = Vec::new();
        if geo.location_suspicious {
            notes.push("Suspicious location");
        }
        if burst {
            notes.push("Rapid session creation");
        }
        if weak_agent {
            notes.push("Unusual or missing user agent");
        }
        let suspicious = !notes.is_empty();

        let (session, evicted) = self
            .sessions
            .create_enforcing_limit(
                &CreateUserSession {
                    token: generate_session_token(),
                    user_id,
                    ip_address: ip.to_string(),
                    user_agent: user_agent.map(String::from),
                    device,
                    country: geo.location.as_ref().map(|l| l.country.clone()),
                    city: geo.location.as_ref().map(|l| l.city.clone()),
                    suspicious,
                    suspicious_notes: suspicious.then(|| notes.join("; ")),
                    expires_at: now + self.config.session_timeout(),
                },
                self.config.max_concurrent_sessions,
                REASON_LIMIT_EXCEEDED,
                now,
            )
            .await?;

        for old in &evicted {
            info!(
                user_id = %user_id,
                evicted_session = %old.id,
                last_activity = %old.last_activity,
                "Evicted least-recently-active session at concurrency cap"
            );
        }

        if suspicious {
            warn!(
                user_id = %user_id,
                session_id = %session.id,
                notes = %session.suspicious_notes.as_deref().unwrap_or_default(),
                "Session created with suspicious markers"
            );
        } else {
            info!(user_id = %user_id, session_id = %session.id, "Session created");
        }

        Ok(session)
    }

    /// Validates a session token and slides its expiry.
    ///
    /// Returns `false` for absent, terminated, and expired sessions; an
    /// expired session is terminated on first sight (the second call is a
    /// plain `false` with no further effect). On success the expiry moves
    /// to `now + session_timeout`.
    pub async fn validate_session(&self, token: &str) -> AppResult<bool> {
        let now = Utc::now();

        let Some(session) = self.sessions.find_by_token(token).await? else {
            return Ok(false);
        };

        if !session.is_active {
            return Ok(false);
        }

        if session.is_expired(now) {
            let terminated = self
                .sessions
                .terminate(session.id, REASON_EXPIRED, now)
                .await?;
            if terminated {
                info!(session_id = %session.id, "Session expired on validation");
            }
            return Ok(false);
        }

        // Sliding renewal. A concurrent renewal is commutative (both slide
        // forward from now); a racing termination makes the touch a no-op
        // and the validation fails.
        let renewed = self
            .sessions
            .touch(session.id, now, now + self.config.session_timeout())
            .await?;

        Ok(renewed)
    }

    /// Terminates a session by token.
    ///
    /// Idempotent: terminating an absent or already-terminated session is a
    /// logged no-op, not an error.
    pub async fn terminate_session(&self, token: &str, reason: &str) -> AppResult<()> {
        let terminated = self
            .sessions
            .terminate_by_token(token, reason, Utc::now())
            .await?;

        if terminated {
            info!(reason = %reason, "Session terminated");
        } else {
            debug!("Termination requested for absent or already-terminated session");
        }

        Ok(())
    }

    /// Terminates every active session for a user, optionally sparing one
    /// token ("log out everywhere else"). Returns how many were terminated.
    pub async fn terminate_all_user_sessions(
        &self,
        user_id: Uuid,
        reason: &str,
        exclude_token: Option<&str>,
    ) -> AppResult<u64> {
        let terminated = self
            .sessions
            .terminate_all_for_user(user_id, reason, Utc::now(), exclude_token)
            .await?;

        info!(
            user_id = %user_id,
            terminated = terminated,
            reason = %reason,
            "Terminated user sessions"
        );

        Ok(terminated)
    }

    /// Flags a session for review, independent of the creation-time checks.
    /// Returns whether a session with that token existed.
    pub async fn mark_session_suspicious(&self, token: &str, reason: &str) -> AppResult<bool> {
        let flagged = self.sessions.set_suspicious(token, reason).await?;

        if flagged {
            warn!(reason = %reason, "Session flagged suspicious");
        } else {
            debug!("Suspicious flag requested for absent session");
        }

        Ok(flagged)
    }

    /// Whether a session is flagged suspicious. Absent sessions are `false`.
    pub async fn is_suspicious_session(&self, token: &str) -> AppResult<bool> {
        Ok(self
            .sessions
            .find_by_token(token)
            .await?
            .map(|s| s.suspicious)
            .unwrap_or(false))
    }

    /// Looks up a session by token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<UserSession>> {
        self.sessions.find_by_token(token).await
    }

    /// Active sessions, for one user or across all users.
    pub async fn active_sessions(&self, user_id: Option<Uuid>) -> AppResult<Vec<UserSession>> {
        match user_id {
            Some(user_id) => self.sessions.find_active_by_user(user_id).await,
            None => self.sessions.find_all_active(ACTIVE_LIST_LIMIT).await,
        }
    }

    /// A user's full session history, newest first.
    pub async fn session_history(&self, user_id: Uuid) -> AppResult<Vec<UserSession>> {
        self.sessions.find_by_user(user_id, HISTORY_LIMIT).await
    }

    /// Aggregate security view over sessions created in a trailing window,
    /// defaulting to the last 24 hours.
    pub async fn security_summary(
        &self,
        window: Option<Duration>,
    ) -> AppResult<SessionSecuritySummary> {
        let to = Utc::now();
        let from = to - window.unwrap_or(Duration::hours(24));

        Ok(SessionSecuritySummary {
            from,
            to,
            total_sessions: self.sessions.count_created_in_range(from, to).await?,
            suspicious_sessions: self.sessions.count_suspicious_in_range(from, to).await?,
            unique_locations: self
                .sessions
                .count_unique_locations_in_range(from, to)
                .await?,
            unusual_locations: self
                .sessions
                .suspicious_locations_in_range(from, to)
                .await?,
            device_breakdown: self.sessions.device_breakdown_in_range(from, to).await?,
        })
    }
}

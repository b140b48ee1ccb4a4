//! Session repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use taskhub_core::error::{AppError, ErrorKind};
use taskhub_core::result::AppResult;
use taskhub_entity::session::model::{CreateUserSession, UserSession};
use taskhub_entity::session::summary::DeviceTypeCount;

/// Repository for session CRUD and query operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new session while enforcing the per-user concurrency cap.
    ///
    /// The count-evict-insert sequence runs inside one transaction holding a
    /// per-user advisory lock, so concurrent logins for the same user from
    /// any number of service instances serialize here and the cap cannot be
    /// exceeded. When the user is at the cap, the sessions with the oldest
    /// `last_activity` are terminated with `evict_reason` to make room.
    ///
    /// Returns the created session and any sessions evicted for it.
    pub async fn create_enforcing_limit(
        &self,
        data: &CreateUserSession,
        max_active: u32,
        evict_reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<(UserSession, Vec<UserSession>)> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        // Serialize concurrent creations for this user across instances.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(data.user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to acquire user lock", e)
            })?;

        let active: Vec<UserSession> = sqlx::query_as(
            "SELECT * FROM user_sessions \
             WHERE user_id = $1 AND is_active = TRUE \
             ORDER BY last_activity ASC",
        )
        .bind(data.user_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count active sessions", e)
        })?;

        let mut evicted = Vec::new();
        let overflow = (active.len() as i64) - i64::from(max_active) + 1;
        if overflow > 0 {
            // Least-recently-active first; the list is already sorted.
            for session in active.iter().take(overflow as usize) {
                let terminated: Option<UserSession> = sqlx::query_as(
                    "UPDATE user_sessions \
                     SET is_active = FALSE, terminated_at = $2, termination_reason = $3 \
                     WHERE id = $1 AND is_active = TRUE RETURNING *",
                )
                .bind(session.id)
                .bind(now)
                .bind(evict_reason)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to evict session", e)
                })?;

                if let Some(s) = terminated {
                    evicted.push(s);
                }
            }
        }

        let session = sqlx::query_as::<_, UserSession>(
            "INSERT INTO user_sessions \
             (token, user_id, ip_address, user_agent, device_type, browser, os, \
              country, city, suspicious, suspicious_notes, created_at, last_activity, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12, $13) RETURNING *",
        )
        .bind(&data.token)
        .bind(data.user_id)
        .bind(&data.ip_address)
        .bind(&data.user_agent)
        .bind(&data.device.device_type)
        .bind(&data.device.browser)
        .bind(&data.device.os)
        .bind(&data.country)
        .bind(&data.city)
        .bind(data.suspicious)
        .bind(&data.suspicious_notes)
        .bind(now)
        .bind(data.expires_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create session", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit session creation", e)
        })?;

        Ok((session, evicted))
    }

    /// Find a session by its token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<UserSession>> {
        sqlx::query_as::<_, UserSession>("SELECT * FROM user_sessions WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find session", e))
    }

    /// Slide the expiry forward: set `last_activity` to `now` and
    /// `expires_at` to the new deadline. No-op unless the session is still
    /// active.
    pub async fn touch(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE user_sessions SET last_activity = $2, expires_at = $3 \
             WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .bind(now)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to renew session", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Terminate a session by id. The update is conditional on the session
    /// still being active, so it cannot clobber a concurrent termination.
    /// Returns whether this call performed the termination.
    pub async fn terminate(
        &self,
        id: Uuid,
        reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE user_sessions \
             SET is_active = FALSE, terminated_at = $2, termination_reason = $3 \
             WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .bind(now)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to terminate session", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Terminate a session by token. Same conditional semantics as
    /// [`Self::terminate`].
    pub async fn terminate_by_token(
        &self,
        token: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE user_sessions \
             SET is_active = FALSE, terminated_at = $2, termination_reason = $3 \
             WHERE token = $1 AND is_active = TRUE",
        )
        .bind(token)
        .bind(now)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to terminate session", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Terminate every active session for a user, optionally sparing one
    /// token. Returns the number of sessions terminated.
    pub async fn terminate_all_for_user(
        &self,
        user_id: Uuid,
        reason: &str,
        now: DateTime<Utc>,
        exclude_token: Option<&str>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE user_sessions \
             SET is_active = FALSE, terminated_at = $2, termination_reason = $3 \
             WHERE user_id = $1 AND is_active = TRUE \
             AND ($4::TEXT IS NULL OR token <> $4)",
        )
        .bind(user_id)
        .bind(now)
        .bind(reason)
        .bind(exclude_token)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to terminate user sessions", e)
        })?;

        Ok(result.rows_affected())
    }

    /// Batch-terminate every active session whose expiry has passed.
    /// Conditional on `is_active` so a racing explicit termination wins.
    pub async fn terminate_expired(
        &self,
        now: DateTime<Utc>,
        reason: &str,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE user_sessions \
             SET is_active = FALSE, terminated_at = $1, termination_reason = $2 \
             WHERE is_active = TRUE AND expires_at <= $1",
        )
        .bind(now)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to terminate expired sessions", e)
        })?;

        Ok(result.rows_affected())
    }

    /// Count sessions created for a user since the cutoff (active or not).
    pub async fn count_created_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_sessions WHERE user_id = $1 AND created_at >= $2",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count created sessions", e)
        })
    }

    /// List all active sessions, most recently active first.
    pub async fn find_all_active(&self, limit: i64) -> AppResult<Vec<UserSession>> {
        sqlx::query_as::<_, UserSession>(
            "SELECT * FROM user_sessions WHERE is_active = TRUE \
             ORDER BY last_activity DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list active sessions", e)
        })
    }

    /// List a user's active sessions, most recently active first.
    pub async fn find_active_by_user(&self, user_id: Uuid) -> AppResult<Vec<UserSession>> {
        sqlx::query_as::<_, UserSession>(
            "SELECT * FROM user_sessions WHERE user_id = $1 AND is_active = TRUE \
             ORDER BY last_activity DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find active sessions", e)
        })
    }

    /// A user's full session history, newest first.
    pub async fn find_by_user(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<UserSession>> {
        sqlx::query_as::<_, UserSession>(
            "SELECT * FROM user_sessions WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load session history", e)
        })
    }

    /// Flag a session suspicious with a note. Works on terminated sessions
    /// too; the flag is part of the audit trail. Returns whether a row
    /// matched.
    pub async fn set_suspicious(&self, token: &str, notes: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE user_sessions SET suspicious = TRUE, suspicious_notes = $2 WHERE token = $1",
        )
        .bind(token)
        .bind(notes)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to flag session", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Sessions created in a date range.
    pub async fn count_created_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_sessions WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count sessions", e))
    }

    /// Suspicious sessions created in a date range.
    pub async fn count_suspicious_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_sessions \
             WHERE suspicious = TRUE AND created_at >= $1 AND created_at < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count suspicious sessions", e)
        })
    }

    /// Distinct resolved locations of sessions created in a date range.
    pub async fn count_unique_locations_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(DISTINCT city || ', ' || country) FROM user_sessions \
             WHERE city IS NOT NULL AND country IS NOT NULL \
             AND created_at >= $1 AND created_at < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count locations", e))
    }

    /// Distinct locations of suspicious sessions created in a date range.
    pub async fn suspicious_locations_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<String>> {
        sqlx::query_scalar(
            "SELECT DISTINCT city || ', ' || country FROM user_sessions \
             WHERE suspicious = TRUE AND city IS NOT NULL AND country IS NOT NULL \
             AND created_at >= $1 AND created_at < $2 \
             ORDER BY 1",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list suspicious locations", e)
        })
    }

    /// Session counts per device class for a date range, descending.
    pub async fn device_breakdown_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<DeviceTypeCount>> {
        sqlx::query_as::<_, DeviceTypeCount>(
            "SELECT device_type, COUNT(*) AS count FROM user_sessions \
             WHERE created_at >= $1 AND created_at < $2 \
             GROUP BY device_type ORDER BY count DESC, device_type ASC",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to build device breakdown", e)
        })
    }
}

//! Failed-login attempt repository implementation.
//!
//! The attempt log is append-only: rows are inserted by the tracker and
//! never updated, except for the `cleared_at` stamp written by an
//! administrative unlock. Lockout derivation reads only uncleared rows;
//! every IP-level aggregate keeps the full log in view.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use taskhub_core::error::{AppError, ErrorKind};
use taskhub_core::result::AppResult;
use taskhub_entity::login_attempt::model::{FailedLoginAttempt, RecordFailedLoginAttempt};
use taskhub_entity::login_attempt::summary::{IdentityCount, IpCount, SuspiciousIp};

/// Repository for the failed-login attempt log.
#[derive(Debug, Clone)]
pub struct LoginAttemptRepository {
    pool: PgPool,
}

impl LoginAttemptRepository {
    /// Create a new login attempt repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one attempt to the log.
    pub async fn record(&self, data: &RecordFailedLoginAttempt) -> AppResult<FailedLoginAttempt> {
        let location = data.location.as_ref();
        sqlx::query_as::<_, FailedLoginAttempt>(
            "INSERT INTO failed_login_attempts \
             (identity, ip_address, user_agent, failure_reason, country, city, country_code, \
              latitude, longitude, suspicious, risk_factors) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
        )
        .bind(&data.identity)
        .bind(&data.ip_address)
        .bind(&data.user_agent)
        .bind(&data.failure_reason)
        .bind(location.map(|l| l.country.clone()))
        .bind(location.map(|l| l.city.clone()))
        .bind(location.map(|l| l.country_code.clone()))
        .bind(location.map(|l| l.latitude))
        .bind(location.map(|l| l.longitude))
        .bind(data.suspicious)
        .bind(&data.risk_factors)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record attempt", e))
    }

    /// Timestamps of uncleared attempts for an identity since the cutoff,
    /// newest first. Feeds lockout derivation.
    pub async fn attempt_times_for_identity(
        &self,
        identity: &str,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<DateTime<Utc>>> {
        sqlx::query_scalar(
            "SELECT attempted_at FROM failed_login_attempts \
             WHERE identity = $1 AND attempted_at >= $2 AND cleared_at IS NULL \
             ORDER BY attempted_at DESC",
        )
        .bind(identity)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load attempt times", e))
    }

    /// Count attempts for an identity since the cutoff (cleared included;
    /// risk factors weigh all evidence).
    pub async fn count_for_identity(
        &self,
        identity: &str,
        since: DateTime<Utc>,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM failed_login_attempts \
             WHERE identity = $1 AND attempted_at >= $2",
        )
        .bind(identity)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count attempts", e))
    }

    /// Count distinct identities other than `exclude` targeted from an IP
    /// since the cutoff. The caller adds one for the identity of the attempt
    /// being assessed.
    pub async fn count_other_identities_from_ip(
        &self,
        ip_address: &str,
        exclude: &str,
        since: DateTime<Utc>,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(DISTINCT identity) FROM failed_login_attempts \
             WHERE ip_address = $1 AND identity <> $2 AND attempted_at >= $3",
        )
        .bind(ip_address)
        .bind(exclude)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count targeted identities", e)
        })
    }

    /// Count attempts from an IP since the cutoff.
    pub async fn count_from_ip(&self, ip_address: &str, since: DateTime<Utc>) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM failed_login_attempts \
             WHERE ip_address = $1 AND attempted_at >= $2",
        )
        .bind(ip_address)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count IP attempts", e))
    }

    /// Stamp `cleared_at` on an identity's uncleared attempts since the
    /// cutoff. Returns how many rows were cleared.
    pub async fn clear_for_identity(
        &self,
        identity: &str,
        since: DateTime<Utc>,
        cleared_at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE failed_login_attempts SET cleared_at = $3 \
             WHERE identity = $1 AND attempted_at >= $2 AND cleared_at IS NULL",
        )
        .bind(identity)
        .bind(since)
        .bind(cleared_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear attempts", e))?;

        Ok(result.rows_affected())
    }

    /// Total attempts in a date range.
    pub async fn count_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM failed_login_attempts \
             WHERE attempted_at >= $1 AND attempted_at < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count attempts", e))
    }

    /// Distinct source IPs in a date range.
    pub async fn count_unique_ips_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(DISTINCT ip_address) FROM failed_login_attempts \
             WHERE attempted_at >= $1 AND attempted_at < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unique IPs", e))
    }

    /// Suspicious attempts in a date range.
    pub async fn count_suspicious_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM failed_login_attempts \
             WHERE suspicious = TRUE AND attempted_at >= $1 AND attempted_at < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count suspicious attempts", e)
        })
    }

    /// Most-targeted identities in a date range, descending.
    pub async fn top_identities(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<IdentityCount>> {
        sqlx::query_as::<_, IdentityCount>(
            "SELECT identity, COUNT(*) AS count FROM failed_login_attempts \
             WHERE attempted_at >= $1 AND attempted_at < $2 \
             GROUP BY identity ORDER BY count DESC, identity ASC LIMIT $3",
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to rank identities", e))
    }

    /// Most-active source IPs in a date range, descending.
    pub async fn top_ips(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<IpCount>> {
        sqlx::query_as::<_, IpCount>(
            "SELECT ip_address, COUNT(*) AS count FROM failed_login_attempts \
             WHERE attempted_at >= $1 AND attempted_at < $2 \
             GROUP BY ip_address ORDER BY count DESC, ip_address ASC LIMIT $3",
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to rank IPs", e))
    }

    /// Most recent attempts in a date range, newest first.
    pub async fn recent_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<FailedLoginAttempt>> {
        sqlx::query_as::<_, FailedLoginAttempt>(
            "SELECT * FROM failed_login_attempts \
             WHERE attempted_at >= $1 AND attempted_at < $2 \
             ORDER BY attempted_at DESC LIMIT $3",
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load recent attempts", e))
    }

    /// IPs whose attempt count since the cutoff meets the threshold,
    /// most active first.
    pub async fn suspicious_ips(
        &self,
        since: DateTime<Utc>,
        threshold: i64,
        limit: i64,
    ) -> AppResult<Vec<SuspiciousIp>> {
        sqlx::query_as::<_, SuspiciousIp>(
            "SELECT ip_address, COUNT(*) AS attempts, MAX(attempted_at) AS last_attempt \
             FROM failed_login_attempts WHERE attempted_at >= $1 \
             GROUP BY ip_address HAVING COUNT(*) >= $2 \
             ORDER BY attempts DESC, ip_address ASC LIMIT $3",
        )
        .bind(since)
        .bind(threshold)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find suspicious IPs", e))
    }

    /// Delete attempts older than the cutoff. Retention pruning only; the
    /// cutoff must stay far outside the lockout lookback window.
    pub async fn prune_older_than(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM failed_login_attempts WHERE attempted_at < $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to prune attempts", e)
            })?;

        Ok(result.rows_affected())
    }
}

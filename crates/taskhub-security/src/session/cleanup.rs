//! Expired session cleanup.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use taskhub_core::result::AppResult;
use taskhub_database::repositories::session::SessionRepository;

use super::manager::REASON_CLEANUP;

/// Batch-terminates sessions whose sliding expiry has passed.
///
/// The manager exposes the operation; the worker's scheduler owns the
/// timer. The underlying update is conditional on `is_active`, so a sweep
/// can never clobber an explicit termination racing it.
#[derive(Clone)]
pub struct SessionCleanup {
    /// Session persistence.
    sessions: Arc<SessionRepository>,
}

impl std::fmt::Debug for SessionCleanup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCleanup").finish()
    }
}

impl SessionCleanup {
    /// Creates a new cleanup handler.
    pub fn new(sessions: Arc<SessionRepository>) -> Self {
        Self { sessions }
    }

    /// Runs one cleanup cycle. Returns the number of sessions terminated.
    pub async fn run_cleanup(&self) -> AppResult<u64> {
        let cleaned = self
            .sessions
            .terminate_expired(Utc::now(), REASON_CLEANUP)
            .await?;

        if cleaned > 0 {
            info!(cleaned = cleaned, "Expired sessions cleaned up");
        }

        Ok(cleaned)
    }
}

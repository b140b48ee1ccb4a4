//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use taskhub_core::config::security::SecurityConfig;
use taskhub_core::config::session::SessionConfig;
use taskhub_core::error::AppError;
use taskhub_database::repositories::login_attempt::LoginAttemptRepository;
use taskhub_security::session::SessionCleanup;

/// Cron-based scheduler for periodic security maintenance.
pub struct CronScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
    /// Session cleanup handler.
    cleanup: Arc<SessionCleanup>,
    /// Attempt log repository for retention pruning.
    attempts: Arc<LoginAttemptRepository>,
    /// Session configuration (cleanup cadence).
    session_config: SessionConfig,
    /// Security configuration (retention).
    security_config: SecurityConfig,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler.
    pub async fn new(
        cleanup: Arc<SessionCleanup>,
        attempts: Arc<LoginAttemptRepository>,
        session_config: SessionConfig,
        security_config: SecurityConfig,
    ) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            cleanup,
            attempts,
            session_config,
            security_config,
        })
    }

    /// Register all default scheduled tasks.
    pub async fn register_default_tasks(&self) -> Result<(), AppError> {
        self.register_session_cleanup().await?;
        self.register_attempt_prune().await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Expired session cleanup, on the configured cadence.
    async fn register_session_cleanup(&self) -> Result<(), AppError> {
        let interval = self.session_config.cleanup_interval_minutes.clamp(1, 59);
        let schedule = format!("0 */{interval} * * * *");

        let cleanup = Arc::clone(&self.cleanup);
        let job = CronJob::new_async(schedule.as_str(), move |_uuid, _lock| {
            let cleanup = Arc::clone(&cleanup);
            Box::pin(async move {
                match cleanup.run_cleanup().await {
                    Ok(cleaned) => {
                        tracing::debug!(cleaned = cleaned, "Session cleanup cycle finished");
                    }
                    Err(e) => tracing::error!("Session cleanup failed: {e}"),
                }
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create session_cleanup schedule: {e}"))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add session_cleanup schedule: {e}"))
        })?;

        tracing::info!(interval_minutes = interval, "Registered: session_cleanup");
        Ok(())
    }

    /// Attempt log retention pruning, daily at 3 AM.
    ///
    /// Retention is measured in days while the lockout lookback is under an
    /// hour, so pruning can never disturb an active lockout.
    async fn register_attempt_prune(&self) -> Result<(), AppError> {
        let attempts = Arc::clone(&self.attempts);
        let retention_days = self.security_config.attempt_retention_days.max(1) as i64;

        let job = CronJob::new_async("0 0 3 * * *", move |_uuid, _lock| {
            let attempts = Arc::clone(&attempts);
            Box::pin(async move {
                let cutoff = Utc::now() - Duration::days(retention_days);
                match attempts.prune_older_than(cutoff).await {
                    Ok(pruned) => {
                        if pruned > 0 {
                            tracing::info!(pruned = pruned, "Old failed-login attempts pruned");
                        }
                    }
                    Err(e) => tracing::error!("Attempt pruning failed: {e}"),
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create attempt_prune schedule: {e}")))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add attempt_prune schedule: {e}")))?;

        tracing::info!("Registered: attempt_prune (daily at 3AM)");
        Ok(())
    }
}

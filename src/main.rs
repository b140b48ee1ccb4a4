//! TaskHub security daemon.
//!
//! Wires the security engine together: configuration, logging, database,
//! geolocation provider, the two trackers, and the maintenance scheduler.
//! The HTTP layer consuming the trackers lives elsewhere; this binary runs
//! migrations and keeps the scheduled maintenance alive.

use std::sync::Arc;

use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use taskhub_core::config::AppConfig;
use taskhub_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("TASKHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Daemon error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main daemon run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting TaskHub security daemon v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = taskhub_database::DatabasePool::connect(&config.database).await?;
    db.health_check().await?;

    tracing::info!("Running database migrations...");
    taskhub_database::migration::run_migrations(db.pool()).await?;

    // ── Step 2: Repositories ─────────────────────────────────────
    let attempt_repo = Arc::new(
        taskhub_database::repositories::login_attempt::LoginAttemptRepository::new(
            db.pool().clone(),
        ),
    );
    let session_repo = Arc::new(taskhub_database::repositories::session::SessionRepository::new(
        db.pool().clone(),
    ));

    // ── Step 3: Geolocation provider ─────────────────────────────
    tracing::info!(provider = ?config.geo.provider, "Initializing geolocation provider");
    let geo_provider = Arc::new(taskhub_security::geo::GeoProviderDispatch::from_config(
        &config.geo,
    )?);
    let geo = taskhub_security::geo::GeoResolver::new(geo_provider);

    // ── Step 4: Security engine ──────────────────────────────────
    let tracker = Arc::new(taskhub_security::login::FailedLoginTracker::new(
        Arc::clone(&attempt_repo),
        geo.clone(),
        config.security.clone(),
    ));
    let session_manager = Arc::new(taskhub_security::session::SessionManager::new(
        Arc::clone(&session_repo),
        geo,
        config.session.clone(),
    ));
    let cleanup = Arc::new(taskhub_security::session::SessionCleanup::new(Arc::clone(
        &session_repo,
    )));

    tracing::info!(
        max_failed_attempts = config.security.max_failed_attempts,
        max_concurrent_sessions = config.session.max_concurrent_sessions,
        "Security engine initialized"
    );

    // Startup snapshot of the last 24 hours.
    let login_summary = tracker.failed_login_summary(None, None).await?;
    let session_summary = session_manager.security_summary(None).await?;
    tracing::info!(
        failed_attempts = login_summary.total_attempts,
        suspicious_attempts = login_summary.suspicious_attempts,
        attacking_ips = login_summary.unique_ips,
        sessions_created = session_summary.total_sessions,
        suspicious_sessions = session_summary.suspicious_sessions,
        "Security posture over the trailing 24h"
    );

    // ── Step 5: Maintenance scheduler ────────────────────────────
    let mut scheduler = if config.worker.enabled {
        let scheduler = taskhub_worker::CronScheduler::new(
            cleanup,
            attempt_repo,
            config.session.clone(),
            config.security.clone(),
        )
        .await?;
        scheduler.register_default_tasks().await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Maintenance scheduler disabled");
        None
    };

    // ── Step 6: Wait for shutdown signal ─────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping...");

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }
    db.close().await;

    tracing::info!("TaskHub security daemon shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

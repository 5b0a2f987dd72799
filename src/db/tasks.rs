//! Background database maintenance.
use chrono::{Duration as ChronoDuration, Utc};
use sqlx::SqlitePool;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::db::services::check_result_service;

const PRUNE_INTERVAL_SECONDS: u64 = 6 * 60 * 60; // Check every 6 hours

/// Periodically prunes check results older than the retention window.
pub async fn run_retention_task(
    pool: SqlitePool,
    retention_days: i64,
    mut shutdown_rx: watch::Receiver<()>,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(PRUNE_INTERVAL_SECONDS));
    info!(
        interval_seconds = PRUNE_INTERVAL_SECONDS,
        retention_days, "Check result retention task started."
    );

    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.changed() => {
                info!("Retention task received shutdown signal.");
                break;
            }

            _ = interval.tick() => {
                let cutoff = Utc::now() - ChronoDuration::days(retention_days);
                match check_result_service::prune_older_than(&pool, cutoff).await {
                    Ok(pruned) if pruned > 0 => {
                        info!(count = pruned, "Pruned old check results.");
                    }
                    Ok(_) => {
                        debug!("No check results to prune at this time.");
                    }
                    Err(e) => {
                        error!(error = %e, "Error pruning old check results.");
                    }
                }
            }
        }
    }
}

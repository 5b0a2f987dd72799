//! Consumes check outcomes, updates the availability state, persists
//! results, and dispatches notifications on state transitions.
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::templates::{self, format_duration};
use super::AlertKind;
use crate::config::SiteWatchConfig;
use crate::db::services::{alert_event_service, check_result_service};
use crate::monitor::{CheckOutcome, SharedMonitorState, Transition};
use crate::notifications::service::{NotificationError, NotificationService};

#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Notification error: {0}")]
    NotificationError(#[from] NotificationError),
    #[error("Templating error: {0}")]
    TemplateError(#[from] tera::Error),
}

pub struct EvaluationService {
    pool: SqlitePool,
    config: Arc<SiteWatchConfig>,
    monitor: SharedMonitorState,
    notification_service: Arc<NotificationService>,
}

impl EvaluationService {
    pub fn new(
        pool: SqlitePool,
        config: Arc<SiteWatchConfig>,
        monitor: SharedMonitorState,
        notification_service: Arc<NotificationService>,
    ) -> Self {
        Self {
            pool,
            config,
            monitor,
            notification_service,
        }
    }

    /// Drains the outcome channel until the checker side closes it.
    pub async fn run(self: Arc<Self>, mut rx: mpsc::Receiver<CheckOutcome>) {
        info!("Alert evaluation service started.");
        while let Some(outcome) = rx.recv().await {
            if let Err(e) = self.process_outcome(&outcome).await {
                error!(error = %e, "Error during outcome evaluation.");
            }
        }
        info!("Alert evaluation service stopped; outcome channel closed.");
    }

    pub async fn process_outcome(&self, outcome: &CheckOutcome) -> Result<(), EvaluationError> {
        check_result_service::insert(&self.pool, outcome).await?;

        // Fold into the shared state; the guard must not live across awaits.
        let (transition, total_checks, consecutive_errors) = {
            let mut state = self.monitor.write().unwrap();
            let transition = state.apply(outcome, self.config.max_consecutive_errors);
            (transition, state.total_checks, state.consecutive_errors)
        };

        if outcome.successful {
            info!(
                check = total_checks,
                details = %outcome.details,
                "Check passed."
            );
        } else {
            warn!(
                check = total_checks,
                consecutive_errors,
                details = %outcome.details,
                "Check failed."
            );
        }

        let (kind, context) = match transition {
            Transition::OutageStarted => (
                AlertKind::Problem,
                self.failure_context(outcome, consecutive_errors),
            ),
            Transition::Escalated => (
                AlertKind::Critical,
                self.failure_context(outcome, consecutive_errors),
            ),
            Transition::Recovered { downtime_seconds } => (
                AlertKind::Recovered,
                self.recovery_context(outcome, downtime_seconds),
            ),
            Transition::StillDown => {
                debug!(consecutive_errors, "Site still down; no notification.");
                return Ok(());
            }
            Transition::None => return Ok(()),
        };

        let message = templates::render_alert(kind, &context)?;
        alert_event_service::insert(&self.pool, kind.as_str(), &message).await?;

        info!(kind = kind.as_str(), "Alert transition; dispatching notifications.");
        if let Err(e) = self
            .notification_service
            .broadcast(&self.config.bot_token, &message, &context)
            .await
        {
            error!(error = %e, "At least one notification failed to deliver.");
        }

        Ok(())
    }

    fn base_context(&self, outcome: &CheckOutcome) -> HashMap<String, String> {
        let mut context = HashMap::new();
        context.insert("site_url".to_string(), self.config.check_url.clone());
        context.insert(
            "timestamp".to_string(),
            outcome.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        );
        context.insert("details".to_string(), outcome.details.clone());
        context
    }

    fn failure_context(
        &self,
        outcome: &CheckOutcome,
        consecutive_errors: u32,
    ) -> HashMap<String, String> {
        let mut context = self.base_context(outcome);
        context.insert(
            "consecutive_errors".to_string(),
            consecutive_errors.to_string(),
        );
        context
    }

    fn recovery_context(
        &self,
        outcome: &CheckOutcome,
        downtime_seconds: i64,
    ) -> HashMap<String, String> {
        let mut context = self.base_context(outcome);
        context.insert("downtime".to_string(), format_duration(downtime_seconds));
        context.insert(
            "response_time".to_string(),
            outcome
                .response_time_ms
                .map(|ms| format!("{:.2}s", ms as f64 / 1000.0))
                .unwrap_or_else(|| "n/a".to_string()),
        );
        context.insert(
            "status_code".to_string(),
            outcome
                .status_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "n/a".to_string()),
        );
        context
    }
}

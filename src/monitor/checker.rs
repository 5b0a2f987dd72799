//! Periodic HTTP availability checks against the configured site.
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use crate::config::SiteWatchConfig;

pub const USER_AGENT: &str = "SiteWatch-Monitor/1.0";

/// The result of a single availability check.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub successful: bool,
    pub status_code: Option<u16>,
    pub response_time_ms: Option<i64>,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

/// Builds the HTTP client used for all checks. Timeout and certificate
/// handling come from the configuration.
pub fn build_client(config: &SiteWatchConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.request_timeout_seconds.max(1)))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()
}

/// Performs one check. Responses in `200..400` count as up, so redirects do
/// not trip the monitor. Transport errors never bubble up; they become failed
/// outcomes.
pub async fn check_once(client: &reqwest::Client, url: &str) -> CheckOutcome {
    let timestamp = Utc::now();
    let start = Instant::now();

    match client.get(url).send().await {
        Ok(response) => {
            let response_time_ms = start.elapsed().as_millis() as i64;
            let code = response.status().as_u16();
            if (200..400).contains(&code) {
                CheckOutcome {
                    successful: true,
                    status_code: Some(code),
                    response_time_ms: Some(response_time_ms),
                    details: format!("HTTP {code}"),
                    timestamp,
                }
            } else {
                CheckOutcome {
                    successful: false,
                    status_code: Some(code),
                    response_time_ms: Some(response_time_ms),
                    details: format!("HTTP error {code}"),
                    timestamp,
                }
            }
        }
        Err(e) => {
            let details = if e.is_timeout() {
                "Error: request timed out".to_string()
            } else {
                format!("Error: {e}")
            };
            CheckOutcome {
                successful: false,
                status_code: None,
                response_time_ms: None,
                details,
                timestamp,
            }
        }
    }
}

/// The check loop. Ticks at the configured interval and pushes every outcome
/// to the evaluation side; exits when the shutdown channel fires or the
/// receiver is gone.
pub async fn run_check_loop(
    client: reqwest::Client,
    config: Arc<SiteWatchConfig>,
    tx: mpsc::Sender<CheckOutcome>,
    mut shutdown_rx: watch::Receiver<()>,
) {
    info!(
        url = %config.check_url,
        interval_seconds = config.check_interval_seconds,
        "Site check loop started."
    );
    let mut interval =
        tokio::time::interval(Duration::from_secs(config.check_interval_seconds.max(1)));

    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.changed() => {
                info!("Check loop received shutdown signal.");
                break;
            }

            _ = interval.tick() => {
                let outcome = check_once(&client, &config.check_url).await;
                if tx.send(outcome).await.is_err() {
                    error!("Outcome channel closed. Terminating check loop.");
                    break;
                }
            }
        }
    }
    info!("Site check loop gracefully shut down.");
}

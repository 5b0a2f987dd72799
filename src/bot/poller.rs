//! Long-polling update loop, the default runtime mode.
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::BotContext;

const POLL_TIMEOUT_SECONDS: u64 = 30;
const BACKOFF_SECONDS: u64 = 5;

pub async fn run_polling_loop(ctx: Arc<BotContext>, mut shutdown_rx: watch::Receiver<()>) {
    info!("Bot long-poll loop started.");

    // A leftover webhook registration blocks getUpdates.
    if let Err(e) = ctx.api.delete_webhook().await {
        warn!(error = %e, "Failed to clear webhook registration before polling.");
    }

    let mut offset = 0i64;
    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.changed() => {
                info!("Polling loop received shutdown signal.");
                break;
            }

            result = ctx.api.get_updates(offset, POLL_TIMEOUT_SECONDS) => {
                match result {
                    Ok(updates) => {
                        for update in updates {
                            offset = offset.max(update.update_id + 1);
                            if let Err(e) = ctx.handle_update(update).await {
                                error!(error = %e, "Error handling update.");
                            }
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to fetch updates. Backing off.");
                        tokio::time::sleep(Duration::from_secs(BACKOFF_SECONDS)).await;
                    }
                }
            }
        }
    }
    info!("Bot long-poll loop gracefully shut down.");
}

pub mod api;
pub mod commands;
pub mod poller;

use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::config::SiteWatchConfig;
use crate::db::services::subscriber_service;
use crate::monitor::SharedMonitorState;
use api::{BotApiClient, BotApiError, Update};

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Bot API error: {0}")]
    Api(#[from] BotApiError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Everything a command handler needs, shared by the long-poll loop and the
/// webhook endpoint.
pub struct BotContext {
    pub api: Arc<BotApiClient>,
    pub pool: SqlitePool,
    pub monitor: SharedMonitorState,
    pub config: Arc<SiteWatchConfig>,
}

impl BotContext {
    pub fn new(
        api: Arc<BotApiClient>,
        pool: SqlitePool,
        monitor: SharedMonitorState,
        config: Arc<SiteWatchConfig>,
    ) -> Self {
        Self {
            api,
            pool,
            monitor,
            config,
        }
    }

    /// Handles one incoming update end to end: parse, run the command,
    /// send the reply. Updates without a text message are ignored.
    pub async fn handle_update(&self, update: Update) -> Result<(), BotError> {
        let Some(message) = update.message else {
            debug!(update_id = update.update_id, "Update without message; ignored.");
            return Ok(());
        };
        let Some(text) = message.text else {
            debug!(update_id = update.update_id, "Message without text; ignored.");
            return Ok(());
        };

        let chat_id = message.chat.id;
        let reply = self.reply_for(chat_id, &text).await?;
        self.api.send_message(chat_id, &reply).await?;
        Ok(())
    }

    /// Produces the reply for a message without sending it.
    pub async fn reply_for(&self, chat_id: i64, text: &str) -> Result<String, BotError> {
        let config = &self.config;
        let reply = match commands::parse(text) {
            commands::Command::Start => {
                commands::welcome_text(&config.check_url, config.check_interval_seconds)
            }
            commands::Command::Help => commands::help_text(&config.check_url),
            commands::Command::Status => {
                let snapshot = self.monitor.read().unwrap().snapshot();
                commands::status_text(&snapshot, config.max_consecutive_errors, &config.check_url)
            }
            commands::Command::Stats => {
                let snapshot = self.monitor.read().unwrap().snapshot();
                let subscriber_count = subscriber_service::count(&self.pool).await?;
                commands::stats_text(&snapshot, &config.check_url, subscriber_count)
            }
            commands::Command::Subscribe => {
                let added = subscriber_service::add(&self.pool, chat_id).await?;
                commands::subscribed_text(!added)
            }
            commands::Command::Unsubscribe => {
                let removed = subscriber_service::remove(&self.pool, chat_id).await?;
                commands::unsubscribed_text(removed)
            }
            commands::Command::Greeting => commands::greeting_text(&config.check_url),
            commands::Command::Farewell => commands::farewell_text(),
            commands::Command::Unknown => commands::fallback_text(),
        };
        Ok(reply)
    }
}

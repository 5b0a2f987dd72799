use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::encryption::{EncryptionError, EncryptionService};
use super::models::{ChannelConfig, ChannelResponse, CreateChannelRequest};
use super::senders::{
    telegram::TelegramSender, webhook::WebhookSender, NotificationSender, SenderError,
};
use crate::db::models::NotificationChannel;
use crate::db::services::subscriber_service;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Encryption error: {0}")]
    EncryptionError(#[from] EncryptionError),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Channel not found: {0}")]
    NotFound(i64),
    #[error("Unsupported channel type: {0}")]
    UnsupportedChannel(String),
    #[error("Channel type {declared:?} does not match the {actual:?} config")]
    ChannelTypeMismatch {
        declared: String,
        actual: &'static str,
    },
    #[error("Sender error: {0}")]
    SenderError(#[from] SenderError),
}

/// Owns the notification channel store and fans alert messages out to every
/// subscriber chat and every configured channel.
pub struct NotificationService {
    pool: SqlitePool,
    encryption: Arc<EncryptionService>,
    telegram: TelegramSender,
    webhook: WebhookSender,
}

impl NotificationService {
    pub fn new(pool: SqlitePool, encryption: Arc<EncryptionService>) -> Self {
        Self {
            pool,
            encryption,
            telegram: TelegramSender::new(),
            webhook: WebhookSender::new(),
        }
    }

    pub async fn create_channel(
        &self,
        payload: CreateChannelRequest,
    ) -> Result<ChannelResponse, NotificationError> {
        let config: ChannelConfig = serde_json::from_value(payload.config)?;
        if payload.channel_type != config.kind() {
            return Err(NotificationError::ChannelTypeMismatch {
                declared: payload.channel_type,
                actual: config.kind(),
            });
        }
        let encrypted_config = self.encryption.encrypt(&serde_json::to_vec(&config)?)?;

        let channel = sqlx::query_as::<_, NotificationChannel>(
            "INSERT INTO notification_channels (name, channel_type, config, created_at) \
             VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(payload.name)
        .bind(payload.channel_type)
        .bind(encrypted_config)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        info!(channel_id = channel.id, channel_type = %channel.channel_type, "Notification channel created.");
        Ok(ChannelResponse {
            id: channel.id,
            name: channel.name,
            channel_type: channel.channel_type,
        })
    }

    pub async fn list_channels(&self) -> Result<Vec<ChannelResponse>, NotificationError> {
        let channels = sqlx::query_as::<_, NotificationChannel>(
            "SELECT * FROM notification_channels ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(channels
            .into_iter()
            .map(|c| ChannelResponse {
                id: c.id,
                name: c.name,
                channel_type: c.channel_type,
            })
            .collect())
    }

    pub async fn delete_channel(&self, channel_id: i64) -> Result<(), NotificationError> {
        let result = sqlx::query("DELETE FROM notification_channels WHERE id = ?")
            .bind(channel_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(NotificationError::NotFound(channel_id));
        }
        Ok(())
    }

    pub async fn test_channel(
        &self,
        channel_id: i64,
        message: Option<String>,
    ) -> Result<(), NotificationError> {
        let channel = self.get_channel_row(channel_id).await?;
        let test_message = message
            .unwrap_or_else(|| format!("This is a test message from channel '{}'.", channel.name));
        self.send_to_channel(&channel, &test_message, &HashMap::new())
            .await
    }

    /// Delivers one message to a stored channel, decrypting its config first.
    pub async fn send_to_channel(
        &self,
        channel: &NotificationChannel,
        message: &str,
        context: &HashMap<String, String>,
    ) -> Result<(), NotificationError> {
        let decrypted = self.encryption.decrypt(&channel.config)?;
        let config: ChannelConfig = serde_json::from_slice(&decrypted)?;

        match channel.channel_type.as_str() {
            "telegram" => self.telegram.send(&config, message, context).await?,
            "webhook" => self.webhook.send(&config, message, context).await?,
            other => return Err(NotificationError::UnsupportedChannel(other.to_string())),
        }
        Ok(())
    }

    /// Fans an alert out to all subscriber chats (through the service's own
    /// bot token) and all configured channels. Individual delivery failures
    /// are logged and do not stop the fanout; the last one is reported.
    pub async fn broadcast(
        &self,
        bot_token: &str,
        message: &str,
        context: &HashMap<String, String>,
    ) -> Result<(), NotificationError> {
        let mut last_error: Option<NotificationError> = None;

        let subscribers = subscriber_service::list(&self.pool).await?;
        for chat_id in &subscribers {
            let config = ChannelConfig::Telegram {
                bot_token: bot_token.to_string(),
                chat_id: chat_id.to_string(),
            };
            if let Err(e) = self.telegram.send(&config, message, context).await {
                warn!(chat_id = chat_id, error = %e, "Failed to notify subscriber.");
                last_error = Some(e.into());
            }
        }

        let channels = sqlx::query_as::<_, NotificationChannel>(
            "SELECT * FROM notification_channels ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        for channel in &channels {
            if let Err(e) = self.send_to_channel(channel, message, context).await {
                warn!(channel_id = channel.id, error = %e, "Failed to notify channel.");
                last_error = Some(e);
            }
        }

        info!(
            subscribers = subscribers.len(),
            channels = channels.len(),
            "Alert fanout finished."
        );

        match last_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn get_channel_row(
        &self,
        channel_id: i64,
    ) -> Result<NotificationChannel, NotificationError> {
        sqlx::query_as::<_, NotificationChannel>(
            "SELECT * FROM notification_channels WHERE id = ?",
        )
        .bind(channel_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => NotificationError::NotFound(channel_id),
            _ => NotificationError::DatabaseError(e),
        })
    }
}

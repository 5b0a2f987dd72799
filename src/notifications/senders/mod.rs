//! Delivery backends for alert notifications.
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use super::models::ChannelConfig;

pub mod telegram;
pub mod webhook;

#[derive(Error, Debug)]
pub enum SenderError {
    #[error("Delivery failed: {0}")]
    SendFailed(String),
    #[error("Invalid channel configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Template rendering error: {0}")]
    TemplatingError(String),
}

/// One delivery backend (Telegram chat, webhook endpoint, ...).
///
/// Implementations receive the decrypted channel config, the rendered alert
/// text, and the alert context for backends that template their own payload.
/// Each call delivers a single message and reports failure per channel, so
/// the fanout can keep going when one target is down.
#[async_trait]
pub trait NotificationSender {
    async fn send(
        &self,
        config: &ChannelConfig,
        message: &str,
        context: &HashMap<String, String>,
    ) -> Result<(), SenderError>;
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for a notification channel. Serialized to JSON and
/// encrypted before being stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChannelConfig {
    Telegram {
        bot_token: String,
        chat_id: String,
    },
    Webhook {
        url: String,
        method: String, // "GET" or "POST"
        headers: Option<HashMap<String, String>>,
        body_template: Option<String>, // JSON template for POST requests
    },
}

impl ChannelConfig {
    /// The channel type name this config belongs to, matching the JSON tag.
    pub fn kind(&self) -> &'static str {
        match self {
            ChannelConfig::Telegram { .. } => "telegram",
            ChannelConfig::Webhook { .. } => "webhook",
        }
    }
}

/// API request body for creating a new notification channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChannelRequest {
    pub name: String,
    pub channel_type: String, // "telegram" or "webhook"
    pub config: serde_json::Value,
}

/// API response for a single notification channel.
/// Deliberately excludes the sensitive config details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResponse {
    pub id: i64,
    pub name: String,
    pub channel_type: String,
}

/// API request for sending a test notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestChannelRequest {
    pub message: Option<String>,
}

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;

use super::{NotificationSender, SenderError};
use crate::notifications::models::ChannelConfig;

/// Delivers notifications through the Telegram Bot API.
pub struct TelegramSender {
    client: Client,
    api_base: String,
}

impl Default for TelegramSender {
    fn default() -> Self {
        Self::new()
    }
}

impl TelegramSender {
    pub fn new() -> Self {
        Self::with_api_base("https://api.telegram.org".to_string())
    }

    /// Points the sender at a different API host. Used by tests.
    pub fn with_api_base(api_base: String) -> Self {
        Self {
            client: Client::new(),
            api_base,
        }
    }

    /// Escapes text for Telegram MarkdownV2.
    /// Characters to escape: _ * [ ] ( ) ~ ` > # + - = | { } . !
    fn escape_markdown_v2(&self, text: &str) -> String {
        let mut escaped_text = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '='
                | '|' | '{' | '}' | '.' | '!' => {
                    escaped_text.push('\\');
                    escaped_text.push(c);
                }
                _ => escaped_text.push(c),
            }
        }
        escaped_text
    }
}

#[derive(Serialize)]
struct TelegramMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[async_trait]
impl NotificationSender for TelegramSender {
    async fn send(
        &self,
        config: &ChannelConfig,
        message: &str,
        _context: &HashMap<String, String>, // Telegram delivers the rendered message as-is
    ) -> Result<(), SenderError> {
        let (bot_token, chat_id) = match config {
            ChannelConfig::Telegram { bot_token, chat_id } => (bot_token, chat_id),
            _ => {
                return Err(SenderError::InvalidConfiguration(
                    "Telegram sender was given a non-telegram channel config".to_string(),
                ));
            }
        };

        let api_url = format!("{}/bot{bot_token}/sendMessage", self.api_base);

        let escaped_message = self.escape_markdown_v2(message);
        let payload = TelegramMessage {
            chat_id,
            text: &escaped_message,
            parse_mode: "MarkdownV2",
        };

        let response = self.client.post(&api_url).json(&payload).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(SenderError::SendFailed(format!(
                "Telegram API returned non-success status: {status}. Body: {error_body}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_v2_escaping() {
        let sender = TelegramSender::new();
        assert_eq!(
            sender.escape_markdown_v2("site is down! (code 503)"),
            "site is down\\! \\(code 503\\)"
        );
        assert_eq!(sender.escape_markdown_v2("plain text"), "plain text");
    }

    #[tokio::test]
    async fn test_rejects_wrong_config_type() {
        let sender = TelegramSender::new();
        let config = ChannelConfig::Webhook {
            url: "http://example.com".to_string(),
            method: "POST".to_string(),
            headers: None,
            body_template: None,
        };
        let result = sender.send(&config, "msg", &HashMap::new()).await;
        assert!(matches!(result, Err(SenderError::InvalidConfiguration(_))));
    }
}

//! Thin client for the bot HTTP API (sendMessage / getUpdates / webhooks).
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Bot API returned an error: {0}")]
    Api(String),
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

/// An incoming update as delivered by long polling or the webhook endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

pub struct BotApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl BotApiClient {
    pub fn new(bot_token: &str) -> Self {
        Self::with_base_url(format!("https://api.telegram.org/bot{bot_token}"))
    }

    /// Builds a client against an explicit base url. Used by tests.
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), BotApiError> {
        let url = format!("{}/sendMessage", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await?;

        self.check_response::<serde_json::Value>(response).await?;
        Ok(())
    }

    /// Long-polls for updates. The request timeout leaves headroom over the
    /// server-side poll timeout.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_seconds: u64,
    ) -> Result<Vec<Update>, BotApiError> {
        let url = format!("{}/getUpdates", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("offset", offset), ("timeout", timeout_seconds as i64)])
            .timeout(Duration::from_secs(timeout_seconds + 10))
            .send()
            .await?;

        let updates = self.check_response::<Vec<Update>>(response).await?;
        Ok(updates.unwrap_or_default())
    }

    pub async fn set_webhook(&self, webhook_url: &str) -> Result<(), BotApiError> {
        let url = format!("{}/setWebhook", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "url": webhook_url }))
            .send()
            .await?;

        self.check_response::<serde_json::Value>(response).await?;
        Ok(())
    }

    pub async fn delete_webhook(&self) -> Result<(), BotApiError> {
        let url = format!("{}/deleteWebhook", self.base_url);
        let response = self.client.post(&url).send().await?;
        self.check_response::<serde_json::Value>(response).await?;
        Ok(())
    }

    async fn check_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<Option<T>, BotApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(BotApiError::Api(format!(
                "Non-success status: {status}. Body: {body}"
            )));
        }

        let parsed: ApiResponse<T> = response.json().await?;
        if !parsed.ok {
            return Err(BotApiError::Api(
                parsed
                    .description
                    .unwrap_or_else(|| "Unknown API error".to_string()),
            ));
        }
        Ok(parsed.result)
    }
}

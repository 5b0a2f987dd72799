use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use std::collections::HashMap;
use tera::{Context, Tera};

use super::{NotificationSender, SenderError};
use crate::notifications::models::ChannelConfig;

/// Pushes alerts to a user-configured HTTP endpoint.
///
/// POST requests carry a JSON body rendered from the channel's Tera template
/// (falling back to the plain alert text); GET requests send no body, so any
/// signalling has to live in the URL and headers. The rendered alert text is
/// always available to templates as `{{ message }}`.
pub struct WebhookSender {
    client: Client,
}

impl Default for WebhookSender {
    fn default() -> Self {
        Self::new()
    }
}

impl WebhookSender {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    fn parse_method(method: &str) -> Result<Method, SenderError> {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            other => Err(SenderError::InvalidConfiguration(format!(
                "Webhook method must be GET or POST, got {other}"
            ))),
        }
    }

    fn build_headers(headers: &HashMap<String, String>) -> Result<HeaderMap, SenderError> {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                SenderError::InvalidConfiguration(format!("Invalid header name {name:?}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|_| {
                SenderError::InvalidConfiguration(format!("Invalid value for header {name:?}"))
            })?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }

    fn render_body(
        template: Option<&str>,
        message: &str,
        context: &HashMap<String, String>,
    ) -> Result<String, SenderError> {
        let mut tera_context = Context::new();
        tera_context.insert("message", message);
        for (key, value) in context {
            tera_context.insert(key, value);
        }
        Tera::one_off(template.unwrap_or(message), &tera_context, true)
            .map_err(|e| SenderError::TemplatingError(e.to_string()))
    }
}

#[async_trait]
impl NotificationSender for WebhookSender {
    async fn send(
        &self,
        config: &ChannelConfig,
        message: &str,
        context: &HashMap<String, String>,
    ) -> Result<(), SenderError> {
        let ChannelConfig::Webhook {
            url,
            method,
            headers,
            body_template,
        } = config
        else {
            return Err(SenderError::InvalidConfiguration(
                "Webhook sender was given a non-webhook channel config".to_string(),
            ));
        };

        let method = Self::parse_method(method)?;
        let mut request = self.client.request(method.clone(), url);

        if let Some(headers) = headers {
            request = request.headers(Self::build_headers(headers)?);
        }

        if method == Method::POST {
            let body = Self::render_body(body_template.as_deref(), message, context)?;
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SenderError::SendFailed(format!(
                "Webhook endpoint answered {status}: {body}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn config(url: String, method: &str) -> ChannelConfig {
        ChannelConfig::Webhook {
            url,
            method: method.to_string(),
            headers: None,
            body_template: None,
        }
    }

    #[tokio::test]
    async fn test_get_request_carries_headers_and_no_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/ping").header("x-token", "s3cret");
                then.status(204);
            })
            .await;

        let mut headers = HashMap::new();
        headers.insert("x-token".to_string(), "s3cret".to_string());
        let config = ChannelConfig::Webhook {
            url: server.url("/ping"),
            method: "get".to_string(),
            headers: Some(headers),
            body_template: None,
        };

        let sender = WebhookSender::new();
        sender.send(&config, "site is down", &HashMap::new()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_falls_back_to_message_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/hook").body("site is down");
                then.status(200);
            })
            .await;

        let sender = WebhookSender::new();
        sender
            .send(&config(server.url("/hook"), "POST"), "site is down", &HashMap::new())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_header_name_is_rejected_before_sending() {
        let mut headers = HashMap::new();
        headers.insert("not a header".to_string(), "x".to_string());
        let config = ChannelConfig::Webhook {
            // Nothing listens here; the config error must surface first.
            url: "http://127.0.0.1:9".to_string(),
            method: "GET".to_string(),
            headers: Some(headers),
            body_template: None,
        };

        let sender = WebhookSender::new();
        let result = sender.send(&config, "msg", &HashMap::new()).await;
        assert!(matches!(result, Err(SenderError::InvalidConfiguration(_))));
    }

    #[tokio::test]
    async fn test_unsupported_method_is_rejected() {
        let sender = WebhookSender::new();
        let result = sender
            .send(&config("http://127.0.0.1:9".to_string(), "DELETE"), "msg", &HashMap::new())
            .await;
        assert!(matches!(result, Err(SenderError::InvalidConfiguration(_))));
    }

    #[tokio::test]
    async fn test_non_success_status_fails_the_delivery() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/hook");
                then.status(500).body("boom");
            })
            .await;

        let sender = WebhookSender::new();
        let result = sender
            .send(&config(server.url("/hook"), "POST"), "msg", &HashMap::new())
            .await;
        assert!(matches!(result, Err(SenderError::SendFailed(_))));
    }

    #[tokio::test]
    async fn test_rejects_wrong_config_type() {
        let sender = WebhookSender::new();
        let config = ChannelConfig::Telegram {
            bot_token: "123:test".to_string(),
            chat_id: "1".to_string(),
        };
        let result = sender.send(&config, "msg", &HashMap::new()).await;
        assert!(matches!(result, Err(SenderError::InvalidConfiguration(_))));
    }
}

use httpmock::prelude::*;

use sitewatch::config::SiteWatchConfig;
use sitewatch::monitor::checker;

fn test_config(check_url: String) -> SiteWatchConfig {
    SiteWatchConfig {
        check_url,
        bot_token: "123:test".to_string(),
        check_interval_seconds: 10,
        request_timeout_seconds: 2,
        max_consecutive_errors: 3,
        accept_invalid_certs: false,
        listen_addr: "127.0.0.1:0".to_string(),
        data_dir: "data".to_string(),
        log_dir: "logs".to_string(),
        encryption_key: "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"
            .to_string(),
        retention_days: 30,
        public_webhook_url: None,
    }
}

#[tokio::test]
async fn test_check_once_success() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200).body("ok");
        })
        .await;

    let config = test_config(server.url("/"));
    let client = checker::build_client(&config).unwrap();
    let outcome = checker::check_once(&client, &config.check_url).await;

    mock.assert_async().await;
    assert!(outcome.successful);
    assert_eq!(outcome.status_code, Some(200));
    assert!(outcome.response_time_ms.is_some());
    assert_eq!(outcome.details, "HTTP 200");
}

#[tokio::test]
async fn test_check_once_http_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(503);
        })
        .await;

    let config = test_config(server.url("/"));
    let client = checker::build_client(&config).unwrap();
    let outcome = checker::check_once(&client, &config.check_url).await;

    assert!(!outcome.successful);
    assert_eq!(outcome.status_code, Some(503));
    assert_eq!(outcome.details, "HTTP error 503");
}

#[tokio::test]
async fn test_check_once_connection_error() {
    // Nothing listens on this port.
    let config = test_config("http://127.0.0.1:9".to_string());
    let client = checker::build_client(&config).unwrap();
    let outcome = checker::check_once(&client, &config.check_url).await;

    assert!(!outcome.successful);
    assert_eq!(outcome.status_code, None);
    assert_eq!(outcome.response_time_ms, None);
    assert!(outcome.details.starts_with("Error:"));
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/")
                .header("user-agent", checker::USER_AGENT);
            then.status(200);
        })
        .await;

    let config = test_config(server.url("/"));
    let client = checker::build_client(&config).unwrap();
    let outcome = checker::check_once(&client, &config.check_url).await;

    mock.assert_async().await;
    assert!(outcome.successful);
}

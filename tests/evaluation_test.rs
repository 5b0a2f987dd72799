use chrono::Utc;
use httpmock::prelude::*;
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;

use sitewatch::alerting::evaluation_service::EvaluationService;
use sitewatch::config::SiteWatchConfig;
use sitewatch::db;
use sitewatch::db::services::{alert_event_service, check_result_service};
use sitewatch::monitor::{CheckOutcome, MonitorState, SiteStatus};
use sitewatch::notifications::encryption::EncryptionService;
use sitewatch::notifications::models::CreateChannelRequest;
use sitewatch::notifications::service::{NotificationError, NotificationService};

const KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

fn test_config() -> SiteWatchConfig {
    SiteWatchConfig {
        check_url: "https://example.com/".to_string(),
        bot_token: "123:test".to_string(),
        check_interval_seconds: 10,
        request_timeout_seconds: 2,
        max_consecutive_errors: 3,
        accept_invalid_certs: false,
        listen_addr: "127.0.0.1:0".to_string(),
        data_dir: "data".to_string(),
        log_dir: "logs".to_string(),
        encryption_key: KEY_HEX.to_string(),
        retention_days: 30,
        public_webhook_url: None,
    }
}

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::run_migrations(&pool).await.unwrap();
    pool
}

fn outcome(successful: bool, details: &str) -> CheckOutcome {
    CheckOutcome {
        successful,
        status_code: if successful { Some(200) } else { Some(503) },
        response_time_ms: if successful { Some(120) } else { None },
        details: details.to_string(),
        timestamp: Utc::now(),
    }
}

fn notification_service(pool: &SqlitePool) -> Arc<NotificationService> {
    Arc::new(NotificationService::new(
        pool.clone(),
        Arc::new(EncryptionService::from_hex_key(KEY_HEX).unwrap()),
    ))
}

#[tokio::test]
async fn test_outage_lifecycle_persists_results_and_events() {
    let pool = test_pool().await;
    let monitor = MonitorState::new_shared();
    // No subscribers and no channels, so the fanout is a no-op.
    let service = EvaluationService::new(
        pool.clone(),
        Arc::new(test_config()),
        monitor.clone(),
        notification_service(&pool),
    );

    service.process_outcome(&outcome(true, "HTTP 200")).await.unwrap();
    service
        .process_outcome(&outcome(false, "HTTP error 503"))
        .await
        .unwrap();
    service
        .process_outcome(&outcome(false, "HTTP error 503"))
        .await
        .unwrap();
    service
        .process_outcome(&outcome(false, "HTTP error 503"))
        .await
        .unwrap();
    service.process_outcome(&outcome(true, "HTTP 200")).await.unwrap();

    let results = check_result_service::recent(&pool, 10).await.unwrap();
    assert_eq!(results.len(), 5);

    // One outage start, one escalation at the threshold, one recovery.
    let events = alert_event_service::recent(&pool, 10).await.unwrap();
    let kinds: Vec<&str> = events.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds.len(), 3);
    assert!(kinds.contains(&"outage_started"));
    assert!(kinds.contains(&"escalated"));
    assert!(kinds.contains(&"recovered"));

    let state = monitor.read().unwrap().snapshot();
    assert_eq!(state.status, SiteStatus::Up);
    assert_eq!(state.total_checks, 5);
    assert_eq!(state.failed_checks, 3);
}

#[tokio::test]
async fn test_webhook_channel_receives_rendered_alert() {
    let webhook_server = MockServer::start_async().await;
    let hook_mock = webhook_server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/hook")
                .body_contains("https://example.com/");
            then.status(200);
        })
        .await;

    let pool = test_pool().await;
    let notifications = notification_service(&pool);
    notifications
        .create_channel(CreateChannelRequest {
            name: "ops hook".to_string(),
            channel_type: "webhook".to_string(),
            config: json!({
                "type": "webhook",
                "url": webhook_server.url("/hook"),
                "method": "POST",
                "headers": null,
                "body_template": "{\"site\": \"{{ site_url | safe }}\", \"errors\": \"{{ consecutive_errors }}\"}"
            }),
        })
        .await
        .unwrap();

    let mut context = HashMap::new();
    context.insert("site_url".to_string(), "https://example.com/".to_string());
    context.insert("consecutive_errors".to_string(), "1".to_string());

    notifications
        .broadcast("123:test", "site is down", &context)
        .await
        .unwrap();

    hook_mock.assert_async().await;
}

fn webhook_channel(name: &str, url: String) -> CreateChannelRequest {
    CreateChannelRequest {
        name: name.to_string(),
        channel_type: "webhook".to_string(),
        config: json!({
            "type": "webhook",
            "url": url,
            "method": "POST",
            "headers": null,
            "body_template": null
        }),
    }
}

#[tokio::test]
async fn test_broadcast_continues_past_failing_channel() {
    let server = MockServer::start_async().await;
    let failing = server
        .mock_async(|when, then| {
            when.method(POST).path("/bad");
            then.status(500);
        })
        .await;
    let healthy = server
        .mock_async(|when, then| {
            when.method(POST).path("/good");
            then.status(200);
        })
        .await;

    let pool = test_pool().await;
    let notifications = notification_service(&pool);
    // The failing channel is created first, so the fanout hits it first.
    notifications
        .create_channel(webhook_channel("bad hook", server.url("/bad")))
        .await
        .unwrap();
    notifications
        .create_channel(webhook_channel("good hook", server.url("/good")))
        .await
        .unwrap();

    let result = notifications
        .broadcast("123:test", "site is down", &HashMap::new())
        .await;

    // The failure is reported, but the healthy channel was still delivered to.
    assert!(result.is_err());
    failing.assert_async().await;
    healthy.assert_async().await;
}

#[tokio::test]
async fn test_create_channel_rejects_mismatched_type() {
    let pool = test_pool().await;
    let notifications = notification_service(&pool);

    let result = notifications
        .create_channel(CreateChannelRequest {
            name: "mislabelled".to_string(),
            channel_type: "telegram".to_string(),
            config: json!({
                "type": "webhook",
                "url": "http://127.0.0.1:9",
                "method": "POST",
                "headers": null,
                "body_template": null
            }),
        })
        .await;

    assert!(matches!(
        result,
        Err(NotificationError::ChannelTypeMismatch { .. })
    ));
    assert!(notifications.list_channels().await.unwrap().is_empty());
}

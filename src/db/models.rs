use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CheckResultRow {
    pub id: i64,
    pub checked_at: DateTime<Utc>,
    pub successful: bool,
    pub status_code: Option<i64>,
    pub response_time_ms: Option<i64>,
    pub details: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AlertEventRow {
    pub id: String,
    pub kind: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Stored channel row; `config` is hex-encoded AES-GCM ciphertext.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NotificationChannel {
    pub id: i64,
    pub name: String,
    pub channel_type: String,
    pub config: String,
    pub created_at: DateTime<Utc>,
}

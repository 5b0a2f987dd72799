use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::models::{AlertEventRow, CheckResultRow};
use crate::db::services::{alert_event_service, check_result_service, subscriber_service};
use crate::monitor::{SiteStatus, StatsSnapshot};
use crate::web::{AppError, AppState};

pub fn create_status_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", get(get_status))
        .route("/stats", get(get_stats))
        .route("/checks", get(get_recent_checks))
        .route("/alerts", get(get_recent_alerts))
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<i64>,
}

impl LimitQuery {
    fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 500)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    site_url: String,
    status: SiteStatus,
    consecutive_errors: u32,
    last_check: Option<chrono::DateTime<chrono::Utc>>,
    last_details: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    site_url: String,
    subscriber_count: i64,
    #[serde(flatten)]
    snapshot: StatsSnapshot,
}

async fn get_status(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, AppError> {
    let snapshot = app_state.monitor.read().unwrap().snapshot();
    Ok(Json(StatusResponse {
        site_url: app_state.config.check_url.clone(),
        status: snapshot.status,
        consecutive_errors: snapshot.consecutive_errors,
        last_check: snapshot.last_check,
        last_details: snapshot.last_details,
    }))
}

async fn get_stats(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, AppError> {
    let snapshot = app_state.monitor.read().unwrap().snapshot();
    let subscriber_count = subscriber_service::count(&app_state.pool).await?;
    Ok(Json(StatsResponse {
        site_url: app_state.config.check_url.clone(),
        subscriber_count,
        snapshot,
    }))
}

async fn get_recent_checks(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<CheckResultRow>>, AppError> {
    let rows = check_result_service::recent(&app_state.pool, query.limit()).await?;
    Ok(Json(rows))
}

async fn get_recent_alerts(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<AlertEventRow>>, AppError> {
    let rows = alert_event_service::recent(&app_state.pool, query.limit()).await?;
    Ok(Json(rows))
}

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tracing::error;

use crate::bot::api::Update;
use crate::web::{AppError, AppState};

pub fn create_webhook_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/webhook", post(receive_update))
        .route("/healthz", get(healthz))
}

/// Inbound bot updates in webhook mode. A handler failure is logged but the
/// endpoint still acknowledges, so the bot API does not redeliver endlessly.
async fn receive_update(
    State(app_state): State<Arc<AppState>>,
    Json(update): Json<Update>,
) -> Result<StatusCode, AppError> {
    if let Err(e) = app_state.bot.handle_update(update).await {
        error!(error = %e, "Error handling webhook update.");
    }
    Ok(StatusCode::OK)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

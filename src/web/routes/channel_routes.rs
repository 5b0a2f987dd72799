use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::notifications::models::{ChannelResponse, CreateChannelRequest, TestChannelRequest};
use crate::web::{AppError, AppState};

pub fn create_channel_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/channels", get(list_channels).post(create_channel))
        .route("/channels/{id}", axum::routing::delete(delete_channel))
        .route("/channels/{id}/test", post(test_channel))
}

async fn list_channels(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<ChannelResponse>>, AppError> {
    let channels = app_state.notification_service.list_channels().await?;
    Ok(Json(channels))
}

async fn create_channel(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateChannelRequest>,
) -> Result<(StatusCode, Json<ChannelResponse>), AppError> {
    let channel = app_state.notification_service.create_channel(payload).await?;
    Ok((StatusCode::CREATED, Json(channel)))
}

async fn delete_channel(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state.notification_service.delete_channel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn test_channel(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<TestChannelRequest>,
) -> Result<StatusCode, AppError> {
    app_state
        .notification_service
        .test_channel(id, payload.message)
        .await?;
    Ok(StatusCode::OK)
}

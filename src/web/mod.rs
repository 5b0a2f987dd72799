pub mod error;
pub mod routes;

pub use error::AppError;

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::bot::BotContext;
use crate::config::SiteWatchConfig;
use crate::monitor::SharedMonitorState;
use crate::notifications::service::NotificationService;

pub struct AppState {
    pub config: Arc<SiteWatchConfig>,
    pub pool: SqlitePool,
    pub monitor: SharedMonitorState,
    pub bot: Arc<BotContext>,
    pub notification_service: Arc<NotificationService>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::webhook_routes::create_webhook_router())
        .nest(
            "/api",
            routes::status_routes::create_status_router()
                .merge(routes::channel_routes::create_channel_router()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub mod models;
pub mod services;
pub mod tasks;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;

/// Opens (and creates, if missing) the SQLite database under `data_dir` and
/// applies the schema.
pub async fn init_pool(data_dir: &str) -> Result<SqlitePool, sqlx::Error> {
    std::fs::create_dir_all(data_dir).map_err(sqlx::Error::Io)?;

    let options = SqliteConnectOptions::new()
        .filename(Path::new(data_dir).join("sitewatch.db"))
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS subscribers (
            chat_id    INTEGER PRIMARY KEY,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS check_results (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            checked_at       TEXT NOT NULL,
            successful       INTEGER NOT NULL,
            status_code      INTEGER,
            response_time_ms INTEGER,
            details          TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS alert_events (
            id         TEXT PRIMARY KEY,
            kind       TEXT NOT NULL,
            message    TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS notification_channels (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            name         TEXT NOT NULL,
            channel_type TEXT NOT NULL,
            config       TEXT NOT NULL,
            created_at   TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

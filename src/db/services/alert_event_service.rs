//! Persistence for alert events (outage started / escalated / recovered).
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::AlertEventRow;

/// Records an alert event and returns its generated id.
pub async fn insert(
    pool: &SqlitePool,
    kind: &str,
    message: &str,
) -> Result<String, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO alert_events (id, kind, message, created_at) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(kind)
        .bind(message)
        .bind(Utc::now())
        .execute(pool)
        .await?;
    Ok(id)
}

pub async fn recent(pool: &SqlitePool, limit: i64) -> Result<Vec<AlertEventRow>, sqlx::Error> {
    sqlx::query_as::<_, AlertEventRow>(
        "SELECT * FROM alert_events ORDER BY created_at DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_insert_and_list_events() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::run_migrations(&pool).await.unwrap();

        let id = insert(&pool, "outage_started", "site went down").await.unwrap();
        assert!(!id.is_empty());

        let events = recent(&pool, 10).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, "outage_started");
        assert_eq!(events[0].id, id);
    }
}

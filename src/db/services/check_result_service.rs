//! Persistence for individual check outcomes.
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::db::models::CheckResultRow;
use crate::monitor::CheckOutcome;

pub async fn insert(pool: &SqlitePool, outcome: &CheckOutcome) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO check_results (checked_at, successful, status_code, response_time_ms, details) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(outcome.timestamp)
    .bind(outcome.successful)
    .bind(outcome.status_code.map(i64::from))
    .bind(outcome.response_time_ms)
    .bind(&outcome.details)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn recent(pool: &SqlitePool, limit: i64) -> Result<Vec<CheckResultRow>, sqlx::Error> {
    sqlx::query_as::<_, CheckResultRow>(
        "SELECT * FROM check_results ORDER BY id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Deletes results older than `cutoff`. Returns the number of pruned rows.
pub async fn prune_older_than(
    pool: &SqlitePool,
    cutoff: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM check_results WHERE checked_at < ?")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::run_migrations(&pool).await.unwrap();
        pool
    }

    fn outcome(successful: bool, at: DateTime<Utc>) -> CheckOutcome {
        CheckOutcome {
            successful,
            status_code: Some(if successful { 200 } else { 503 }),
            response_time_ms: Some(15),
            details: "HTTP 200".to_string(),
            timestamp: at,
        }
    }

    #[tokio::test]
    async fn test_insert_and_recent() {
        let pool = test_pool().await;
        let now = Utc::now();

        insert(&pool, &outcome(true, now - Duration::seconds(20))).await.unwrap();
        insert(&pool, &outcome(false, now - Duration::seconds(10))).await.unwrap();
        insert(&pool, &outcome(true, now)).await.unwrap();

        let rows = recent(&pool, 2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].successful);
        assert!(!rows[1].successful);
    }

    #[tokio::test]
    async fn test_pruning_respects_cutoff() {
        let pool = test_pool().await;
        let now = Utc::now();

        insert(&pool, &outcome(true, now - Duration::days(40))).await.unwrap();
        insert(&pool, &outcome(true, now)).await.unwrap();

        let pruned = prune_older_than(&pool, now - Duration::days(30)).await.unwrap();
        assert_eq!(pruned, 1);

        let rows = recent(&pool, 10).await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}

//! Persistence for notification subscribers (chat ids).
use chrono::Utc;
use sqlx::SqlitePool;

/// Adds a subscriber. Returns `false` when the chat was already subscribed.
pub async fn add(pool: &SqlitePool, chat_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("INSERT OR IGNORE INTO subscribers (chat_id, created_at) VALUES (?, ?)")
        .bind(chat_id)
        .bind(Utc::now())
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Removes a subscriber. Returns `false` when the chat was not subscribed.
pub async fn remove(pool: &SqlitePool, chat_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM subscribers WHERE chat_id = ?")
        .bind(chat_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn contains(pool: &SqlitePool, chat_id: i64) -> Result<bool, sqlx::Error> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM subscribers WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT chat_id FROM subscribers ORDER BY chat_id")
        .fetch_all(pool)
        .await
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM subscribers")
        .fetch_one(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[tokio::test]
    async fn test_subscribe_is_idempotent() {
        let pool = test_pool().await;

        assert!(add(&pool, 42).await.unwrap());
        assert!(!add(&pool, 42).await.unwrap());
        assert!(contains(&pool, 42).await.unwrap());
        assert_eq!(count(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        let pool = test_pool().await;

        add(&pool, 7).await.unwrap();
        assert!(remove(&pool, 7).await.unwrap());
        assert!(!remove(&pool, 7).await.unwrap());
        assert!(!contains(&pool, 7).await.unwrap());
        assert_eq!(list(&pool).await.unwrap(), Vec::<i64>::new());
    }
}

//! Event subscription repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::EventType;

/// Subscribe an execution to a named message or signal
pub async fn add_event_subscription(
    pool: &SqlitePool,
    execution_id: &str,
    event_type: EventType,
    event_name: &str,
) -> Result<i64, SqliteError> {
    let now = chrono::Utc::now().timestamp_millis();

    let result = sqlx::query(
        r#"
        INSERT INTO event_subscriptions (execution_id, event_type, event_name, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(execution_id)
    .bind(event_type.as_str())
    .bind(event_name)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Names of events of `event_type` an execution is subscribed to
pub async fn list_event_names(
    pool: &SqlitePool,
    execution_id: &str,
    event_type: EventType,
) -> Result<Vec<String>, SqliteError> {
    let names: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT event_name
        FROM event_subscriptions
        WHERE execution_id = ? AND event_type = ?
        ORDER BY event_name
        "#,
    )
    .bind(execution_id)
    .bind(event_type.as_str())
    .fetch_all(pool)
    .await?;

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::execution::insert_execution;
    use crate::data::sqlite::test_support::test_pool;
    use crate::data::types::NewExecution;

    #[tokio::test]
    async fn test_subscriptions_are_typed() {
        let pool = test_pool().await;
        insert_execution(&pool, &NewExecution::process_instance("pi-1", "p", 1))
            .await
            .unwrap();

        add_event_subscription(&pool, "pi-1", EventType::Message, "paymentReceived")
            .await
            .unwrap();
        add_event_subscription(&pool, "pi-1", EventType::Signal, "cancel")
            .await
            .unwrap();
        add_event_subscription(&pool, "pi-1", EventType::Message, "addressChanged")
            .await
            .unwrap();

        let messages = list_event_names(&pool, "pi-1", EventType::Message)
            .await
            .unwrap();
        assert_eq!(messages, vec!["addressChanged", "paymentReceived"]);

        let signals = list_event_names(&pool, "pi-1", EventType::Signal)
            .await
            .unwrap();
        assert_eq!(signals, vec!["cancel"]);
    }
}

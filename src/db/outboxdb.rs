// db/outboxdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{db::DBClient, StoreError};
use crate::models::outboxmodels::{OutboxEntry, PropagationIntent};

/// Durable queue of cross-store writes still owed to a collaborator store.
/// Entries survive process restarts; the retry worker drains them until
/// acknowledged.
#[async_trait]
pub trait OutboxExt: Send + Sync {
    async fn enqueue_intent(&self, intent: &PropagationIntent) -> Result<OutboxEntry, StoreError>;

    /// Unacknowledged entries whose next attempt is due, oldest first.
    async fn due_entries(&self, limit: i64) -> Result<Vec<OutboxEntry>, StoreError>;

    async fn mark_acked(&self, entry_id: Uuid) -> Result<(), StoreError>;

    async fn mark_failed(
        &self,
        entry_id: Uuid,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

#[async_trait]
impl OutboxExt for DBClient {
    async fn enqueue_intent(&self, intent: &PropagationIntent) -> Result<OutboxEntry, StoreError> {
        let payload = serde_json::to_value(intent)
            .map_err(|e| StoreError::Unavailable(format!("intent serialization: {}", e)))?;

        let entry = sqlx::query_as::<_, OutboxEntry>(
            r#"
            INSERT INTO propagation_outbox (kind, payload)
            VALUES ($1, $2)
            RETURNING id, kind, payload, attempts, next_attempt_at,
                      last_error, created_at, acked_at
            "#,
        )
        .bind(intent.kind())
        .bind(payload)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn due_entries(&self, limit: i64) -> Result<Vec<OutboxEntry>, StoreError> {
        let entries = sqlx::query_as::<_, OutboxEntry>(
            r#"
            SELECT id, kind, payload, attempts, next_attempt_at,
                   last_error, created_at, acked_at
            FROM propagation_outbox
            WHERE acked_at IS NULL AND next_attempt_at <= NOW()
            ORDER BY created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn mark_acked(&self, entry_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE propagation_outbox SET acked_at = NOW() WHERE id = $1")
            .bind(entry_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn mark_failed(
        &self,
        entry_id: Uuid,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE propagation_outbox
            SET attempts = attempts + 1, last_error = $1, next_attempt_at = $2
            WHERE id = $3
            "#,
        )
        .bind(error)
        .bind(next_attempt_at)
        .bind(entry_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

use super::util::downcast;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::types::JsonValue;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

pub struct MySqlOutboxRepo {
    pool: MySqlPool,
}

impl MySqlOutboxRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlOutboxRepo { pool }
    }

    fn row_to_event(r: &MySqlRow) -> anyhow::Result<NotificationEvent> {
        let event_type: EventType =
            serde_json::from_value(JsonValue::String(r.get::<String, _>("event_type")))?;

        Ok(NotificationEvent {
            event_id: EventId(r.get::<Uuid, _>("event_id")),
            event_type,
            receivers_json: r.get::<JsonValue, _>("receivers_json"),
            payload_json: r.get::<JsonValue, _>("payload_json"),
            created_at: r.get::<DateTime<Utc>, _>("created_at"),
        })
    }

    fn type_tag(event_type: EventType) -> anyhow::Result<String> {
        match serde_json::to_value(event_type)? {
            JsonValue::String(s) => Ok(s),
            other => anyhow::bail!("unexpected event type encoding: {other}"),
        }
    }
}

#[async_trait::async_trait]
impl OutboxRepo for MySqlOutboxRepo {
    async fn enqueue_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        event: &NotificationEvent,
    ) -> anyhow::Result<()> {
        let tx = downcast(tx);

        sqlx::query(
            r#"
INSERT INTO outbox (event_id, event_type, receivers_json, payload_json, created_at, next_attempt_at)
VALUES (?, ?, ?, ?, ?, ?)
ON DUPLICATE KEY UPDATE event_id = event_id
"#,
        )
        .bind(event.event_id)
        .bind(Self::type_tag(event.event_type)?)
        .bind(&event.receivers_json)
        .bind(&event.payload_json)
        .bind(event.created_at)
        .bind(event.created_at)
        .execute(tx.conn())
        .await?;

        Ok(())
    }

    async fn claim_ready_batch_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        now: DateTime<Utc>,
        limit: u32,
    ) -> anyhow::Result<Vec<NotificationEvent>> {
        let tx = downcast(tx);

        let rows = sqlx::query(
            r#"
SELECT event_id, event_type, receivers_json, payload_json, created_at
FROM outbox
WHERE delivered_at IS NULL
  AND next_attempt_at <= ?
ORDER BY created_at ASC
LIMIT ?
FOR UPDATE SKIP LOCKED
"#,
        )
        .bind(now)
        .bind(limit as i64)
        .fetch_all(tx.conn())
        .await?;

        rows.iter().map(Self::row_to_event).collect()
    }

    async fn mark_delivered_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        event_id: EventId,
        delivered_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let tx = downcast(tx);

        sqlx::query("UPDATE outbox SET delivered_at = ? WHERE event_id = ?")
            .bind(delivered_at)
            .bind(event_id)
            .execute(tx.conn())
            .await?;

        Ok(())
    }

    async fn reschedule_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        event_id: EventId,
        next_attempt_at: DateTime<Utc>,
        last_error: &str,
    ) -> anyhow::Result<()> {
        let tx = downcast(tx);

        sqlx::query("UPDATE outbox SET next_attempt_at = ?, last_error = ? WHERE event_id = ?")
            .bind(next_attempt_at)
            .bind(last_error)
            .bind(event_id)
            .execute(tx.conn())
            .await?;

        Ok(())
    }
}

use crate::domain_port::*;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

struct OutboxRow {
    event: NotificationEvent,
    next_attempt_at: DateTime<Utc>,
    delivered_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

pub struct MemoryOutboxRepo {
    rows: DashMap<EventId, OutboxRow>,
}

impl MemoryOutboxRepo {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
        }
    }

    pub fn undelivered_count(&self) -> usize {
        self.rows.iter().filter(|r| r.delivered_at.is_none()).count()
    }

    pub fn undelivered_ids(&self) -> Vec<EventId> {
        self.rows
            .iter()
            .filter(|r| r.delivered_at.is_none())
            .map(|r| *r.key())
            .collect()
    }

    pub fn last_error_of(&self, event_id: EventId) -> Option<String> {
        self.rows.get(&event_id).and_then(|r| r.last_error.clone())
    }
}

impl Default for MemoryOutboxRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl OutboxRepo for MemoryOutboxRepo {
    async fn enqueue_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        event: &NotificationEvent,
    ) -> anyhow::Result<()> {
        self.rows.entry(event.event_id).or_insert_with(|| OutboxRow {
            event: event.clone(),
            next_attempt_at: event.created_at,
            delivered_at: None,
            last_error: None,
        });
        Ok(())
    }

    async fn claim_ready_batch_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        now: DateTime<Utc>,
        limit: u32,
    ) -> anyhow::Result<Vec<NotificationEvent>> {
        let mut ready: Vec<NotificationEvent> = self
            .rows
            .iter()
            .filter(|r| r.delivered_at.is_none() && r.next_attempt_at <= now)
            .map(|r| r.event.clone())
            .collect();
        ready.sort_by_key(|e| (e.created_at, e.event_id));
        ready.truncate(limit as usize);
        Ok(ready)
    }

    async fn mark_delivered_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        event_id: EventId,
        delivered_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        if let Some(mut row) = self.rows.get_mut(&event_id) {
            row.delivered_at = Some(delivered_at);
        }
        Ok(())
    }

    async fn reschedule_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        event_id: EventId,
        next_attempt_at: DateTime<Utc>,
        last_error: &str,
    ) -> anyhow::Result<()> {
        if let Some(mut row) = self.rows.get_mut(&event_id) {
            row.next_attempt_at = next_attempt_at;
            row.last_error = Some(last_error.to_owned());
        }
        Ok(())
    }
}

use crate::domain_model::*;
use crate::domain_port::repo_tx::StorageTx;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct EventId(pub uuid::Uuid);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "friend.request.new")]
    FriendRequestNew,
    #[serde(rename = "friend.request.accepted")]
    FriendRequestAccepted,
    #[serde(rename = "friend.request.denied")]
    FriendRequestDenied,
    #[serde(rename = "group.join.requested")]
    GroupJoinRequested,
    #[serde(rename = "group.join.approved")]
    GroupJoinApproved,
    #[serde(rename = "group.join.rejected")]
    GroupJoinRejected,
    #[serde(rename = "group.member.kicked")]
    GroupMemberKicked,
}

/// One pending notification, enqueued inside the same transaction as the
/// mutation that caused it. A background worker delivers and marks it.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub event_id: EventId,
    pub event_type: EventType,
    pub receivers_json: serde_json::Value,
    pub payload_json: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn new(
        event_type: EventType,
        receivers: Vec<UserId>,
        payload: &SocialEvent,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            event_id: EventId(uuid::Uuid::new_v4()),
            event_type,
            receivers_json: serde_json::to_value(receivers)?,
            payload_json: serde_json::to_value(payload)?,
            created_at: Utc::now(),
        })
    }

    pub fn receivers(&self) -> anyhow::Result<Vec<UserId>> {
        Ok(serde_json::from_value(self.receivers_json.clone())?)
    }
}

#[async_trait::async_trait]
pub trait OutboxRepo: Send + Sync {
    async fn enqueue_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        event: &NotificationEvent,
    ) -> anyhow::Result<()>;

    /// Undelivered events whose next attempt is due, oldest first, locked
    /// for the claiming transaction.
    async fn claim_ready_batch_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        now: DateTime<Utc>,
        limit: u32,
    ) -> anyhow::Result<Vec<NotificationEvent>>;

    async fn mark_delivered_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        event_id: EventId,
        delivered_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;

    async fn reschedule_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        event_id: EventId,
        next_attempt_at: DateTime<Utc>,
        last_error: &str,
    ) -> anyhow::Result<()>;
}

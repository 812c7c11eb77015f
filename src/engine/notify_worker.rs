use crate::domain_model::SocialEvent;
use crate::domain_port::*;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Drains the notification outbox and hands each event to the `Notifier`
/// collaborator, one call per recipient. Failed events are rescheduled
/// with a backoff; the mutating operations that enqueued them are long
/// since committed.
pub struct NotifyWorker {
    tx_manager: Arc<dyn TxManager>,
    outbox_repo: Arc<dyn OutboxRepo>,
    notifier: Arc<dyn Notifier>,
    batch_size: u32,
    poll_interval: Duration,
    retry_backoff: chrono::Duration,
    cancellation_token: CancellationToken,
}

impl NotifyWorker {
    pub fn new(
        tx_manager: Arc<dyn TxManager>,
        outbox_repo: Arc<dyn OutboxRepo>,
        notifier: Arc<dyn Notifier>,
        batch_size: u32,
        poll_interval: Duration,
        retry_backoff: chrono::Duration,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            tx_manager,
            outbox_repo,
            notifier,
            batch_size,
            poll_interval,
            retry_backoff,
            cancellation_token,
        }
    }

    async fn deliver(&self, event: &NotificationEvent) -> anyhow::Result<()> {
        let receivers = event.receivers()?;
        let payload: SocialEvent = serde_json::from_value(event.payload_json.clone())?;
        for receiver in receivers {
            self.notifier.notify(receiver, &payload).await?;
        }
        Ok(())
    }

    pub async fn tick_once(&self) -> anyhow::Result<bool> {
        let mut tx = self.tx_manager.begin().await?;

        let now = Utc::now();
        let batch = self
            .outbox_repo
            .claim_ready_batch_in_tx(&mut *tx, now, self.batch_size)
            .await?;

        if batch.is_empty() {
            tx.commit().await?;
            return Ok(false);
        }

        for event in &batch {
            match self.deliver(event).await {
                Ok(()) => {
                    self.outbox_repo
                        .mark_delivered_in_tx(&mut *tx, event.event_id, Utc::now())
                        .await?;
                }
                Err(e) => {
                    tracing::warn!(event_id = %event.event_id.0, "notification delivery failed: {e:#}");
                    let next = Utc::now() + self.retry_backoff;
                    self.outbox_repo
                        .reschedule_in_tx(&mut *tx, event.event_id, next, &format!("{e:#}"))
                        .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(true)
    }

    pub async fn run(&self) {
        loop {
            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    tracing::info!("notify worker shutting down");
                    break;
                }
                result = self.tick_once() => {
                    match result {
                        Ok(true) => {}
                        Ok(false) => tokio::time::sleep(self.poll_interval).await,
                        Err(e) => {
                            tracing::error!("notify worker tick failed: {e:#}");
                            tokio::time::sleep(self.poll_interval).await;
                        }
                    }
                }
            }
        }
    }
}

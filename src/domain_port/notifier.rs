use crate::domain_model::{SocialEvent, UserId};

/// Best-effort delivery of a workflow event to one user. Failures are
/// logged and retried by the outbox worker, never propagated into the
/// mutating operation.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: UserId, event: &SocialEvent) -> anyhow::Result<()>;
}

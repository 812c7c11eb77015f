use crate::domain_model::{SocialEvent, UserId};
use crate::domain_port::Notifier;

/// Notifier that only logs. Stands in for the application's real
/// transport (popup, e-mail) in demos.
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, recipient: UserId, event: &SocialEvent) -> anyhow::Result<()> {
        tracing::info!(%recipient, ?event, "notification delivered");
        Ok(())
    }
}

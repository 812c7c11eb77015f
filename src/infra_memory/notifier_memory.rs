use crate::domain_model::{SocialEvent, UserId};
use crate::domain_port::Notifier;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Records every delivery; can be switched to fail to exercise the
/// outbox retry path.
pub struct RecordingNotifier {
    delivered: Mutex<Vec<(UserId, SocialEvent)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn delivered(&self) -> Vec<(UserId, SocialEvent)> {
        self.delivered
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    pub fn delivered_to(&self, recipient: UserId) -> Vec<SocialEvent> {
        self.delivered()
            .into_iter()
            .filter(|(user, _)| *user == recipient)
            .map(|(_, event)| event)
            .collect()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, recipient: UserId, event: &SocialEvent) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("notifier unavailable");
        }
        if let Ok(mut delivered) = self.delivered.lock() {
            delivered.push((recipient, event.clone()));
        }
        Ok(())
    }
}

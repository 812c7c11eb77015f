#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use studium::application_impl::*;
use studium::application_port::*;
use studium::domain_model::UserId;
use studium::domain_port::*;
use studium::engine::NotifyWorker;
use studium::infra_memory::*;
use tokio_util::sync::CancellationToken;

/// Full engine wired against the in-memory backend, with a recording
/// notifier and a manually driven outbox worker.
pub struct TestStack {
    pub friends: Arc<dyn FriendGraph>,
    pub groups: Arc<dyn GroupMembership>,
    pub outbox: Arc<MemoryOutboxRepo>,
    pub notifier: Arc<RecordingNotifier>,
    pub directory: Arc<MemoryUserDirectory>,
    worker: NotifyWorker,
}

impl TestStack {
    pub fn new() -> Self {
        let tx_manager: Arc<dyn TxManager> = Arc::new(MemoryTxManager::new());
        let outbox = Arc::new(MemoryOutboxRepo::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let directory = Arc::new(MemoryUserDirectory::new());

        let friends: Arc<dyn FriendGraph> = Arc::new(FriendGraphImpl::new(
            Arc::new(MemoryRelationshipRepo::new()),
            outbox.clone(),
            directory.clone(),
            tx_manager.clone(),
        ));
        let groups: Arc<dyn GroupMembership> = Arc::new(GroupMembershipImpl::new(
            Arc::new(MemoryMembershipRepo::new()),
            outbox.clone(),
            directory.clone(),
            tx_manager.clone(),
        ));

        // zero backoff so failed deliveries are retried by the next tick
        let worker = NotifyWorker::new(
            tx_manager,
            outbox.clone(),
            notifier.clone(),
            64,
            Duration::from_millis(10),
            chrono::Duration::zero(),
            CancellationToken::new(),
        );

        Self {
            friends,
            groups,
            outbox,
            notifier,
            directory,
            worker,
        }
    }

    pub fn user(&self, name: &str) -> UserId {
        self.directory.register(name)
    }

    /// Run worker ticks until the outbox has nothing ready.
    pub async fn drain_outbox(&self) {
        while self.worker.tick_once().await.expect("outbox tick") {}
    }

    /// A single tick, for tests that watch the retry path.
    pub async fn tick_outbox(&self) {
        let _ = self.worker.tick_once().await.expect("outbox tick");
    }
}

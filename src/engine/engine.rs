use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::engine::NotifyWorker;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::settings::Settings;
use sqlx::{MySql, Pool};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Wires the social engine from settings: picks the storage backend,
/// builds the services, and runs the notification worker until
/// `shutdown` is called.
pub struct Engine {
    pub friend_graph: Arc<dyn FriendGraph>,
    pub group_membership: Arc<dyn GroupMembership>,
    worker_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl Engine {
    pub async fn try_new(
        settings: &Settings,
        user_directory: Arc<dyn UserDirectory>,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        let (tx_manager, relationship_repo, membership_repo, outbox_repo): (
            Arc<dyn TxManager>,
            Arc<dyn RelationshipRepo>,
            Arc<dyn MembershipRepo>,
            Arc<dyn OutboxRepo>,
        ) = match settings.storage.backend.as_str() {
            "memory" => (
                Arc::new(MemoryTxManager::new()),
                Arc::new(MemoryRelationshipRepo::new()),
                Arc::new(MemoryMembershipRepo::new()),
                Arc::new(MemoryOutboxRepo::new()),
            ),
            "mysql" => {
                let dsn = settings
                    .storage
                    .mysql_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("storage.mysql_dsn is required for mysql"))?;
                let pool = Pool::<MySql>::connect(dsn).await?;
                (
                    Arc::new(MySqlTxManager::new(pool.clone())),
                    Arc::new(MySqlRelationshipRepo::new(pool.clone())),
                    Arc::new(MySqlMembershipRepo::new(pool.clone())),
                    Arc::new(MySqlOutboxRepo::new(pool)),
                )
            }
            other => return Err(anyhow::anyhow!("unknown storage backend: {}", other)),
        };

        let friend_graph: Arc<dyn FriendGraph> = Arc::new(FriendGraphImpl::new(
            relationship_repo,
            outbox_repo.clone(),
            user_directory.clone(),
            tx_manager.clone(),
        ));
        let group_membership: Arc<dyn GroupMembership> = Arc::new(GroupMembershipImpl::new(
            membership_repo,
            outbox_repo.clone(),
            user_directory,
            tx_manager.clone(),
        ));

        let cancel = CancellationToken::new();
        let worker = NotifyWorker::new(
            tx_manager,
            outbox_repo,
            notifier,
            settings.notify.batch_size,
            Duration::from_millis(settings.notify.poll_interval_ms),
            chrono::Duration::seconds(settings.notify.retry_backoff_secs as i64),
            cancel.clone(),
        );
        let worker_handle = tokio::spawn(async move { worker.run().await });

        Ok(Self {
            friend_graph,
            group_membership,
            worker_handle: Mutex::new(Some(worker_handle)),
            cancel,
        })
    }

    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let handle = match self.worker_handle.lock() {
            Ok(mut lock) => lock.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!("notify worker join failed: {e}");
            }
        }
    }
}

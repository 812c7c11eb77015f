use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;

/// Friend-relationship state machine over the relationship store.
///
/// Every operation runs as a single transaction; notifications go through
/// the outbox enqueued in that same transaction, so delivery can never
/// block or roll back the mutation.
pub struct FriendGraphImpl {
    relationship_repo: Arc<dyn RelationshipRepo>,
    outbox_repo: Arc<dyn OutboxRepo>,
    user_directory: Arc<dyn UserDirectory>,
    tx_manager: Arc<dyn TxManager>,
}

impl FriendGraphImpl {
    pub fn new(
        relationship_repo: Arc<dyn RelationshipRepo>,
        outbox_repo: Arc<dyn OutboxRepo>,
        user_directory: Arc<dyn UserDirectory>,
        tx_manager: Arc<dyn TxManager>,
    ) -> Self {
        Self {
            relationship_repo,
            outbox_repo,
            user_directory,
            tx_manager,
        }
    }

    async fn enqueue(
        &self,
        tx: &mut dyn StorageTx<'_>,
        event_type: EventType,
        receivers: Vec<UserId>,
        payload: &SocialEvent,
    ) -> Result<(), SocialError> {
        let event = NotificationEvent::new(event_type, receivers, payload)
            .map_err(|e| SocialError::Store(format!("compose notification: {e}")))?;
        self.outbox_repo
            .enqueue_in_tx(tx, &event)
            .await
            .map_err(|e| SocialError::Store(format!("enqueue notification: {e}")))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl FriendGraph for FriendGraphImpl {
    async fn send_request(&self, subject: UserId, object: UserId) -> Result<(), SocialError> {
        if subject == object {
            return Err(SocialError::SelfRelationship);
        }

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| SocialError::Store(e.to_string()))?;

        // a block in either direction wins over the plain duplicate check
        let forward = self.relationship_repo.get_in_tx(&mut *tx, subject, object).await?;
        let backward = self.relationship_repo.get_in_tx(&mut *tx, object, subject).await?;
        let blocked = |edge: &Option<FriendEdge>| {
            matches!(
                edge,
                Some(FriendEdge {
                    status: RelationStatus::Blocked,
                    ..
                })
            )
        };
        if blocked(&forward) || blocked(&backward) {
            return Err(SocialError::Blocked);
        }
        if forward.is_some() || backward.is_some() {
            return Err(SocialError::RelationshipExists);
        }

        // the unique (subject, object) key backstops concurrent senders
        let edge = FriendEdge::new(subject, object, RelationStatus::Pending);
        self.relationship_repo.insert_in_tx(&mut *tx, &edge).await?;

        let username = self.user_directory.get_username(subject).await?;
        self.enqueue(
            &mut *tx,
            EventType::FriendRequestNew,
            vec![object],
            &SocialEvent::FriendRequestNew(FriendRequestNew {
                from: subject,
                username,
            }),
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| SocialError::Store(e.to_string()))?;
        Ok(())
    }

    async fn accept(&self, subject: UserId, object: UserId) -> Result<(), SocialError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| SocialError::Store(e.to_string()))?;

        // the accepting party holds the incoming pending edge
        let incoming = self
            .relationship_repo
            .get_in_tx(&mut *tx, object, subject)
            .await?
            .ok_or(SocialError::RelationshipNotFound)?;
        if incoming.status != RelationStatus::Pending {
            return Err(SocialError::RelationshipNotFound);
        }
        // the acceptor may have blocked the requester after the request;
        // only `unblock` exits BLOCKED, so accepting must refuse here
        if let Some(forward) = self
            .relationship_repo
            .get_in_tx(&mut *tx, subject, object)
            .await?
            && forward.status == RelationStatus::Blocked
        {
            return Err(SocialError::Blocked);
        }

        // upsert both directions so the pair is symmetric afterwards
        self.relationship_repo
            .upsert_in_tx(&mut *tx, &incoming.with_status(RelationStatus::Accepted))
            .await?;
        self.relationship_repo
            .upsert_in_tx(&mut *tx, &incoming.reciprocal(RelationStatus::Accepted))
            .await?;

        let username = self.user_directory.get_username(subject).await?;
        self.enqueue(
            &mut *tx,
            EventType::FriendRequestAccepted,
            vec![object],
            &SocialEvent::FriendRequestAccepted(FriendRequestAccepted {
                by: subject,
                username,
            }),
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| SocialError::Store(e.to_string()))?;
        Ok(())
    }

    async fn deny(&self, subject: UserId, object: UserId) -> Result<(), SocialError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| SocialError::Store(e.to_string()))?;

        let incoming = self
            .relationship_repo
            .get_in_tx(&mut *tx, object, subject)
            .await?
            .ok_or(SocialError::RelationshipNotFound)?;

        match incoming.status {
            // idempotent
            RelationStatus::Denied => {}
            RelationStatus::Blocked => return Err(SocialError::Blocked),
            // an ACCEPTED pair is dissolved via `remove`, never denied
            RelationStatus::Accepted => return Err(SocialError::RelationshipNotFound),
            RelationStatus::Pending => {
                self.relationship_repo
                    .upsert_in_tx(&mut *tx, &incoming.with_status(RelationStatus::Denied))
                    .await?;
                self.enqueue(
                    &mut *tx,
                    EventType::FriendRequestDenied,
                    vec![object],
                    &SocialEvent::FriendRequestDenied(FriendRequestDenied { by: subject }),
                )
                .await?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| SocialError::Store(e.to_string()))?;
        Ok(())
    }

    async fn block(&self, subject: UserId, object: UserId) -> Result<(), SocialError> {
        if subject == object {
            return Err(SocialError::SelfRelationship);
        }

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| SocialError::Store(e.to_string()))?;

        // supersedes any prior status; the reverse edge is untouched, and
        // the blocked party is deliberately not notified
        self.relationship_repo
            .upsert_in_tx(
                &mut *tx,
                &FriendEdge::new(subject, object, RelationStatus::Blocked),
            )
            .await?;

        tx.commit()
            .await
            .map_err(|e| SocialError::Store(e.to_string()))?;
        Ok(())
    }

    async fn unblock(&self, subject: UserId, object: UserId) -> Result<(), SocialError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| SocialError::Store(e.to_string()))?;

        if let Some(edge) = self.relationship_repo.get_in_tx(&mut *tx, subject, object).await?
            && edge.status == RelationStatus::Blocked
        {
            self.relationship_repo
                .delete_in_tx(&mut *tx, subject, object)
                .await?;
        }

        tx.commit()
            .await
            .map_err(|e| SocialError::Store(e.to_string()))?;
        Ok(())
    }

    async fn remove(&self, subject: UserId, object: UserId) -> Result<(), SocialError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| SocialError::Store(e.to_string()))?;

        // unfriend clears both directions, but never an active block
        for (a, b) in [(subject, object), (object, subject)] {
            if let Some(edge) = self.relationship_repo.get_in_tx(&mut *tx, a, b).await?
                && edge.status != RelationStatus::Blocked
            {
                self.relationship_repo.delete_in_tx(&mut *tx, a, b).await?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| SocialError::Store(e.to_string()))?;
        Ok(())
    }

    async fn list_friends(&self, user: UserId) -> Result<Vec<FriendEdge>, SocialError> {
        self.relationship_repo.list_by_subject(user).await
    }

    async fn relation(
        &self,
        subject: UserId,
        object: UserId,
    ) -> Result<Option<FriendEdge>, SocialError> {
        self.relationship_repo.get(subject, object).await
    }

    async fn is_blocked(&self, subject: UserId, object: UserId) -> Result<bool, SocialError> {
        let edge = self.relationship_repo.get(subject, object).await?;
        Ok(matches!(
            edge,
            Some(FriendEdge {
                status: RelationStatus::Blocked,
                ..
            })
        ))
    }
}

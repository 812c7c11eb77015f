use crate::application_port::SocialError;
use crate::domain_model::*;
use crate::domain_port::repo_tx::StorageTx;

/// Durable storage of directed relationship edges, keyed by
/// (subject, object). One row per direction.
#[async_trait::async_trait]
pub trait RelationshipRepo: Send + Sync {
    async fn get_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        subject: UserId,
        object: UserId,
    ) -> Result<Option<FriendEdge>, SocialError>;

    /// Insert a new edge. The (subject, object) key is unique; a concurrent
    /// duplicate maps to `RelationshipExists` rather than racing.
    async fn insert_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        edge: &FriendEdge,
    ) -> Result<(), SocialError>;

    /// Insert-or-update by key. Backs reciprocal-edge repair on accept and
    /// status supersession on block.
    async fn upsert_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        edge: &FriendEdge,
    ) -> Result<(), SocialError>;

    /// Idempotent delete of one direction.
    async fn delete_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        subject: UserId,
        object: UserId,
    ) -> Result<(), SocialError>;

    async fn get(&self, subject: UserId, object: UserId)
    -> Result<Option<FriendEdge>, SocialError>;

    /// All edges with `user` as subject, ordered by status then object id.
    async fn list_by_subject(&self, user: UserId) -> Result<Vec<FriendEdge>, SocialError>;
}

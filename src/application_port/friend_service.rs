use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum SocialError {
    // validation
    #[error("cannot create a relationship with yourself")]
    SelfRelationship,
    #[error("{0}")]
    Validation(String),

    // conflict
    #[error("a relationship between these users already exists")]
    RelationshipExists,
    #[error("a group named '{0}' already exists")]
    DuplicateGroupName(String),

    // blocking
    #[error("relationship is blocked")]
    Blocked,

    // not found
    #[error("relationship not found")]
    RelationshipNotFound,
    #[error("group not found")]
    GroupNotFound,
    #[error("group member not found")]
    MemberNotFound,
    #[error("join request not found")]
    RequestNotFound,

    // invalid state transition
    #[error("join request was already processed")]
    AlreadyProcessed,

    // permission
    #[error("permission denied: {0}")]
    PermissionDenied(&'static str),

    // storage, surfaced to callers without internal detail
    #[error("store error: {0}")]
    Store(String),
}

/// The friend-relationship state machine over directed edges.
///
/// Per directed edge: `∅ → PENDING → {ACCEPTED, DENIED} → ∅` (on remove),
/// and `∅ → BLOCKED → ∅` (on unblock). BLOCKED may supersede any status.
#[async_trait::async_trait]
pub trait FriendGraph: Send + Sync {
    /// Create a PENDING edge `subject -> object` and notify `object`.
    ///
    /// Fails with `SelfRelationship` when subject == object, `Blocked` when
    /// either direction holds a BLOCKED edge, `RelationshipExists` when any
    /// edge already links the pair.
    async fn send_request(&self, subject: UserId, object: UserId) -> Result<(), SocialError>;

    /// Accept the pending request addressed to `subject` from `object`.
    ///
    /// Upserts BOTH directions to ACCEPTED in one transaction, so the pair
    /// behaves as an undirected friendship afterwards. Fails with `Blocked`
    /// when `subject` holds a BLOCKED edge towards `object`.
    async fn accept(&self, subject: UserId, object: UserId) -> Result<(), SocialError>;

    /// Deny the pending request addressed to `subject` from `object`.
    /// No-op if the edge is already DENIED; an ACCEPTED edge cannot be
    /// denied (use `remove`).
    async fn deny(&self, subject: UserId, object: UserId) -> Result<(), SocialError>;

    /// Set `subject -> object` to BLOCKED, superseding any prior status.
    /// The reverse edge is untouched.
    async fn block(&self, subject: UserId, object: UserId) -> Result<(), SocialError>;

    /// Remove a BLOCKED edge `subject -> object`. No-op if none exists.
    async fn unblock(&self, subject: UserId, object: UserId) -> Result<(), SocialError>;

    /// Unfriend: delete non-BLOCKED edges in both directions. Idempotent.
    /// BLOCKED edges survive; only `unblock` clears those.
    async fn remove(&self, subject: UserId, object: UserId) -> Result<(), SocialError>;

    /// All edges where `user` is the subject, ordered by status then
    /// counterpart id.
    async fn list_friends(&self, user: UserId) -> Result<Vec<FriendEdge>, SocialError>;

    /// The directed edge `subject -> object`, if any.
    async fn relation(
        &self,
        subject: UserId,
        object: UserId,
    ) -> Result<Option<FriendEdge>, SocialError>;

    /// True iff a BLOCKED edge `subject -> object` exists.
    async fn is_blocked(&self, subject: UserId, object: UserId) -> Result<bool, SocialError>;
}

use crate::application_port::SocialError;
use crate::domain_model::*;

/// Result of `request_join`. The already-* arms are silent no-ops rather
/// than errors, keeping the operation idempotent for the caller.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum JoinOutcome {
    /// Open group: the user was added as MEMBER immediately.
    Joined,
    /// Gated group: a PENDING join request was created.
    Requested,
    AlreadyMember,
    AlreadyRequested,
}

#[async_trait::async_trait]
pub trait GroupMembership: Send + Sync {
    /// Create a group and add `owner` as ADMIN atomically.
    async fn create_group(
        &self,
        owner: UserId,
        name: &str,
        description: &str,
        require_approval: bool,
    ) -> Result<GroupId, SocialError>;

    /// Join an open group immediately, or file a PENDING join request on a
    /// gated one. At most one PENDING request per (group, user) ever exists.
    async fn request_join(&self, group: GroupId, user: UserId)
    -> Result<JoinOutcome, SocialError>;

    /// Approve or reject a PENDING request. ADMIN-only; terminal.
    async fn process_join_request(
        &self,
        request: JoinRequestId,
        approve: bool,
        actor: UserId,
    ) -> Result<(), SocialError>;

    /// ADMIN-only. Raises `target` to ADMIN.
    async fn promote(
        &self,
        group: GroupId,
        actor: UserId,
        target: UserId,
    ) -> Result<(), SocialError>;

    /// ADMIN-only. Lowers `target` to MEMBER; the owner can never be demoted.
    async fn demote(
        &self,
        group: GroupId,
        actor: UserId,
        target: UserId,
    ) -> Result<(), SocialError>;

    /// ADMIN-only. Removes `target` from the group; the owner can never be
    /// kicked.
    async fn kick(&self, group: GroupId, actor: UserId, target: UserId)
    -> Result<(), SocialError>;

    /// A member removes themself. The owner cannot leave their own group.
    async fn leave(&self, group: GroupId, user: UserId) -> Result<(), SocialError>;

    /// Owner-only. Cascades members and join requests.
    async fn delete_group(&self, group: GroupId, actor: UserId) -> Result<(), SocialError>;

    /// ADMIN-only. Toggles join gating; existing members are unaffected.
    async fn set_require_approval(
        &self,
        group: GroupId,
        actor: UserId,
        value: bool,
    ) -> Result<(), SocialError>;

    async fn get_group(&self, group: GroupId) -> Result<Group, SocialError>;

    /// Members ordered by role then user id.
    async fn list_members(&self, group: GroupId) -> Result<Vec<GroupMember>, SocialError>;

    /// ADMIN-only view of the approval queue, oldest first.
    async fn list_pending_requests(
        &self,
        group: GroupId,
        actor: UserId,
    ) -> Result<Vec<JoinRequest>, SocialError>;
}

use crate::application_port::SocialError;
use crate::domain_model::*;
use crate::domain_port::repo_tx::StorageTx;

/// Outcome of the atomic PENDING-request claim. Mirrors a unique-key insert:
/// exactly one caller wins, later callers observe the existing row.
pub enum JoinClaim {
    Won,
    Existing,
}

/// Durable storage of groups, members-with-roles and join requests.
#[async_trait::async_trait]
pub trait MembershipRepo: Send + Sync {
    // groups

    /// Insert a group row. The name is unique; duplicates map to
    /// `DuplicateGroupName`.
    async fn insert_group_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group: &Group,
    ) -> Result<(), SocialError>;

    async fn get_group_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
    ) -> Result<Option<Group>, SocialError>;

    async fn get_group(&self, group_id: GroupId) -> Result<Option<Group>, SocialError>;

    async fn set_require_approval_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
        value: bool,
    ) -> Result<(), SocialError>;

    /// Delete the group and cascade its members and join requests.
    async fn delete_group_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
    ) -> Result<(), SocialError>;

    // members

    /// Insert-if-absent; an existing (group, user) row is left untouched.
    async fn insert_member_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        member: &GroupMember,
    ) -> Result<(), SocialError>;

    async fn get_member_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<Option<GroupMember>, SocialError>;

    async fn update_role_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
        user_id: UserId,
        role: GroupRole,
    ) -> Result<(), SocialError>;

    async fn delete_member_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<(), SocialError>;

    /// Members ordered by role then user id.
    async fn list_members_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
    ) -> Result<Vec<GroupMember>, SocialError>;

    async fn list_members(&self, group_id: GroupId) -> Result<Vec<GroupMember>, SocialError>;

    // join requests

    /// Atomically claim the single PENDING slot for (group, user). Backed by
    /// a unique key over open requests, so two racing callers cannot both
    /// insert.
    async fn claim_join_request_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        request: &JoinRequest,
    ) -> Result<JoinClaim, SocialError>;

    async fn get_join_request_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        request_id: JoinRequestId,
    ) -> Result<Option<JoinRequest>, SocialError>;

    /// Move a request into a terminal state, recording who processed it.
    async fn resolve_join_request_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        request: &JoinRequest,
    ) -> Result<(), SocialError>;

    /// PENDING requests for a group, oldest first.
    async fn list_pending_requests_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
    ) -> Result<Vec<JoinRequest>, SocialError>;
}

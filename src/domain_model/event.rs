use crate::domain_model::{GroupId, UserId};
use serde::{Deserialize, Serialize};

// Payloads delivered to users when a workflow event occurs. Usernames are
// resolved at enqueue time so the receiving side needs no directory lookup.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequestNew {
    pub from: UserId,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequestAccepted {
    pub by: UserId,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequestDenied {
    pub by: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupJoinRequested {
    pub group_id: GroupId,
    pub group_name: String,
    pub user_id: UserId,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupJoinResolved {
    pub group_id: GroupId,
    pub group_name: String,
    pub approved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMemberKicked {
    pub group_id: GroupId,
    pub group_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SocialEvent {
    FriendRequestNew(FriendRequestNew),
    FriendRequestAccepted(FriendRequestAccepted),
    FriendRequestDenied(FriendRequestDenied),
    GroupJoinRequested(GroupJoinRequested),
    GroupJoinResolved(GroupJoinResolved),
    GroupMemberKicked(GroupMemberKicked),
}

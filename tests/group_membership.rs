mod common;

use common::TestStack;
use studium::application_port::{JoinOutcome, SocialError};
use studium::domain_model::{GroupRole, SocialEvent};

#[tokio::test]
async fn create_group_adds_owner_as_admin() {
    let stack = TestStack::new();
    let owner = stack.user("owner");

    let group = stack
        .groups
        .create_group(owner, "Rust Study Circle", "weekly meetups", false)
        .await
        .unwrap();

    let members = stack.groups.list_members(group).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, owner);
    assert_eq!(members[0].role, GroupRole::Admin);

    let loaded = stack.groups.get_group(group).await.unwrap();
    assert_eq!(loaded.owner, owner);
    assert_eq!(loaded.name, "Rust Study Circle");
}

#[tokio::test]
async fn group_name_and_description_are_validated() {
    let stack = TestStack::new();
    let owner = stack.user("owner");

    let too_long = "A".repeat(51);
    assert!(matches!(
        stack
            .groups
            .create_group(owner, &too_long, "desc", false)
            .await
            .unwrap_err(),
        SocialError::Validation(_)
    ));
    assert!(matches!(
        stack
            .groups
            .create_group(owner, "bad;name", "desc", false)
            .await
            .unwrap_err(),
        SocialError::Validation(_)
    ));
    assert!(matches!(
        stack
            .groups
            .create_group(owner, "fine name", "   ", false)
            .await
            .unwrap_err(),
        SocialError::Validation(_)
    ));
}

#[tokio::test]
async fn duplicate_group_name_conflicts() {
    let stack = TestStack::new();
    let owner = stack.user("owner");
    let other = stack.user("other");

    stack
        .groups
        .create_group(owner, "Dup", "first", false)
        .await
        .unwrap();
    let err = stack
        .groups
        .create_group(other, "Dup", "second", false)
        .await
        .unwrap_err();
    assert!(matches!(err, SocialError::DuplicateGroupName(name) if name == "Dup"));
}

#[tokio::test]
async fn open_group_join_is_immediate_with_no_request_row() {
    let stack = TestStack::new();
    let owner = stack.user("owner");
    let user = stack.user("user");

    let group = stack
        .groups
        .create_group(owner, "Open Group", "anyone welcome", false)
        .await
        .unwrap();

    assert_eq!(
        stack.groups.request_join(group, user).await.unwrap(),
        JoinOutcome::Joined
    );
    let members = stack.groups.list_members(group).await.unwrap();
    assert!(members.iter().any(|m| m.user_id == user && m.role == GroupRole::Member));
    assert!(stack
        .groups
        .list_pending_requests(group, owner)
        .await
        .unwrap()
        .is_empty());

    // joining again is a silent no-op
    assert_eq!(
        stack.groups.request_join(group, user).await.unwrap(),
        JoinOutcome::AlreadyMember
    );
}

#[tokio::test]
async fn gated_group_keeps_a_single_pending_request() {
    let stack = TestStack::new();
    let owner = stack.user("owner");
    let user = stack.user("user");

    let group = stack
        .groups
        .create_group(owner, "Gated Group", "apply first", true)
        .await
        .unwrap();

    assert_eq!(
        stack.groups.request_join(group, user).await.unwrap(),
        JoinOutcome::Requested
    );
    assert_eq!(
        stack.groups.request_join(group, user).await.unwrap(),
        JoinOutcome::AlreadyRequested
    );

    let pending = stack.groups.list_pending_requests(group, owner).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].user_id, user);
}

#[tokio::test]
async fn non_admin_cannot_process_requests() {
    let stack = TestStack::new();
    let owner = stack.user("owner");
    let user = stack.user("user");
    let outsider = stack.user("outsider");

    let group = stack
        .groups
        .create_group(owner, "Gated Group", "apply first", true)
        .await
        .unwrap();
    stack.groups.request_join(group, user).await.unwrap();
    let request = stack.groups.list_pending_requests(group, owner).await.unwrap()[0].clone();

    let err = stack
        .groups
        .process_join_request(request.request_id, true, outsider)
        .await
        .unwrap_err();
    assert!(matches!(err, SocialError::PermissionDenied(_)));

    // the request is still pending and processable by an admin
    let pending = stack.groups.list_pending_requests(group, owner).await.unwrap();
    assert_eq!(pending.len(), 1);
}

#[tokio::test]
async fn approval_is_terminal_and_creates_membership() {
    let stack = TestStack::new();
    let owner = stack.user("owner");
    let user = stack.user("user");

    let group = stack
        .groups
        .create_group(owner, "Gated Group", "apply first", true)
        .await
        .unwrap();
    stack.groups.request_join(group, user).await.unwrap();
    let request = stack.groups.list_pending_requests(group, owner).await.unwrap()[0].clone();

    stack
        .groups
        .process_join_request(request.request_id, true, owner)
        .await
        .unwrap();

    let members = stack.groups.list_members(group).await.unwrap();
    assert!(members.iter().any(|m| m.user_id == user && m.role == GroupRole::Member));

    assert!(matches!(
        stack
            .groups
            .process_join_request(request.request_id, false, owner)
            .await
            .unwrap_err(),
        SocialError::AlreadyProcessed
    ));
}

#[tokio::test]
async fn rejection_produces_no_membership_and_allows_reapplying() {
    let stack = TestStack::new();
    let owner = stack.user("owner");
    let user = stack.user("user");

    let group = stack
        .groups
        .create_group(owner, "Gated Group", "apply first", true)
        .await
        .unwrap();
    stack.groups.request_join(group, user).await.unwrap();
    let request = stack.groups.list_pending_requests(group, owner).await.unwrap()[0].clone();

    stack
        .groups
        .process_join_request(request.request_id, false, owner)
        .await
        .unwrap();

    let members = stack.groups.list_members(group).await.unwrap();
    assert!(!members.iter().any(|m| m.user_id == user));

    // rejection is terminal; a fresh request opens a new pending slot
    assert_eq!(
        stack.groups.request_join(group, user).await.unwrap(),
        JoinOutcome::Requested
    );
}

#[tokio::test]
async fn promote_then_demote_round_trips() {
    let stack = TestStack::new();
    let owner = stack.user("owner");
    let user = stack.user("user");

    let group = stack
        .groups
        .create_group(owner, "Open Group", "anyone welcome", false)
        .await
        .unwrap();
    stack.groups.request_join(group, user).await.unwrap();

    stack.groups.promote(group, owner, user).await.unwrap();
    let members = stack.groups.list_members(group).await.unwrap();
    assert!(members.iter().any(|m| m.user_id == user && m.role == GroupRole::Admin));

    stack.groups.demote(group, owner, user).await.unwrap();
    let members = stack.groups.list_members(group).await.unwrap();
    assert!(members.iter().any(|m| m.user_id == user && m.role == GroupRole::Member));
}

#[tokio::test]
async fn owner_is_never_demotable_or_kickable() {
    let stack = TestStack::new();
    let owner = stack.user("owner");
    let admin = stack.user("admin");

    let group = stack
        .groups
        .create_group(owner, "Open Group", "anyone welcome", false)
        .await
        .unwrap();
    stack.groups.request_join(group, admin).await.unwrap();
    stack.groups.promote(group, owner, admin).await.unwrap();

    assert!(matches!(
        stack.groups.demote(group, admin, owner).await.unwrap_err(),
        SocialError::PermissionDenied(_)
    ));
    assert!(matches!(
        stack.groups.kick(group, admin, owner).await.unwrap_err(),
        SocialError::PermissionDenied(_)
    ));

    let members = stack.groups.list_members(group).await.unwrap();
    assert!(members.iter().any(|m| m.user_id == owner && m.role == GroupRole::Admin));
}

#[tokio::test]
async fn plain_members_cannot_moderate() {
    let stack = TestStack::new();
    let owner = stack.user("owner");
    let member = stack.user("member");
    let victim = stack.user("victim");

    let group = stack
        .groups
        .create_group(owner, "Open Group", "anyone welcome", false)
        .await
        .unwrap();
    stack.groups.request_join(group, member).await.unwrap();
    stack.groups.request_join(group, victim).await.unwrap();

    assert!(matches!(
        stack.groups.kick(group, member, victim).await.unwrap_err(),
        SocialError::PermissionDenied(_)
    ));
    assert!(matches!(
        stack.groups.promote(group, member, victim).await.unwrap_err(),
        SocialError::PermissionDenied(_)
    ));
    assert!(matches!(
        stack
            .groups
            .set_require_approval(group, member, true)
            .await
            .unwrap_err(),
        SocialError::PermissionDenied(_)
    ));
}

#[tokio::test]
async fn kick_removes_and_notifies_the_target() {
    let stack = TestStack::new();
    let owner = stack.user("owner");
    let user = stack.user("user");

    let group = stack
        .groups
        .create_group(owner, "Open Group", "anyone welcome", false)
        .await
        .unwrap();
    stack.groups.request_join(group, user).await.unwrap();

    stack.groups.kick(group, owner, user).await.unwrap();
    let members = stack.groups.list_members(group).await.unwrap();
    assert!(!members.iter().any(|m| m.user_id == user));

    stack.drain_outbox().await;
    assert!(stack
        .notifier
        .delivered_to(user)
        .iter()
        .any(|e| matches!(e, SocialEvent::GroupMemberKicked(_))));
}

#[tokio::test]
async fn members_can_leave_but_the_owner_cannot() {
    let stack = TestStack::new();
    let owner = stack.user("owner");
    let user = stack.user("user");

    let group = stack
        .groups
        .create_group(owner, "Open Group", "anyone welcome", false)
        .await
        .unwrap();
    stack.groups.request_join(group, user).await.unwrap();

    stack.groups.leave(group, user).await.unwrap();
    assert_eq!(stack.groups.list_members(group).await.unwrap().len(), 1);

    assert!(matches!(
        stack.groups.leave(group, owner).await.unwrap_err(),
        SocialError::PermissionDenied(_)
    ));
}

#[tokio::test]
async fn delete_group_is_owner_only_and_cascades() {
    let stack = TestStack::new();
    let owner = stack.user("owner");
    let admin = stack.user("admin");
    let applicant = stack.user("applicant");

    let group = stack
        .groups
        .create_group(owner, "Gated Group", "apply first", true)
        .await
        .unwrap();
    // admins who are not the owner still cannot delete
    stack.groups.set_require_approval(group, owner, false).await.unwrap();
    stack.groups.request_join(group, admin).await.unwrap();
    stack.groups.promote(group, owner, admin).await.unwrap();
    stack.groups.set_require_approval(group, owner, true).await.unwrap();
    stack.groups.request_join(group, applicant).await.unwrap();

    assert!(matches!(
        stack.groups.delete_group(group, admin).await.unwrap_err(),
        SocialError::PermissionDenied(_)
    ));

    stack.groups.delete_group(group, owner).await.unwrap();
    assert!(matches!(
        stack.groups.get_group(group).await.unwrap_err(),
        SocialError::GroupNotFound
    ));
    assert!(matches!(
        stack.groups.list_pending_requests(group, owner).await.unwrap_err(),
        SocialError::GroupNotFound
    ));
}

#[tokio::test]
async fn toggling_require_approval_changes_join_mode() {
    let stack = TestStack::new();
    let owner = stack.user("owner");
    let first = stack.user("first");
    let second = stack.user("second");

    let group = stack
        .groups
        .create_group(owner, "Toggle Group", "sometimes gated", true)
        .await
        .unwrap();

    assert_eq!(
        stack.groups.request_join(group, first).await.unwrap(),
        JoinOutcome::Requested
    );

    stack
        .groups
        .set_require_approval(group, owner, false)
        .await
        .unwrap();
    assert_eq!(
        stack.groups.request_join(group, second).await.unwrap(),
        JoinOutcome::Joined
    );

    // existing members and pending requests are untouched by the toggle
    let pending = stack.groups.list_pending_requests(group, owner).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].user_id, first);
}

#[tokio::test]
async fn join_workflow_notifies_admins_and_requester() {
    let stack = TestStack::new();
    let owner = stack.user("owner");
    let admin = stack.user("admin");
    let applicant = stack.user("applicant");

    let group = stack
        .groups
        .create_group(owner, "Gated Group", "apply first", true)
        .await
        .unwrap();
    stack.groups.set_require_approval(group, owner, false).await.unwrap();
    stack.groups.request_join(group, admin).await.unwrap();
    stack.groups.promote(group, owner, admin).await.unwrap();
    stack.groups.set_require_approval(group, owner, true).await.unwrap();

    stack.groups.request_join(group, applicant).await.unwrap();
    stack.drain_outbox().await;

    for recipient in [owner, admin] {
        assert!(stack.notifier.delivered_to(recipient).iter().any(|e| matches!(
            e,
            SocialEvent::GroupJoinRequested(p) if p.user_id == applicant && p.username == "applicant"
        )));
    }

    let request = stack.groups.list_pending_requests(group, owner).await.unwrap()[0].clone();
    stack
        .groups
        .process_join_request(request.request_id, true, admin)
        .await
        .unwrap();
    stack.drain_outbox().await;

    assert!(stack.notifier.delivered_to(applicant).iter().any(|e| matches!(
        e,
        SocialEvent::GroupJoinResolved(p) if p.approved
    )));
}

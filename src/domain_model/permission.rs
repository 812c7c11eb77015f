//! Pure permission predicates over group state.
//!
//! Every mutating membership operation routes through these instead of
//! re-deriving admin status at the call site.

use crate::domain_model::{Group, GroupRole, UserId};

/// The owner counts as admin even if the role row is missing or stale.
pub fn is_admin(group: &Group, user: UserId, role: Option<GroupRole>) -> bool {
    user == group.owner || matches!(role, Some(GroupRole::Admin))
}

pub fn can_modify_settings(group: &Group, actor: UserId, actor_role: Option<GroupRole>) -> bool {
    is_admin(group, actor, actor_role)
}

pub fn can_process_requests(group: &Group, actor: UserId, actor_role: Option<GroupRole>) -> bool {
    is_admin(group, actor, actor_role)
}

pub fn can_promote(group: &Group, actor: UserId, actor_role: Option<GroupRole>) -> bool {
    is_admin(group, actor, actor_role)
}

/// The owner can never be demoted, by anyone.
pub fn can_demote(
    group: &Group,
    actor: UserId,
    actor_role: Option<GroupRole>,
    target: UserId,
) -> bool {
    target != group.owner && is_admin(group, actor, actor_role)
}

/// The owner can never be kicked, by anyone.
pub fn can_kick(
    group: &Group,
    actor: UserId,
    actor_role: Option<GroupRole>,
    target: UserId,
) -> bool {
    target != group.owner && is_admin(group, actor, actor_role)
}

/// Only the owner may delete the group.
pub fn can_delete(group: &Group, actor: UserId) -> bool {
    actor == group.owner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::GroupId;
    use chrono::Utc;

    fn user(n: u8) -> UserId {
        UserId(uuid::Uuid::from_u128(n as u128))
    }

    fn group(owner: UserId) -> Group {
        Group {
            group_id: GroupId(uuid::Uuid::from_u128(99)),
            name: "g".to_owned(),
            description: "d".to_owned(),
            require_approval: true,
            owner,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn owner_is_always_admin() {
        let owner = user(1);
        let g = group(owner);
        assert!(is_admin(&g, owner, None));
        assert!(is_admin(&g, owner, Some(GroupRole::Member)));
    }

    #[test]
    fn plain_member_is_not_admin() {
        let g = group(user(1));
        assert!(!is_admin(&g, user(2), Some(GroupRole::Member)));
        assert!(!is_admin(&g, user(2), None));
        assert!(is_admin(&g, user(2), Some(GroupRole::Admin)));
    }

    #[test]
    fn owner_is_protected_from_demote_and_kick() {
        let owner = user(1);
        let admin = user(2);
        let g = group(owner);
        assert!(!can_demote(&g, admin, Some(GroupRole::Admin), owner));
        assert!(!can_kick(&g, admin, Some(GroupRole::Admin), owner));
        // even the owner cannot target themself
        assert!(!can_kick(&g, owner, Some(GroupRole::Admin), owner));
    }

    #[test]
    fn non_owner_targets_follow_admin_rule() {
        let owner = user(1);
        let g = group(owner);
        assert!(can_kick(&g, owner, None, user(3)));
        assert!(can_demote(&g, user(2), Some(GroupRole::Admin), user(3)));
        assert!(!can_kick(&g, user(2), Some(GroupRole::Member), user(3)));
    }

    #[test]
    fn only_owner_deletes() {
        let owner = user(1);
        let g = group(owner);
        assert!(can_delete(&g, owner));
        assert!(!can_delete(&g, user(2)));
    }
}

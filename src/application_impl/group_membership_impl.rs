use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use std::sync::Arc;

/// Group lifecycle, role assignment and join-request workflow.
///
/// All admin checks route through `domain_model::permission`; each public
/// operation is one transaction against the membership store.
pub struct GroupMembershipImpl {
    membership_repo: Arc<dyn MembershipRepo>,
    outbox_repo: Arc<dyn OutboxRepo>,
    user_directory: Arc<dyn UserDirectory>,
    tx_manager: Arc<dyn TxManager>,
}

impl GroupMembershipImpl {
    pub fn new(
        membership_repo: Arc<dyn MembershipRepo>,
        outbox_repo: Arc<dyn OutboxRepo>,
        user_directory: Arc<dyn UserDirectory>,
        tx_manager: Arc<dyn TxManager>,
    ) -> Self {
        Self {
            membership_repo,
            outbox_repo,
            user_directory,
            tx_manager,
        }
    }

    async fn begin(&self) -> Result<Box<dyn StorageTx<'_> + '_>, SocialError> {
        self.tx_manager
            .begin()
            .await
            .map_err(|e| SocialError::Store(e.to_string()))
    }

    async fn get_group_or_fail(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
    ) -> Result<Group, SocialError> {
        self.membership_repo
            .get_group_in_tx(tx, group_id)
            .await?
            .ok_or(SocialError::GroupNotFound)
    }

    async fn actor_role(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
        actor: UserId,
    ) -> Result<Option<GroupRole>, SocialError> {
        Ok(self
            .membership_repo
            .get_member_in_tx(tx, group_id, actor)
            .await?
            .map(|m| m.role))
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

    async fn commit(&self, tx: Box<dyn StorageTx<'_> + '_>) -> Result<(), SocialError> {
        tx.commit()
            .await
            .map_err(|e| SocialError::Store(e.to_string()))
    }
}

#[async_trait::async_trait]
impl GroupMembership for GroupMembershipImpl {
    async fn create_group(
        &self,
        owner: UserId,
        name: &str,
        description: &str,
        require_approval: bool,
    ) -> Result<GroupId, SocialError> {
        validate_group_name(name).map_err(SocialError::Validation)?;
        validate_group_description(description).map_err(SocialError::Validation)?;

        let group = Group {
            group_id: GroupId(uuid::Uuid::new_v4()),
            name: name.trim().to_owned(),
            description: description.trim().to_owned(),
            require_approval,
            owner,
            created_at: Utc::now(),
        };

        // group row plus owner-as-admin in ONE tx
        let mut tx = self.begin().await?;
        self.membership_repo.insert_group_in_tx(&mut *tx, &group).await?;
        self.membership_repo
            .insert_member_in_tx(
                &mut *tx,
                &GroupMember::new(group.group_id, owner, GroupRole::Admin),
            )
            .await?;
        self.commit(tx).await?;

        Ok(group.group_id)
    }

    async fn request_join(
        &self,
        group_id: GroupId,
        user: UserId,
    ) -> Result<JoinOutcome, SocialError> {
        let mut tx = self.begin().await?;
        let group = self.get_group_or_fail(&mut *tx, group_id).await?;

        if self
            .membership_repo
            .get_member_in_tx(&mut *tx, group_id, user)
            .await?
            .is_some()
        {
            self.commit(tx).await?;
            return Ok(JoinOutcome::AlreadyMember);
        }

        if !group.require_approval {
            // open group: immediate membership, no request row
            self.membership_repo
                .insert_member_in_tx(
                    &mut *tx,
                    &GroupMember::new(group_id, user, GroupRole::Member),
                )
                .await?;
            self.commit(tx).await?;
            return Ok(JoinOutcome::Joined);
        }

        let request = JoinRequest::new_pending(group_id, user);
        match self
            .membership_repo
            .claim_join_request_in_tx(&mut *tx, &request)
            .await?
        {
            JoinClaim::Existing => {
                self.commit(tx).await?;
                Ok(JoinOutcome::AlreadyRequested)
            }
            JoinClaim::Won => {
                let admins: Vec<UserId> = self
                    .membership_repo
                    .list_members_in_tx(&mut *tx, group_id)
                    .await?
                    .into_iter()
                    .filter(|m| permission::is_admin(&group, m.user_id, Some(m.role)))
                    .map(|m| m.user_id)
                    .collect();
                if !admins.is_empty() {
                    let username = self.user_directory.get_username(user).await?;
                    self.enqueue(
                        &mut *tx,
                        EventType::GroupJoinRequested,
                        admins,
                        &SocialEvent::GroupJoinRequested(GroupJoinRequested {
                            group_id,
                            group_name: group.name.clone(),
                            user_id: user,
                            username,
                        }),
                    )
                    .await?;
                }
                self.commit(tx).await?;
                Ok(JoinOutcome::Requested)
            }
        }
    }

    async fn process_join_request(
        &self,
        request_id: JoinRequestId,
        approve: bool,
        actor: UserId,
    ) -> Result<(), SocialError> {
        let mut tx = self.begin().await?;

        let request = self
            .membership_repo
            .get_join_request_in_tx(&mut *tx, request_id)
            .await?
            .ok_or(SocialError::RequestNotFound)?;
        let group = self.get_group_or_fail(&mut *tx, request.group_id).await?;

        let role = self.actor_role(&mut *tx, group.group_id, actor).await?;
        if !permission::can_process_requests(&group, actor, role) {
            return Err(SocialError::PermissionDenied(
                "only group admins may process join requests",
            ));
        }
        if !request.is_pending() {
            return Err(SocialError::AlreadyProcessed);
        }

        let resolved = JoinRequest {
            status: if approve {
                JoinStatus::Approved
            } else {
                JoinStatus::Rejected
            },
            processed_at: Some(Utc::now()),
            processed_by: Some(actor),
            ..request.clone()
        };
        self.membership_repo
            .resolve_join_request_in_tx(&mut *tx, &resolved)
            .await?;
        if approve {
            self.membership_repo
                .insert_member_in_tx(
                    &mut *tx,
                    &GroupMember::new(group.group_id, request.user_id, GroupRole::Member),
                )
                .await?;
        }

        self.enqueue(
            &mut *tx,
            if approve {
                EventType::GroupJoinApproved
            } else {
                EventType::GroupJoinRejected
            },
            vec![request.user_id],
            &SocialEvent::GroupJoinResolved(GroupJoinResolved {
                group_id: group.group_id,
                group_name: group.name.clone(),
                approved: approve,
            }),
        )
        .await?;

        self.commit(tx).await
    }

    async fn promote(
        &self,
        group_id: GroupId,
        actor: UserId,
        target: UserId,
    ) -> Result<(), SocialError> {
        let mut tx = self.begin().await?;
        let group = self.get_group_or_fail(&mut *tx, group_id).await?;

        let role = self.actor_role(&mut *tx, group_id, actor).await?;
        if !permission::can_promote(&group, actor, role) {
            return Err(SocialError::PermissionDenied(
                "only group admins may promote members",
            ));
        }
        self.membership_repo
            .get_member_in_tx(&mut *tx, group_id, target)
            .await?
            .ok_or(SocialError::MemberNotFound)?;

        self.membership_repo
            .update_role_in_tx(&mut *tx, group_id, target, GroupRole::Admin)
            .await?;
        self.commit(tx).await
    }

    async fn demote(
        &self,
        group_id: GroupId,
        actor: UserId,
        target: UserId,
    ) -> Result<(), SocialError> {
        let mut tx = self.begin().await?;
        let group = self.get_group_or_fail(&mut *tx, group_id).await?;

        let role = self.actor_role(&mut *tx, group_id, actor).await?;
        if !permission::can_demote(&group, actor, role, target) {
            return Err(SocialError::PermissionDenied(if target == group.owner {
                "the group owner cannot be demoted"
            } else {
                "only group admins may demote members"
            }));
        }
        self.membership_repo
            .get_member_in_tx(&mut *tx, group_id, target)
            .await?
            .ok_or(SocialError::MemberNotFound)?;

        self.membership_repo
            .update_role_in_tx(&mut *tx, group_id, target, GroupRole::Member)
            .await?;
        self.commit(tx).await
    }

    async fn kick(
        &self,
        group_id: GroupId,
        actor: UserId,
        target: UserId,
    ) -> Result<(), SocialError> {
        let mut tx = self.begin().await?;
        let group = self.get_group_or_fail(&mut *tx, group_id).await?;

        let role = self.actor_role(&mut *tx, group_id, actor).await?;
        if !permission::can_kick(&group, actor, role, target) {
            return Err(SocialError::PermissionDenied(if target == group.owner {
                "the group owner cannot be kicked"
            } else {
                "only group admins may kick members"
            }));
        }
        self.membership_repo
            .get_member_in_tx(&mut *tx, group_id, target)
            .await?
            .ok_or(SocialError::MemberNotFound)?;

        self.membership_repo
            .delete_member_in_tx(&mut *tx, group_id, target)
            .await?;
        self.enqueue(
            &mut *tx,
            EventType::GroupMemberKicked,
            vec![target],
            &SocialEvent::GroupMemberKicked(GroupMemberKicked {
                group_id,
                group_name: group.name.clone(),
            }),
        )
        .await?;
        self.commit(tx).await
    }

    async fn leave(&self, group_id: GroupId, user: UserId) -> Result<(), SocialError> {
        let mut tx = self.begin().await?;
        let group = self.get_group_or_fail(&mut *tx, group_id).await?;

        // the owner is pinned as ADMIN member for the group's lifetime
        if user == group.owner {
            return Err(SocialError::PermissionDenied(
                "the owner cannot leave their own group",
            ));
        }
        self.membership_repo
            .get_member_in_tx(&mut *tx, group_id, user)
            .await?
            .ok_or(SocialError::MemberNotFound)?;

        self.membership_repo
            .delete_member_in_tx(&mut *tx, group_id, user)
            .await?;
        self.commit(tx).await
    }

    async fn delete_group(&self, group_id: GroupId, actor: UserId) -> Result<(), SocialError> {
        let mut tx = self.begin().await?;
        let group = self.get_group_or_fail(&mut *tx, group_id).await?;

        if !permission::can_delete(&group, actor) {
            return Err(SocialError::PermissionDenied(
                "only the group owner may delete the group",
            ));
        }

        self.membership_repo
            .delete_group_in_tx(&mut *tx, group_id)
            .await?;
        self.commit(tx).await
    }

    async fn set_require_approval(
        &self,
        group_id: GroupId,
        actor: UserId,
        value: bool,
    ) -> Result<(), SocialError> {
        let mut tx = self.begin().await?;
        let group = self.get_group_or_fail(&mut *tx, group_id).await?;

        let role = self.actor_role(&mut *tx, group_id, actor).await?;
        if !permission::can_modify_settings(&group, actor, role) {
            return Err(SocialError::PermissionDenied(
                "only group admins may change group settings",
            ));
        }

        self.membership_repo
            .set_require_approval_in_tx(&mut *tx, group_id, value)
            .await?;
        self.commit(tx).await
    }

    async fn get_group(&self, group_id: GroupId) -> Result<Group, SocialError> {
        self.membership_repo
            .get_group(group_id)
            .await?
            .ok_or(SocialError::GroupNotFound)
    }

    async fn list_members(&self, group_id: GroupId) -> Result<Vec<GroupMember>, SocialError> {
        if self.membership_repo.get_group(group_id).await?.is_none() {
            return Err(SocialError::GroupNotFound);
        }
        self.membership_repo.list_members(group_id).await
    }

    async fn list_pending_requests(
        &self,
        group_id: GroupId,
        actor: UserId,
    ) -> Result<Vec<JoinRequest>, SocialError> {
        let mut tx = self.begin().await?;
        let group = self.get_group_or_fail(&mut *tx, group_id).await?;

        let role = self.actor_role(&mut *tx, group_id, actor).await?;
        if !permission::can_process_requests(&group, actor, role) {
            return Err(SocialError::PermissionDenied(
                "only group admins may view join requests",
            ));
        }

        let requests = self
            .membership_repo
            .list_pending_requests_in_tx(&mut *tx, group_id)
            .await?;
        self.commit(tx).await?;
        Ok(requests)
    }
}

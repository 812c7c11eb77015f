use crate::application_port::SocialError;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

pub struct MemoryMembershipRepo {
    groups: DashMap<GroupId, Group>,
    // unique-name index, the memory stand-in for the SQL unique key
    names: DashMap<String, GroupId>,
    members: DashMap<(GroupId, UserId), GroupMember>,
    requests: DashMap<JoinRequestId, JoinRequest>,
    // at most one open request per (group, user)
    open_requests: DashMap<(GroupId, UserId), JoinRequestId>,
}

impl MemoryMembershipRepo {
    pub fn new() -> Self {
        Self {
            groups: DashMap::new(),
            names: DashMap::new(),
            members: DashMap::new(),
            requests: DashMap::new(),
            open_requests: DashMap::new(),
        }
    }
}

impl Default for MemoryMembershipRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MembershipRepo for MemoryMembershipRepo {
    async fn insert_group_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        group: &Group,
    ) -> Result<(), SocialError> {
        match self.names.entry(group.name.clone()) {
            Entry::Occupied(_) => Err(SocialError::DuplicateGroupName(group.name.clone())),
            Entry::Vacant(slot) => {
                slot.insert(group.group_id);
                self.groups.insert(group.group_id, group.clone());
                Ok(())
            }
        }
    }

    async fn get_group_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
    ) -> Result<Option<Group>, SocialError> {
        Ok(self.groups.get(&group_id).map(|g| g.clone()))
    }

    async fn get_group(&self, group_id: GroupId) -> Result<Option<Group>, SocialError> {
        Ok(self.groups.get(&group_id).map(|g| g.clone()))
    }

    async fn set_require_approval_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
        value: bool,
    ) -> Result<(), SocialError> {
        match self.groups.get_mut(&group_id) {
            Some(mut group) => {
                group.require_approval = value;
                Ok(())
            }
            None => Err(SocialError::GroupNotFound),
        }
    }

    async fn delete_group_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
    ) -> Result<(), SocialError> {
        if let Some((_, group)) = self.groups.remove(&group_id) {
            self.names.remove(&group.name);
        }
        self.members.retain(|(g, _), _| *g != group_id);
        self.requests.retain(|_, r| r.group_id != group_id);
        self.open_requests.retain(|(g, _), _| *g != group_id);
        Ok(())
    }

    async fn insert_member_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        member: &GroupMember,
    ) -> Result<(), SocialError> {
        // insert-if-absent, existing row wins
        self.members
            .entry((member.group_id, member.user_id))
            .or_insert_with(|| member.clone());
        Ok(())
    }

    async fn get_member_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<Option<GroupMember>, SocialError> {
        Ok(self.members.get(&(group_id, user_id)).map(|m| m.clone()))
    }

    async fn update_role_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
        user_id: UserId,
        role: GroupRole,
    ) -> Result<(), SocialError> {
        match self.members.get_mut(&(group_id, user_id)) {
            Some(mut member) => {
                member.role = role;
                Ok(())
            }
            None => Err(SocialError::MemberNotFound),
        }
    }

    async fn delete_member_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<(), SocialError> {
        self.members.remove(&(group_id, user_id));
        Ok(())
    }

    async fn list_members_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
    ) -> Result<Vec<GroupMember>, SocialError> {
        self.list_members(group_id).await
    }

    async fn list_members(&self, group_id: GroupId) -> Result<Vec<GroupMember>, SocialError> {
        let mut members: Vec<GroupMember> = self
            .members
            .iter()
            .filter(|m| m.group_id == group_id)
            .map(|m| m.clone())
            .collect();
        members.sort_by_key(|m| (m.role, m.user_id));
        Ok(members)
    }

    async fn claim_join_request_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        request: &JoinRequest,
    ) -> Result<JoinClaim, SocialError> {
        match self.open_requests.entry((request.group_id, request.user_id)) {
            Entry::Occupied(_) => Ok(JoinClaim::Existing),
            Entry::Vacant(slot) => {
                slot.insert(request.request_id);
                self.requests.insert(request.request_id, request.clone());
                Ok(JoinClaim::Won)
            }
        }
    }

    async fn get_join_request_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        request_id: JoinRequestId,
    ) -> Result<Option<JoinRequest>, SocialError> {
        Ok(self.requests.get(&request_id).map(|r| r.clone()))
    }

    async fn resolve_join_request_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        request: &JoinRequest,
    ) -> Result<(), SocialError> {
        match self.requests.get_mut(&request.request_id) {
            Some(mut stored) => {
                if !stored.is_pending() {
                    return Err(SocialError::AlreadyProcessed);
                }
                *stored = request.clone();
                drop(stored);
                self.open_requests.remove(&(request.group_id, request.user_id));
                Ok(())
            }
            None => Err(SocialError::RequestNotFound),
        }
    }

    async fn list_pending_requests_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
    ) -> Result<Vec<JoinRequest>, SocialError> {
        let mut requests: Vec<JoinRequest> = self
            .requests
            .iter()
            .filter(|r| r.group_id == group_id && r.is_pending())
            .map(|r| r.clone())
            .collect();
        requests.sort_by_key(|r| (r.requested_at, r.request_id));
        Ok(requests)
    }
}

use super::util::{downcast, is_dup_key};
use crate::application_port::SocialError;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use std::str::FromStr;

// Open requests carry open_flag = 1, processed ones NULL; the unique key
// (group_id, user_id, open_flag) then allows any number of processed rows
// but at most one PENDING per (group, user).
pub struct MySqlMembershipRepo {
    pool: MySqlPool,
}

impl MySqlMembershipRepo {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_group(row: &MySqlRow) -> Group {
        Group {
            group_id: row.get::<GroupId, _>("group_id"),
            name: row.get::<String, _>("name"),
            description: row.get::<String, _>("description"),
            require_approval: row.get::<bool, _>("require_approval"),
            owner: row.get::<UserId, _>("owner_id"),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
        }
    }

    fn row_to_member(row: &MySqlRow) -> Result<GroupMember, SocialError> {
        let role = GroupRole::from_str(row.get::<&str, _>("role"))
            .map_err(|e| SocialError::Store(format!("decode group role: {e}")))?;
        Ok(GroupMember {
            group_id: row.get::<GroupId, _>("group_id"),
            user_id: row.get::<UserId, _>("user_id"),
            role,
            joined_at: row.get::<DateTime<Utc>, _>("joined_at"),
        })
    }

    fn row_to_request(row: &MySqlRow) -> Result<JoinRequest, SocialError> {
        let status = JoinStatus::from_str(row.get::<&str, _>("status"))
            .map_err(|e| SocialError::Store(format!("decode join status: {e}")))?;
        Ok(JoinRequest {
            request_id: row.get::<JoinRequestId, _>("request_id"),
            group_id: row.get::<GroupId, _>("group_id"),
            user_id: row.get::<UserId, _>("user_id"),
            status,
            requested_at: row.get::<DateTime<Utc>, _>("requested_at"),
            processed_at: row.get::<Option<DateTime<Utc>>, _>("processed_at"),
            processed_by: row.get::<Option<UserId>, _>("processed_by"),
        })
    }
}

#[async_trait::async_trait]
impl MembershipRepo for MySqlMembershipRepo {
    async fn insert_group_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group: &Group,
    ) -> Result<(), SocialError> {
        let tx = downcast(tx);

        let res = sqlx::query(
            r#"
INSERT INTO study_group (group_id, name, description, require_approval, owner_id, created_at)
VALUES (?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(group.group_id)
        .bind(&group.name)
        .bind(&group.description)
        .bind(group.require_approval)
        .bind(group.owner)
        .bind(group.created_at)
        .execute(tx.conn())
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(e) if is_dup_key(&e) => Err(SocialError::DuplicateGroupName(group.name.clone())),
            Err(e) => Err(SocialError::Store(format!("insert group: {e}"))),
        }
    }

    async fn get_group_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
    ) -> Result<Option<Group>, SocialError> {
        let tx = downcast(tx);

        let row = sqlx::query(
            r#"
SELECT group_id, name, description, require_approval, owner_id, created_at
FROM study_group
WHERE group_id = ?
FOR UPDATE
"#,
        )
        .bind(group_id)
        .fetch_optional(tx.conn())
        .await
        .map_err(|e| SocialError::Store(format!("select group: {e}")))?;

        Ok(row.as_ref().map(Self::row_to_group))
    }

    async fn get_group(&self, group_id: GroupId) -> Result<Option<Group>, SocialError> {
        let row = sqlx::query(
            r#"
SELECT group_id, name, description, require_approval, owner_id, created_at
FROM study_group
WHERE group_id = ?
"#,
        )
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SocialError::Store(format!("select group: {e}")))?;

        Ok(row.as_ref().map(Self::row_to_group))
    }

    async fn set_require_approval_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
        value: bool,
    ) -> Result<(), SocialError> {
        let tx = downcast(tx);

        sqlx::query("UPDATE study_group SET require_approval = ? WHERE group_id = ?")
            .bind(value)
            .bind(group_id)
            .execute(tx.conn())
            .await
            .map_err(|e| SocialError::Store(format!("update group settings: {e}")))?;

        Ok(())
    }

    async fn delete_group_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
    ) -> Result<(), SocialError> {
        let tx = downcast(tx);

        // explicit cascade: requests -> members -> group
        sqlx::query("DELETE FROM join_request WHERE group_id = ?")
            .bind(group_id)
            .execute(tx.conn())
            .await
            .map_err(|e| SocialError::Store(format!("cascade join requests: {e}")))?;
        sqlx::query("DELETE FROM group_member WHERE group_id = ?")
            .bind(group_id)
            .execute(tx.conn())
            .await
            .map_err(|e| SocialError::Store(format!("cascade members: {e}")))?;
        sqlx::query("DELETE FROM study_group WHERE group_id = ?")
            .bind(group_id)
            .execute(tx.conn())
            .await
            .map_err(|e| SocialError::Store(format!("delete group: {e}")))?;

        Ok(())
    }

    async fn insert_member_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        member: &GroupMember,
    ) -> Result<(), SocialError> {
        let tx = downcast(tx);

        // insert-if-absent: an existing row keeps its role and joined_at
        sqlx::query(
            r#"
INSERT INTO group_member (group_id, user_id, role, joined_at)
VALUES (?, ?, ?, ?)
ON DUPLICATE KEY UPDATE group_id = group_id
"#,
        )
        .bind(member.group_id)
        .bind(member.user_id)
        .bind(member.role.to_string())
        .bind(member.joined_at)
        .execute(tx.conn())
        .await
        .map_err(|e| SocialError::Store(format!("insert member: {e}")))?;

        Ok(())
    }

    async fn get_member_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<Option<GroupMember>, SocialError> {
        let tx = downcast(tx);

        let row = sqlx::query(
            r#"
SELECT group_id, user_id, role, joined_at
FROM group_member
WHERE group_id = ? AND user_id = ?
FOR UPDATE
"#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(tx.conn())
        .await
        .map_err(|e| SocialError::Store(format!("select member: {e}")))?;

        row.as_ref().map(Self::row_to_member).transpose()
    }

    async fn update_role_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
        user_id: UserId,
        role: GroupRole,
    ) -> Result<(), SocialError> {
        let tx = downcast(tx);

        let res = sqlx::query("UPDATE group_member SET role = ? WHERE group_id = ? AND user_id = ?")
            .bind(role.to_string())
            .bind(group_id)
            .bind(user_id)
            .execute(tx.conn())
            .await
            .map_err(|e| SocialError::Store(format!("update role: {e}")))?;

        if res.rows_affected() == 0 {
            // role unchanged also reports 0; re-check existence
            let exists = sqlx::query("SELECT 1 FROM group_member WHERE group_id = ? AND user_id = ?")
                .bind(group_id)
                .bind(user_id)
                .fetch_optional(tx.conn())
                .await
                .map_err(|e| SocialError::Store(format!("select member: {e}")))?;
            if exists.is_none() {
                return Err(SocialError::MemberNotFound);
            }
        }

        Ok(())
    }

    async fn delete_member_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<(), SocialError> {
        let tx = downcast(tx);

        sqlx::query("DELETE FROM group_member WHERE group_id = ? AND user_id = ?")
            .bind(group_id)
            .bind(user_id)
            .execute(tx.conn())
            .await
            .map_err(|e| SocialError::Store(format!("delete member: {e}")))?;

        Ok(())
    }

    async fn list_members_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
    ) -> Result<Vec<GroupMember>, SocialError> {
        let tx = downcast(tx);

        let rows = sqlx::query(
            r#"
SELECT group_id, user_id, role, joined_at
FROM group_member
WHERE group_id = ?
ORDER BY FIELD(role, 'admin', 'member'), user_id
"#,
        )
        .bind(group_id)
        .fetch_all(tx.conn())
        .await
        .map_err(|e| SocialError::Store(format!("list members: {e}")))?;

        rows.iter().map(Self::row_to_member).collect()
    }

    async fn list_members(&self, group_id: GroupId) -> Result<Vec<GroupMember>, SocialError> {
        let rows = sqlx::query(
            r#"
SELECT group_id, user_id, role, joined_at
FROM group_member
WHERE group_id = ?
ORDER BY FIELD(role, 'admin', 'member'), user_id
"#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SocialError::Store(format!("list members: {e}")))?;

        rows.iter().map(Self::row_to_member).collect()
    }

    async fn claim_join_request_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        request: &JoinRequest,
    ) -> Result<JoinClaim, SocialError> {
        let tx = downcast(tx);

        let res = sqlx::query(
            r#"
INSERT INTO join_request
    (request_id, group_id, user_id, status, requested_at, processed_at, processed_by, open_flag)
VALUES (?, ?, ?, ?, ?, NULL, NULL, 1)
"#,
        )
        .bind(request.request_id)
        .bind(request.group_id)
        .bind(request.user_id)
        .bind(request.status.to_string())
        .bind(request.requested_at)
        .execute(tx.conn())
        .await;

        match res {
            Ok(_) => Ok(JoinClaim::Won),
            Err(e) if is_dup_key(&e) => Ok(JoinClaim::Existing),
            Err(e) => Err(SocialError::Store(format!("claim join request: {e}"))),
        }
    }

    async fn get_join_request_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        request_id: JoinRequestId,
    ) -> Result<Option<JoinRequest>, SocialError> {
        let tx = downcast(tx);

        let row = sqlx::query(
            r#"
SELECT request_id, group_id, user_id, status, requested_at, processed_at, processed_by
FROM join_request
WHERE request_id = ?
FOR UPDATE
"#,
        )
        .bind(request_id)
        .fetch_optional(tx.conn())
        .await
        .map_err(|e| SocialError::Store(format!("select join request: {e}")))?;

        row.as_ref().map(Self::row_to_request).transpose()
    }

    async fn resolve_join_request_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        request: &JoinRequest,
    ) -> Result<(), SocialError> {
        let tx = downcast(tx);

        // the status guard makes processing terminal even under races
        let res = sqlx::query(
            r#"
UPDATE join_request
SET status = ?, processed_at = ?, processed_by = ?, open_flag = NULL
WHERE request_id = ? AND status = 'pending'
"#,
        )
        .bind(request.status.to_string())
        .bind(request.processed_at)
        .bind(request.processed_by)
        .bind(request.request_id)
        .execute(tx.conn())
        .await
        .map_err(|e| SocialError::Store(format!("resolve join request: {e}")))?;

        if res.rows_affected() == 0 {
            return Err(SocialError::AlreadyProcessed);
        }

        Ok(())
    }

    async fn list_pending_requests_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        group_id: GroupId,
    ) -> Result<Vec<JoinRequest>, SocialError> {
        let tx = downcast(tx);

        let rows = sqlx::query(
            r#"
SELECT request_id, group_id, user_id, status, requested_at, processed_at, processed_by
FROM join_request
WHERE group_id = ? AND status = 'pending'
ORDER BY requested_at ASC, request_id ASC
"#,
        )
        .bind(group_id)
        .fetch_all(tx.conn())
        .await
        .map_err(|e| SocialError::Store(format!("list join requests: {e}")))?;

        rows.iter().map(Self::row_to_request).collect()
    }
}

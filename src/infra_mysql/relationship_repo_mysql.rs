use super::util::{downcast, is_dup_key};
use crate::application_port::SocialError;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use std::str::FromStr;

pub struct MySqlRelationshipRepo {
    pool: MySqlPool,
}

impl MySqlRelationshipRepo {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_edge(row: &MySqlRow) -> Result<FriendEdge, SocialError> {
        let status = RelationStatus::from_str(row.get::<&str, _>("status"))
            .map_err(|e| SocialError::Store(format!("decode relation status: {e}")))?;
        Ok(FriendEdge {
            subject: row.get::<UserId, _>("subject_id"),
            object: row.get::<UserId, _>("object_id"),
            status,
            since: row.get::<DateTime<Utc>, _>("since"),
        })
    }
}

#[async_trait::async_trait]
impl RelationshipRepo for MySqlRelationshipRepo {
    async fn get_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        subject: UserId,
        object: UserId,
    ) -> Result<Option<FriendEdge>, SocialError> {
        let tx = downcast(tx);

        // FOR UPDATE: the caller's check-then-write stays race free
        let row = sqlx::query(
            r#"
SELECT subject_id, object_id, status, since
FROM relationship
WHERE subject_id = ? AND object_id = ?
FOR UPDATE
"#,
        )
        .bind(subject)
        .bind(object)
        .fetch_optional(tx.conn())
        .await
        .map_err(|e| SocialError::Store(format!("select relationship: {e}")))?;

        row.as_ref().map(Self::row_to_edge).transpose()
    }

    async fn insert_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        edge: &FriendEdge,
    ) -> Result<(), SocialError> {
        let tx = downcast(tx);

        let res = sqlx::query(
            r#"
INSERT INTO relationship (subject_id, object_id, status, since)
VALUES (?, ?, ?, ?)
"#,
        )
        .bind(edge.subject)
        .bind(edge.object)
        .bind(edge.status.to_string())
        .bind(edge.since)
        .execute(tx.conn())
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(e) if is_dup_key(&e) => Err(SocialError::RelationshipExists),
            Err(e) => Err(SocialError::Store(format!("insert relationship: {e}"))),
        }
    }

    async fn upsert_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        edge: &FriendEdge,
    ) -> Result<(), SocialError> {
        let tx = downcast(tx);

        sqlx::query(
            r#"
INSERT INTO relationship (subject_id, object_id, status, since)
VALUES (?, ?, ?, ?)
ON DUPLICATE KEY UPDATE status = VALUES(status)
"#,
        )
        .bind(edge.subject)
        .bind(edge.object)
        .bind(edge.status.to_string())
        .bind(edge.since)
        .execute(tx.conn())
        .await
        .map_err(|e| SocialError::Store(format!("upsert relationship: {e}")))?;

        Ok(())
    }

    async fn delete_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        subject: UserId,
        object: UserId,
    ) -> Result<(), SocialError> {
        let tx = downcast(tx);

        sqlx::query("DELETE FROM relationship WHERE subject_id = ? AND object_id = ?")
            .bind(subject)
            .bind(object)
            .execute(tx.conn())
            .await
            .map_err(|e| SocialError::Store(format!("delete relationship: {e}")))?;

        Ok(())
    }

    async fn get(
        &self,
        subject: UserId,
        object: UserId,
    ) -> Result<Option<FriendEdge>, SocialError> {
        let row = sqlx::query(
            r#"
SELECT subject_id, object_id, status, since
FROM relationship
WHERE subject_id = ? AND object_id = ?
"#,
        )
        .bind(subject)
        .bind(object)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SocialError::Store(format!("select relationship: {e}")))?;

        row.as_ref().map(Self::row_to_edge).transpose()
    }

    async fn list_by_subject(&self, user: UserId) -> Result<Vec<FriendEdge>, SocialError> {
        let rows = sqlx::query(
            r#"
SELECT subject_id, object_id, status, since
FROM relationship
WHERE subject_id = ?
ORDER BY FIELD(status, 'pending', 'accepted', 'denied', 'blocked'), object_id
"#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SocialError::Store(format!("list relationships: {e}")))?;

        rows.iter().map(Self::row_to_edge).collect()
    }
}

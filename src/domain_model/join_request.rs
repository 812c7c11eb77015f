use crate::domain_model::{GroupId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct JoinRequestId(pub uuid::Uuid);

impl fmt::Display for JoinRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// APPROVED and REJECTED are terminal.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for JoinStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JoinStatus::Pending => "pending",
            JoinStatus::Approved => "approved",
            JoinStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

impl FromStr for JoinStatus {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => anyhow::bail!("unknown join status: {}", s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub request_id: JoinRequestId,
    pub group_id: GroupId,
    pub user_id: UserId,
    pub status: JoinStatus,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<UserId>,
}

impl JoinRequest {
    pub fn new_pending(group_id: GroupId, user_id: UserId) -> Self {
        Self {
            request_id: JoinRequestId(uuid::Uuid::new_v4()),
            group_id,
            user_id,
            status: JoinStatus::Pending,
            requested_at: Utc::now(),
            processed_at: None,
            processed_by: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == JoinStatus::Pending
    }
}

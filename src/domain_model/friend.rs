use crate::domain_model::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a single directed relationship edge.
///
/// Variant order is the sort order used by `list_friends`.
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationStatus {
    Pending,
    Accepted,
    Denied,
    Blocked,
}

impl fmt::Display for RelationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelationStatus::Pending => "pending",
            RelationStatus::Accepted => "accepted",
            RelationStatus::Denied => "denied",
            RelationStatus::Blocked => "blocked",
        };
        f.write_str(s)
    }
}

impl FromStr for RelationStatus {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "denied" => Ok(Self::Denied),
            "blocked" => Ok(Self::Blocked),
            _ => anyhow::bail!("unknown relation status: {}", s),
        }
    }
}

/// A directed edge `subject -> object` in the friend graph.
///
/// ACCEPTED edges always come in mirrored pairs; BLOCKED edges are
/// one-directional and independent of the reverse edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendEdge {
    pub subject: UserId,
    pub object: UserId,
    pub status: RelationStatus,
    pub since: DateTime<Utc>,
}

impl FriendEdge {
    pub fn new(subject: UserId, object: UserId, status: RelationStatus) -> Self {
        Self {
            subject,
            object,
            status,
            since: Utc::now(),
        }
    }

    /// The same edge with a new status, keeping the original timestamp.
    pub fn with_status(&self, status: RelationStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// The mirrored edge `object -> subject`.
    pub fn reciprocal(&self, status: RelationStatus) -> Self {
        Self {
            subject: self.object,
            object: self.subject,
            status,
            since: self.since,
        }
    }
}

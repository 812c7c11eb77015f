use crate::domain_model::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct GroupId(pub uuid::Uuid);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role sort order: admins first in member listings.
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Admin,
    Member,
}

impl fmt::Display for GroupRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GroupRole::Admin => "admin",
            GroupRole::Member => "member",
        };
        f.write_str(s)
    }
}

impl FromStr for GroupRole {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            _ => anyhow::bail!("unknown group role: {}", s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub group_id: GroupId,
    pub name: String,
    pub description: String,
    pub require_approval: bool,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    pub group_id: GroupId,
    pub user_id: UserId,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

impl GroupMember {
    pub fn new(group_id: GroupId, user_id: UserId, role: GroupRole) -> Self {
        Self {
            group_id,
            user_id,
            role,
            joined_at: Utc::now(),
        }
    }
}

pub const MAX_GROUP_NAME_LEN: usize = 50;
pub const MAX_GROUP_DESCRIPTION_LEN: usize = 255;

/// Group names: trimmed non-blank, bounded, alphanumeric plus space/'-'/'_'.
pub fn validate_group_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("group name must not be blank".to_owned());
    }
    if name.chars().count() > MAX_GROUP_NAME_LEN {
        return Err(format!(
            "group name must be at most {} characters",
            MAX_GROUP_NAME_LEN
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_')
    {
        return Err("group name may only contain letters, digits, spaces, '-' and '_'".to_owned());
    }
    Ok(())
}

pub fn validate_group_description(description: &str) -> Result<(), String> {
    let description = description.trim();
    if description.is_empty() {
        return Err("group description must not be blank".to_owned());
    }
    if description.chars().count() > MAX_GROUP_DESCRIPTION_LEN {
        return Err(format!(
            "group description must be at most {} characters",
            MAX_GROUP_DESCRIPTION_LEN
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_bounds() {
        assert!(validate_group_name("Rust Study Circle").is_ok());
        assert!(validate_group_name("  ").is_err());
        assert!(validate_group_name(&"A".repeat(50)).is_ok());
        assert!(validate_group_name(&"A".repeat(51)).is_err());
    }

    #[test]
    fn name_charset() {
        assert!(validate_group_name("algo-club_2026").is_ok());
        assert!(validate_group_name("bad;name").is_err());
        assert!(validate_group_name("no/slashes").is_err());
    }

    #[test]
    fn description_bounds() {
        assert!(validate_group_description("weekly sessions").is_ok());
        assert!(validate_group_description("").is_err());
        assert!(validate_group_description(&"d".repeat(256)).is_err());
    }
}

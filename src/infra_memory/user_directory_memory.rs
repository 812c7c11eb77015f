use crate::application_port::SocialError;
use crate::domain_model::UserId;
use crate::domain_port::UserDirectory;
use dashmap::DashMap;

/// Directory fake: ids are derived from usernames with uuid v5, so tests
/// and demos can mint stable identities without an account system.
pub struct MemoryUserDirectory {
    usernames: DashMap<UserId, String>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            usernames: DashMap::new(),
        }
    }

    pub fn register(&self, username: &str) -> UserId {
        let user_id = UserId(uuid::Uuid::new_v5(
            &uuid::Uuid::NAMESPACE_OID,
            username.as_bytes(),
        ));
        self.usernames.insert(user_id, username.to_owned());
        user_id
    }
}

impl Default for MemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn get_username(&self, user_id: UserId) -> Result<String, SocialError> {
        self.usernames
            .get(&user_id)
            .map(|u| u.clone())
            .ok_or_else(|| SocialError::Store(format!("unknown user: {user_id}")))
    }
}

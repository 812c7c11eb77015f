use crate::application_port::SocialError;
use crate::domain_model::UserId;

/// Read-only identity lookup, used when composing notification payloads.
/// Owned by the application layer; never mutated here.
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_username(&self, user_id: UserId) -> Result<String, SocialError>;
}

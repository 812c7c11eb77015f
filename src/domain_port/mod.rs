// store

mod membership_repo;
mod outbox_repo;
mod relationship_repo;

pub use membership_repo::*;
pub use outbox_repo::*;
pub use relationship_repo::*;

// collaborators

mod notifier;
mod user_directory;

pub use notifier::*;
pub use user_directory::*;

mod repo_tx;

pub use repo_tx::*;

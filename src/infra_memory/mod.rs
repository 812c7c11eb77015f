//! In-memory adapters for the store ports, used by tests and demo
//! binaries. Uniqueness invariants are enforced with dashmap entry
//! semantics, mirroring the SQL unique keys.

mod membership_repo_memory;
mod notifier_memory;
mod outbox_repo_memory;
mod relationship_repo_memory;
mod repo_tx_memory;
mod user_directory_memory;

pub use membership_repo_memory::*;
pub use notifier_memory::*;
pub use outbox_repo_memory::*;
pub use relationship_repo_memory::*;
pub use repo_tx_memory::*;
pub use user_directory_memory::*;

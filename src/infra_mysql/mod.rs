//! sqlx/MySQL adapters for the store ports. These require a provisioned
//! database and are verified manually; automated tests run against
//! `infra_memory`.

mod membership_repo_mysql;
mod outbox_repo_mysql;
mod relationship_repo_mysql;
mod repo_tx_mysql;
mod util;

pub use membership_repo_mysql::*;
pub use outbox_repo_mysql::*;
pub use relationship_repo_mysql::*;
pub use repo_tx_mysql::*;
pub use util::*;

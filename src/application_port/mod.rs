mod friend_service;
mod group_service;

pub use friend_service::*;
pub use group_service::*;

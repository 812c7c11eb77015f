mod event;
mod friend;
mod group;
mod join_request;
pub mod permission;
mod user;

pub use event::*;
pub use friend::*;
pub use group::*;
pub use join_request::*;
pub use user::*;

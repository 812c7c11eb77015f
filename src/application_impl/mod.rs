mod friend_graph_impl;
mod group_membership_impl;

pub use friend_graph_impl::*;
pub use group_membership_impl::*;

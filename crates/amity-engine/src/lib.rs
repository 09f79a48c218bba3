//! Amity Engine - Friendship lifecycle and social-graph queries
//!
//! [`FriendshipEngine`] drives the request/accept/deny/block state machine
//! over any [`amity_storage::FriendshipStore`] and derives friends,
//! friends-of-friends and mutual friends from the stored edges.
//! [`FriendableHandle`] is the same API bound to one entity.

pub mod engine;
pub mod handle;

pub use engine::{FriendshipEngine, RequestFilter};
pub use handle::FriendableHandle;

//! Amity Core - Friendship graph types
//!
//! This crate provides the data model, status state machine, query types,
//! lifecycle events and configuration shared by the Amity storage backends
//! and the relationship engine.

pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod friendship;
pub mod limits;
pub mod query;
pub mod status;

pub use config::{FriendshipsConfig, GroupCatalog, TableNames};
pub use entity::{AnyEntity, EntityId, EntityLookup, EntityRegistry, EntityType, Friendable, FriendableRef};
pub use error::{Error, Result};
pub use events::{EventSink, FriendshipEvent, FriendshipEventKind, NoopSink, RecordingSink, TracingSink};
pub use friendship::{Direction, Friendship, FriendshipId, GroupMembership};
pub use query::{EdgeScope, FriendshipQuery, GroupFilter, PaginatedResults, Pagination, PaginationInfo};
pub use status::FriendshipStatus;

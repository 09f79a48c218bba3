//! Storage backend trait definitions

use crate::error::StorageResult;
use amity_core::{Friendship, FriendshipId, FriendshipQuery, FriendshipStatus, FriendableRef, GroupMembership};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Trait for friendship store implementations
///
/// Every filtered operation takes a [`FriendshipQuery`]; backends must
/// select exactly the edges [`FriendshipQuery::matches`] selects, in
/// insertion order.
#[async_trait]
pub trait FriendshipStore: Send + Sync {
    /// Initialize the storage (create tables, etc.)
    async fn initialize(&self) -> StorageResult<()>;

    /// Health check
    async fn health_check(&self) -> StorageResult<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Friendship Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a new friendship edge
    async fn insert_friendship(&self, friendship: &Friendship) -> StorageResult<()>;

    /// Get a friendship by id
    async fn get_friendship(&self, id: &FriendshipId) -> StorageResult<Option<Friendship>>;

    /// Friendships matching a query, honouring its pagination
    async fn find_friendships(&self, query: &FriendshipQuery) -> StorageResult<Vec<Friendship>>;

    /// First friendship matching a query
    async fn first_friendship(&self, query: &FriendshipQuery) -> StorageResult<Option<Friendship>>;

    /// Number of friendships matching a query (pagination ignored)
    async fn count_friendships(&self, query: &FriendshipQuery) -> StorageResult<usize>;

    /// Whether any friendship matches a query
    async fn friendship_exists(&self, query: &FriendshipQuery) -> StorageResult<bool>;

    /// Set the status of every matching friendship, returning rows changed
    async fn update_status(
        &self,
        query: &FriendshipQuery,
        status: FriendshipStatus,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<usize>;

    /// Delete every matching friendship and its group memberships,
    /// returning friendships removed
    async fn delete_friendships(&self, query: &FriendshipQuery) -> StorageResult<usize>;

    // ─────────────────────────────────────────────────────────────────────────
    // Group Membership Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a membership unless an identical row exists. Returns whether
    /// a row was created.
    async fn insert_membership(&self, membership: &GroupMembership) -> StorageResult<bool>;

    /// Delete memberships of `member` on a friendship, for one group or all
    async fn delete_memberships(
        &self,
        friendship_id: &FriendshipId,
        member: &FriendableRef,
        group: Option<&str>,
    ) -> StorageResult<usize>;

    /// Memberships attached to a friendship
    async fn memberships_for(&self, friendship_id: &FriendshipId) -> StorageResult<Vec<GroupMembership>>;
}

//! In-memory storage backend for testing

use crate::error::{StorageError, StorageResult};
use crate::traits::FriendshipStore;
use amity_core::{
    Friendship, FriendshipId, FriendshipQuery, FriendshipStatus, FriendableRef, GroupMembership,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory storage backend
///
/// Edges are kept in insertion order. Useful for testing and temporary
/// storage.
pub struct MemoryStorage {
    friendships: RwLock<Vec<Friendship>>,
    memberships: RwLock<Vec<GroupMembership>>,
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Database(format!("Lock error: {}", e))
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            friendships: RwLock::new(Vec::new()),
            memberships: RwLock::new(Vec::new()),
        }
    }

    fn read_friendships(&self) -> StorageResult<RwLockReadGuard<'_, Vec<Friendship>>> {
        self.friendships.read().map_err(lock_error)
    }

    fn write_friendships(&self) -> StorageResult<RwLockWriteGuard<'_, Vec<Friendship>>> {
        self.friendships.write().map_err(lock_error)
    }

    fn read_memberships(&self) -> StorageResult<RwLockReadGuard<'_, Vec<GroupMembership>>> {
        self.memberships.read().map_err(lock_error)
    }

    fn write_memberships(&self) -> StorageResult<RwLockWriteGuard<'_, Vec<GroupMembership>>> {
        self.memberships.write().map_err(lock_error)
    }

    /// Every edge matching the query, ignoring pagination
    fn matching(&self, query: &FriendshipQuery) -> StorageResult<Vec<Friendship>> {
        let friendships = self.read_friendships()?;
        let memberships = self.read_memberships()?;
        Ok(friendships
            .iter()
            .filter(|f| query.matches(f, &memberships))
            .cloned()
            .collect())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FriendshipStore for MemoryStorage {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        Ok(true)
    }

    // Friendship operations

    async fn insert_friendship(&self, friendship: &Friendship) -> StorageResult<()> {
        let mut friendships = self.write_friendships()?;
        friendships.push(friendship.clone());
        Ok(())
    }

    async fn get_friendship(&self, id: &FriendshipId) -> StorageResult<Option<Friendship>> {
        let friendships = self.read_friendships()?;
        Ok(friendships.iter().find(|f| f.id == *id).cloned())
    }

    async fn find_friendships(&self, query: &FriendshipQuery) -> StorageResult<Vec<Friendship>> {
        let all = self.matching(query)?;
        Ok(query.pagination.window(all))
    }

    async fn first_friendship(&self, query: &FriendshipQuery) -> StorageResult<Option<Friendship>> {
        Ok(self.matching(query)?.into_iter().next())
    }

    async fn count_friendships(&self, query: &FriendshipQuery) -> StorageResult<usize> {
        Ok(self.matching(query)?.len())
    }

    async fn friendship_exists(&self, query: &FriendshipQuery) -> StorageResult<bool> {
        let friendships = self.read_friendships()?;
        let memberships = self.read_memberships()?;
        Ok(friendships.iter().any(|f| query.matches(f, &memberships)))
    }

    async fn update_status(
        &self,
        query: &FriendshipQuery,
        status: FriendshipStatus,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<usize> {
        let mut friendships = self.write_friendships()?;
        let memberships = self.read_memberships()?;

        let mut changed = 0;
        for friendship in friendships.iter_mut() {
            if query.matches(friendship, &memberships) {
                friendship.status = status;
                friendship.updated_at = updated_at;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete_friendships(&self, query: &FriendshipQuery) -> StorageResult<usize> {
        let mut friendships = self.write_friendships()?;
        let mut memberships = self.write_memberships()?;

        let removed: Vec<FriendshipId> = friendships
            .iter()
            .filter(|f| query.matches(f, &memberships))
            .map(|f| f.id)
            .collect();

        if removed.is_empty() {
            return Ok(0);
        }

        friendships.retain(|f| !removed.contains(&f.id));
        memberships.retain(|m| !removed.contains(&m.friendship_id));

        Ok(removed.len())
    }

    // Group membership operations

    async fn insert_membership(&self, membership: &GroupMembership) -> StorageResult<bool> {
        let friendships = self.read_friendships()?;
        if !friendships.iter().any(|f| f.id == membership.friendship_id) {
            return Err(StorageError::Database(format!(
                "Friendship {} does not exist",
                membership.friendship_id
            )));
        }

        let mut memberships = self.write_memberships()?;
        if memberships.contains(membership) {
            return Ok(false);
        }
        memberships.push(membership.clone());
        Ok(true)
    }

    async fn delete_memberships(
        &self,
        friendship_id: &FriendshipId,
        member: &FriendableRef,
        group: Option<&str>,
    ) -> StorageResult<usize> {
        let mut memberships = self.write_memberships()?;
        let before = memberships.len();
        memberships.retain(|m| {
            !(m.friendship_id == *friendship_id
                && m.member == *member
                && group.map_or(true, |g| m.group == g))
        });
        Ok(before - memberships.len())
    }

    async fn memberships_for(&self, friendship_id: &FriendshipId) -> StorageResult<Vec<GroupMembership>> {
        let memberships = self.read_memberships()?;
        Ok(memberships
            .iter()
            .filter(|m| m.friendship_id == *friendship_id)
            .cloned()
            .collect())
    }
}

//! Per-entity view of the engine

use crate::engine::{FriendshipEngine, RequestFilter};
use amity_core::{Friendable, FriendableRef, Friendship, PaginatedResults, Pagination, Result};
use amity_storage::FriendshipStore;

/// The engine API with one entity fixed as the acting side.
///
/// ```ignore
/// let alice = engine.for_entity(&alice_user);
/// alice.befriend(&bob).await?;
/// ```
pub struct FriendableHandle<'e, S: FriendshipStore> {
    engine: &'e FriendshipEngine<S>,
    entity: FriendableRef,
}

impl<'e, S: FriendshipStore> FriendableHandle<'e, S> {
    pub fn new(engine: &'e FriendshipEngine<S>, entity: FriendableRef) -> Self {
        Self { engine, entity }
    }

    pub fn entity(&self) -> &FriendableRef {
        &self.entity
    }

    pub async fn befriend(&self, other: &impl Friendable) -> Result<Option<Friendship>> {
        self.engine.befriend(&self.entity, &other.friendable_ref()).await
    }

    pub async fn accept_friend_request(&self, sender: &impl Friendable) -> Result<bool> {
        self.engine
            .accept_friend_request(&self.entity, &sender.friendable_ref())
            .await
    }

    pub async fn deny_friend_request(&self, sender: &impl Friendable) -> Result<bool> {
        self.engine
            .deny_friend_request(&self.entity, &sender.friendable_ref())
            .await
    }

    pub async fn block_friend(&self, other: &impl Friendable) -> Result<Friendship> {
        self.engine.block_friend(&self.entity, &other.friendable_ref()).await
    }

    pub async fn unblock_friend(&self, other: &impl Friendable) -> Result<bool> {
        self.engine.unblock_friend(&self.entity, &other.friendable_ref()).await
    }

    pub async fn unfriend(&self, other: &impl Friendable) -> Result<bool> {
        self.engine.unfriend(&self.entity, &other.friendable_ref()).await
    }

    pub async fn has_blocked(&self, other: &impl Friendable) -> Result<bool> {
        self.engine.has_blocked(&self.entity, &other.friendable_ref()).await
    }

    pub async fn is_blocked_by(&self, other: &impl Friendable) -> Result<bool> {
        self.engine.is_blocked_by(&self.entity, &other.friendable_ref()).await
    }

    pub async fn can_befriend(&self, other: &impl Friendable) -> Result<bool> {
        self.engine.can_befriend(&self.entity, &other.friendable_ref()).await
    }

    pub async fn get_friendship(&self, other: &impl Friendable) -> Result<Option<Friendship>> {
        self.engine.get_friendship(&self.entity, &other.friendable_ref()).await
    }

    pub async fn is_friend_with(&self, other: &impl Friendable) -> Result<bool> {
        self.engine.is_friend_with(&self.entity, &other.friendable_ref()).await
    }

    pub async fn has_friend_request_from(&self, other: &impl Friendable) -> Result<bool> {
        self.engine
            .has_friend_request_from(&self.entity, &other.friendable_ref())
            .await
    }

    pub async fn get_friend_requests(&self) -> Result<Vec<Friendship>> {
        self.engine.get_friend_requests(&self.entity).await
    }

    pub async fn group_friend(&self, friend: &impl Friendable, group: &str) -> Result<bool> {
        self.engine
            .group_friend(&self.entity, &friend.friendable_ref(), group)
            .await
    }

    pub async fn ungroup_friend(&self, friend: &impl Friendable, group: Option<&str>) -> Result<usize> {
        self.engine
            .ungroup_friend(&self.entity, &friend.friendable_ref(), group)
            .await
    }

    pub async fn groups_for(&self, friend: &impl Friendable) -> Result<Vec<String>> {
        self.engine.groups_for(&self.entity, &friend.friendable_ref()).await
    }

    pub async fn get_friends(&self, group: Option<&str>) -> Result<Vec<FriendableRef>> {
        self.engine.get_friends(&self.entity, group).await
    }

    pub async fn get_friends_page(
        &self,
        group: Option<&str>,
        pagination: Pagination,
    ) -> Result<PaginatedResults<FriendableRef>> {
        self.engine.get_friends_page(&self.entity, group, pagination).await
    }

    pub async fn get_friends_of_friends(&self) -> Result<Vec<FriendableRef>> {
        self.engine.get_friends_of_friends(&self.entity).await
    }

    pub async fn get_mutual_friends(&self, other: &impl Friendable) -> Result<Vec<FriendableRef>> {
        self.engine
            .get_mutual_friends(&self.entity, &other.friendable_ref())
            .await
    }

    pub async fn get_mutual_friends_count(&self, other: &impl Friendable) -> Result<usize> {
        self.engine
            .get_mutual_friends_count(&self.entity, &other.friendable_ref())
            .await
    }

    pub async fn get_friends_count(&self) -> Result<usize> {
        self.engine.get_friends_count(&self.entity).await
    }

    pub async fn requests(&self, filter: &RequestFilter) -> Result<PaginatedResults<Friendship>> {
        self.engine.requests(&self.entity, filter).await
    }

    pub async fn get_all_friendships(&self) -> Result<Vec<Friendship>> {
        self.engine.get_all_friendships(&self.entity).await
    }

    pub async fn get_pending_friendships(&self) -> Result<Vec<Friendship>> {
        self.engine.get_pending_friendships(&self.entity).await
    }

    pub async fn get_accepted_friendships(&self) -> Result<Vec<Friendship>> {
        self.engine.get_accepted_friendships(&self.entity).await
    }

    pub async fn get_denied_friendships(&self) -> Result<Vec<Friendship>> {
        self.engine.get_denied_friendships(&self.entity).await
    }

    pub async fn get_blocked_friendships(&self) -> Result<Vec<Friendship>> {
        self.engine.get_blocked_friendships(&self.entity).await
    }
}

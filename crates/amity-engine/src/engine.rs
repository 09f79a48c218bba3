//! The friendship engine

use crate::handle::FriendableHandle;
use amity_core::{
    Direction, EntityRegistry, EventSink, Friendable, FriendableRef, Friendship,
    FriendshipEvent, FriendshipEventKind, FriendshipQuery, FriendshipStatus, FriendshipsConfig,
    GroupMembership, PaginatedResults, Pagination, PaginationInfo, Result, TracingSink,
};
use amity_storage::FriendshipStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Filter for listing an entity's friendships
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestFilter {
    /// Only edges with this status (None = any)
    #[serde(default)]
    pub status: Option<FriendshipStatus>,

    #[serde(default)]
    pub direction: Direction,

    /// Only edges the entity tagged with this group
    #[serde(default)]
    pub group: Option<String>,

    #[serde(default)]
    pub pagination: Pagination,
}

impl RequestFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: FriendshipStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }
}

/// Relationship engine over a friendship store.
///
/// Refused transitions are reported as `false` / `None`; only storage
/// failures and invalid entity references are errors.
pub struct FriendshipEngine<S: FriendshipStore> {
    store: Arc<S>,
    events: Arc<dyn EventSink>,
    registry: EntityRegistry,
    config: FriendshipsConfig,
}

impl<S: FriendshipStore> Clone for FriendshipEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            events: Arc::clone(&self.events),
            registry: self.registry.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: FriendshipStore> FriendshipEngine<S> {
    /// Engine with an open registry, the default group catalog and events
    /// logged through `tracing`
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            events: Arc::new(TracingSink),
            registry: EntityRegistry::default(),
            config: FriendshipsConfig::default(),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_registry(mut self, registry: EntityRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_config(mut self, config: FriendshipsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &FriendshipsConfig {
        &self.config
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// The engine API bound to one entity
    pub fn for_entity(&self, entity: &impl Friendable) -> FriendableHandle<'_, S> {
        FriendableHandle::new(self, entity.friendable_ref())
    }

    fn emit(&self, kind: FriendshipEventKind, actor: &FriendableRef, other: &FriendableRef) {
        self.events.emit(FriendshipEvent::new(kind, actor, other));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // State machine
    // ─────────────────────────────────────────────────────────────────────────

    /// Send a friend request from `sender` to `recipient`
    pub async fn befriend(
        &self,
        sender: &FriendableRef,
        recipient: &FriendableRef,
    ) -> Result<Option<Friendship>> {
        self.registry.ensure_friendable(sender).await?;
        self.registry.ensure_friendable(recipient).await?;

        if sender == recipient {
            warn!(entity = %sender, "Refusing self friend request");
            return Ok(None);
        }

        if self.is_blocked_by(sender, recipient).await? {
            debug!(sender = %sender, recipient = %recipient, "Sender is blocked by recipient");
            return Ok(None);
        }

        self.resolve_block_if_present(sender, recipient).await?;

        if !self.can_befriend(sender, recipient).await? {
            debug!(sender = %sender, recipient = %recipient, "Friendship already exists");
            return Ok(None);
        }

        let friendship = Friendship::request(sender.clone(), recipient.clone());
        self.store.insert_friendship(&friendship).await?;

        info!(id = %friendship.id, sender = %sender, recipient = %recipient, "Friend request sent");
        self.emit(FriendshipEventKind::Sent, sender, recipient);

        Ok(Some(friendship))
    }

    /// `recipient` accepts the pending request `sender` sent them
    pub async fn accept_friend_request(
        &self,
        recipient: &FriendableRef,
        sender: &FriendableRef,
    ) -> Result<bool> {
        self.answer_request(recipient, sender, FriendshipStatus::Accepted)
            .await
    }

    /// `recipient` denies the pending request `sender` sent them
    pub async fn deny_friend_request(
        &self,
        recipient: &FriendableRef,
        sender: &FriendableRef,
    ) -> Result<bool> {
        self.answer_request(recipient, sender, FriendshipStatus::Denied)
            .await
    }

    async fn answer_request(
        &self,
        recipient: &FriendableRef,
        sender: &FriendableRef,
        answer: FriendshipStatus,
    ) -> Result<bool> {
        let from = FriendshipStatus::answerable_to(answer);
        if from.is_empty() {
            warn!(status = %answer, "Not a friend request answer");
            return Ok(false);
        }

        let open = FriendshipQuery::directed(sender, recipient).with_statuses(from.clone());
        let changed = self.store.update_status(&open, answer, Utc::now()).await?;

        if changed == 0 {
            if self
                .store
                .friendship_exists(&FriendshipQuery::directed(recipient, sender).with_statuses(from))
                .await?
            {
                warn!(
                    entity = %recipient,
                    other = %sender,
                    "Cannot answer an outgoing friend request"
                );
            }
            return Ok(false);
        }

        info!(recipient = %recipient, sender = %sender, status = %answer, "Friend request answered");
        let kind = match answer {
            FriendshipStatus::Accepted => FriendshipEventKind::Accepted,
            _ => FriendshipEventKind::Denied,
        };
        self.emit(kind, recipient, sender);

        Ok(true)
    }

    /// `blocker` blocks `blocked`, replacing any edge between them except a
    /// block `blocked` holds on `blocker`
    pub async fn block_friend(
        &self,
        blocker: &FriendableRef,
        blocked: &FriendableRef,
    ) -> Result<Friendship> {
        self.registry.ensure_friendable(blocker).await?;
        self.registry.ensure_friendable(blocked).await?;

        if blocker == blocked {
            return Err(amity_core::Error::InvalidReference(format!(
                "{} cannot block itself",
                blocker
            )));
        }

        let removed = self
            .store
            .delete_friendships(&FriendshipQuery::directed(blocker, blocked))
            .await?
            + self
                .store
                .delete_friendships(&FriendshipQuery::directed(blocked, blocker).with_statuses(vec![
                    FriendshipStatus::Pending,
                    FriendshipStatus::Accepted,
                    FriendshipStatus::Denied,
                ]))
                .await?;
        debug!(removed, "Cleared edges before block");

        let friendship = Friendship::block(blocker.clone(), blocked.clone());
        self.store.insert_friendship(&friendship).await?;

        info!(blocker = %blocker, blocked = %blocked, "Entity blocked");
        self.emit(FriendshipEventKind::Blocked, blocker, blocked);

        Ok(friendship)
    }

    /// Remove the block `blocker` holds on `blocked`
    pub async fn unblock_friend(&self, blocker: &FriendableRef, blocked: &FriendableRef) -> Result<bool> {
        let removed = self
            .store
            .delete_friendships(
                &FriendshipQuery::directed(blocker, blocked).with_status(FriendshipStatus::Blocked),
            )
            .await?;

        if removed == 0 {
            return Ok(false);
        }

        info!(blocker = %blocker, blocked = %blocked, "Entity unblocked");
        self.emit(FriendshipEventKind::Unblocked, blocker, blocked);
        Ok(true)
    }

    /// Remove every edge between the pair, whatever its status
    pub async fn unfriend(&self, entity: &FriendableRef, other: &FriendableRef) -> Result<bool> {
        let removed = self
            .store
            .delete_friendships(&FriendshipQuery::between(entity, other))
            .await?;

        if removed == 0 {
            return Ok(false);
        }

        info!(entity = %entity, other = %other, removed, "Friendship cancelled");
        self.emit(FriendshipEventKind::Cancelled, entity, other);
        Ok(true)
    }

    pub async fn has_blocked(&self, entity: &FriendableRef, other: &FriendableRef) -> Result<bool> {
        Ok(self
            .store
            .friendship_exists(
                &FriendshipQuery::directed(entity, other).with_status(FriendshipStatus::Blocked),
            )
            .await?)
    }

    pub async fn is_blocked_by(&self, entity: &FriendableRef, other: &FriendableRef) -> Result<bool> {
        self.has_blocked(other, entity).await
    }

    /// Whether `entity` may send `other` a request. Never mutates.
    pub async fn can_befriend(&self, entity: &FriendableRef, other: &FriendableRef) -> Result<bool> {
        if self.has_blocked(entity, other).await? {
            return Ok(true);
        }

        let live = FriendshipQuery::between(entity, other).with_statuses(FriendshipStatus::active());
        Ok(!self.store.friendship_exists(&live).await?)
    }

    /// Lift the block `entity` holds on `other`, if any
    pub async fn resolve_block_if_present(
        &self,
        entity: &FriendableRef,
        other: &FriendableRef,
    ) -> Result<bool> {
        if !self.has_blocked(entity, other).await? {
            return Ok(false);
        }
        self.unblock_friend(entity, other).await
    }

    /// The edge between the pair, preferring one that is not denied
    pub async fn get_friendship(
        &self,
        entity: &FriendableRef,
        other: &FriendableRef,
    ) -> Result<Option<Friendship>> {
        let between = FriendshipQuery::between(entity, other);
        let live = self
            .store
            .first_friendship(&between.clone().with_statuses(FriendshipStatus::active()))
            .await?;
        match live {
            Some(friendship) => Ok(Some(friendship)),
            None => Ok(self.store.first_friendship(&between).await?),
        }
    }

    pub async fn is_friend_with(&self, entity: &FriendableRef, other: &FriendableRef) -> Result<bool> {
        Ok(self
            .store
            .friendship_exists(
                &FriendshipQuery::between(entity, other).with_status(FriendshipStatus::Accepted),
            )
            .await?)
    }

    /// Whether `other` has a pending request out to `entity`
    pub async fn has_friend_request_from(
        &self,
        entity: &FriendableRef,
        other: &FriendableRef,
    ) -> Result<bool> {
        Ok(self
            .store
            .friendship_exists(
                &FriendshipQuery::directed(other, entity).with_status(FriendshipStatus::Pending),
            )
            .await?)
    }

    /// Pending requests sent to `entity`
    pub async fn get_friend_requests(&self, entity: &FriendableRef) -> Result<Vec<Friendship>> {
        Ok(self
            .store
            .find_friendships(
                &FriendshipQuery::touching(entity, Direction::Incoming)
                    .with_status(FriendshipStatus::Pending),
            )
            .await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Groups
    // ─────────────────────────────────────────────────────────────────────────

    /// Put `friend` in one of `entity`'s groups
    pub async fn group_friend(
        &self,
        entity: &FriendableRef,
        friend: &FriendableRef,
        group: &str,
    ) -> Result<bool> {
        if !self.config.groups.contains(group) {
            warn!(group, "Unknown friend group");
            return Ok(false);
        }
        self.registry.ensure_friendable(entity).await?;
        self.registry.ensure_friendable(friend).await?;

        let accepted = FriendshipQuery::between(entity, friend).with_status(FriendshipStatus::Accepted);
        let Some(friendship) = self.store.first_friendship(&accepted).await? else {
            debug!(entity = %entity, friend = %friend, "Cannot group a non-friend");
            return Ok(false);
        };

        let created = self
            .store
            .insert_membership(&GroupMembership::new(friendship.id, group, friend.clone()))
            .await?;
        if created {
            info!(entity = %entity, friend = %friend, group, "Friend grouped");
        }
        Ok(created)
    }

    /// Take `friend` out of one of `entity`'s groups, or all of them
    pub async fn ungroup_friend(
        &self,
        entity: &FriendableRef,
        friend: &FriendableRef,
        group: Option<&str>,
    ) -> Result<usize> {
        if let Some(group) = group {
            if !self.config.groups.contains(group) {
                warn!(group, "Unknown friend group");
                return Ok(0);
            }
        }

        let edges = self
            .store
            .find_friendships(&FriendshipQuery::between(entity, friend))
            .await?;

        let mut removed = 0;
        for edge in &edges {
            removed += self.store.delete_memberships(&edge.id, friend, group).await?;
        }

        if removed > 0 {
            info!(entity = %entity, friend = %friend, removed, "Friend ungrouped");
        }
        Ok(removed)
    }

    /// Groups `entity` has put `friend` in
    pub async fn groups_for(&self, entity: &FriendableRef, friend: &FriendableRef) -> Result<Vec<String>> {
        let edges = self
            .store
            .find_friendships(&FriendshipQuery::between(entity, friend).with_status(FriendshipStatus::Accepted))
            .await?;

        let mut groups = Vec::new();
        for edge in &edges {
            for membership in self.store.memberships_for(&edge.id).await? {
                if membership.member == *friend && !groups.contains(&membership.group) {
                    groups.push(membership.group);
                }
            }
        }
        Ok(groups)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived sets
    // ─────────────────────────────────────────────────────────────────────────

    /// Accepted friends of `entity`, optionally only those in `group`
    pub async fn get_friends(&self, entity: &FriendableRef, group: Option<&str>) -> Result<Vec<FriendableRef>> {
        let mut query =
            FriendshipQuery::touching(entity, Direction::Both).with_status(FriendshipStatus::Accepted);
        if let Some(group) = group {
            query = query.in_group(group, entity);
        }

        let edges = self.store.find_friendships(&query).await?;
        debug!(entity = %entity, edges = edges.len(), "Loaded friend edges");

        let mut friends = Vec::new();
        for edge in &edges {
            if let Some(other) = edge.other_party(entity) {
                if other != entity && !friends.contains(other) {
                    friends.push(other.clone());
                }
            }
        }
        Ok(friends)
    }

    pub async fn get_friends_page(
        &self,
        entity: &FriendableRef,
        group: Option<&str>,
        pagination: Pagination,
    ) -> Result<PaginatedResults<FriendableRef>> {
        let friends = self.get_friends(entity, group).await?;
        Ok(PaginatedResults::from_all(friends, pagination))
    }

    /// Friends of `entity`'s friends who are neither `entity` nor its friends
    pub async fn get_friends_of_friends(&self, entity: &FriendableRef) -> Result<Vec<FriendableRef>> {
        let friends = self.get_friends(entity, None).await?;
        if friends.is_empty() {
            return Ok(Vec::new());
        }

        let edges = self
            .store
            .find_friendships(
                &FriendshipQuery::touching_any(friends.clone()).with_status(FriendshipStatus::Accepted),
            )
            .await?;

        let mut result = Vec::new();
        for edge in &edges {
            for endpoint in [&edge.sender, &edge.recipient] {
                if endpoint != entity && !friends.contains(endpoint) && !result.contains(endpoint) {
                    result.push(endpoint.clone());
                }
            }
        }
        Ok(result)
    }

    pub async fn get_friends_of_friends_page(
        &self,
        entity: &FriendableRef,
        pagination: Pagination,
    ) -> Result<PaginatedResults<FriendableRef>> {
        let result = self.get_friends_of_friends(entity).await?;
        Ok(PaginatedResults::from_all(result, pagination))
    }

    /// Friends `entity` and `other` have in common
    pub async fn get_mutual_friends(&self, entity: &FriendableRef, other: &FriendableRef) -> Result<Vec<FriendableRef>> {
        let mine = self.get_friends(entity, None).await?;
        let theirs = self.get_friends(other, None).await?;

        Ok(mine
            .into_iter()
            .filter(|f| f != entity && f != other && theirs.contains(f))
            .collect())
    }

    pub async fn get_mutual_friends_page(
        &self,
        entity: &FriendableRef,
        other: &FriendableRef,
        pagination: Pagination,
    ) -> Result<PaginatedResults<FriendableRef>> {
        let mutual = self.get_mutual_friends(entity, other).await?;
        Ok(PaginatedResults::from_all(mutual, pagination))
    }

    pub async fn get_mutual_friends_count(&self, entity: &FriendableRef, other: &FriendableRef) -> Result<usize> {
        Ok(self.get_mutual_friends(entity, other).await?.len())
    }

    /// Number of accepted edges touching `entity`
    pub async fn get_friends_count(&self, entity: &FriendableRef) -> Result<usize> {
        Ok(self
            .store
            .count_friendships(
                &FriendshipQuery::touching(entity, Direction::Both).with_status(FriendshipStatus::Accepted),
            )
            .await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Status accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Edges touching `entity` matching a filter, one page at a time
    pub async fn requests(
        &self,
        entity: &FriendableRef,
        filter: &RequestFilter,
    ) -> Result<PaginatedResults<Friendship>> {
        let mut query = FriendshipQuery::touching(entity, filter.direction).with_status_opt(filter.status);
        if let Some(group) = &filter.group {
            query = query.in_group(group.clone(), entity);
        }

        let total = self.store.count_friendships(&query).await?;
        let data = self
            .store
            .find_friendships(&query.paginate(filter.pagination))
            .await?;

        Ok(PaginatedResults {
            data,
            pagination: PaginationInfo::new(filter.pagination.page, filter.pagination.per_page, total),
        })
    }

    async fn with_status(
        &self,
        entity: &FriendableRef,
        status: Option<FriendshipStatus>,
    ) -> Result<Vec<Friendship>> {
        let query = FriendshipQuery::touching(entity, Direction::Both).with_status_opt(status);
        Ok(self.store.find_friendships(&query).await?)
    }

    pub async fn get_all_friendships(&self, entity: &FriendableRef) -> Result<Vec<Friendship>> {
        self.with_status(entity, None).await
    }

    pub async fn get_pending_friendships(&self, entity: &FriendableRef) -> Result<Vec<Friendship>> {
        self.with_status(entity, Some(FriendshipStatus::Pending)).await
    }

    pub async fn get_accepted_friendships(&self, entity: &FriendableRef) -> Result<Vec<Friendship>> {
        self.with_status(entity, Some(FriendshipStatus::Accepted)).await
    }

    pub async fn get_denied_friendships(&self, entity: &FriendableRef) -> Result<Vec<Friendship>> {
        self.with_status(entity, Some(FriendshipStatus::Denied)).await
    }

    /// Blocks in both directions
    pub async fn get_blocked_friendships(&self, entity: &FriendableRef) -> Result<Vec<Friendship>> {
        self.with_status(entity, Some(FriendshipStatus::Blocked)).await
    }
}

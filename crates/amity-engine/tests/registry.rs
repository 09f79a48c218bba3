//! Entity registry checks at the engine boundary

mod common;

use amity_core::{EntityId, EntityLookup, EntityRegistry, Error, FriendableRef, Result};
use async_trait::async_trait;
use common::{memory_engine, user};
use std::sync::Arc;

struct KnownUsers(Vec<&'static str>);

#[async_trait]
impl EntityLookup for KnownUsers {
    async fn exists(&self, id: &EntityId) -> Result<bool> {
        Ok(self.0.iter().any(|known| *known == id.as_str()))
    }
}

fn team(id: u64) -> FriendableRef {
    FriendableRef::new("team", id)
}

#[tokio::test]
async fn test_strict_registry_rejects_unknown_types() {
    let (engine, events) = memory_engine();
    let engine = engine.with_registry(
        EntityRegistry::strict().register("user", Arc::new(KnownUsers(vec!["1", "2"]))),
    );

    assert!(engine.befriend(&user(1), &user(2)).await.unwrap().is_some());

    let err = engine.befriend(&user(1), &team(7)).await.unwrap_err();
    assert!(matches!(err, Error::UnknownEntityType(t) if t == "team"));

    let err = engine.block_friend(&user(1), &user(3)).await.unwrap_err();
    assert!(matches!(err, Error::EntityNotFound(_)));

    assert_eq!(events.names(), vec!["friendship.sent"]);
}

#[tokio::test]
async fn test_open_registry_mixes_types() {
    let (engine, _) = memory_engine();

    engine.befriend(&user(1), &team(1)).await.unwrap();
    assert!(engine.accept_friend_request(&team(1), &user(1)).await.unwrap());

    assert_eq!(engine.get_friends(&user(1), None).await.unwrap(), vec![team(1)]);
    // same id, different type: not the same entity
    assert!(!engine.is_friend_with(&user(1), &user(1)).await.unwrap());
    assert!(engine.get_friends(&team(1), None).await.unwrap().contains(&user(1)));
}

#[tokio::test]
async fn test_invalid_reference_is_rejected() {
    let (engine, _) = memory_engine();
    let bad = FriendableRef::new("", "1");

    assert!(matches!(
        engine.befriend(&user(1), &bad).await,
        Err(Error::Validation(_))
    ));
}

#[tokio::test]
async fn test_grouping_checks_both_sides() {
    let (engine, _) = memory_engine();
    engine.befriend(&user(1), &user(2)).await.unwrap();
    engine.accept_friend_request(&user(2), &user(1)).await.unwrap();

    // same store, but user 1 is no longer known
    let strict = engine
        .clone()
        .with_registry(EntityRegistry::strict().register("user", Arc::new(KnownUsers(vec!["2"]))));

    let err = strict.group_friend(&user(1), &user(2), "family").await.unwrap_err();
    assert!(matches!(err, Error::EntityNotFound(_)));
    assert!(engine.groups_for(&user(1), &user(2)).await.unwrap().is_empty());

    assert!(engine.group_friend(&user(1), &user(2), "family").await.unwrap());
}

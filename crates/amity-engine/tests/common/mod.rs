//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use amity_core::{FriendableRef, RecordingSink, TableNames};
use amity_engine::FriendshipEngine;
use amity_storage::{MemoryStorage, SqliteStorage};
use std::sync::Arc;

pub fn user(id: u64) -> FriendableRef {
    FriendableRef::new("user", id)
}

/// `count` users with ids starting at `first`
pub fn users(first: u64, count: u64) -> Vec<FriendableRef> {
    (first..first + count).map(user).collect()
}

pub fn memory_engine() -> (FriendshipEngine<MemoryStorage>, Arc<RecordingSink>) {
    let events = Arc::new(RecordingSink::new());
    let engine = FriendshipEngine::new(Arc::new(MemoryStorage::new())).with_events(events.clone());
    (engine, events)
}

pub fn sqlite_engine() -> (FriendshipEngine<SqliteStorage>, Arc<RecordingSink>) {
    let storage = SqliteStorage::in_memory(TableNames::default()).expect("Failed to open SQLite");
    let events = Arc::new(RecordingSink::new());
    let engine = FriendshipEngine::new(Arc::new(storage)).with_events(events.clone());
    (engine, events)
}

/// Run each listed `async fn(engine, events)` against every backend
#[allow(unused_macros)]
macro_rules! on_each_backend {
    ($($name:ident),* $(,)?) => {
        mod memory {
            $(
                #[tokio::test]
                async fn $name() {
                    let (engine, events) = crate::common::memory_engine();
                    super::$name(engine, events).await;
                }
            )*
        }

        mod sqlite {
            $(
                #[tokio::test]
                async fn $name() {
                    let (engine, events) = crate::common::sqlite_engine();
                    super::$name(engine, events).await;
                }
            )*
        }
    };
}

//! Amity Storage - Storage backends for the friendship graph
//!
//! This crate provides the `FriendshipStore` trait and the backends that
//! persist friendship edges and group memberships.

#![allow(clippy::result_large_err)]

pub mod error;
pub mod migration;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub mod memory;

pub use error::{StorageError, StorageResult};
pub use migration::{Migratable, SchemaVersion, CURRENT_VERSION, MIGRATIONS};
pub use traits::FriendshipStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStorage;

pub use memory::MemoryStorage;

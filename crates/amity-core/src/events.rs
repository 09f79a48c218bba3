//! Friendship lifecycle events and the sinks that receive them

use crate::entity::FriendableRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Kind of lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipEventKind {
    Sent,
    Accepted,
    Denied,
    Blocked,
    Unblocked,
    Cancelled,
}

impl FriendshipEventKind {
    /// Event name as seen by listeners
    pub fn name(self) -> &'static str {
        match self {
            Self::Sent => "friendship.sent",
            Self::Accepted => "friendship.accepted",
            Self::Denied => "friendship.denied",
            Self::Blocked => "friendship.blocked",
            Self::Unblocked => "friendship.unblocked",
            Self::Cancelled => "friendship.cancelled",
        }
    }
}

/// Event payload: who acted, and on whom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendshipEvent {
    pub kind: FriendshipEventKind,
    pub actor: FriendableRef,
    pub other: FriendableRef,
    pub occurred_at: DateTime<Utc>,
}

impl FriendshipEvent {
    pub fn new(kind: FriendshipEventKind, actor: &FriendableRef, other: &FriendableRef) -> Self {
        Self {
            kind,
            actor: actor.clone(),
            other: other.clone(),
            occurred_at: Utc::now(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Receives lifecycle events.
///
/// Emission is fire-and-forget: the engine does not wait on, retry, or
/// observe failures of a sink.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: FriendshipEvent);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: FriendshipEvent) {}
}

/// Logs every event through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: FriendshipEvent) {
        tracing::info!(
            event = event.name(),
            actor = %event.actor,
            other = %event.other,
            "friendship event"
        );
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<FriendshipEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far
    pub fn events(&self) -> Vec<FriendshipEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(FriendshipEvent::name).collect()
    }

    pub fn contains(&self, kind: FriendshipEventKind) -> bool {
        self.events().iter().any(|e| e.kind == kind)
    }

    pub fn clear(&self) {
        match self.events.lock() {
            Ok(mut events) => events.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: FriendshipEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

//! Friendship (edge) and group membership types

use crate::entity::FriendableRef;
use crate::status::FriendshipStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for a friendship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FriendshipId(pub Ulid);

impl FriendshipId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for FriendshipId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FriendshipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of an edge a query looks at, relative to its subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Subject is the stored sender
    Outgoing,
    /// Subject is the stored recipient
    Incoming,
    #[default]
    Both,
}

impl Direction {
    pub fn includes_outgoing(self) -> bool {
        matches!(self, Self::Outgoing | Self::Both)
    }

    pub fn includes_incoming(self) -> bool {
        matches!(self, Self::Incoming | Self::Both)
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "outgoing" | "out" => Ok(Self::Outgoing),
            "incoming" | "in" => Ok(Self::Incoming),
            "both" | "all" => Ok(Self::Both),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

/// A friendship edge between two entities.
///
/// Stored directed (who initiated), queried symmetrically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Friendship {
    pub id: FriendshipId,

    /// Entity that created the edge
    pub sender: FriendableRef,

    /// Entity the edge was created for
    pub recipient: FriendableRef,

    pub status: FriendshipStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    pub fn new(sender: FriendableRef, recipient: FriendableRef, status: FriendshipStatus) -> Self {
        let now = Utc::now();
        Self {
            id: FriendshipId::new(),
            sender,
            recipient,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    /// New pending friend request
    pub fn request(sender: FriendableRef, recipient: FriendableRef) -> Self {
        Self::new(sender, recipient, FriendshipStatus::Pending)
    }

    /// New block record
    pub fn block(sender: FriendableRef, recipient: FriendableRef) -> Self {
        Self::new(sender, recipient, FriendshipStatus::Blocked)
    }

    pub fn involves(&self, entity: &FriendableRef) -> bool {
        self.sender == *entity || self.recipient == *entity
    }

    /// Symmetric pair check
    pub fn is_between(&self, a: &FriendableRef, b: &FriendableRef) -> bool {
        (self.sender == *a && self.recipient == *b) || (self.sender == *b && self.recipient == *a)
    }

    /// The side of the edge that is not `entity`, if `entity` is on it
    pub fn other_party(&self, entity: &FriendableRef) -> Option<&FriendableRef> {
        if self.sender == *entity {
            Some(&self.recipient)
        } else if self.recipient == *entity {
            Some(&self.sender)
        } else {
            None
        }
    }
}

/// One side of a friendship tagging the other side with a named group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupMembership {
    pub friendship_id: FriendshipId,

    /// Group slug, e.g. "family"
    pub group: String,

    /// The entity placed in the group
    pub member: FriendableRef,
}

impl GroupMembership {
    pub fn new(friendship_id: FriendshipId, group: impl Into<String>, member: FriendableRef) -> Self {
        Self {
            friendship_id,
            group: group.into(),
            member,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> FriendableRef {
        FriendableRef::new("user", id)
    }

    #[test]
    fn test_request_creation() {
        let friendship = Friendship::request(user("1"), user("2"));

        assert_eq!(friendship.status, FriendshipStatus::Pending);
        assert_eq!(friendship.created_at, friendship.updated_at);
        assert!(friendship.is_between(&user("1"), &user("2")));
        assert!(friendship.is_between(&user("2"), &user("1")));
        assert!(!friendship.is_between(&user("1"), &user("3")));
    }

    #[test]
    fn test_other_party() {
        let friendship = Friendship::request(user("1"), user("2"));

        assert_eq!(friendship.other_party(&user("1")), Some(&user("2")));
        assert_eq!(friendship.other_party(&user("2")), Some(&user("1")));
        assert_eq!(friendship.other_party(&user("3")), None);
    }

    #[test]
    fn test_same_id_different_type_is_a_different_party() {
        let friendship = Friendship::request(user("1"), FriendableRef::new("team", "1"));
        assert!(!friendship.involves(&FriendableRef::new("team", "2")));
        assert!(friendship.involves(&FriendableRef::new("team", "1")));
        assert_eq!(
            friendship.other_party(&user("1")),
            Some(&FriendableRef::new("team", "1"))
        );
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("in".parse::<Direction>(), Ok(Direction::Incoming));
        assert_eq!("OUTGOING".parse::<Direction>(), Ok(Direction::Outgoing));
        assert_eq!("all".parse::<Direction>(), Ok(Direction::Both));
        assert!("sideways".parse::<Direction>().is_err());
    }
}

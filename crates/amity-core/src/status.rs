//! Friendship status and its transitions

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Status of a friendship edge.
///
/// The integer codes are what backends persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Denied,
    Blocked,
}

impl FriendshipStatus {
    pub const ALL: [FriendshipStatus; 4] = [
        FriendshipStatus::Pending,
        FriendshipStatus::Accepted,
        FriendshipStatus::Denied,
        FriendshipStatus::Blocked,
    ];

    pub fn code(self) -> i64 {
        match self {
            Self::Pending => 0,
            Self::Accepted => 1,
            Self::Denied => 2,
            Self::Blocked => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Accepted),
            2 => Some(Self::Denied),
            3 => Some(Self::Blocked),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Denied => "denied",
            Self::Blocked => "blocked",
        }
    }

    /// Whether an existing edge may be updated in place to `next`.
    ///
    /// Only a pending request can be answered. Blocking and unblocking
    /// replace edges rather than update them.
    pub fn can_transition_to(self, next: FriendshipStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted) | (Self::Pending, Self::Denied)
        )
    }

    /// Statuses an existing edge may be in to be updated to `next`
    pub fn answerable_to(next: FriendshipStatus) -> Vec<FriendshipStatus> {
        Self::ALL
            .into_iter()
            .filter(|status| status.can_transition_to(next))
            .collect()
    }

    /// Statuses that keep a pair from sending a new request
    pub fn active() -> Vec<FriendshipStatus> {
        vec![Self::Pending, Self::Accepted, Self::Blocked]
    }
}

impl std::fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FriendshipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "denied" => Ok(Self::Denied),
            "blocked" => Ok(Self::Blocked),
            other => Err(format!("unknown friendship status '{}'", other)),
        }
    }
}

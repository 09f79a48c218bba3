//! Filtered queries over the friendship edge table

use crate::entity::FriendableRef;
use crate::friendship::{Direction, Friendship, GroupMembership};
use crate::limits::MAX_PER_PAGE;
use crate::status::FriendshipStatus;
use serde::{Deserialize, Serialize};

/// Which edges a query starts from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeScope {
    /// Edges with `subject` on the side(s) selected by `direction`
    Touching {
        subject: FriendableRef,
        direction: Direction,
    },
    /// Edges connecting the unordered pair
    Between(FriendableRef, FriendableRef),
    /// Edges with this exact sender and recipient
    Directed {
        sender: FriendableRef,
        recipient: FriendableRef,
    },
    /// Edges touching any of the entities, on either side
    TouchingAny(Vec<FriendableRef>),
}

impl EdgeScope {
    pub fn matches(&self, friendship: &Friendship) -> bool {
        match self {
            EdgeScope::Touching { subject, direction } => {
                (direction.includes_outgoing() && friendship.sender == *subject)
                    || (direction.includes_incoming() && friendship.recipient == *subject)
            }
            EdgeScope::Between(a, b) => friendship.is_between(a, b),
            EdgeScope::Directed { sender, recipient } => {
                friendship.sender == *sender && friendship.recipient == *recipient
            }
            EdgeScope::TouchingAny(entities) => entities.iter().any(|e| friendship.involves(e)),
        }
    }
}

/// Restricts edges to those `tagged_by` put into `group`.
///
/// A membership row names the member placed in the group, so the tagging
/// side is whichever party is not the member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupFilter {
    pub group: String,
    pub tagged_by: FriendableRef,
}

impl GroupFilter {
    pub fn matches(&self, friendship: &Friendship, memberships: &[GroupMembership]) -> bool {
        memberships.iter().any(|m| {
            m.friendship_id == friendship.id && m.group == self.group && m.member != self.tagged_by
        })
    }
}

/// Pagination options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    /// Page number (0-indexed)
    #[serde(default)]
    pub page: usize,

    /// Number of results per page, 0 for the whole set
    #[serde(default)]
    pub per_page: usize,
}

impl Pagination {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page,
            per_page: per_page.min(MAX_PER_PAGE),
        }
    }

    /// No pagination: the whole set
    pub fn all() -> Self {
        Self::default()
    }

    /// First page of `per_page` items (0 = whole set)
    pub fn per_page(per_page: usize) -> Self {
        Self::new(0, per_page)
    }

    pub fn is_unbounded(&self) -> bool {
        self.per_page == 0
    }

    /// Rows to skip; saturates for pages past `usize::MAX` rows
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.per_page)
    }

    /// Cut this page out of an already materialised result set
    pub fn window<T>(&self, items: Vec<T>) -> Vec<T> {
        if self.is_unbounded() {
            return items;
        }
        items
            .into_iter()
            .skip(self.offset())
            .take(self.per_page)
            .collect()
    }
}

/// A filtered query over friendships
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendshipQuery {
    pub scope: EdgeScope,

    /// Allowed statuses (empty = any)
    #[serde(default)]
    pub statuses: Vec<FriendshipStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupFilter>,

    #[serde(default)]
    pub pagination: Pagination,
}

impl FriendshipQuery {
    pub fn new(scope: EdgeScope) -> Self {
        Self {
            scope,
            statuses: Vec::new(),
            group: None,
            pagination: Pagination::all(),
        }
    }

    pub fn touching(subject: &FriendableRef, direction: Direction) -> Self {
        Self::new(EdgeScope::Touching {
            subject: subject.clone(),
            direction,
        })
    }

    pub fn between(a: &FriendableRef, b: &FriendableRef) -> Self {
        Self::new(EdgeScope::Between(a.clone(), b.clone()))
    }

    pub fn directed(sender: &FriendableRef, recipient: &FriendableRef) -> Self {
        Self::new(EdgeScope::Directed {
            sender: sender.clone(),
            recipient: recipient.clone(),
        })
    }

    pub fn touching_any(entities: Vec<FriendableRef>) -> Self {
        Self::new(EdgeScope::TouchingAny(entities))
    }

    pub fn with_status(mut self, status: FriendshipStatus) -> Self {
        self.statuses = vec![status];
        self
    }

    pub fn with_statuses(mut self, statuses: Vec<FriendshipStatus>) -> Self {
        self.statuses = statuses;
        self
    }

    /// Optional status filter
    pub fn with_status_opt(self, status: Option<FriendshipStatus>) -> Self {
        match status {
            Some(status) => self.with_status(status),
            None => self,
        }
    }

    pub fn in_group(mut self, group: impl Into<String>, tagged_by: &FriendableRef) -> Self {
        self.group = Some(GroupFilter {
            group: group.into(),
            tagged_by: tagged_by.clone(),
        });
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Same filter without pagination (used for counts and existence)
    pub fn unpaginated(&self) -> Self {
        Self {
            pagination: Pagination::all(),
            ..self.clone()
        }
    }

    /// In-memory predicate; every backend must select the same edges
    pub fn matches(&self, friendship: &Friendship, memberships: &[GroupMembership]) -> bool {
        if !self.scope.matches(friendship) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&friendship.status) {
            return false;
        }
        match &self.group {
            Some(filter) => filter.matches(friendship, memberships),
            None => true,
        }
    }
}

/// Paginated results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResults<T> {
    /// The data for this page
    pub data: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationInfo,
}

impl<T> PaginatedResults<T> {
    /// Paginate a fully materialised set
    pub fn from_all(items: Vec<T>, pagination: Pagination) -> Self {
        let total_count = items.len();
        let info = PaginationInfo::new(pagination.page, pagination.per_page, total_count);
        Self {
            data: pagination.window(items),
            pagination: info,
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub current_page: usize,
    pub per_page: usize,
    pub total_count: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PaginationInfo {
    pub fn new(current_page: usize, per_page: usize, total_count: usize) -> Self {
        if per_page == 0 {
            return Self {
                current_page: 0,
                per_page: total_count,
                total_count,
                total_pages: usize::from(total_count > 0),
                has_next_page: false,
                has_previous_page: false,
            };
        }
        let total_pages = total_count.div_ceil(per_page);
        Self {
            current_page,
            per_page,
            total_count,
            total_pages,
            has_next_page: current_page.saturating_add(1) < total_pages,
            has_previous_page: current_page > 0,
        }
    }
}

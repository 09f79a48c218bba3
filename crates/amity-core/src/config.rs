//! Friendship configuration: physical table names and the group catalog

use crate::error::Result;
use crate::limits::{validate_group_slug, validate_table_name};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete friendship configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FriendshipsConfig {
    #[serde(default)]
    pub tables: TableNames,

    #[serde(default)]
    pub groups: GroupCatalog,
}

impl FriendshipsConfig {
    pub fn validate(&self) -> Result<()> {
        self.tables.validate()?;
        self.groups.validate()?;
        Ok(())
    }
}

/// Physical names of the two tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableNames {
    #[serde(default = "default_friendships_table")]
    pub friendships: String,

    #[serde(default = "default_group_memberships_table")]
    pub group_memberships: String,
}

fn default_friendships_table() -> String {
    "friendships".to_string()
}

fn default_group_memberships_table() -> String {
    "user_friendship_groups".to_string()
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            friendships: default_friendships_table(),
            group_memberships: default_group_memberships_table(),
        }
    }
}

impl TableNames {
    pub fn new(friendships: impl Into<String>, group_memberships: impl Into<String>) -> Self {
        Self {
            friendships: friendships.into(),
            group_memberships: group_memberships.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_table_name(&self.friendships)?;
        validate_table_name(&self.group_memberships)?;
        Ok(())
    }
}

/// Groups a friend can be placed in: slug -> display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupCatalog {
    groups: BTreeMap<String, String>,
}

impl Default for GroupCatalog {
    fn default() -> Self {
        Self::empty()
            .with_group("acquaintances", "Acquaintances")
            .with_group("close_friends", "Close Friends")
            .with_group("family", "Family")
    }
}

impl GroupCatalog {
    pub fn empty() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }

    pub fn with_group(mut self, slug: impl Into<String>, name: impl Into<String>) -> Self {
        self.groups.insert(slug.into(), name.into());
        self
    }

    pub fn insert(&mut self, slug: impl Into<String>, name: impl Into<String>) {
        self.groups.insert(slug.into(), name.into());
    }

    pub fn remove(&mut self, slug: &str) -> Option<String> {
        self.groups.remove(slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.groups.contains_key(slug)
    }

    /// Display name for a slug
    pub fn name(&self, slug: &str) -> Option<&str> {
        self.groups.get(slug).map(String::as_str)
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.groups.iter().map(|(s, n)| (s.as_str(), n.as_str()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        for slug in self.groups.keys() {
            validate_group_slug(slug)?;
        }
        Ok(())
    }
}

//! Friendable entity references and the entity type registry

use crate::error::{Error, Result};
use crate::limits::{validate_entity_id, validate_entity_type};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// Entity type tag (e.g. "user", "team")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityType(pub String);

impl EntityType {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Application key of an entity.
///
/// Integer keys are carried as their decimal text so that entities of
/// different types can share one edge table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Polymorphic reference to a friendable entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FriendableRef {
    pub entity_type: EntityType,
    pub entity_id: EntityId,
}

impl FriendableRef {
    pub fn new(entity_type: impl Into<EntityType>, entity_id: impl Into<EntityId>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
        }
    }

    /// Check the type tag and id against the limits
    pub fn validate(&self) -> Result<()> {
        validate_entity_type(self.entity_type.as_str())?;
        validate_entity_id(self.entity_id.as_str())?;
        Ok(())
    }
}

impl std::fmt::Display for FriendableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.entity_id)
    }
}

impl FromStr for FriendableRef {
    type Err = Error;

    /// Parse `type:id`. The id may itself contain ':'.
    fn from_str(s: &str) -> Result<Self> {
        let (entity_type, entity_id) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidReference(format!("expected 'type:id', got '{}'", s)))?;
        let reference = FriendableRef::new(entity_type, entity_id);
        reference.validate()?;
        Ok(reference)
    }
}

/// Capability implemented by application entities that take part in
/// friendships.
pub trait Friendable {
    /// Type tag stored in the sender/recipient type columns
    fn friendable_type(&self) -> EntityType;

    /// Key stored in the sender/recipient id columns
    fn friendable_id(&self) -> EntityId;

    fn friendable_ref(&self) -> FriendableRef {
        FriendableRef {
            entity_type: self.friendable_type(),
            entity_id: self.friendable_id(),
        }
    }
}

impl Friendable for FriendableRef {
    fn friendable_type(&self) -> EntityType {
        self.entity_type.clone()
    }

    fn friendable_id(&self) -> EntityId {
        self.entity_id.clone()
    }

    fn friendable_ref(&self) -> FriendableRef {
        self.clone()
    }
}

/// Looks up whether an entity of one type exists
#[async_trait]
pub trait EntityLookup: Send + Sync {
    async fn exists(&self, id: &EntityId) -> Result<bool>;
}

/// Lookup that accepts every id of its type
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyEntity;

#[async_trait]
impl EntityLookup for AnyEntity {
    async fn exists(&self, _id: &EntityId) -> Result<bool> {
        Ok(true)
    }
}

/// Registry mapping entity type tags to their lookups
#[derive(Clone)]
pub struct EntityRegistry {
    lookups: HashMap<EntityType, Arc<dyn EntityLookup>>,
    strict: bool,
}

impl EntityRegistry {
    /// Registry that accepts any type tag without lookups
    pub fn open() -> Self {
        Self {
            lookups: HashMap::new(),
            strict: false,
        }
    }

    /// Registry that only accepts registered type tags
    pub fn strict() -> Self {
        Self {
            lookups: HashMap::new(),
            strict: true,
        }
    }

    /// Register a lookup for a type tag
    pub fn register(
        mut self,
        entity_type: impl Into<EntityType>,
        lookup: Arc<dyn EntityLookup>,
    ) -> Self {
        self.lookups.insert(entity_type.into(), lookup);
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn knows(&self, entity_type: &EntityType) -> bool {
        !self.strict || self.lookups.contains_key(entity_type)
    }

    /// Registered type tags, sorted
    pub fn types(&self) -> Vec<&EntityType> {
        let mut types: Vec<_> = self.lookups.keys().collect();
        types.sort();
        types
    }

    /// Validate a reference and, when a lookup is registered for its type,
    /// check that the entity exists.
    pub async fn ensure_friendable(&self, reference: &FriendableRef) -> Result<()> {
        reference.validate()?;

        match self.lookups.get(&reference.entity_type) {
            Some(lookup) => {
                if !lookup.exists(&reference.entity_id).await? {
                    return Err(Error::EntityNotFound(reference.to_string()));
                }
                Ok(())
            }
            None if self.strict => Err(Error::UnknownEntityType(
                reference.entity_type.to_string(),
            )),
            None => Ok(()),
        }
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::open()
    }
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("types", &self.types())
            .field("strict", &self.strict)
            .finish()
    }
}

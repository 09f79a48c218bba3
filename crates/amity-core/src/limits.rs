//! Input validation limits for references, groups and table names

/// Maximum length for an entity type tag (255 chars, the morph column width)
pub const MAX_ENTITY_TYPE_LEN: usize = 255;

/// Maximum length for an entity id (255 chars)
pub const MAX_ENTITY_ID_LEN: usize = 255;

/// Maximum length for a group slug (64 chars)
pub const MAX_GROUP_SLUG_LEN: usize = 64;

/// Maximum length for a physical table name (64 chars)
pub const MAX_TABLE_NAME_LEN: usize = 64;

/// Maximum page size (1000)
pub const MAX_PER_PAGE: usize = 1000;

/// Validation error type
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyEntityType,
    EntityTypeTooLong { len: usize, max: usize },
    InvalidEntityType(String),
    EmptyEntityId,
    EntityIdTooLong { len: usize, max: usize },
    EmptyGroupSlug,
    GroupSlugTooLong { len: usize, max: usize },
    InvalidGroupSlug(String),
    InvalidTableName(String),
    PerPageTooLarge { per_page: usize, max: usize },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyEntityType => write!(f, "Entity type cannot be empty"),
            Self::EntityTypeTooLong { len, max } => {
                write!(f, "Entity type too long: {} chars (max {})", len, max)
            }
            Self::InvalidEntityType(t) => {
                write!(f, "Invalid entity type '{}': ':' and whitespace are not allowed", t)
            }
            Self::EmptyEntityId => write!(f, "Entity id cannot be empty"),
            Self::EntityIdTooLong { len, max } => {
                write!(f, "Entity id too long: {} chars (max {})", len, max)
            }
            Self::EmptyGroupSlug => write!(f, "Group slug cannot be empty"),
            Self::GroupSlugTooLong { len, max } => {
                write!(f, "Group slug too long: {} chars (max {})", len, max)
            }
            Self::InvalidGroupSlug(s) => write!(
                f,
                "Invalid group slug '{}': use lowercase letters, digits, '_' or '-'",
                s
            ),
            Self::InvalidTableName(t) => write!(
                f,
                "Invalid table name '{}': use letters, digits and '_' (max {} chars)",
                t, MAX_TABLE_NAME_LEN
            ),
            Self::PerPageTooLarge { per_page, max } => {
                write!(f, "Page size too large: {} (max {})", per_page, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate an entity type tag
pub fn validate_entity_type(entity_type: &str) -> Result<(), ValidationError> {
    if entity_type.is_empty() {
        return Err(ValidationError::EmptyEntityType);
    }
    if entity_type.len() > MAX_ENTITY_TYPE_LEN {
        return Err(ValidationError::EntityTypeTooLong {
            len: entity_type.len(),
            max: MAX_ENTITY_TYPE_LEN,
        });
    }
    if entity_type.contains(':') || entity_type.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEntityType(entity_type.to_string()));
    }
    Ok(())
}

/// Validate an entity id
pub fn validate_entity_id(entity_id: &str) -> Result<(), ValidationError> {
    if entity_id.is_empty() {
        return Err(ValidationError::EmptyEntityId);
    }
    if entity_id.len() > MAX_ENTITY_ID_LEN {
        return Err(ValidationError::EntityIdTooLong {
            len: entity_id.len(),
            max: MAX_ENTITY_ID_LEN,
        });
    }
    Ok(())
}

/// Validate a group slug
pub fn validate_group_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() {
        return Err(ValidationError::EmptyGroupSlug);
    }
    if slug.len() > MAX_GROUP_SLUG_LEN {
        return Err(ValidationError::GroupSlugTooLong {
            len: slug.len(),
            max: MAX_GROUP_SLUG_LEN,
        });
    }
    let valid = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if !valid {
        return Err(ValidationError::InvalidGroupSlug(slug.to_string()));
    }
    Ok(())
}

/// Validate a physical table name.
///
/// Table names are interpolated into SQL, so only plain identifiers pass.
pub fn validate_table_name(name: &str) -> Result<(), ValidationError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_TABLE_NAME_LEN
        && name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(ValidationError::InvalidTableName(name.to_string()));
    }
    Ok(())
}

/// Validate a page size
pub fn validate_per_page(per_page: usize) -> Result<(), ValidationError> {
    if per_page > MAX_PER_PAGE {
        return Err(ValidationError::PerPageTooLarge {
            per_page,
            max: MAX_PER_PAGE,
        });
    }
    Ok(())
}

//! CLI configuration

use std::path::{Path, PathBuf};

use amity_core::{FriendshipsConfig, GroupCatalog, TableNames};
use serde::{Deserialize, Serialize};

/// Get default config file path
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("amity")
        .join("config.toml")
}

/// Get default database path
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("amity")
        .join("amity.db")
}

fn default_entity_type() -> String {
    "user".to_string()
}

/// Configuration for the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Type tag used for bare ids on the command line
    #[serde(default = "default_entity_type")]
    pub default_entity_type: String,

    /// Accepted entity types; empty accepts any
    #[serde(default)]
    pub entity_types: Vec<String>,

    #[serde(default)]
    pub tables: TableNames,

    #[serde(default)]
    pub groups: GroupCatalog,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            default_entity_type: default_entity_type(),
            entity_types: Vec::new(),
            tables: TableNames::default(),
            groups: GroupCatalog::default(),
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file is missing
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))?;
        config.friendships().validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(default_database_path)
    }

    pub fn friendships(&self) -> FriendshipsConfig {
        FriendshipsConfig {
            tables: self.tables.clone(),
            groups: self.groups.clone(),
        }
    }

    /// Scalar keys understood by `get` and `set`. Groups are addressed as
    /// `groups.<slug>`.
    pub fn keys() -> &'static [&'static str] {
        &[
            "database",
            "default_entity_type",
            "entity_types",
            "tables.friendships",
            "tables.group_memberships",
        ]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "database" => Some(self.database_path().display().to_string()),
            "default_entity_type" => Some(self.default_entity_type.clone()),
            "entity_types" => Some(self.entity_types.join(",")),
            "tables.friendships" => Some(self.tables.friendships.clone()),
            "tables.group_memberships" => Some(self.tables.group_memberships.clone()),
            _ => {
                let slug = key.strip_prefix("groups.")?;
                self.groups.name(slug).map(str::to_string)
            }
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "database" => self.database = Some(PathBuf::from(value)),
            "default_entity_type" => {
                amity_core::limits::validate_entity_type(value)?;
                self.default_entity_type = value.to_string();
            }
            "entity_types" => {
                self.entity_types = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                for entity_type in &self.entity_types {
                    amity_core::limits::validate_entity_type(entity_type)?;
                }
            }
            "tables.friendships" => {
                amity_core::limits::validate_table_name(value)?;
                self.tables.friendships = value.to_string();
            }
            "tables.group_memberships" => {
                amity_core::limits::validate_table_name(value)?;
                self.tables.group_memberships = value.to_string();
            }
            _ => match key.strip_prefix("groups.") {
                Some(slug) => {
                    amity_core::limits::validate_group_slug(slug)?;
                    if value.is_empty() {
                        self.groups.remove(slug);
                    } else {
                        self.groups.insert(slug, value);
                    }
                }
                None => anyhow::bail!(
                    "Unknown config key: {}. Available keys: {}, groups.<slug>",
                    key,
                    Self::keys().join(", ")
                ),
            },
        }
        Ok(())
    }
}

//! Provisioning configuration contract
//!
//! These are the inputs handed to the provisioning tool (`database_configs`).
//! Verification only reads them back to know what to expect; nothing here is
//! ever serialized towards the warehouse.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Retention Snowflake applies when a database does not set one
pub const DEFAULT_RETENTION_DAYS: u32 = 1;

/// One configured database and its nested schemas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub name: String,

    #[serde(default)]
    pub comment: String,

    #[serde(default)]
    pub data_retention_time_in_days: Option<u32>,

    #[serde(default)]
    pub is_transient: Option<bool>,

    /// Schemas in declaration order
    #[serde(default)]
    pub schemas: Vec<SchemaConfig>,
}

impl DatabaseConfig {
    pub fn new(name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: comment.into(),
            data_retention_time_in_days: None,
            is_transient: None,
            schemas: Vec::new(),
        }
    }

    pub fn with_retention(mut self, days: u32) -> Self {
        self.data_retention_time_in_days = Some(days);
        self
    }

    pub fn with_transient(mut self, is_transient: bool) -> Self {
        self.is_transient = Some(is_transient);
        self
    }

    pub fn with_schema(mut self, schema: SchemaConfig) -> Self {
        self.schemas.push(schema);
        self
    }

    pub fn expected_transient(&self) -> bool {
        self.is_transient.unwrap_or(false)
    }

    pub fn expected_retention(&self) -> u32 {
        self.data_retention_time_in_days.unwrap_or(DEFAULT_RETENTION_DAYS)
    }
}

/// One configured schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub name: String,

    #[serde(default)]
    pub comment: String,

    #[serde(default)]
    pub is_managed: Option<bool>,

    #[serde(default)]
    pub is_transient: Option<bool>,
}

impl SchemaConfig {
    pub fn new(name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: comment.into(),
            is_managed: None,
            is_transient: None,
        }
    }

    pub fn with_managed(mut self, is_managed: bool) -> Self {
        self.is_managed = Some(is_managed);
        self
    }

    pub fn with_transient(mut self, is_transient: bool) -> Self {
        self.is_transient = Some(is_transient);
        self
    }

    pub fn expected_managed_access(&self) -> bool {
        self.is_managed.unwrap_or(false)
    }

    /// Schemas of a transient database are always transient
    pub fn expected_transient(&self, database: &DatabaseConfig) -> bool {
        self.is_transient.unwrap_or(false) || database.expected_transient()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigDocument {
    Variables {
        database_configs: BTreeMap<String, DatabaseConfig>,
    },
    Bare(BTreeMap<String, DatabaseConfig>),
}

/// Logical resource key -> database configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvisioningConfig {
    pub databases: BTreeMap<String, DatabaseConfig>,
}

impl ProvisioningConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database(mut self, key: impl Into<String>, database: DatabaseConfig) -> Self {
        self.databases.insert(key.into(), database);
        self
    }

    /// Parse either a bare map or a variables document with a
    /// `database_configs` entry (other variables are ignored)
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let document: ConfigDocument = serde_json::from_str(json)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        let databases = match document {
            ConfigDocument::Variables { database_configs } => database_configs,
            ConfigDocument::Bare(databases) => databases,
        };

        Ok(Self { databases })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&contents)
    }

    /// Number of databases plus schemas
    pub fn object_count(&self) -> usize {
        self.databases.values().map(|db| 1 + db.schemas.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }
}

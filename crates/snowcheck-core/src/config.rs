//! Configuration (snowcheck.toml) and connection settings
//!
//! Tool settings come from an optional TOML file; credentials only ever come
//! from the environment. Both are built once at startup and passed by
//! reference into every verification call.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Seconds to wait after provisioning before the first introspection query
pub const DEFAULT_SETTLE_DELAY_SECS: u64 = 5;

pub const ENV_ORGANIZATION: &str = "SNOWFLAKE_ORGANIZATION_NAME";
pub const ENV_ACCOUNT: &str = "SNOWFLAKE_ACCOUNT_NAME";
pub const ENV_USER: &str = "SNOWFLAKE_USER";
pub const ENV_PRIVATE_KEY: &str = "SNOWFLAKE_PRIVATE_KEY";
pub const ENV_ROLE: &str = "SNOWFLAKE_ROLE";
pub const ENV_WAREHOUSE: &str = "SNOWFLAKE_WAREHOUSE";

/// Verification behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifySettings {
    /// Blunt wait for metadata propagation, observed once per scenario
    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: u64,

    /// Principal whose grants are checked (grants are skipped when unset)
    #[serde(default)]
    pub principal: Option<String>,

    /// Privileges the principal must hold on every configured database
    #[serde(default)]
    pub database_privileges: Vec<String>,

    /// Privileges the principal must hold on every configured schema
    #[serde(default)]
    pub schema_privileges: Vec<String>,
}

fn default_settle_delay_secs() -> u64 {
    DEFAULT_SETTLE_DELAY_SECS
}

impl Default for VerifySettings {
    fn default() -> Self {
        Self {
            settle_delay_secs: DEFAULT_SETTLE_DELAY_SECS,
            principal: None,
            database_privileges: Vec::new(),
            schema_privileges: Vec::new(),
        }
    }
}

impl VerifySettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }

    /// Whether any grant expectations are configured
    pub fn checks_grants(&self) -> bool {
        self.principal.is_some()
            && (!self.database_privileges.is_empty() || !self.schema_privileges.is_empty())
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub verify: VerifySettings,

    /// Role override (takes precedence over SNOWFLAKE_ROLE)
    #[serde(default)]
    pub role: Option<String>,

    /// Warehouse override (takes precedence over SNOWFLAKE_WAREHOUSE)
    #[serde(default)]
    pub warehouse: Option<String>,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Key-pair credentials for one warehouse account
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub organization: String,
    pub account: String,
    pub user: String,
    pub role: Option<String>,
    pub warehouse: Option<String>,
    /// PEM encoded private key
    pub private_key: String,
}

impl ConnectionSettings {
    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary lookup; values are trimmed and
    /// blank values count as absent
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |key: &'static str| optional(key).ok_or(ConfigError::MissingEnv(key));

        Ok(Self {
            organization: required(ENV_ORGANIZATION)?,
            account: required(ENV_ACCOUNT)?,
            user: required(ENV_USER)?,
            private_key: required(ENV_PRIVATE_KEY)?,
            role: optional(ENV_ROLE),
            warehouse: optional(ENV_WAREHOUSE),
        })
    }

    /// Apply role/warehouse overrides from the config file
    pub fn with_overrides(mut self, config: &Config) -> Self {
        if let Some(role) = &config.role {
            self.role = Some(role.clone());
        }
        if let Some(warehouse) = &config.warehouse {
            self.warehouse = Some(warehouse.clone());
        }
        self
    }

    /// Account identifier in `<organization>-<account>` form
    pub fn account_identifier(&self) -> String {
        format!("{}-{}", self.organization, self.account)
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("organization", &self.organization)
            .field("account", &self.account)
            .field("user", &self.user)
            .field("role", &self.role)
            .field("warehouse", &self.warehouse)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Missing required environment variable {0}")]
    MissingEnv(&'static str),
}

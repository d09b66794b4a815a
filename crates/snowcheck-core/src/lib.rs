//! Snowcheck Core
//!
//! Domain model shared by the verification crates: the property records read
//! back from the warehouse, the provisioning configuration they are checked
//! against, diagnostics and the versioned report.
//! Never rename diagnostic codes - they are part of the public API.

pub mod config;
pub mod diagnostic;
pub mod properties;
pub mod provisioning;
pub mod report;

pub use config::{Config, ConfigError, ConnectionSettings, VerifySettings, DEFAULT_SETTLE_DELAY_SECS};
pub use diagnostic::{Diagnostic, DiagnosticCode, ObjectRef, Severity};
pub use properties::{names_match, DatabaseProperties, GrantRecord, SchemaProperties, WarehouseProperties};
pub use provisioning::{DatabaseConfig, ProvisioningConfig, SchemaConfig, DEFAULT_RETENTION_DAYS};
pub use report::{Report, ReportVersion};

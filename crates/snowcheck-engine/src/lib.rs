//! Snowcheck engine - assertion layer
//!
//! This crate compares provisioning configuration against what the
//! introspection layer reads back from the warehouse:
//! - Database, schema and warehouse property checks
//! - Privilege expectations for a principal
//! - Scenario runner with a one-off settle delay

pub mod scenario;
pub mod verifier;

pub use scenario::Scenario;
pub use verifier::{DatabaseVerification, WarehouseExpectation};

//! Test fixtures for scenario integration tests
//!
//! A provisioning configuration in the shape the infrastructure variables
//! file uses, and a mock warehouse state that matches it.

#![allow(dead_code)]

use snowcheck_catalog::{GrantTarget, MockConnectionBuilder};
use snowcheck_core::{DatabaseProperties, GrantRecord, SchemaProperties, WarehouseProperties};

/// Variables document with two databases, one of them transient
pub const VARIABLES_JSON: &str = r#"{
    "environment": "test",
    "database_configs": {
        "analytics": {
            "name": "TT_DB_X",
            "comment": "c",
            "schemas": [
                {"name": "TT_SCHEMA_X", "comment": "managed", "is_managed": true},
                {"name": "TT_SCHEMA_Y", "comment": "plain"}
            ]
        },
        "scratch": {
            "name": "TT_DB_SCRATCH",
            "comment": "scratch",
            "data_retention_time_in_days": 0,
            "is_transient": true,
            "schemas": [
                {"name": "TT_SCRATCH_SCHEMA", "comment": "tmp"}
            ]
        }
    }
}"#;

pub fn database(name: &str, comment: &str, retention: u32, is_transient: bool) -> DatabaseProperties {
    DatabaseProperties {
        name: name.to_string(),
        comment: comment.to_string(),
        data_retention_time_in_days: retention,
        is_transient,
    }
}

pub fn schema(database: &str, name: &str, comment: &str, managed: bool, transient: bool) -> SchemaProperties {
    SchemaProperties {
        name: name.to_string(),
        database_name: database.to_string(),
        comment: comment.to_string(),
        is_transient: transient,
        is_managed_access: managed,
        data_retention_time_in_days: 1,
    }
}

pub fn grant(privilege: &str, grantee: &str) -> GrantRecord {
    GrantRecord {
        privilege: privilege.to_string(),
        granted_on: "DATABASE".to_string(),
        name: "TT_DB_X".to_string(),
        granted_to: "ROLE".to_string(),
        grantee: grantee.to_string(),
    }
}

pub fn warehouse() -> WarehouseProperties {
    WarehouseProperties {
        name: "TT_WH_X".to_string(),
        size: "X-Small".to_string(),
        comment: "ci warehouse".to_string(),
    }
}

/// Warehouse state exactly as [`VARIABLES_JSON`] describes it
pub fn provisioned_state() -> MockConnectionBuilder {
    MockConnectionBuilder::new()
        .with_database(database("TT_DB_X", "c", 1, false))
        .with_schema(schema("TT_DB_X", "TT_SCHEMA_X", "managed", true, false))
        .with_schema(schema("TT_DB_X", "TT_SCHEMA_Y", "plain", false, false))
        .with_database(database("TT_DB_SCRATCH", "scratch", 0, true))
        .with_schema(schema("TT_DB_SCRATCH", "TT_SCRATCH_SCHEMA", "tmp", false, true))
        .with_warehouse(warehouse())
        .with_grant(&GrantTarget::database("TT_DB_X"), grant("USAGE", "TEST_ROLE"))
        .with_grant(&GrantTarget::database("TT_DB_X"), grant("OWNERSHIP", "SYSADMIN"))
}

//! Test fixtures for introspection integration tests
//!
//! Property records matching what a provisioning run typically creates, and
//! raw result sets in the alternative layouts different warehouse versions
//! produce.

#![allow(dead_code)]

use snowcheck_catalog::{RowSet, WireValue};
use snowcheck_core::{DatabaseProperties, GrantRecord, SchemaProperties, WarehouseProperties};

/// The database from the `{name: "TT_DB_X", comment: "c"}` scenario
pub fn scenario_database() -> DatabaseProperties {
    DatabaseProperties {
        name: "TT_DB_X".to_string(),
        comment: "c".to_string(),
        data_retention_time_in_days: 1,
        is_transient: false,
    }
}

/// Managed-access schema nested in [`scenario_database`]
pub fn scenario_schema() -> SchemaProperties {
    SchemaProperties {
        name: "TT_SCHEMA_X".to_string(),
        database_name: "TT_DB_X".to_string(),
        comment: "c".to_string(),
        is_transient: false,
        is_managed_access: true,
        data_retention_time_in_days: 1,
    }
}

/// Transient database with a non-default retention
pub fn transient_database() -> DatabaseProperties {
    DatabaseProperties {
        name: "TT_DB_TRANSIENT".to_string(),
        comment: "scratch space".to_string(),
        data_retention_time_in_days: 0,
        is_transient: true,
    }
}

pub fn small_warehouse() -> WarehouseProperties {
    WarehouseProperties {
        name: "TT_WH_X".to_string(),
        size: "X-Small".to_string(),
        comment: "test warehouse".to_string(),
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

/// `SHOW SCHEMAS` as exposed by versions with a dedicated managed-access column
pub fn schema_rows_with_flag_column(managed: WireValue) -> RowSet {
    RowSet::new(["name", "database_name", "comment", "is_managed_access", "retention_time"])
        .with_row(vec![
            "TT_SCHEMA_X".into(),
            "TT_DB_X".into(),
            "c".into(),
            managed,
            "1".into(),
        ])
}

/// `SHOW SCHEMAS` as exposed by versions that fold flags into `options`
pub fn schema_rows_with_options(options: &str) -> RowSet {
    RowSet::new(["created_on", "name", "database_name", "comment", "options", "retention_time"])
        .with_row(vec![
            WireValue::Null,
            "TT_SCHEMA_X".into(),
            "TT_DB_X".into(),
            "c".into(),
            options.into(),
            WireValue::Int(1),
        ])
}

//! Typed property records read back from the warehouse
//!
//! All records are plain values: rebuilt on every verification call and
//! compared by field equality.

use serde::{Deserialize, Serialize};

/// Properties of a database as reported by `SHOW DATABASES`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseProperties {
    pub name: String,
    pub comment: String,
    pub data_retention_time_in_days: u32,
    pub is_transient: bool,
}

/// Properties of a schema as reported by `SHOW SCHEMAS ... IN DATABASE`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaProperties {
    pub name: String,
    /// Owning database; expected to equal the database the schema was looked up in
    pub database_name: String,
    pub comment: String,
    pub is_transient: bool,
    pub is_managed_access: bool,
    pub data_retention_time_in_days: u32,
}

/// Properties of a virtual warehouse as reported by `SHOW WAREHOUSES`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseProperties {
    pub name: String,
    /// Size class as reported, e.g. "X-Small"
    pub size: String,
    pub comment: String,
}

/// One row of `SHOW GRANTS ON ...`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRecord {
    /// Privilege token, e.g. "USAGE"
    pub privilege: String,

    /// Kind of object the grant is on, e.g. "DATABASE"
    pub granted_on: String,

    /// Object name
    pub name: String,

    /// Kind of principal, e.g. "ROLE"
    pub granted_to: String,

    /// Principal name
    pub grantee: String,
}

impl GrantRecord {
    /// Case-insensitive grantee comparison
    pub fn is_granted_to(&self, principal: &str) -> bool {
        names_match(&self.grantee, principal)
    }
}

/// Case-insensitive identifier comparison
///
/// Quoted identifiers may carry any Unicode text, so this folds full Unicode
/// case rather than ASCII only.
pub fn names_match(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grantee_match_ignores_case() {
        let grant = GrantRecord {
            privilege: "USAGE".to_string(),
            granted_on: "DATABASE".to_string(),
            name: "TT_DB_X".to_string(),
            granted_to: "ROLE".to_string(),
            grantee: "Analyst".to_string(),
        };

        assert!(grant.is_granted_to("ANALYST"));
        assert!(grant.is_granted_to("analyst"));
        assert!(!grant.is_granted_to("ANALYSTS"));
    }

    #[test]
    fn names_match_folds_unicode_case() {
        assert!(names_match("ÉQUIPE_DATA", "équipe_data"));
        assert!(!names_match("ÉQUIPE", "EQUIPE"));
    }

    #[test]
    fn defaults_are_empty() {
        let props = SchemaProperties::default();
        assert!(props.name.is_empty());
        assert!(!props.is_managed_access);
        assert_eq!(props.data_retention_time_in_days, 0);
    }
}

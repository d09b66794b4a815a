//! Grant retrieval and filtering

use crate::columns::ColumnIndexMap;
use crate::connection::{IntrospectionConnection, RowSet};
use crate::decode::{FromIntrospectionRow, RowDecoder};
use crate::error::VerifyError;
use snowcheck_core::{names_match, GrantRecord};
use std::fmt;

/// Object whose grants are listed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GrantTarget {
    Database(String),
    Schema { database: String, schema: String },
}

impl GrantTarget {
    pub fn database(database: impl Into<String>) -> Self {
        Self::Database(database.into())
    }

    pub fn schema(database: impl Into<String>, schema: impl Into<String>) -> Self {
        Self::Schema {
            database: database.into(),
            schema: schema.into(),
        }
    }

    /// `SHOW GRANTS ON DATABASE <db>` / `SHOW GRANTS ON SCHEMA <db>.<schema>`
    pub fn to_sql(&self) -> String {
        match self {
            Self::Database(database) => format!("SHOW GRANTS ON DATABASE {}", database),
            Self::Schema { database, schema } => {
                format!("SHOW GRANTS ON SCHEMA {}.{}", database, schema)
            }
        }
    }
}

impl fmt::Display for GrantTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(database) => write!(f, "database {}", database),
            Self::Schema { database, schema } => write!(f, "schema {}.{}", database, schema),
        }
    }
}

/// All grants on `target`, unfiltered
pub async fn fetch_all_grants<C>(conn: &C, target: &GrantTarget) -> Result<Vec<GrantRecord>, VerifyError>
where
    C: IntrospectionConnection + ?Sized,
{
    let sql = target.to_sql();
    tracing::debug!(%sql, "grant listing");

    let rows = conn.query(&sql).await?;
    decode_grants(&rows)
}

/// Grants on `target` issued to `principal` (case-insensitive); an empty
/// list is a valid answer
pub async fn fetch_grants<C>(
    conn: &C,
    target: &GrantTarget,
    principal: &str,
) -> Result<Vec<GrantRecord>, VerifyError>
where
    C: IntrospectionConnection + ?Sized,
{
    let grants = fetch_all_grants(conn, target).await?;
    Ok(filter_grants(grants, principal))
}

/// Decode every row of a grant listing
///
/// Unresolved columns decode as empty strings instead of failing.
pub fn decode_grants(rows: &RowSet) -> Result<Vec<GrantRecord>, VerifyError> {
    let columns = ColumnIndexMap::resolve(&rows.columns, GrantRecord::COLUMNS)?;

    let missing = columns.unresolved(GrantRecord::COLUMNS);
    if !missing.is_empty() {
        tracing::warn!(
            missing = ?missing,
            available = ?rows.columns,
            "grant listing lacks expected columns; affected fields stay empty"
        );
    }

    rows.rows
        .iter()
        .map(|row| GrantRecord::decode(&RowDecoder::new(row, &columns)))
        .collect()
}

/// Keep the grants issued to `principal`, preserving order
pub fn filter_grants(grants: Vec<GrantRecord>, principal: &str) -> Vec<GrantRecord> {
    grants
        .into_iter()
        .filter(|grant| grant.is_granted_to(principal))
        .collect()
}

/// Whether `privilege` appears in `grants` (case-insensitive)
pub fn has_privilege(grants: &[GrantRecord], privilege: &str) -> bool {
    grants
        .iter()
        .any(|grant| names_match(&grant.privilege, privilege))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grant(privilege: &str, grantee: &str) -> GrantRecord {
        GrantRecord {
            privilege: privilege.to_string(),
            granted_on: "DATABASE".to_string(),
            name: "TT_DB_X".to_string(),
            granted_to: "ROLE".to_string(),
            grantee: grantee.to_string(),
        }
    }

    #[test]
    fn grant_queries() {
        assert_eq!(
            GrantTarget::database("TT_DB_X").to_sql(),
            "SHOW GRANTS ON DATABASE TT_DB_X"
        );
        assert_eq!(
            GrantTarget::schema("TT_DB_X", "TT_SCHEMA_X").to_sql(),
            "SHOW GRANTS ON SCHEMA TT_DB_X.TT_SCHEMA_X"
        );
    }

    #[test]
    fn filter_keeps_matching_grantees_in_order() {
        let grants = vec![
            grant("OWNERSHIP", "SYSADMIN"),
            grant("USAGE", "analyst"),
            grant("USAGE", "PUBLIC"),
            grant("MONITOR", "Analyst"),
            grant("USAGE", "ÉQUIPE_DATA"),
        ];

        let filtered = filter_grants(grants.clone(), "ANALYST");
        assert_eq!(filtered, vec![grant("USAGE", "analyst"), grant("MONITOR", "Analyst")]);

        let filtered = filter_grants(grants, "équipe_data");
        assert_eq!(filtered, vec![grant("USAGE", "ÉQUIPE_DATA")]);
    }

    #[test]
    fn filter_can_be_empty() {
        let filtered = filter_grants(vec![grant("USAGE", "PUBLIC")], "ANALYST");
        assert!(filtered.is_empty());
    }

    #[test]
    fn privilege_membership_ignores_case() {
        let grants = vec![grant("USAGE", "ANALYST")];
        assert!(has_privilege(&grants, "usage"));
        assert!(has_privilege(&grants, "USAGE"));
        assert!(!has_privilege(&grants, "OWNERSHIP"));
        assert!(!has_privilege(&[], "USAGE"));

        let quoted = vec![grant("RÉVISION", "ANALYST")];
        assert!(has_privilege(&quoted, "révision"));
    }

    #[test]
    fn decode_listing() {
        let rows = RowSet::new([
            "created_on", "privilege", "granted_on", "name", "granted_to", "grantee_name",
        ])
        .with_row(vec![
            "2024-01-01".into(),
            "USAGE".into(),
            "DATABASE".into(),
            "TT_DB_X".into(),
            "ROLE".into(),
            "ANALYST".into(),
        ]);

        let grants = decode_grants(&rows).unwrap();
        assert_eq!(grants, vec![grant("USAGE", "ANALYST")]);
    }
}

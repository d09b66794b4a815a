//! Diagnostic codes and verification findings
//!
//! IMPORTANT: Diagnostic codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Existence (1xxx)
    /// A configured database was not found in the warehouse
    DatabaseMissing,

    /// A configured schema was not found in its database
    SchemaMissing,

    /// A warehouse was not found
    WarehouseMissing,

    // Property fidelity (2xxx)
    /// Reported name differs from the configured name
    NameMismatch,

    /// Reported comment does not contain the configured comment
    CommentMismatch,

    /// Transient flag differs from configuration
    TransientMismatch,

    /// Managed-access flag differs from configuration
    ManagedAccessMismatch,

    /// Data retention differs from configuration
    RetentionMismatch,

    /// Schema reports a different owning database than the one queried
    SchemaContainerMismatch,

    /// Warehouse size class differs from the expected one
    WarehouseSizeMismatch,

    // Access control (3xxx)
    /// An expected privilege is not granted to the principal
    PrivilegeMissing,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DatabaseMissing => "DATABASE_MISSING",
            Self::SchemaMissing => "SCHEMA_MISSING",
            Self::WarehouseMissing => "WAREHOUSE_MISSING",
            Self::NameMismatch => "NAME_MISMATCH",
            Self::CommentMismatch => "COMMENT_MISMATCH",
            Self::TransientMismatch => "TRANSIENT_MISMATCH",
            Self::ManagedAccessMismatch => "MANAGED_ACCESS_MISMATCH",
            Self::RetentionMismatch => "RETENTION_MISMATCH",
            Self::SchemaContainerMismatch => "SCHEMA_CONTAINER_MISMATCH",
            Self::WarehouseSizeMismatch => "WAREHOUSE_SIZE_MISMATCH",
            Self::PrivilegeMissing => "PRIVILEGE_MISSING",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - should be reviewed but not blocking
    Warn,

    /// Error - the provisioned state does not match the configuration
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// The warehouse object a diagnostic is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Object kind ("database", "schema", "warehouse")
    pub kind: String,

    /// Object name
    pub name: String,

    /// Containing database, for schemas
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
}

impl ObjectRef {
    pub fn database(name: impl Into<String>) -> Self {
        Self {
            kind: "database".to_string(),
            name: name.into(),
            container: None,
        }
    }

    pub fn schema(database: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: "schema".to_string(),
            name: name.into(),
            container: Some(database.into()),
        }
    }

    pub fn warehouse(name: impl Into<String>) -> Self {
        Self {
            kind: "warehouse".to_string(),
            name: name.into(),
            container: None,
        }
    }

    /// Fully qualified name (`DB.SCHEMA` for schemas)
    pub fn fqn(&self) -> String {
        match &self.container {
            Some(container) => format!("{}.{}", container, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.fqn())
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Object the finding is about
    pub object: Option<ObjectRef>,

    /// Expected value (for comparison diagnostics)
    pub expected: Option<String>,

    /// Actual value (for comparison diagnostics)
    pub actual: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with minimal fields
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            object: None,
            expected: None,
            actual: None,
        }
    }

    /// Set the object
    pub fn with_object(mut self, object: ObjectRef) -> Self {
        self.object = Some(object);
        self
    }

    /// Set expected/actual values
    pub fn with_comparison(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_code_stability() {
        // Ensure codes are stable strings
        assert_eq!(DiagnosticCode::DatabaseMissing.as_str(), "DATABASE_MISSING");
        assert_eq!(DiagnosticCode::ManagedAccessMismatch.as_str(), "MANAGED_ACCESS_MISMATCH");
    }

    #[test]
    fn diagnostic_serialization() {
        let diag = Diagnostic::new(
            DiagnosticCode::SchemaMissing,
            Severity::Error,
            "Schema 'TT_SCHEMA_X' not found",
        )
        .with_object(ObjectRef::schema("TT_DB_X", "TT_SCHEMA_X"));

        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("SCHEMA_MISSING"));
        assert!(json.contains("error"));
        assert!(json.contains("TT_DB_X"));
    }

    #[test]
    fn object_ref_fqn() {
        assert_eq!(ObjectRef::database("DB").fqn(), "DB");
        assert_eq!(ObjectRef::schema("DB", "S").fqn(), "DB.S");
        assert_eq!(ObjectRef::schema("DB", "S").to_string(), "schema DB.S");
    }
}

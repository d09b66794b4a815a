//! Verification of provisioned objects against their configuration
//!
//! Comparison is split from fetching: the `compare_*` functions are pure and
//! turn an expected/actual pair into diagnostics, while the `verify_*`
//! functions drive the introspection queries. Not-found outcomes become
//! diagnostics; schema-contract, decode and query failures are returned as
//! errors and abort the scenario.

use snowcheck_catalog::fetch::{
    fetch_database_properties, fetch_schema_properties, fetch_warehouse_properties,
};
use snowcheck_catalog::{fetch_grants, has_privilege, GrantTarget, IntrospectionConnection, VerifyError};
use snowcheck_core::{
    DatabaseConfig, DatabaseProperties, Diagnostic, DiagnosticCode, GrantRecord, ObjectRef,
    SchemaConfig, SchemaProperties, Severity, VerifySettings, WarehouseProperties,
};
use std::fmt::Display;

/// Outcome of verifying one configured database and its schemas
#[derive(Debug, Clone)]
pub struct DatabaseVerification {
    /// The configured database name
    pub database: String,

    /// Diagnostics produced by the comparison
    pub diagnostics: Vec<Diagnostic>,

    /// Databases and schemas inspected (schemas of a missing database are not)
    pub objects_checked: usize,
}

impl DatabaseVerification {
    fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            diagnostics: Vec::new(),
            objects_checked: 0,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }
}

/// What a warehouse is expected to look like
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseExpectation {
    pub name: String,

    /// Size class such as `X-Small`; compared case-insensitively
    pub size: Option<String>,

    /// Text the warehouse comment must contain
    pub comment: Option<String>,
}

impl WarehouseExpectation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
            comment: None,
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

fn mismatch(
    code: DiagnosticCode,
    object: &ObjectRef,
    property: &str,
    expected: impl Display,
    actual: impl Display,
) -> Diagnostic {
    let expected = expected.to_string();
    let actual = actual.to_string();

    Diagnostic::new(
        code,
        Severity::Error,
        format!("{} {}: expected {}, got {}", object, property, expected, actual),
    )
    .with_object(object.clone())
    .with_comparison(expected, actual)
}

fn missing(code: DiagnosticCode, object: &ObjectRef) -> Diagnostic {
    Diagnostic::new(code, Severity::Error, format!("{} does not exist", object))
        .with_object(object.clone())
}

fn check_comment(diagnostics: &mut Vec<Diagnostic>, object: &ObjectRef, expected: &str, actual: &str) {
    if !actual.contains(expected) {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::CommentMismatch,
                Severity::Error,
                format!("{} comment does not contain '{}' (got '{}')", object, expected, actual),
            )
            .with_object(object.clone())
            .with_comparison(expected, actual),
        );
    }
}

/// Compare a database's properties against its configuration
pub fn compare_database(expected: &DatabaseConfig, actual: &DatabaseProperties) -> Vec<Diagnostic> {
    let object = ObjectRef::database(&expected.name);
    let mut diagnostics = Vec::new();

    if actual.name != expected.name {
        diagnostics.push(mismatch(DiagnosticCode::NameMismatch, &object, "name", &expected.name, &actual.name));
    }

    check_comment(&mut diagnostics, &object, &expected.comment, &actual.comment);

    if actual.is_transient != expected.expected_transient() {
        diagnostics.push(mismatch(
            DiagnosticCode::TransientMismatch,
            &object,
            "is_transient",
            expected.expected_transient(),
            actual.is_transient,
        ));
    }

    if actual.data_retention_time_in_days != expected.expected_retention() {
        diagnostics.push(mismatch(
            DiagnosticCode::RetentionMismatch,
            &object,
            "data_retention_time_in_days",
            expected.expected_retention(),
            actual.data_retention_time_in_days,
        ));
    }

    diagnostics
}

/// Compare a schema's properties against its configuration inside `database`
pub fn compare_schema(
    database: &DatabaseConfig,
    expected: &SchemaConfig,
    actual: &SchemaProperties,
) -> Vec<Diagnostic> {
    let object = ObjectRef::schema(&database.name, &expected.name);
    let mut diagnostics = Vec::new();

    if actual.name != expected.name {
        diagnostics.push(mismatch(DiagnosticCode::NameMismatch, &object, "name", &expected.name, &actual.name));
    }

    if actual.database_name != database.name {
        diagnostics.push(mismatch(
            DiagnosticCode::SchemaContainerMismatch,
            &object,
            "database_name",
            &database.name,
            &actual.database_name,
        ));
    }

    check_comment(&mut diagnostics, &object, &expected.comment, &actual.comment);

    if actual.is_managed_access != expected.expected_managed_access() {
        diagnostics.push(mismatch(
            DiagnosticCode::ManagedAccessMismatch,
            &object,
            "is_managed_access",
            expected.expected_managed_access(),
            actual.is_managed_access,
        ));
    }

    let transient = expected.expected_transient(database);
    if actual.is_transient != transient {
        diagnostics.push(mismatch(
            DiagnosticCode::TransientMismatch,
            &object,
            "is_transient",
            transient,
            actual.is_transient,
        ));
    }

    diagnostics
}

/// Compare a warehouse's properties against an expectation
pub fn compare_warehouse(expected: &WarehouseExpectation, actual: &WarehouseProperties) -> Vec<Diagnostic> {
    let object = ObjectRef::warehouse(&expected.name);
    let mut diagnostics = Vec::new();

    if actual.name != expected.name {
        diagnostics.push(mismatch(DiagnosticCode::NameMismatch, &object, "name", &expected.name, &actual.name));
    }

    if let Some(size) = &expected.size {
        if !actual.size.eq_ignore_ascii_case(size) {
            diagnostics.push(mismatch(DiagnosticCode::WarehouseSizeMismatch, &object, "size", size, &actual.size));
        }
    }

    if let Some(comment) = &expected.comment {
        check_comment(&mut diagnostics, &object, comment, &actual.comment);
    }

    diagnostics
}

/// Diagnostics for every `required` privilege missing from `grants`
pub fn compare_privileges(
    object: &ObjectRef,
    principal: &str,
    required: &[String],
    grants: &[GrantRecord],
) -> Vec<Diagnostic> {
    required
        .iter()
        .filter(|privilege| !has_privilege(grants, privilege))
        .map(|privilege| {
            Diagnostic::new(
                DiagnosticCode::PrivilegeMissing,
                Severity::Error,
                format!("{} does not grant {} to {}", object, privilege, principal),
            )
            .with_object(object.clone())
            .with_comparison(privilege.as_str(), "not granted")
        })
        .collect()
}

async fn check_grants<C>(
    conn: &C,
    target: GrantTarget,
    object: &ObjectRef,
    settings: &VerifySettings,
    required: &[String],
) -> Result<Vec<Diagnostic>, VerifyError>
where
    C: IntrospectionConnection + ?Sized,
{
    let Some(principal) = settings.principal.as_deref() else {
        return Ok(Vec::new());
    };
    if required.is_empty() {
        return Ok(Vec::new());
    }

    let grants = fetch_grants(conn, &target, principal).await?;
    Ok(compare_privileges(object, principal, required, &grants))
}

/// Verify one configured database and each of its schemas
pub async fn verify_database<C>(
    conn: &C,
    config: &DatabaseConfig,
    settings: &VerifySettings,
) -> Result<DatabaseVerification, VerifyError>
where
    C: IntrospectionConnection + ?Sized,
{
    let mut verification = DatabaseVerification::new(&config.name);
    let object = ObjectRef::database(&config.name);
    verification.objects_checked += 1;

    let actual = match fetch_database_properties(conn, &config.name).await {
        Ok(actual) => actual,
        Err(e) if e.is_not_found() => {
            tracing::info!(database = %config.name, "database missing; skipping its schemas");
            verification.diagnostics.push(missing(DiagnosticCode::DatabaseMissing, &object));
            return Ok(verification);
        }
        Err(e) => return Err(e),
    };

    verification.diagnostics.extend(compare_database(config, &actual));
    verification.diagnostics.extend(
        check_grants(
            conn,
            GrantTarget::database(&config.name),
            &object,
            settings,
            &settings.database_privileges,
        )
        .await?,
    );
    tracing::info!(database = %config.name, "verified database");

    for schema in &config.schemas {
        verification.objects_checked += 1;
        let schema_object = ObjectRef::schema(&config.name, &schema.name);

        match fetch_schema_properties(conn, &config.name, &schema.name).await {
            Ok(actual) => {
                verification.diagnostics.extend(compare_schema(config, schema, &actual));
                verification.diagnostics.extend(
                    check_grants(
                        conn,
                        GrantTarget::schema(&config.name, &schema.name),
                        &schema_object,
                        settings,
                        &settings.schema_privileges,
                    )
                    .await?,
                );
                tracing::info!(schema = %schema_object.fqn(), "verified schema");
            }
            Err(e) if e.is_not_found() => {
                verification.diagnostics.push(missing(DiagnosticCode::SchemaMissing, &schema_object));
            }
            Err(e) => return Err(e),
        }
    }

    Ok(verification)
}

/// Verify one warehouse
pub async fn verify_warehouse<C>(conn: &C, expected: &WarehouseExpectation) -> Result<Vec<Diagnostic>, VerifyError>
where
    C: IntrospectionConnection + ?Sized,
{
    match fetch_warehouse_properties(conn, &expected.name).await {
        Ok(actual) => {
            tracing::info!(warehouse = %expected.name, "verified warehouse");
            Ok(compare_warehouse(expected, &actual))
        }
        Err(e) if e.is_not_found() => Ok(vec![missing(
            DiagnosticCode::WarehouseMissing,
            &ObjectRef::warehouse(&expected.name),
        )]),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use snowcheck_core::{SchemaConfig, DEFAULT_RETENTION_DAYS};

    fn database_config() -> DatabaseConfig {
        DatabaseConfig::new("TT_DB_X", "c")
            .with_schema(SchemaConfig::new("TT_SCHEMA_X", "s").with_managed(true))
    }

    fn database_props() -> DatabaseProperties {
        DatabaseProperties {
            name: "TT_DB_X".to_string(),
            comment: "created by test: c".to_string(),
            data_retention_time_in_days: DEFAULT_RETENTION_DAYS,
            is_transient: false,
        }
    }

    fn schema_props() -> SchemaProperties {
        SchemaProperties {
            name: "TT_SCHEMA_X".to_string(),
            database_name: "TT_DB_X".to_string(),
            comment: "s".to_string(),
            is_transient: false,
            is_managed_access: true,
            data_retention_time_in_days: 1,
        }
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<DiagnosticCode> {
        diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_matching_database() {
        assert!(compare_database(&database_config(), &database_props()).is_empty());
    }

    #[test]
    fn test_retention_defaults_to_one_day() {
        let actual = DatabaseProperties {
            data_retention_time_in_days: 7,
            ..database_props()
        };

        let diagnostics = compare_database(&database_config(), &actual);
        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::RetentionMismatch]);
        assert_eq!(diagnostics[0].expected.as_deref(), Some("1"));
        assert_eq!(diagnostics[0].actual.as_deref(), Some("7"));

        let configured = database_config().with_retention(7);
        assert!(compare_database(&configured, &actual).is_empty());
    }

    #[test]
    fn test_comment_containment() {
        let actual = DatabaseProperties {
            comment: "something else".to_string(),
            ..database_props()
        };

        let diagnostics = compare_database(&database_config(), &actual);
        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::CommentMismatch]);
    }

    #[test]
    fn test_transient_mismatch() {
        let config = database_config().with_transient(true);
        let diagnostics = compare_database(&config, &database_props());

        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::TransientMismatch]);
        assert_eq!(diagnostics[0].expected.as_deref(), Some("true"));
        assert_eq!(diagnostics[0].actual.as_deref(), Some("false"));
    }

    #[test]
    fn test_schema_checks() {
        let config = database_config();
        let expected = &config.schemas[0];

        assert!(compare_schema(&config, expected, &schema_props()).is_empty());

        let unmanaged = SchemaProperties {
            is_managed_access: false,
            ..schema_props()
        };
        assert_eq!(
            codes(&compare_schema(&config, expected, &unmanaged)),
            vec![DiagnosticCode::ManagedAccessMismatch]
        );

        let moved = SchemaProperties {
            database_name: "OTHER_DB".to_string(),
            ..schema_props()
        };
        assert_eq!(
            codes(&compare_schema(&config, expected, &moved)),
            vec![DiagnosticCode::SchemaContainerMismatch]
        );
    }

    #[test]
    fn test_schema_inherits_transient_database() {
        let config = database_config().with_transient(true);
        let expected = &config.schemas[0];

        let diagnostics = compare_schema(&config, expected, &schema_props());
        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::TransientMismatch]);

        let transient = SchemaProperties {
            is_transient: true,
            ..schema_props()
        };
        assert!(compare_schema(&config, expected, &transient).is_empty());
    }

    #[test]
    fn test_warehouse_size_is_case_insensitive() {
        let actual = WarehouseProperties {
            name: "TT_WH_X".to_string(),
            size: "X-Small".to_string(),
            comment: "ci warehouse".to_string(),
        };

        let expected = WarehouseExpectation::new("TT_WH_X").with_size("x-small").with_comment("ci");
        assert!(compare_warehouse(&expected, &actual).is_empty());

        let larger = WarehouseExpectation::new("TT_WH_X").with_size("LARGE");
        assert_eq!(
            codes(&compare_warehouse(&larger, &actual)),
            vec![DiagnosticCode::WarehouseSizeMismatch]
        );
    }

    #[test]
    fn test_missing_privileges() {
        let object = ObjectRef::database("TT_DB_X");
        let grants = vec![GrantRecord {
            privilege: "USAGE".to_string(),
            grantee: "TEST_ROLE".to_string(),
            ..Default::default()
        }];
        let required = vec!["usage".to_string(), "MONITOR".to_string()];

        let diagnostics = compare_privileges(&object, "TEST_ROLE", &required, &grants);
        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::PrivilegeMissing]);
        assert!(diagnostics[0].message.contains("MONITOR"));
    }
}

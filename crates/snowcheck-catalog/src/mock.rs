//! Mock connection for testing
//!
//! Answers introspection statements from canned result sets without touching
//! a warehouse. Objects registered through the typed helpers are laid out the
//! way Snowflake lays out its `SHOW` output (text cells, flags folded into
//! the `options` column), so decoding runs against realistic rows.
//! Statements with no canned answer return an empty result carrying the
//! column layout for their kind, which is what the warehouse does when
//! nothing matches.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let conn = MockConnection::new();
//! conn.add_database(&DatabaseProperties { name: "TT_DB_X".into(), ..Default::default() }).await;
//! assert!(fetch::database_exists(&conn, "TT_DB_X").await?);
//! assert!(!fetch::database_exists(&conn, "NEVER_CREATED").await?);
//! ```

use crate::connection::{IntrospectionConnection, RowSet};
use crate::error::VerifyError;
use crate::grants::GrantTarget;
use crate::query::ObjectLookup;
use crate::wire::WireValue;
use snowcheck_core::{DatabaseProperties, GrantRecord, SchemaProperties, WarehouseProperties};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const CREATED_ON: &str = "2024-01-01 00:00:00.000 -0800";

/// `SHOW DATABASES` column layout
pub const DATABASE_LAYOUT: &[&str] = &[
    "created_on", "name", "is_default", "is_current", "origin", "owner", "comment",
    "options", "retention_time", "kind", "owner_role_type",
];

/// `SHOW SCHEMAS` column layout
pub const SCHEMA_LAYOUT: &[&str] = &[
    "created_on", "name", "is_default", "is_current", "database_name", "owner", "comment",
    "options", "retention_time", "owner_role_type",
];

/// `SHOW WAREHOUSES` column layout (abridged)
pub const WAREHOUSE_LAYOUT: &[&str] = &[
    "name", "state", "type", "size", "min_cluster_count", "max_cluster_count", "running",
    "queued", "is_default", "is_current", "auto_suspend", "auto_resume", "comment", "owner",
];

/// `SHOW GRANTS ON ...` column layout
pub const GRANT_LAYOUT: &[&str] = &[
    "created_on", "privilege", "granted_on", "name", "granted_to", "grantee_name",
    "grant_option", "granted_by",
];

/// Column layout for the kind of statement `sql` is
pub fn layout_for(sql: &str) -> &'static [&'static str] {
    let upper = sql.trim_start().to_ascii_uppercase();
    if upper.starts_with("SHOW DATABASES") {
        DATABASE_LAYOUT
    } else if upper.starts_with("SHOW SCHEMAS") {
        SCHEMA_LAYOUT
    } else if upper.starts_with("SHOW WAREHOUSES") {
        WAREHOUSE_LAYOUT
    } else if upper.starts_with("SHOW GRANTS") {
        GRANT_LAYOUT
    } else {
        &[]
    }
}

fn options(flags: &[(bool, &str)]) -> String {
    flags
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, marker)| *marker)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Canned `SHOW DATABASES` row for `props`
pub fn database_row(props: &DatabaseProperties) -> (String, Vec<WireValue>) {
    let sql = ObjectLookup::database(&props.name).to_sql();
    let row = vec![
        CREATED_ON.into(),
        props.name.as_str().into(),
        "N".into(),
        "N".into(),
        "".into(),
        "SYSADMIN".into(),
        props.comment.as_str().into(),
        options(&[(props.is_transient, "TRANSIENT")]).into(),
        props.data_retention_time_in_days.to_string().into(),
        (if props.is_transient { "TRANSIENT" } else { "STANDARD" }).into(),
        "ROLE".into(),
    ];
    (sql, row)
}

/// Canned `SHOW SCHEMAS` row for `props`
pub fn schema_row(props: &SchemaProperties) -> (String, Vec<WireValue>) {
    let sql = ObjectLookup::schema(&props.database_name, &props.name).to_sql();
    let row = vec![
        CREATED_ON.into(),
        props.name.as_str().into(),
        "N".into(),
        "N".into(),
        props.database_name.as_str().into(),
        "SYSADMIN".into(),
        props.comment.as_str().into(),
        options(&[
            (props.is_transient, "TRANSIENT"),
            (props.is_managed_access, "MANAGED ACCESS"),
        ])
        .into(),
        props.data_retention_time_in_days.to_string().into(),
        "ROLE".into(),
    ];
    (sql, row)
}

/// Canned `SHOW WAREHOUSES` row for `props`
pub fn warehouse_row(props: &WarehouseProperties) -> (String, Vec<WireValue>) {
    let sql = ObjectLookup::warehouse(&props.name).to_sql();
    let row = vec![
        props.name.as_str().into(),
        "SUSPENDED".into(),
        "STANDARD".into(),
        props.size.as_str().into(),
        WireValue::Int(1),
        WireValue::Int(1),
        WireValue::Int(0),
        WireValue::Int(0),
        "N".into(),
        "N".into(),
        WireValue::Int(600),
        "true".into(),
        props.comment.as_str().into(),
        "SYSADMIN".into(),
    ];
    (sql, row)
}

/// Canned `SHOW GRANTS` row for `grant`
pub fn grant_row(target: &GrantTarget, grant: &GrantRecord) -> (String, Vec<WireValue>) {
    let row = vec![
        CREATED_ON.into(),
        grant.privilege.as_str().into(),
        grant.granted_on.as_str().into(),
        grant.name.as_str().into(),
        grant.granted_to.as_str().into(),
        grant.grantee.as_str().into(),
        "false".into(),
        "SYSADMIN".into(),
    ];
    (target.to_sql(), row)
}

fn append_row(responses: &mut HashMap<String, RowSet>, sql: String, row: Vec<WireValue>) {
    responses
        .entry(sql.clone())
        .or_insert_with(|| RowSet::new(layout_for(&sql).iter().copied()))
        .push_row(row);
}

/// Mock introspection connection
///
/// Clones share state, so a test can keep a handle while the code under test
/// owns another.
pub struct MockConnection {
    /// Canned results by exact statement text
    responses: Arc<RwLock<HashMap<String, RowSet>>>,

    /// Errors to return for specific statements
    errors: Arc<RwLock<HashMap<String, VerifyError>>>,

    /// Every statement received, in order
    executed: Arc<RwLock<Vec<String>>>,

    /// Simulate connection failure
    fail_connection: bool,

    /// Simulate query latency (milliseconds)
    latency_ms: u64,

    /// Name to return from name() method
    driver_name: &'static str,
}

impl MockConnection {
    /// Create a new mock connection with no canned results
    pub fn new() -> Self {
        Self::from_responses(HashMap::new())
    }

    /// Create a mock connection from pre-built results keyed by statement
    pub fn from_responses(responses: HashMap<String, RowSet>) -> Self {
        Self {
            responses: Arc::new(RwLock::new(responses)),
            errors: Arc::new(RwLock::new(HashMap::new())),
            executed: Arc::new(RwLock::new(Vec::new())),
            fail_connection: false,
            latency_ms: 0,
            driver_name: "Mock",
        }
    }

    /// Answer `sql` with `rows`, replacing any earlier answer
    pub async fn add_response(&self, sql: impl Into<String>, rows: RowSet) {
        self.responses.write().await.insert(sql.into(), rows);
    }

    /// Fail `sql` with `error`
    pub async fn add_error(&self, sql: impl Into<String>, error: VerifyError) {
        self.errors.write().await.insert(sql.into(), error);
    }

    pub async fn add_database(&self, props: &DatabaseProperties) {
        let (sql, row) = database_row(props);
        append_row(&mut *self.responses.write().await, sql, row);
    }

    pub async fn add_schema(&self, props: &SchemaProperties) {
        let (sql, row) = schema_row(props);
        append_row(&mut *self.responses.write().await, sql, row);
    }

    pub async fn add_warehouse(&self, props: &WarehouseProperties) {
        let (sql, row) = warehouse_row(props);
        append_row(&mut *self.responses.write().await, sql, row);
    }

    pub async fn add_grant(&self, target: &GrantTarget, grant: &GrantRecord) {
        let (sql, row) = grant_row(target, grant);
        append_row(&mut *self.responses.write().await, sql, row);
    }

    /// Statements received so far, in order
    pub async fn executed_queries(&self) -> Vec<String> {
        self.executed.read().await.clone()
    }

    pub async fn query_count(&self) -> usize {
        self.executed.read().await.len()
    }

    /// Clear all canned results, errors and the statement log
    pub async fn clear(&self) {
        self.responses.write().await.clear();
        self.errors.write().await.clear();
        self.executed.write().await.clear();
    }

    /// Configure to fail all pings
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Delay every call by `latency_ms` milliseconds
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Set a custom driver name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.driver_name = name;
        self
    }

    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }
}

impl Default for MockConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockConnection {
    fn clone(&self) -> Self {
        Self {
            responses: Arc::clone(&self.responses),
            errors: Arc::clone(&self.errors),
            executed: Arc::clone(&self.executed),
            fail_connection: self.fail_connection,
            latency_ms: self.latency_ms,
            driver_name: self.driver_name,
        }
    }
}

#[async_trait::async_trait]
impl IntrospectionConnection for MockConnection {
    fn name(&self) -> &'static str {
        self.driver_name
    }

    async fn query(&self, sql: &str) -> Result<RowSet, VerifyError> {
        self.simulate_latency().await;
        self.executed.write().await.push(sql.to_string());

        if self.fail_connection {
            return Err(VerifyError::ConnectionError(
                "Simulated connection failure".to_string(),
            ));
        }

        if let Some(error) = self.errors.read().await.get(sql) {
            return Err(error.clone());
        }

        let responses = self.responses.read().await;
        Ok(responses
            .get(sql)
            .cloned()
            .unwrap_or_else(|| RowSet::new(layout_for(sql).iter().copied())))
    }

    async fn ping(&self) -> Result<(), VerifyError> {
        self.simulate_latency().await;

        if self.fail_connection {
            Err(VerifyError::ConnectionError(
                "Simulated connection failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

/// Builder for a [`MockConnection`] pre-populated with objects
///
/// ```rust,ignore
/// let conn = MockConnectionBuilder::new()
///     .with_database(DatabaseProperties { name: "TT_DB_X".into(), ..Default::default() })
///     .with_latency(50)
///     .build();
/// ```
#[derive(Default)]
pub struct MockConnectionBuilder {
    responses: HashMap<String, RowSet>,
    errors: HashMap<String, VerifyError>,
    fail_connection: bool,
    latency_ms: u64,
}

impl MockConnectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database(mut self, props: DatabaseProperties) -> Self {
        let (sql, row) = database_row(&props);
        append_row(&mut self.responses, sql, row);
        self
    }

    pub fn with_schema(mut self, props: SchemaProperties) -> Self {
        let (sql, row) = schema_row(&props);
        append_row(&mut self.responses, sql, row);
        self
    }

    pub fn with_warehouse(mut self, props: WarehouseProperties) -> Self {
        let (sql, row) = warehouse_row(&props);
        append_row(&mut self.responses, sql, row);
        self
    }

    pub fn with_grant(mut self, target: &GrantTarget, grant: GrantRecord) -> Self {
        let (sql, row) = grant_row(target, &grant);
        append_row(&mut self.responses, sql, row);
        self
    }

    pub fn with_response(mut self, sql: impl Into<String>, rows: RowSet) -> Self {
        self.responses.insert(sql.into(), rows);
        self
    }

    pub fn with_error(mut self, sql: impl Into<String>, error: VerifyError) -> Self {
        self.errors.insert(sql.into(), error);
        self
    }

    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn build(self) -> MockConnection {
        MockConnection {
            responses: Arc::new(RwLock::new(self.responses)),
            errors: Arc::new(RwLock::new(self.errors)),
            executed: Arc::new(RwLock::new(Vec::new())),
            fail_connection: self.fail_connection,
            latency_ms: self.latency_ms,
            driver_name: "Mock",
        }
    }
}

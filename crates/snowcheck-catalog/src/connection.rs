//! Connection seam between the verification core and a warehouse driver

use crate::error::VerifyError;
use crate::wire::WireValue;

/// A fully materialized introspection result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    /// Column names in result order
    pub columns: Vec<String>,

    /// Rows; each row is aligned with `columns`
    pub rows: Vec<Vec<WireValue>>,
}

impl RowSet {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn with_row(mut self, row: Vec<WireValue>) -> Self {
        self.rows.push(row);
        self
    }

    pub fn push_row(&mut self, row: Vec<WireValue>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// An open, already authenticated warehouse connection
///
/// Implementations issue exactly one round trip per call and neither retry
/// nor cache. Callers await queries one after another; a connection is never
/// asked to run two queries at once.
#[async_trait::async_trait]
pub trait IntrospectionConnection: Send + Sync {
    /// Get the driver name (e.g., "Snowflake")
    fn name(&self) -> &'static str;

    /// Execute one read-only statement and return its full result
    async fn query(&self, sql: &str) -> Result<RowSet, VerifyError>;

    /// Check that the connection is usable
    async fn ping(&self) -> Result<(), VerifyError>;
}

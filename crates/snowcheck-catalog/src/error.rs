//! Error taxonomy for verification calls

use crate::query::ObjectLookup;

/// Errors that abort a verification call
#[derive(Debug, Clone, thiserror::Error)]
pub enum VerifyError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Connection failed: {0}")]
    ConnectionError(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    /// A mandatory introspection column is absent: the metadata layout no
    /// longer matches what the decoder was written against
    #[error("Column for '{field}' missing from result (expected one of: {expected}; got: {available})")]
    MissingColumn {
        field: &'static str,
        expected: String,
        available: String,
    },

    #[error("No {} found", .0)]
    NotFound(ObjectLookup),

    #[error("{count} rows carry the exact name of {lookup}")]
    AmbiguousMatch { lookup: ObjectLookup, count: usize },

    #[error("Cannot decode '{field}': {source}")]
    Decode {
        field: &'static str,
        #[source]
        source: DecodeError,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl VerifyError {
    /// Whether this is the "object does not exist" outcome rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Cell-level coercion failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("'{0}' is not a decimal integer")]
    NotAnInteger(String),

    #[error("non-finite number {0}")]
    NonFinite(f64),

    #[error("{0} is out of range")]
    OutOfRange(i64),
}

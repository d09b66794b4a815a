//! Warehouse introspection for provisioning verification
//!
//! This crate reads back what a provisioning run left in the warehouse. Every
//! call is one `SHOW ...` round trip whose result set is decoded into the
//! typed records of `snowcheck-core`:
//!
//! - [`query`] builds the introspection statements (with LIKE escaping)
//! - [`columns`] maps semantic fields onto whatever columns the warehouse returned
//! - [`decode`] coerces the loosely typed cells into typed values
//! - [`fetch`] and [`grants`] put the three together
//!
//! ## Features
//!
//! - `snowflake` - live Snowflake connections via key-pair authentication
//!
//! ## Example
//!
//! ```rust,ignore
//! use snowcheck_catalog::{fetch, SnowflakeConnection};
//!
//! let conn = SnowflakeConnection::connect(&settings)?;
//! if fetch::database_exists(&conn, "TT_DB_X").await? {
//!     let props = fetch::fetch_database_properties(&conn, "TT_DB_X").await?;
//! }
//! ```

pub mod columns;
pub mod connection;
pub mod decode;
pub mod error;
pub mod fetch;
pub mod grants;
pub mod mock;
pub mod query;
pub mod snowflake;
pub mod wire;

pub use columns::{ColumnIndexMap, Field, FieldSpec, Repr, WireColumn};
pub use connection::{IntrospectionConnection, RowSet};
pub use decode::{FromIntrospectionRow, RowDecoder};
pub use error::{DecodeError, VerifyError};
pub use grants::{GrantTarget, decode_grants, fetch_all_grants, fetch_grants, filter_grants, has_privilege};
pub use mock::{MockConnection, MockConnectionBuilder};
pub use query::{ObjectKind, ObjectLookup, escape_like};
pub use snowflake::SnowflakeConnection;
pub use wire::WireValue;

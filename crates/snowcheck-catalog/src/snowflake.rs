//! Snowflake connection using key-pair authentication
//!
//! Credentials come from [`ConnectionSettings`]; the account identifier is
//! `<organization>-<account>`. The connection is owned by one verification
//! scenario and dropped when the scenario ends, whichever way it ends.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let settings = ConnectionSettings::from_env()?;
//! let conn = SnowflakeConnection::connect(&settings)?;
//! conn.ping().await?;
//! ```
//!
//! Reference: https://docs.snowflake.com/en/user-guide/key-pair-auth

use crate::connection::{IntrospectionConnection, RowSet};
use crate::error::VerifyError;
use snowcheck_core::ConnectionSettings;

#[cfg(feature = "snowflake")]
use crate::wire::WireValue;

#[cfg(feature = "snowflake")]
use snowflake_api::{QueryResult, SnowflakeApi};

#[cfg(feature = "snowflake")]
use arrow_array::cast::AsArray;

#[cfg(feature = "snowflake")]
use arrow_array::types::{
    Decimal128Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
    UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};

#[cfg(feature = "snowflake")]
use arrow_array::{Array, RecordBatch};

#[cfg(feature = "snowflake")]
use arrow_schema::DataType;

/// Live Snowflake connection
pub struct SnowflakeConnection {
    #[cfg(feature = "snowflake")]
    api: SnowflakeApi,

    account: String,
}

impl SnowflakeConnection {
    /// Authenticate with the key pair in `settings`
    #[cfg(feature = "snowflake")]
    pub fn connect(settings: &ConnectionSettings) -> Result<Self, VerifyError> {
        let account = settings.account_identifier();

        let api = SnowflakeApi::with_certificate_auth(
            &account,
            settings.warehouse.as_deref(),
            None, // database
            None, // schema
            &settings.user,
            settings.role.as_deref(),
            &settings.private_key,
        )
        .map_err(|e| VerifyError::AuthenticationError(format!(
            "Failed to authenticate with key-pair: {}",
            e
        )))?;

        tracing::info!(%account, user = %settings.user, "connected to Snowflake");

        Ok(Self { api, account })
    }

    /// Build without snowflake feature
    #[cfg(not(feature = "snowflake"))]
    pub fn connect(_settings: &ConnectionSettings) -> Result<Self, VerifyError> {
        Err(VerifyError::ConfigError(
            "Snowflake support not compiled. Rebuild with: cargo build --features snowflake".to_string()
        ))
    }

    /// Account identifier in use
    pub fn account(&self) -> &str {
        &self.account
    }
}

#[cfg(feature = "snowflake")]
fn into_row_set(result: QueryResult) -> Result<RowSet, VerifyError> {
    match result {
        QueryResult::Arrow(batches) => Ok(batches_to_row_set(&batches)),
        QueryResult::Json(json) => {
            let columns = json.schema.iter().map(|field| field.name.clone()).collect();
            json_to_row_set(columns, &json.value)
        }
        QueryResult::Empty => Ok(RowSet::default()),
    }
}

#[cfg(feature = "snowflake")]
fn batches_to_row_set(batches: &[RecordBatch]) -> RowSet {
    let mut rows = match batches.first() {
        Some(batch) => RowSet::new(batch.schema().fields().iter().map(|f| f.name().clone())),
        None => RowSet::default(),
    };

    for batch in batches {
        for row_idx in 0..batch.num_rows() {
            let row = batch
                .columns()
                .iter()
                .map(|column| arrow_cell(column.as_ref(), row_idx))
                .collect();
            rows.push_row(row);
        }
    }

    rows
}

#[cfg(feature = "snowflake")]
fn arrow_cell(array: &dyn Array, row: usize) -> WireValue {
    if array.is_null(row) {
        return WireValue::Null;
    }

    match array.data_type() {
        DataType::Utf8 => WireValue::Text(array.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => WireValue::Text(array.as_string::<i64>().value(row).to_string()),
        DataType::Binary => WireValue::Bytes(array.as_binary::<i32>().value(row).to_vec()),
        DataType::LargeBinary => WireValue::Bytes(array.as_binary::<i64>().value(row).to_vec()),
        DataType::Boolean => WireValue::Bool(array.as_boolean().value(row)),
        DataType::Int8 => WireValue::Int(array.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => WireValue::Int(array.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => WireValue::Int(array.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => WireValue::Int(array.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => WireValue::Int(array.as_primitive::<UInt8Type>().value(row).into()),
        DataType::UInt16 => WireValue::Int(array.as_primitive::<UInt16Type>().value(row).into()),
        DataType::UInt32 => WireValue::Int(array.as_primitive::<UInt32Type>().value(row).into()),
        DataType::UInt64 => {
            let value = array.as_primitive::<UInt64Type>().value(row);
            i64::try_from(value)
                .map(WireValue::Int)
                .unwrap_or(WireValue::Float(value as f64))
        }
        DataType::Float32 => WireValue::Float(array.as_primitive::<Float32Type>().value(row).into()),
        DataType::Float64 => WireValue::Float(array.as_primitive::<Float64Type>().value(row)),
        DataType::Decimal128(_, scale) => {
            let raw = array.as_primitive::<Decimal128Type>().value(row);
            if *scale == 0 {
                i64::try_from(raw)
                    .map(WireValue::Int)
                    .unwrap_or(WireValue::Float(raw as f64))
            } else {
                WireValue::Float(raw as f64 / 10f64.powi(i32::from(*scale)))
            }
        }
        other => {
            tracing::debug!(data_type = ?other, "unsupported cell type read as null");
            WireValue::Null
        }
    }
}

#[cfg(feature = "snowflake")]
fn json_to_row_set(columns: Vec<String>, value: &serde_json::Value) -> Result<RowSet, VerifyError> {
    let mut rows = RowSet::new(columns);

    let Some(records) = value.as_array() else {
        return Err(VerifyError::QueryError(
            "Unexpected JSON result format: expected an array of rows".to_string()
        ));
    };

    for record in records {
        let cells = record.as_array().ok_or_else(|| {
            VerifyError::QueryError("Unexpected JSON result format: row is not an array".to_string())
        })?;
        rows.push_row(cells.iter().map(json_cell).collect());
    }

    Ok(rows)
}

#[cfg(feature = "snowflake")]
fn json_cell(value: &serde_json::Value) -> WireValue {
    use serde_json::Value;

    match value {
        Value::Null => WireValue::Null,
        Value::String(s) => WireValue::Text(s.clone()),
        Value::Bool(b) => WireValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => WireValue::Int(i),
            None => WireValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        other => WireValue::Text(other.to_string()),
    }
}

#[async_trait::async_trait]
impl IntrospectionConnection for SnowflakeConnection {
    fn name(&self) -> &'static str {
        "Snowflake"
    }

    #[cfg(feature = "snowflake")]
    async fn query(&self, sql: &str) -> Result<RowSet, VerifyError> {
        let result = self.api.exec(sql)
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                if err_str.contains("Insufficient privileges") {
                    VerifyError::QueryError(format!("Permission denied running '{}': {}", sql, err_str))
                } else {
                    VerifyError::QueryError(err_str)
                }
            })?;

        into_row_set(result)
    }

    #[cfg(not(feature = "snowflake"))]
    async fn query(&self, _sql: &str) -> Result<RowSet, VerifyError> {
        Err(VerifyError::ConfigError(
            "Snowflake support not compiled. Rebuild with: cargo build --features snowflake".to_string()
        ))
    }

    #[cfg(feature = "snowflake")]
    async fn ping(&self) -> Result<(), VerifyError> {
        self.api.exec("SELECT 1")
            .await
            .map_err(|e| VerifyError::ConnectionError(format!("Connection test failed: {}", e)))?;
        Ok(())
    }

    #[cfg(not(feature = "snowflake"))]
    async fn ping(&self) -> Result<(), VerifyError> {
        Err(VerifyError::ConfigError(
            "Snowflake support not compiled. Rebuild with: cargo build --features snowflake".to_string()
        ))
    }
}

#[cfg(all(test, feature = "snowflake"))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_rows_become_wire_values() {
        let rows = json_to_row_set(
            vec!["name".to_string(), "retention_time".to_string(), "comment".to_string()],
            &json!([["TT_DB_X", "1", null], ["TT_DB_Y", 7, "c"]]),
        )
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows.rows[0][0], WireValue::from("TT_DB_X"));
        assert_eq!(rows.rows[0][2], WireValue::Null);
        assert_eq!(rows.rows[1][1], WireValue::Int(7));
    }

    #[test]
    fn json_rows_must_be_arrays() {
        let result = json_to_row_set(vec!["name".to_string()], &json!({"name": "x"}));
        assert!(matches!(result, Err(VerifyError::QueryError(_))));
    }
}

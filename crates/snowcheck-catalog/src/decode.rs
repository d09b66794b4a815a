//! Row decoding
//!
//! A [`RowDecoder`] reads typed values out of one result row through a
//! resolved [`ColumnIndexMap`]. Unresolved optional fields are skipped (the
//! caller keeps its default); resolved fields always go through the uniform
//! [`WireValue`] coercions.

use crate::columns::{self, ColumnIndexMap, Field, FieldSpec, Repr};
use crate::error::{DecodeError, VerifyError};
use crate::wire::WireValue;
use snowcheck_core::{DatabaseProperties, GrantRecord, SchemaProperties, WarehouseProperties};

static NULL: WireValue = WireValue::Null;

/// Typed access to one row
#[derive(Debug, Clone, Copy)]
pub struct RowDecoder<'a> {
    row: &'a [WireValue],
    columns: &'a ColumnIndexMap,
}

impl<'a> RowDecoder<'a> {
    pub fn new(row: &'a [WireValue], columns: &'a ColumnIndexMap) -> Self {
        Self { row, columns }
    }

    /// Raw cell for a field; short rows read as null
    pub fn cell(&self, field: Field) -> Option<&'a WireValue> {
        self.columns
            .index_of(field)
            .map(|index| self.row.get(index).unwrap_or(&NULL))
    }

    /// Text value, `None` when the field is unresolved
    pub fn text(&self, field: Field) -> Option<String> {
        self.cell(field).map(WireValue::to_text)
    }

    /// Text value of a field the result set must carry
    pub fn required_text(&self, field: Field) -> Result<String, VerifyError> {
        self.text(field).ok_or(VerifyError::MissingColumn {
            field: field.as_str(),
            expected: field.as_str().to_string(),
            available: String::new(),
        })
    }

    /// Integer value; unparsable text is a decode error
    pub fn int(&self, field: Field) -> Result<Option<i64>, VerifyError> {
        self.cell(field)
            .map(|cell| {
                cell.to_int().map_err(|source| VerifyError::Decode {
                    field: field.as_str(),
                    source,
                })
            })
            .transpose()
    }

    /// Non-negative count such as retention days
    pub fn count(&self, field: Field) -> Result<Option<u32>, VerifyError> {
        self.int(field)?
            .map(|value| {
                u32::try_from(value).map_err(|_| VerifyError::Decode {
                    field: field.as_str(),
                    source: DecodeError::OutOfRange(value),
                })
            })
            .transpose()
    }

    /// Boolean value, honouring how the resolved column carries it
    pub fn flag(&self, field: Field) -> Option<bool> {
        let column = self.columns.get(field)?;
        let cell = self.row.get(column.index).unwrap_or(&NULL);
        Some(match column.repr {
            Repr::Value => cell.to_flag(),
            Repr::Marker(marker) => cell.contains_marker(marker),
        })
    }
}

/// Records that can be decoded from one introspection row
pub trait FromIntrospectionRow: Sized {
    /// Column table used to resolve the result set
    const COLUMNS: &'static [FieldSpec];

    fn decode(row: &RowDecoder<'_>) -> Result<Self, VerifyError>;
}

impl FromIntrospectionRow for DatabaseProperties {
    const COLUMNS: &'static [FieldSpec] = columns::DATABASE_COLUMNS;

    fn decode(row: &RowDecoder<'_>) -> Result<Self, VerifyError> {
        Ok(Self {
            name: row.required_text(Field::Name)?,
            comment: row.text(Field::Comment).unwrap_or_default(),
            data_retention_time_in_days: row.count(Field::RetentionTime)?.unwrap_or_default(),
            is_transient: row.flag(Field::IsTransient).unwrap_or_default(),
        })
    }
}

impl FromIntrospectionRow for SchemaProperties {
    const COLUMNS: &'static [FieldSpec] = columns::SCHEMA_COLUMNS;

    fn decode(row: &RowDecoder<'_>) -> Result<Self, VerifyError> {
        Ok(Self {
            name: row.required_text(Field::Name)?,
            database_name: row.text(Field::DatabaseName).unwrap_or_default(),
            comment: row.text(Field::Comment).unwrap_or_default(),
            is_transient: row.flag(Field::IsTransient).unwrap_or_default(),
            is_managed_access: row.flag(Field::ManagedAccess).unwrap_or_default(),
            data_retention_time_in_days: row.count(Field::RetentionTime)?.unwrap_or_default(),
        })
    }
}

impl FromIntrospectionRow for WarehouseProperties {
    const COLUMNS: &'static [FieldSpec] = columns::WAREHOUSE_COLUMNS;

    fn decode(row: &RowDecoder<'_>) -> Result<Self, VerifyError> {
        Ok(Self {
            name: row.required_text(Field::Name)?,
            size: row.text(Field::Size).unwrap_or_default(),
            comment: row.text(Field::Comment).unwrap_or_default(),
        })
    }
}

impl FromIntrospectionRow for GrantRecord {
    const COLUMNS: &'static [FieldSpec] = columns::GRANT_COLUMNS;

    fn decode(row: &RowDecoder<'_>) -> Result<Self, VerifyError> {
        Ok(Self {
            privilege: row.text(Field::Privilege).unwrap_or_default(),
            granted_on: row.text(Field::GrantedOn).unwrap_or_default(),
            name: row.text(Field::Name).unwrap_or_default(),
            granted_to: row.text(Field::GrantedTo).unwrap_or_default(),
            grantee: row.text(Field::Grantee).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode<T: FromIntrospectionRow>(columns: &[&str], row: Vec<WireValue>) -> Result<T, VerifyError> {
        let map = ColumnIndexMap::resolve(columns, T::COLUMNS)?;
        T::decode(&RowDecoder::new(&row, &map))
    }

    #[test]
    fn database_from_text_cells() {
        let props: DatabaseProperties = decode(
            &["created_on", "name", "comment", "retention_time", "is_transient"],
            vec![
                "2024-01-01".into(),
                "TT_DB_X".into(),
                "c".into(),
                "7".into(),
                "true".into(),
            ],
        )
        .unwrap();

        assert_eq!(
            props,
            DatabaseProperties {
                name: "TT_DB_X".to_string(),
                comment: "c".to_string(),
                data_retention_time_in_days: 7,
                is_transient: true,
            }
        );
    }

    #[test]
    fn nulls_decode_to_defaults() {
        let props: DatabaseProperties = decode(
            &["name", "comment", "retention_time", "is_transient"],
            vec!["DB".into(), WireValue::Null, WireValue::Null, WireValue::Null],
        )
        .unwrap();

        assert_eq!(props.comment, "");
        assert_eq!(props.data_retention_time_in_days, 0);
        assert!(!props.is_transient);
    }

    #[test]
    fn native_and_byte_cells() {
        let props: DatabaseProperties = decode(
            &["name", "comment", "retention_time"],
            vec![b"DB".to_vec().into(), b"bytes comment".to_vec().into(), WireValue::Float(3.0)],
        )
        .unwrap();

        assert_eq!(props.name, "DB");
        assert_eq!(props.comment, "bytes comment");
        assert_eq!(props.data_retention_time_in_days, 3);
    }

    #[test]
    fn unparsable_retention_is_fatal() {
        let result: Result<DatabaseProperties, _> = decode(
            &["name", "retention_time"],
            vec!["DB".into(), "one day".into()],
        );

        assert!(matches!(
            result,
            Err(VerifyError::Decode { field: "retention_time", .. })
        ));
    }

    #[test]
    fn negative_retention_is_out_of_range() {
        let result: Result<DatabaseProperties, _> =
            decode(&["name", "retention_time"], vec!["DB".into(), WireValue::Int(-1)]);

        match result {
            Err(VerifyError::Decode { source, .. }) => assert_eq!(source, DecodeError::OutOfRange(-1)),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn managed_access_from_dedicated_column() {
        let props: SchemaProperties = decode(
            &["name", "database_name", "comment", "is_managed_access"],
            vec!["S".into(), "DB".into(), "".into(), "true".into()],
        )
        .unwrap();

        assert!(props.is_managed_access);
        assert_eq!(props.database_name, "DB");
    }

    #[test]
    fn managed_access_from_options_marker() {
        let props: SchemaProperties = decode(
            &["name", "database_name", "options"],
            vec!["S".into(), "DB".into(), "TRANSIENT, MANAGED ACCESS".into()],
        )
        .unwrap();

        assert!(props.is_managed_access);
        assert!(props.is_transient);
    }

    #[test]
    fn empty_options_mean_neither_flag() {
        let props: SchemaProperties = decode(
            &["name", "options"],
            vec!["S".into(), "".into()],
        )
        .unwrap();

        assert!(!props.is_managed_access);
        assert!(!props.is_transient);
    }

    #[test]
    fn short_row_reads_null() {
        let props: WarehouseProperties =
            decode(&["name", "size", "comment"], vec!["WH".into(), "X-Small".into()]).unwrap();

        assert_eq!(props.size, "X-Small");
        assert_eq!(props.comment, "");
    }

    #[test]
    fn grant_with_missing_columns_degrades_to_empty() {
        let grant: GrantRecord = decode(
            &["privilege", "grantee_name"],
            vec!["USAGE".into(), "ANALYST".into()],
        )
        .unwrap();

        assert_eq!(grant.privilege, "USAGE");
        assert_eq!(grant.grantee, "ANALYST");
        assert_eq!(grant.granted_on, "");
        assert_eq!(grant.name, "");
    }
}

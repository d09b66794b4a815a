//! Property fetchers and existence checks
//!
//! Fetchers run the kind-specific `SHOW` statement, resolve the columns,
//! select the single matching row and decode it. Existence checks run the
//! same statement but only look at whether any row came back.

use crate::columns::{ColumnIndexMap, Field};
use crate::connection::{IntrospectionConnection, RowSet};
use crate::decode::{FromIntrospectionRow, RowDecoder};
use crate::error::VerifyError;
use crate::query::ObjectLookup;
use crate::wire::WireValue;
use snowcheck_core::{names_match, DatabaseProperties, SchemaProperties, WarehouseProperties};

/// Whether the lookup returns at least one row
///
/// No column resolution or decoding takes place.
pub async fn object_exists<C>(conn: &C, lookup: &ObjectLookup) -> Result<bool, VerifyError>
where
    C: IntrospectionConnection + ?Sized,
{
    let sql = lookup.to_sql();
    tracing::debug!(%sql, "existence check");

    let rows = conn.query(&sql).await?;
    Ok(!rows.is_empty())
}

pub async fn database_exists<C>(conn: &C, database: &str) -> Result<bool, VerifyError>
where
    C: IntrospectionConnection + ?Sized,
{
    object_exists(conn, &ObjectLookup::database(database)).await
}

pub async fn schema_exists<C>(conn: &C, database: &str, schema: &str) -> Result<bool, VerifyError>
where
    C: IntrospectionConnection + ?Sized,
{
    object_exists(conn, &ObjectLookup::schema(database, schema)).await
}

pub async fn warehouse_exists<C>(conn: &C, warehouse: &str) -> Result<bool, VerifyError>
where
    C: IntrospectionConnection + ?Sized,
{
    object_exists(conn, &ObjectLookup::warehouse(warehouse)).await
}

/// Fetch and decode the one object matching `lookup`
pub async fn fetch_one<T, C>(conn: &C, lookup: &ObjectLookup) -> Result<T, VerifyError>
where
    T: FromIntrospectionRow,
    C: IntrospectionConnection + ?Sized,
{
    let sql = lookup.to_sql();
    tracing::debug!(%sql, "property fetch");

    let rows = conn.query(&sql).await?;
    decode_single(&rows, lookup)
}

/// Decode the single row of `rows` that answers `lookup`
///
/// Column resolution runs before the row count is looked at, so a changed
/// metadata layout is never reported as a missing object. A result without
/// any column metadata (some drivers send none for empty results) can only
/// mean "not found".
pub fn decode_single<T: FromIntrospectionRow>(rows: &RowSet, lookup: &ObjectLookup) -> Result<T, VerifyError> {
    if rows.is_empty() && rows.columns.is_empty() {
        return Err(VerifyError::NotFound(lookup.clone()));
    }

    let columns = ColumnIndexMap::resolve(&rows.columns, T::COLUMNS)?;
    let row = select_row(rows, &columns, lookup)?;
    T::decode(&RowDecoder::new(row, &columns))
}

/// Pick the row for `lookup`
///
/// LIKE treats `_` as a wildcard, so a name such as `TT_DB_X` can also match
/// `TT_DBAX`. Only a row whose name equals the lookup (ignoring case) answers
/// it; a result made of siblings alone means the object does not exist.
fn select_row<'a>(
    rows: &'a RowSet,
    columns: &ColumnIndexMap,
    lookup: &ObjectLookup,
) -> Result<&'a [WireValue], VerifyError> {
    let exact: Vec<&Vec<WireValue>> = rows
        .rows
        .iter()
        .filter(|row| {
            RowDecoder::new(row, columns)
                .text(Field::Name)
                .is_some_and(|name| names_match(&name, &lookup.name))
        })
        .collect();

    match exact.as_slice() {
        [] => {
            if !rows.is_empty() {
                tracing::debug!(%lookup, siblings = rows.len(), "only wildcard siblings matched");
            }
            Err(VerifyError::NotFound(lookup.clone()))
        }
        [row] => Ok(row.as_slice()),
        several => Err(VerifyError::AmbiguousMatch {
            lookup: lookup.clone(),
            count: several.len(),
        }),
    }
}

pub async fn fetch_database_properties<C>(conn: &C, database: &str) -> Result<DatabaseProperties, VerifyError>
where
    C: IntrospectionConnection + ?Sized,
{
    fetch_one(conn, &ObjectLookup::database(database)).await
}

pub async fn fetch_schema_properties<C>(
    conn: &C,
    database: &str,
    schema: &str,
) -> Result<SchemaProperties, VerifyError>
where
    C: IntrospectionConnection + ?Sized,
{
    fetch_one(conn, &ObjectLookup::schema(database, schema)).await
}

pub async fn fetch_warehouse_properties<C>(conn: &C, warehouse: &str) -> Result<WarehouseProperties, VerifyError>
where
    C: IntrospectionConnection + ?Sized,
{
    fetch_one(conn, &ObjectLookup::warehouse(warehouse)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn databases(names: &[&str]) -> RowSet {
        names.iter().fold(RowSet::new(["name", "comment"]), |rows, name| {
            rows.with_row(vec![(*name).into(), "c".into()])
        })
    }

    #[test]
    fn zero_rows_is_not_found() {
        let lookup = ObjectLookup::database("TT_DB_X");
        let result: Result<DatabaseProperties, _> = decode_single(&databases(&[]), &lookup);
        assert!(matches!(result, Err(VerifyError::NotFound(l)) if l == lookup));
    }

    #[test]
    fn missing_name_column_beats_not_found() {
        let lookup = ObjectLookup::database("TT_DB_X");
        let result: Result<DatabaseProperties, _> = decode_single(&RowSet::new(["comment"]), &lookup);
        assert!(matches!(result, Err(VerifyError::MissingColumn { .. })));
    }

    #[test]
    fn empty_result_without_metadata_is_not_found() {
        let lookup = ObjectLookup::database("TT_DB_X");
        let result: Result<DatabaseProperties, _> = decode_single(&RowSet::default(), &lookup);
        assert!(matches!(result, Err(VerifyError::NotFound(_))));
    }

    #[test]
    fn wildcard_sibling_is_skipped() {
        let lookup = ObjectLookup::database("TT_DB_X");
        let props: DatabaseProperties =
            decode_single(&databases(&["TT_DBAX", "TT_DB_X"]), &lookup).unwrap();
        assert_eq!(props.name, "TT_DB_X");
    }

    #[test]
    fn lone_wildcard_sibling_is_not_found() {
        let lookup = ObjectLookup::database("TT_DB_X");
        let result: Result<DatabaseProperties, _> = decode_single(&databases(&["TT_DBAX"]), &lookup);
        assert!(matches!(result, Err(VerifyError::NotFound(l)) if l == lookup));
    }

    #[test]
    fn siblings_only_is_not_found() {
        let lookup = ObjectLookup::database("TT_DB_X");
        let result: Result<DatabaseProperties, _> =
            decode_single(&databases(&["TT_DBAX", "TT_DBBX"]), &lookup);
        assert!(matches!(result, Err(VerifyError::NotFound(_))));
    }

    #[test]
    fn single_row_matches_ignoring_case() {
        let lookup = ObjectLookup::database("tt_db_x");
        let props: DatabaseProperties = decode_single(&databases(&["TT_DB_X"]), &lookup).unwrap();
        assert_eq!(props.name, "TT_DB_X");
    }

    #[test]
    fn duplicate_exact_rows_are_ambiguous() {
        let lookup = ObjectLookup::database("TT_DB_X");
        let result: Result<DatabaseProperties, _> =
            decode_single(&databases(&["TT_DB_X", "tt_db_x", "TT_DBAX"]), &lookup);
        assert!(matches!(result, Err(VerifyError::AmbiguousMatch { count: 2, .. })));
    }
}

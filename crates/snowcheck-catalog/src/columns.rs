//! Column index resolution
//!
//! `SHOW` output differs between warehouse versions and regions: columns move,
//! optional ones come and go, and some flags are exposed either as a
//! dedicated column or as a marker inside the free-text `options` column.
//! Each record type declares one table of [`FieldSpec`]s; resolution turns it
//! into positions for the result set at hand.

use crate::error::VerifyError;
use std::collections::HashMap;

/// Semantic fields read from introspection results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Comment,
    RetentionTime,
    IsTransient,
    DatabaseName,
    ManagedAccess,
    Size,
    Privilege,
    GrantedOn,
    GrantedTo,
    Grantee,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Comment => "comment",
            Self::RetentionTime => "retention_time",
            Self::IsTransient => "is_transient",
            Self::DatabaseName => "database_name",
            Self::ManagedAccess => "managed_access",
            Self::Size => "size",
            Self::Privilege => "privilege",
            Self::GrantedOn => "granted_on",
            Self::GrantedTo => "granted_to",
            Self::Grantee => "grantee",
        }
    }
}

/// How a flag is carried by a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repr {
    /// The cell holds the value itself
    Value,
    /// The cell is an option blob; the flag is set when it contains the marker
    Marker(&'static str),
}

/// One recognized wire column for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireColumn {
    pub name: &'static str,
    pub repr: Repr,
}

impl WireColumn {
    pub const fn value(name: &'static str) -> Self {
        Self { name, repr: Repr::Value }
    }

    pub const fn marker(name: &'static str, marker: &'static str) -> Self {
        Self { name, repr: Repr::Marker(marker) }
    }
}

/// A field and the wire columns that may carry it, in preference order
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: Field,
    pub columns: &'static [WireColumn],
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(field: Field, columns: &'static [WireColumn]) -> Self {
        Self { field, columns, required: true }
    }

    pub const fn optional(field: Field, columns: &'static [WireColumn]) -> Self {
        Self { field, columns, required: false }
    }
}

const NAME: &[WireColumn] = &[WireColumn::value("name")];
const COMMENT: &[WireColumn] = &[WireColumn::value("comment")];
const RETENTION: &[WireColumn] = &[WireColumn::value("retention_time")];
const TRANSIENT: &[WireColumn] = &[
    WireColumn::value("is_transient"),
    WireColumn::marker("options", "TRANSIENT"),
];
const MANAGED_ACCESS: &[WireColumn] = &[
    WireColumn::value("is_managed_access"),
    WireColumn::marker("options", "MANAGED ACCESS"),
];
const DATABASE_NAME: &[WireColumn] = &[WireColumn::value("database_name")];
const SIZE: &[WireColumn] = &[WireColumn::value("size")];
const PRIVILEGE: &[WireColumn] = &[WireColumn::value("privilege")];
const GRANTED_ON: &[WireColumn] = &[WireColumn::value("granted_on")];
const GRANTED_TO: &[WireColumn] = &[WireColumn::value("granted_to")];
const GRANTEE: &[WireColumn] = &[WireColumn::value("grantee_name")];

/// `SHOW DATABASES`
pub const DATABASE_COLUMNS: &[FieldSpec] = &[
    FieldSpec::required(Field::Name, NAME),
    FieldSpec::optional(Field::Comment, COMMENT),
    FieldSpec::optional(Field::RetentionTime, RETENTION),
    FieldSpec::optional(Field::IsTransient, TRANSIENT),
];

/// `SHOW SCHEMAS`
pub const SCHEMA_COLUMNS: &[FieldSpec] = &[
    FieldSpec::required(Field::Name, NAME),
    FieldSpec::optional(Field::DatabaseName, DATABASE_NAME),
    FieldSpec::optional(Field::Comment, COMMENT),
    FieldSpec::optional(Field::RetentionTime, RETENTION),
    FieldSpec::optional(Field::IsTransient, TRANSIENT),
    FieldSpec::optional(Field::ManagedAccess, MANAGED_ACCESS),
];

/// `SHOW WAREHOUSES`
pub const WAREHOUSE_COLUMNS: &[FieldSpec] = &[
    FieldSpec::required(Field::Name, NAME),
    FieldSpec::optional(Field::Size, SIZE),
    FieldSpec::optional(Field::Comment, COMMENT),
];

/// `SHOW GRANTS`; nothing is required because grant layouts vary the most
pub const GRANT_COLUMNS: &[FieldSpec] = &[
    FieldSpec::optional(Field::Privilege, PRIVILEGE),
    FieldSpec::optional(Field::GrantedOn, GRANTED_ON),
    FieldSpec::optional(Field::Name, NAME),
    FieldSpec::optional(Field::GrantedTo, GRANTED_TO),
    FieldSpec::optional(Field::Grantee, GRANTEE),
];

/// Where a field was found in the current result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub index: usize,
    pub wire_name: &'static str,
    pub repr: Repr,
}

/// Field -> column position for one result set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnIndexMap {
    resolved: HashMap<Field, ResolvedColumn>,
}

impl ColumnIndexMap {
    /// Resolve `specs` against the column names of a result set
    ///
    /// Matching is exact and case-sensitive; with duplicate names the first
    /// occurrence wins. Fails when a required field has none of its wire
    /// columns present.
    pub fn resolve<S: AsRef<str>>(columns: &[S], specs: &[FieldSpec]) -> Result<Self, VerifyError> {
        let mut resolved = HashMap::new();

        for spec in specs {
            let found = spec.columns.iter().find_map(|wire| {
                columns
                    .iter()
                    .position(|column| column.as_ref() == wire.name)
                    .map(|index| ResolvedColumn {
                        index,
                        wire_name: wire.name,
                        repr: wire.repr,
                    })
            });

            match found {
                Some(column) => {
                    resolved.insert(spec.field, column);
                }
                None if spec.required => {
                    return Err(VerifyError::MissingColumn {
                        field: spec.field.as_str(),
                        expected: spec
                            .columns
                            .iter()
                            .map(|wire| wire.name)
                            .collect::<Vec<_>>()
                            .join(", "),
                        available: columns
                            .iter()
                            .map(|c| c.as_ref())
                            .collect::<Vec<_>>()
                            .join(", "),
                    });
                }
                None => {}
            }
        }

        Ok(Self { resolved })
    }

    pub fn get(&self, field: Field) -> Option<ResolvedColumn> {
        self.resolved.get(&field).copied()
    }

    /// Column position, or `None` for an unresolved optional field
    pub fn index_of(&self, field: Field) -> Option<usize> {
        self.get(field).map(|column| column.index)
    }

    pub fn is_resolved(&self, field: Field) -> bool {
        self.resolved.contains_key(&field)
    }

    /// Fields of `specs` that could not be resolved
    pub fn unresolved(&self, specs: &[FieldSpec]) -> Vec<Field> {
        specs
            .iter()
            .map(|spec| spec.field)
            .filter(|field| !self.is_resolved(*field))
            .collect()
    }
}

//! Introspection statements
//!
//! Lookups are exact-name: the escaped name is passed as the LIKE pattern
//! without adding any wildcard. Container names (databases) are appended as
//! plain identifiers and are expected to be ordinary, pre-validated names.

use std::fmt;

/// Double every single quote so the name can sit inside a quoted literal
pub fn escape_like(name: &str) -> String {
    name.replace('\'', "''")
}

/// Kinds of objects that can be looked up by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Database,
    Schema,
    Warehouse,
}

impl ObjectKind {
    /// Plural keyword used by `SHOW`
    pub fn show_keyword(&self) -> &'static str {
        match self {
            Self::Database => "DATABASES",
            Self::Schema => "SCHEMAS",
            Self::Warehouse => "WAREHOUSES",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Schema => "schema",
            Self::Warehouse => "warehouse",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A name lookup for one object, optionally inside a database
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLookup {
    pub kind: ObjectKind,
    pub name: String,
    pub container: Option<String>,
}

impl ObjectLookup {
    pub fn database(name: impl Into<String>) -> Self {
        Self {
            kind: ObjectKind::Database,
            name: name.into(),
            container: None,
        }
    }

    pub fn schema(database: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: ObjectKind::Schema,
            name: name.into(),
            container: Some(database.into()),
        }
    }

    pub fn warehouse(name: impl Into<String>) -> Self {
        Self {
            kind: ObjectKind::Warehouse,
            name: name.into(),
            container: None,
        }
    }

    /// `SHOW <KIND> LIKE '<escaped name>' [IN DATABASE <container>]`
    pub fn to_sql(&self) -> String {
        let mut sql = format!(
            "SHOW {} LIKE '{}'",
            self.kind.show_keyword(),
            escape_like(&self.name)
        );
        if let Some(container) = &self.container {
            sql.push_str(" IN DATABASE ");
            sql.push_str(container);
        }
        sql
    }
}

impl fmt::Display for ObjectLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.name)?;
        if let Some(container) = &self.container {
            write!(f, " in database '{}'", container)?;
        }
        Ok(())
    }
}

//! Columns, their type descriptors and attributes

use serde::{Deserialize, Serialize};
use crate::refs::{ColumnRef, TableRef};

/// Opaque column type descriptor
///
/// Holds the type as written in the DDL (e.g. `VARCHAR(255)`, `INTEGER[]`).
/// Type semantics such as precision and defaults are not interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnType {
    name: String,
}

impl ColumnType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Attribute flags carried by a column
///
/// `primary_key` is derived from the registered constraints and can only be
/// changed by constraint lifecycle hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnAttributes {
    /// Declared NOT NULL
    pub not_null: bool,

    primary_key: bool,
}

impl ColumnAttributes {
    /// True while at least one registered PRIMARY KEY covers the column
    pub fn primary_key(&self) -> bool {
        self.primary_key
    }

    pub(crate) fn set_primary_key(&mut self, primary_key: bool) {
        self.primary_key = primary_key;
    }
}

/// A column in a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Type descriptor
    #[serde(rename = "type")]
    pub data_type: ColumnType,

    /// Attribute flags
    pub attrs: ColumnAttributes,

    /// Owning table, set when the column is added to a table
    #[serde(skip)]
    table: Option<TableRef>,
}

impl Column {
    /// Create a detached, nullable column
    pub fn new(name: impl Into<String>, data_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            data_type,
            attrs: ColumnAttributes::default(),
            table: None,
        }
    }

    /// Set NOT NULL
    pub fn with_not_null(mut self, not_null: bool) -> Self {
        self.attrs.not_null = not_null;
        self
    }

    /// Owning table, if the column has been added to one
    pub fn table(&self) -> Option<&TableRef> {
        self.table.as_ref()
    }

    /// Qualified reference to this column, if attached
    pub fn column_ref(&self) -> Option<ColumnRef> {
        self.table.as_ref().map(|table| table.column(self.name.clone()))
    }

    pub(crate) fn attach(&mut self, table: TableRef) {
        self.table = Some(table);
    }
}

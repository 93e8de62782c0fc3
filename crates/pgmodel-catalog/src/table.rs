//! Tables: ordered collections of columns

use serde::Serialize;
use crate::collections::OrderedMap;
use crate::column::Column;
use crate::error::{CatalogError, ObjectKind};
use crate::refs::{ColumnRef, TableRef};

/// A table scoped to one schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    /// Table name
    pub name: String,

    /// Name of the owning schema
    pub schema: String,

    columns: OrderedMap<String, Column>,
}

impl Table {
    /// Create an empty table in `schema`
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: schema.into(),
            columns: OrderedMap::new(),
        }
    }

    pub fn table_ref(&self) -> TableRef {
        TableRef::new(self.schema.clone(), self.name.clone())
    }

    /// Append a column, preserving declaration order
    ///
    /// The column is attached to this table and starts without derived
    /// attributes; those come from constraints registered afterwards.
    pub fn add_column(&mut self, mut column: Column) -> Result<&Column, CatalogError> {
        let table = self.table_ref();
        let fqn = table.column(column.name.clone()).fqn();
        column.attach(table);
        column.attrs.set_primary_key(false);

        let name = column.name.clone();
        self.columns
            .add(name, column)
            .map(|column| &*column)
            .map_err(|_| CatalogError::duplicate(ObjectKind::Column, fqn))
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Mutable access for tables that are still being assembled
    ///
    /// Derived attributes stay read-only through this handle.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.get_mut(name)
    }

    /// Columns in declaration order
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// Qualified references to every column, in declaration order
    pub fn column_refs(&self) -> Vec<ColumnRef> {
        let table = self.table_ref();
        self.columns.keys().map(|name| table.column(name.clone())).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Move the table into `schema`, re-attaching every column and clearing
    /// derived attributes
    pub(crate) fn reattach(&mut self, schema: &str) {
        self.schema = schema.to_string();
        let table = self.table_ref();
        for column in self.columns.values_mut() {
            column.attach(table.clone());
            column.attrs.set_primary_key(false);
        }
    }

    pub(crate) fn remove_column(&mut self, name: &str) -> Option<Column> {
        self.columns.remove(name)
    }
}

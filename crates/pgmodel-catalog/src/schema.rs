//! Schemas: ordered collections of tables

use serde::Serialize;
use crate::collections::OrderedMap;
use crate::column::Column;
use crate::error::{CatalogError, ObjectKind};
use crate::refs::ColumnRef;
use crate::table::Table;

/// A named namespace of tables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    /// Schema name
    pub name: String,

    tables: OrderedMap<String, Table>,
}

impl Schema {
    /// Create an empty schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: OrderedMap::new(),
        }
    }

    /// Add a table, preserving declaration order
    ///
    /// The table is moved into this schema: its `schema` field and every
    /// column back-reference are rewritten, and derived column attributes
    /// are cleared until constraints are registered for it.
    pub fn add_table(&mut self, mut table: Table) -> Result<&Table, CatalogError> {
        table.reattach(&self.name);
        let fqn = table.table_ref().fqn();
        let name = table.name.clone();
        self.tables
            .add(name, table)
            .map(|table| &*table)
            .map_err(|_| CatalogError::duplicate(ObjectKind::Table, fqn))
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Tables in declaration order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub(crate) fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    pub(crate) fn remove_table(&mut self, name: &str) -> Option<Table> {
        self.tables.remove(name)
    }
}

/// Resolve a column for mutation through the schema map
pub(crate) fn column_mut<'a>(
    schemas: &'a mut OrderedMap<String, Schema>,
    column: &ColumnRef,
) -> Option<&'a mut Column> {
    schemas
        .get_mut(column.schema.as_str())?
        .table_mut(&column.table)?
        .column_mut(&column.column)
}

//! Qualified identifiers for tables and columns
//!
//! Back-references inside the catalog are held as these plain names and
//! resolved through the owning containers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a table by schema and table name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableRef {
    /// Schema name
    pub schema: String,

    /// Table name
    pub table: String,
}

impl TableRef {
    /// Create a new table reference
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Reference a column of this table
    pub fn column(&self, column: impl Into<String>) -> ColumnRef {
        ColumnRef {
            schema: self.schema.clone(),
            table: self.table.clone(),
            column: column.into(),
        }
    }

    /// Get fully qualified name
    pub fn fqn(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Identifies a column by schema, table and column name
///
/// This is the column identity used by the dependency registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Schema name
    pub schema: String,

    /// Table name
    pub table: String,

    /// Column name
    pub column: String,
}

impl ColumnRef {
    /// Create a new column reference
    pub fn new(
        schema: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            column: column.into(),
        }
    }

    /// The table this column belongs to
    pub fn table_ref(&self) -> TableRef {
        TableRef::new(self.schema.clone(), self.table.clone())
    }

    /// True if this column belongs to `table`
    pub fn belongs_to(&self, table: &TableRef) -> bool {
        self.schema == table.schema && self.table == table.table
    }

    /// Get fully qualified name
    pub fn fqn(&self) -> String {
        format!("{}.{}.{}", self.schema, self.table, self.column)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.schema, self.table, self.column)
    }
}

//! Human-readable catalog dump

use std::fmt;
use crate::catalog::Catalog;
use crate::column::Column;
use crate::constraint::Constraint;

impl Catalog {
    /// Render the catalog as an indented tree
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for schema in self.schemas() {
            writeln!(f, "schema {}", schema.name)?;
            for table in schema.tables() {
                writeln!(f, "  table {}", table.table_ref())?;
                for column in table.columns() {
                    writeln!(f, "    {}", column)?;
                }
            }
        }

        if !self.depends.is_empty() {
            writeln!(f, "constraints")?;
            for constraint in self.constraints() {
                writeln!(f, "  {}", constraint)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)?;
        if self.attrs.not_null {
            write!(f, " NOT NULL")?;
        }
        if self.attrs.primary_key() {
            write!(f, " PRIMARY KEY")?;
        }
        Ok(())
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} ({})", self.name, self.kind, self.table, self.column_list())?;
        if let Some(first) = self.refers.first() {
            let columns: Vec<&str> = self.refers.iter().map(|c| c.column.as_str()).collect();
            write!(f, " REFERENCES {} ({})", first.table_ref(), columns.join(", "))?;
        }
        write!(f, " ON DROP {}", self.drop_behaviour)
    }
}

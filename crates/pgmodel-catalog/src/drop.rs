//! Cascading drop of columns, tables and schemas
//!
//! Dropping an object first collects every constraint that depends on one of
//! the object's columns. Constraints declared inside the dropped object go
//! with it unconditionally. Every other dependent constraint is removed if its
//! drop behaviour is CASCADE, and blocks the drop if it is RESTRICT, unless
//! the caller asked for the drop to cascade. A blocked drop changes nothing.

use tracing::{debug, info};
use crate::catalog::Catalog;
use crate::column::Column;
use crate::constraint::{Constraint, DropBehaviour};
use crate::error::CatalogError;
use crate::refs::{ColumnRef, TableRef};
use crate::schema::Schema;
use crate::table::Table;

/// Result of a successful drop
#[derive(Debug, Clone, PartialEq)]
pub struct Dropped<T> {
    /// The removed object
    pub object: T,

    /// Constraints deregistered as part of the drop, in removal order
    pub constraints: Vec<Constraint>,
}

impl Catalog {
    /// Drop a column
    ///
    /// With `cascade` false, fails with `RestrictedByConstraint` while any
    /// RESTRICT constraint depends on the column.
    pub fn drop_column(&mut self, column: &ColumnRef, cascade: bool) -> Result<Dropped<Column>, CatalogError> {
        self.resolve_column(column)?;

        let target = format!("column {}", column);
        let doomed = self.plan_drop(&target, std::slice::from_ref(column), |_| false, cascade)?;
        let constraints = self.deregister_all(&doomed)?;

        let object = self
            .table_mut(&column.table_ref())?
            .remove_column(&column.column)
            .ok_or_else(|| CatalogError::UnknownColumn(column.fqn()))?;

        info!(column = %column, cascaded = constraints.len(), "dropped column");
        Ok(Dropped { object, constraints })
    }

    /// Drop a table and every constraint declared on it
    ///
    /// Constraints of other tables that reference this table follow their
    /// drop behaviour.
    pub fn drop_table(&mut self, table: &TableRef, cascade: bool) -> Result<Dropped<Table>, CatalogError> {
        let dropped = self.drop_tables(std::slice::from_ref(table), cascade)?;
        let object = dropped
            .object
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::UnknownTable(table.fqn()))?;
        Ok(Dropped { object, constraints: dropped.constraints })
    }

    /// Drop several tables as one unit
    ///
    /// Constraints declared on any table of the set go with it, so tables
    /// that only reference each other drop without CASCADE. Every table must
    /// exist; a repeated table is dropped once.
    pub fn drop_tables(&mut self, tables: &[TableRef], cascade: bool) -> Result<Dropped<Vec<Table>>, CatalogError> {
        let mut set: Vec<&TableRef> = Vec::new();
        let mut columns: Vec<ColumnRef> = Vec::new();
        for table in tables {
            if set.contains(&table) {
                continue;
            }
            columns.extend(self.resolve_table(table)?.column_refs());
            set.push(table);
        }

        let target = format!("table {}", join(&set));
        let doomed = self.plan_drop(&target, &columns, |c| set.contains(&&c.table), cascade)?;
        let constraints = self.deregister_all(&doomed)?;

        let mut object = Vec::with_capacity(set.len());
        for table in set {
            let removed = self
                .schemas
                .get_mut(table.schema.as_str())
                .and_then(|schema| schema.remove_table(&table.table))
                .ok_or_else(|| CatalogError::UnknownTable(table.fqn()))?;
            info!(table = %table, "dropped table");
            object.push(removed);
        }

        debug!(tables = object.len(), cascaded = constraints.len(), "dropped tables");
        Ok(Dropped { object, constraints })
    }

    /// Drop a schema with all of its tables
    ///
    /// Constraints declared on tables outside the schema that reference it
    /// follow their drop behaviour.
    pub fn drop_schema(&mut self, name: &str, cascade: bool) -> Result<Dropped<Schema>, CatalogError> {
        let dropped = self.drop_schemas(&[name], cascade)?;
        let object = dropped
            .object
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::UnknownSchema(name.to_string()))?;
        Ok(Dropped { object, constraints: dropped.constraints })
    }

    /// Drop several schemas as one unit
    ///
    /// Constraints declared inside any schema of the set go with it. Every
    /// schema must exist; a repeated schema is dropped once.
    pub fn drop_schemas<S: AsRef<str>>(&mut self, names: &[S], cascade: bool) -> Result<Dropped<Vec<Schema>>, CatalogError> {
        let mut set: Vec<&str> = Vec::new();
        let mut columns: Vec<ColumnRef> = Vec::new();
        for name in names {
            let name: &str = name.as_ref();
            if set.contains(&name) {
                continue;
            }
            let schema = self
                .schema(name)
                .ok_or_else(|| CatalogError::UnknownSchema(name.to_string()))?;
            columns.extend(schema.tables().flat_map(Table::column_refs));
            set.push(name);
        }

        let target = format!("schema {}", set.join(", "));
        let doomed = self.plan_drop(&target, &columns, |c| set.contains(&c.table.schema.as_str()), cascade)?;
        let constraints = self.deregister_all(&doomed)?;

        let mut object = Vec::with_capacity(set.len());
        for name in set {
            let removed = self
                .schemas
                .remove(name)
                .ok_or_else(|| CatalogError::UnknownSchema(name.to_string()))?;
            info!(schema = %name, tables = removed.table_count(), "dropped schema");
            object.push(removed);
        }

        debug!(schemas = object.len(), cascaded = constraints.len(), "dropped schemas");
        Ok(Dropped { object, constraints })
    }

    /// Names of the constraints a drop of `columns` would remove
    ///
    /// `owned` marks constraints that live inside the dropped object. Fails,
    /// naming every blocking constraint, if a RESTRICT constraint outside the
    /// object depends on it and `cascade` is false.
    fn plan_drop<F>(
        &self,
        target: &str,
        columns: &[ColumnRef],
        owned: F,
        cascade: bool,
    ) -> Result<Vec<String>, CatalogError>
    where
        F: Fn(&Constraint) -> bool,
    {
        let mut doomed: Vec<String> = Vec::new();
        let mut blocking: Vec<String> = Vec::new();

        for column in columns {
            for constraint in self.depends.dependents(column) {
                if doomed.contains(&constraint.name) || blocking.contains(&constraint.name) {
                    continue;
                }

                let removable = owned(constraint)
                    || cascade
                    || constraint.drop_behaviour == DropBehaviour::Cascade;
                if removable {
                    doomed.push(constraint.name.clone());
                } else {
                    blocking.push(constraint.name.clone());
                }
            }
        }

        if !blocking.is_empty() {
            debug!(object = %target, blocking = ?blocking, "drop restricted");
            return Err(CatalogError::RestrictedByConstraint {
                target: target.to_string(),
                constraints: blocking,
            });
        }

        Ok(doomed)
    }

    fn deregister_all(&mut self, names: &[String]) -> Result<Vec<Constraint>, CatalogError> {
        names
            .iter()
            .map(|name| self.deregister_constraint(name))
            .collect()
    }
}

fn join(tables: &[&TableRef]) -> String {
    tables.iter().map(|t| t.fqn()).collect::<Vec<_>>().join(", ")
}

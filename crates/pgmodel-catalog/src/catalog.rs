//! The catalog root: schemas plus the dependency registry

use serde::Serialize;
use tracing::debug;
use crate::collections::OrderedMap;
use crate::column::Column;
use crate::constraint::Constraint;
use crate::depends::Depends;
use crate::error::{CatalogError, ObjectKind};
use crate::refs::{ColumnRef, TableRef};
use crate::schema::Schema;
use crate::table::Table;

/// In-memory model of a database schema
///
/// All mutations go through this type so that the derived column attributes
/// and the dependency indexes stay consistent with each other. A mutation
/// that returns an error leaves the catalog unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalog {
    pub(crate) schemas: OrderedMap<String, Schema>,

    #[serde(rename = "constraints")]
    pub(crate) depends: Depends,
}

impl Catalog {
    /// Create an empty catalog with no schemas
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new, empty schema
    pub fn add_schema(&mut self, name: impl Into<String>) -> Result<&Schema, CatalogError> {
        let name = name.into();
        let schema = self
            .schemas
            .add(name.clone(), Schema::new(name.clone()))
            .map_err(|_| CatalogError::duplicate(ObjectKind::Schema, name.clone()))?;

        debug!(schema = %name, "added schema");
        Ok(&*schema)
    }

    /// Add `table` to the schema named by `table.schema`
    pub fn add_table(&mut self, table: Table) -> Result<&Table, CatalogError> {
        let table_ref = table.table_ref();
        let schema = self
            .schemas
            .get_mut(table.schema.as_str())
            .ok_or_else(|| CatalogError::UnknownSchema(table.schema.clone()))?;

        let added = schema.add_table(table)?;
        debug!(table = %table_ref, columns = added.column_count(), "added table");
        Ok(added)
    }

    /// Append a column to an existing table
    pub fn add_column(&mut self, table: &TableRef, column: Column) -> Result<&Column, CatalogError> {
        let added = self.table_mut(table)?.add_column(column)?;
        debug!(table = %table, column = %added.name, "added column");
        Ok(added)
    }

    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Schemas in creation order
    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    pub fn schema_names(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    pub fn table(&self, table: &TableRef) -> Option<&Table> {
        self.schemas.get(table.schema.as_str())?.table(&table.table)
    }

    pub fn column(&self, column: &ColumnRef) -> Option<&Column> {
        self.schemas
            .get(column.schema.as_str())?
            .table(&column.table)?
            .column(&column.column)
    }

    /// Resolve `column`, reporting the first missing level
    pub fn resolve_column(&self, column: &ColumnRef) -> Result<&Column, CatalogError> {
        self.schemas
            .get(column.schema.as_str())
            .ok_or_else(|| CatalogError::UnknownSchema(column.schema.clone()))?
            .table(&column.table)
            .ok_or_else(|| CatalogError::UnknownTable(column.table_ref().fqn()))?
            .column(&column.column)
            .ok_or_else(|| CatalogError::UnknownColumn(column.fqn()))
    }

    /// Resolve `table`, reporting the first missing level
    pub fn resolve_table(&self, table: &TableRef) -> Result<&Table, CatalogError> {
        self.schemas
            .get(table.schema.as_str())
            .ok_or_else(|| CatalogError::UnknownSchema(table.schema.clone()))?
            .table(&table.table)
            .ok_or_else(|| CatalogError::UnknownTable(table.fqn()))
    }

    pub(crate) fn table_mut(&mut self, table: &TableRef) -> Result<&mut Table, CatalogError> {
        self.schemas
            .get_mut(table.schema.as_str())
            .ok_or_else(|| CatalogError::UnknownSchema(table.schema.clone()))?
            .table_mut(&table.table)
            .ok_or_else(|| CatalogError::UnknownTable(table.fqn()))
    }

    /// Register a constraint and apply its derived column attributes
    ///
    /// The column lists must fit the constraint kind, and every column the
    /// constraint depends on must already exist.
    pub fn register_constraint(&mut self, constraint: Constraint) -> Result<&Constraint, CatalogError> {
        constraint.validate()?;
        self.resolve_table(&constraint.table)?;
        for column in constraint.depends() {
            self.resolve_column(column)?;
        }

        let registered = self.depends.register(constraint)?;
        registered.on_create(&mut self.schemas);

        debug!(
            constraint = %registered.name,
            kind = %registered.kind,
            table = %registered.table,
            "registered constraint"
        );
        Ok(registered)
    }

    /// Remove the constraint called `name` and undo its derived attributes
    pub fn deregister_constraint(&mut self, name: &str) -> Result<Constraint, CatalogError> {
        let constraint = self.depends.deregister(name)?;
        constraint.on_remove(&mut self.schemas, &self.depends);

        debug!(constraint = %constraint.name, kind = %constraint.kind, "deregistered constraint");
        Ok(constraint)
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.depends.get(name)
    }

    /// Constraints in registration order
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.depends.iter()
    }

    /// Constraints depending on `column`, through `constrains` or `refers`
    pub fn constraints_on(&self, column: &ColumnRef) -> Vec<&Constraint> {
        self.depends.dependents(column)
    }

    /// Constraints declared on `table`
    pub fn constraints_of(&self, table: &TableRef) -> Vec<&Constraint> {
        self.depends.declared_on(table)
    }

    /// The dependency registry
    pub fn depends(&self) -> &Depends {
        &self.depends
    }

    /// Serialize the catalog as pretty-printed JSON, preserving order
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

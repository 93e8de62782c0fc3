//! Constraints and their lifecycle hooks

use serde::{Deserialize, Serialize};
use crate::collections::OrderedMap;
use crate::depends::Depends;
use crate::error::CatalogError;
use crate::refs::{ColumnRef, TableRef};
use crate::schema::{self, Schema};

/// Kind of rule a constraint enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Primary,
    Unique,
    ForeignKey,
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "PRIMARY KEY"),
            Self::Unique => write!(f, "UNIQUE"),
            Self::ForeignKey => write!(f, "FOREIGN KEY"),
        }
    }
}

/// What happens to a constraint when something it depends on is dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropBehaviour {
    /// The constraint is dropped along with its dependency
    #[default]
    Cascade,

    /// The dependency cannot be dropped while the constraint exists,
    /// unless the drop explicitly cascades
    Restrict,
}

impl std::fmt::Display for DropBehaviour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cascade => write!(f, "CASCADE"),
            Self::Restrict => write!(f, "RESTRICT"),
        }
    }
}

/// A named rule over one or more columns of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// Catalog-wide unique name
    pub name: String,

    /// Table the constraint is declared on
    pub table: TableRef,

    /// Constraint kind
    pub kind: ConstraintKind,

    /// Columns the rule is defined over (never empty once registered)
    pub constrains: Vec<ColumnRef>,

    /// Referenced columns; empty unless `kind` is `ForeignKey`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refers: Vec<ColumnRef>,

    /// Behaviour when a dependency is dropped
    #[serde(default)]
    pub drop_behaviour: DropBehaviour,
}

impl Constraint {
    /// Create a constraint over columns of `table`
    pub fn new<I, S>(name: impl Into<String>, table: TableRef, kind: ConstraintKind, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let constrains = columns.into_iter().map(|c| table.column(c)).collect();
        Self {
            name: name.into(),
            table,
            kind,
            constrains,
            refers: Vec::new(),
            drop_behaviour: DropBehaviour::default(),
        }
    }

    /// PRIMARY KEY over `columns` of `table`
    pub fn primary_key<I, S>(name: impl Into<String>, table: TableRef, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, table, ConstraintKind::Primary, columns)
    }

    /// UNIQUE over `columns` of `table`
    pub fn unique<I, S>(name: impl Into<String>, table: TableRef, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, table, ConstraintKind::Unique, columns)
    }

    /// FOREIGN KEY from `columns` of `table` to `ref_columns` of `ref_table`
    pub fn foreign_key<I, S, J, T>(
        name: impl Into<String>,
        table: TableRef,
        columns: I,
        ref_table: &TableRef,
        ref_columns: J,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        J: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut constraint = Self::new(name, table, ConstraintKind::ForeignKey, columns);
        constraint.refers = ref_columns.into_iter().map(|c| ref_table.column(c)).collect();
        constraint
    }

    /// Set drop behaviour
    pub fn with_drop_behaviour(mut self, drop_behaviour: DropBehaviour) -> Self {
        self.drop_behaviour = drop_behaviour;
        self
    }

    /// Every column this constraint depends on: `constrains` then `refers`
    ///
    /// A column present in both lists is yielded twice.
    pub fn depends(&self) -> impl Iterator<Item = &ColumnRef> {
        self.constrains.iter().chain(self.refers.iter())
    }

    /// True if `column` is one of the constrained columns
    pub fn covers(&self, column: &ColumnRef) -> bool {
        self.constrains.contains(column)
    }

    /// Constrained column names, comma separated
    pub fn column_list(&self) -> String {
        self.constrains
            .iter()
            .map(|c| c.column.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Check that the column lists fit the constraint kind
    ///
    /// `constrains` must be non-empty and lie within `table`. Only a foreign
    /// key has `refers`, pairing one referenced column of a single table with
    /// each constrained column.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.constrains.is_empty() {
            return Err(CatalogError::EmptyConstraintColumnSet(self.name.clone()));
        }
        if let Some(stray) = self.constrains.iter().find(|c| !c.belongs_to(&self.table)) {
            return Err(CatalogError::malformed(
                &self.name,
                format!("column {} is not in table {}", stray, self.table),
            ));
        }

        match self.kind {
            ConstraintKind::Primary | ConstraintKind::Unique => {
                if !self.refers.is_empty() {
                    return Err(CatalogError::malformed(
                        &self.name,
                        format!("{} cannot reference other columns", self.kind),
                    ));
                }
            }
            ConstraintKind::ForeignKey => {
                let Some(first) = self.refers.first() else {
                    return Err(CatalogError::malformed(&self.name, "no referenced columns"));
                };
                if self.refers.len() != self.constrains.len() {
                    return Err(CatalogError::malformed(
                        &self.name,
                        format!(
                            "{} referencing columns but {} referenced columns",
                            self.constrains.len(),
                            self.refers.len()
                        ),
                    ));
                }
                let target = first.table_ref();
                if let Some(stray) = self.refers.iter().find(|c| !c.belongs_to(&target)) {
                    return Err(CatalogError::malformed(
                        &self.name,
                        format!("referenced column {} is not in table {}", stray, target),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Set the derived column attributes this constraint implies
    pub(crate) fn on_create(&self, schemas: &mut OrderedMap<String, Schema>) {
        match self.kind {
            ConstraintKind::Primary => {
                for column in &self.constrains {
                    if let Some(column) = schema::column_mut(schemas, column) {
                        column.attrs.set_primary_key(true);
                    }
                }
            }
            ConstraintKind::Unique | ConstraintKind::ForeignKey => {}
        }
    }

    /// Clear derived attributes once the constraint has left `depends`
    ///
    /// A column stays a primary key column while any other registered
    /// PRIMARY KEY still covers it.
    pub(crate) fn on_remove(&self, schemas: &mut OrderedMap<String, Schema>, depends: &Depends) {
        match self.kind {
            ConstraintKind::Primary => {
                for column_ref in &self.constrains {
                    if depends.is_primary_key(column_ref) {
                        continue;
                    }
                    if let Some(column) = schema::column_mut(schemas, column_ref) {
                        column.attrs.set_primary_key(false);
                    }
                }
            }
            ConstraintKind::Unique | ConstraintKind::ForeignKey => {}
        }
    }
}

//! Dependency registry
//!
//! Tracks which constraints depend on which columns, and owns every
//! registered constraint by name.
//!
//! Two indexes are kept in lockstep:
//! - column -> names of the constraints depending on it (`constrains` then `refers`)
//! - constraint name -> constraint, in registration order

use serde::Serialize;
use crate::collections::{Multimap, OrderedMap};
use crate::constraint::{Constraint, ConstraintKind};
use crate::error::CatalogError;
use crate::refs::{ColumnRef, TableRef};

/// Column and name indexes over the registered constraints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Depends {
    #[serde(skip)]
    constraints_by_column: Multimap<ColumnRef, String>,

    constraints_by_name: OrderedMap<String, Constraint>,
}

impl Depends {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `constraint` under its name and every column it depends on
    ///
    /// Fails without touching either index if the name is taken or the
    /// constraint's column lists do not fit its kind.
    pub fn register(&mut self, constraint: Constraint) -> Result<&Constraint, CatalogError> {
        constraint.validate()?;

        let name = constraint.name.clone();
        let registered = self
            .constraints_by_name
            .add(name.clone(), constraint)
            .map_err(|_| CatalogError::DuplicateConstraintName(name.clone()))?;

        for column in registered.depends() {
            self.constraints_by_column.add(column.clone(), name.clone());
        }

        Ok(&*registered)
    }

    /// Remove the constraint called `name` from both indexes
    ///
    /// Only this constraint's column associations are removed; other
    /// constraints on the same columns keep theirs.
    pub fn deregister(&mut self, name: &str) -> Result<Constraint, CatalogError> {
        let constraint = self
            .constraints_by_name
            .remove(name)
            .ok_or_else(|| CatalogError::UnknownConstraint(name.to_string()))?;

        for column in constraint.depends() {
            self.constraints_by_column.remove(column, &constraint.name);
        }

        Ok(constraint)
    }

    pub fn get(&self, name: &str) -> Option<&Constraint> {
        self.constraints_by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constraints_by_name.contains_key(name)
    }

    /// Constraints in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints_by_name.values()
    }

    /// Raw index entry for `column`: one name per dependency occurrence
    pub fn dependent_names(&self, column: &ColumnRef) -> &[String] {
        self.constraints_by_column.get(column)
    }

    /// Distinct constraints depending on `column`, in registration order of
    /// the dependency
    pub fn dependents(&self, column: &ColumnRef) -> Vec<&Constraint> {
        let mut found: Vec<&Constraint> = Vec::new();
        for name in self.constraints_by_column.get(column) {
            if found.iter().any(|c| &c.name == name) {
                continue;
            }
            if let Some(constraint) = self.constraints_by_name.get(name.as_str()) {
                found.push(constraint);
            }
        }
        found
    }

    /// Constraints declared on `table`
    pub fn declared_on(&self, table: &TableRef) -> Vec<&Constraint> {
        self.iter().filter(|c| &c.table == table).collect()
    }

    /// True if any registered PRIMARY KEY covers `column`
    pub fn is_primary_key(&self, column: &ColumnRef) -> bool {
        self.dependents(column)
            .iter()
            .any(|c| c.kind == ConstraintKind::Primary && c.covers(column))
    }

    pub fn len(&self) -> usize {
        self.constraints_by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints_by_name.is_empty()
    }
}

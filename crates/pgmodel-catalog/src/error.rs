//! Catalog error taxonomy

use std::fmt;

/// Kind of namespace object, for duplicate-name reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Schema,
    Table,
    Column,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema => write!(f, "Schema"),
            Self::Table => write!(f, "Table"),
            Self::Column => write!(f, "Column"),
        }
    }
}

/// Errors returned by catalog mutations
///
/// Every variant is recoverable: a failed call leaves the catalog exactly as
/// it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("{kind} already exists: {name}")]
    DuplicateName { kind: ObjectKind, name: String },

    #[error("Schema not found: {0}")]
    UnknownSchema(String),

    #[error("Table not found: {0}")]
    UnknownTable(String),

    #[error("Column not found: {0}")]
    UnknownColumn(String),

    #[error("Constraint already exists: {0}")]
    DuplicateConstraintName(String),

    #[error("Constraint not found: {0}")]
    UnknownConstraint(String),

    #[error("Constraint {0} does not constrain any column")]
    EmptyConstraintColumnSet(String),

    #[error("Malformed constraint {name}: {reason}")]
    MalformedConstraint { name: String, reason: String },

    #[error("Cannot drop {target}: required by {}", .constraints.join(", "))]
    RestrictedByConstraint {
        target: String,
        constraints: Vec<String>,
    },
}

impl CatalogError {
    pub(crate) fn duplicate(kind: ObjectKind, name: impl Into<String>) -> Self {
        Self::DuplicateName {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedConstraint {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

//! Identifier folding and object name resolution
//!
//! Unquoted identifiers fold to lower case the way PostgreSQL does; quoted
//! identifiers keep their spelling.

use sqlparser::ast::{Ident, ObjectName};
use pgmodel_catalog::TableRef;
use crate::error::CompileError;

/// Normalise a single identifier
pub fn ident(ident: &Ident) -> String {
    if ident.quote_style.is_some() {
        ident.value.clone()
    } else {
        ident.value.to_lowercase()
    }
}

/// Normalise a list of identifiers, e.g. a constraint column list
pub fn idents(idents: &[Ident]) -> Vec<String> {
    idents.iter().map(ident).collect()
}

/// Resolve `[database.][schema.]table`
///
/// A bare table name lives in `default_schema`. A leading database name is
/// accepted and ignored.
pub fn table_ref(name: &ObjectName, default_schema: &str) -> Result<TableRef, CompileError> {
    match name.0.as_slice() {
        [table] => Ok(TableRef::new(default_schema, ident(table))),
        [schema, table] | [_, schema, table] => Ok(TableRef::new(ident(schema), ident(table))),
        _ => Err(CompileError::InvalidName(name.to_string())),
    }
}

/// Resolve `[database.]schema`
pub fn schema_name(name: &ObjectName) -> Result<String, CompileError> {
    match name.0.as_slice() {
        [schema] | [_, schema] => Ok(ident(schema)),
        _ => Err(CompileError::InvalidName(name.to_string())),
    }
}

//! Compile errors and their diagnostic codes

use sqlparser::parser::ParserError;
use pgmodel_catalog::CatalogError;
use pgmodel_core::DiagnosticCode;

/// Reasons a statement could not be applied to the catalog
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Unsupported statement: {0}")]
    UnsupportedStatement(String),

    #[error("Invalid object name: {0}")]
    InvalidName(String),

    #[error("Invalid foreign key {name}: {reason}")]
    InvalidForeignKey { name: String, reason: String },

    #[error("Failed to parse SQL: {0}")]
    Parse(#[from] ParserError),
}

impl CompileError {
    /// Stable diagnostic code for this error
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Self::Catalog(err) => catalog_code(err),
            Self::UnsupportedStatement(_) => DiagnosticCode::SqlUnsupportedStatement,
            Self::InvalidName(_) => DiagnosticCode::SqlInvalidName,
            Self::InvalidForeignKey { .. } => DiagnosticCode::InvalidForeignKey,
            Self::Parse(_) => DiagnosticCode::SqlParseError,
        }
    }
}

fn catalog_code(err: &CatalogError) -> DiagnosticCode {
    match err {
        CatalogError::DuplicateName { .. } => DiagnosticCode::DuplicateName,
        CatalogError::UnknownSchema(_) => DiagnosticCode::UnknownSchema,
        CatalogError::UnknownTable(_) => DiagnosticCode::UnknownTable,
        CatalogError::UnknownColumn(_) => DiagnosticCode::UnknownColumn,
        CatalogError::DuplicateConstraintName(_) => DiagnosticCode::DuplicateConstraintName,
        CatalogError::UnknownConstraint(_) => DiagnosticCode::UnknownConstraint,
        CatalogError::EmptyConstraintColumnSet(_) => DiagnosticCode::EmptyConstraintColumnSet,
        CatalogError::MalformedConstraint { .. } => DiagnosticCode::MalformedConstraint,
        CatalogError::RestrictedByConstraint { .. } => DiagnosticCode::RestrictedByConstraint,
    }
}

//! Diagnostic codes and error reporting
//!
//! IMPORTANT: Diagnostic codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Diagnostic code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Namespace errors (1xxx)
    /// A schema, table or column name is already taken in its scope
    DuplicateName,

    /// Referenced schema does not exist
    UnknownSchema,

    /// Referenced table does not exist
    UnknownTable,

    /// Referenced column does not exist
    UnknownColumn,

    // Constraint errors (2xxx)
    /// Constraint name is already registered in the catalog
    DuplicateConstraintName,

    /// Referenced constraint is not registered
    UnknownConstraint,

    /// Constraint declared over zero columns
    EmptyConstraintColumnSet,

    /// Drop refused because a RESTRICT constraint depends on the target
    RestrictedByConstraint,

    /// Foreign key column lists do not line up with the referenced key
    InvalidForeignKey,

    /// Constraint column lists do not fit the constraint kind
    MalformedConstraint,

    // SQL front end (3xxx)
    /// Failed to parse SQL
    SqlParseError,

    /// Statement is outside the compiler's repertoire
    SqlUnsupportedStatement,

    /// Object name has an unexpected number of parts
    SqlInvalidName,

    /// Statement was a no-op (e.g. IF NOT EXISTS on an existing object)
    SqlStatementSkipped,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateName => "DUPLICATE_NAME",
            Self::UnknownSchema => "UNKNOWN_SCHEMA",
            Self::UnknownTable => "UNKNOWN_TABLE",
            Self::UnknownColumn => "UNKNOWN_COLUMN",
            Self::DuplicateConstraintName => "DUPLICATE_CONSTRAINT_NAME",
            Self::UnknownConstraint => "UNKNOWN_CONSTRAINT",
            Self::EmptyConstraintColumnSet => "EMPTY_CONSTRAINT_COLUMN_SET",
            Self::RestrictedByConstraint => "RESTRICTED_BY_CONSTRAINT",
            Self::InvalidForeignKey => "INVALID_FOREIGN_KEY",
            Self::MalformedConstraint => "MALFORMED_CONSTRAINT",
            Self::SqlParseError => "SQL_PARSE_ERROR",
            Self::SqlUnsupportedStatement => "SQL_UNSUPPORTED_STATEMENT",
            Self::SqlInvalidName => "SQL_INVALID_NAME",
            Self::SqlStatementSkipped => "SQL_STATEMENT_SKIPPED",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - statement was skipped but compilation continued
    Warn,

    /// Error - statement could not be applied
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Source location in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// File path as given on the command line
    pub file: String,

    /// Optional line number (1-indexed)
    pub line: Option<usize>,

    /// Optional column number (1-indexed)
    pub column: Option<usize>,
}

impl Location {
    /// Create a new location with just a file path
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: None,
            column: None,
        }
    }

    /// Create a location with file and line number
    pub fn with_line(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line: Some(line),
            column: None,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(f, "{}:{}:{}", self.file, line, column),
            (Some(line), None) => write!(f, "{}:{}", self.file, line),
            _ => write!(f, "{}", self.file),
        }
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Source location (best-effort)
    pub location: Option<Location>,

    /// Zero-based index of the offending statement within its file
    pub statement: Option<usize>,
}

impl Diagnostic {
    /// Create a new diagnostic with minimal fields
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            location: None,
            statement: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the statement index
    pub fn with_statement(mut self, index: usize) -> Self {
        self.statement = Some(index);
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.severity, self.code)?;
        if let Some(location) = &self.location {
            write!(f, " {}", location)?;
        }
        if let Some(index) = self.statement {
            write!(f, " (statement {})", index + 1)?;
        }
        write!(f, ": {}", self.message)
    }
}

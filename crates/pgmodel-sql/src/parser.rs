//! DDL parsing using datafusion-sqlparser-rs
//!
//! Parses SQL text into statements and turns parser failures into diagnostics.

use sqlparser::ast::Statement;
use sqlparser::dialect::{AnsiDialect, Dialect, GenericDialect, PostgreSqlDialect};
use sqlparser::parser::{Parser, ParserError};
use pgmodel_core::{DialectConfig, Diagnostic, DiagnosticCode, Location, Severity};
use std::path::{Path, PathBuf};

/// SQL parser with configurable dialect
pub struct SqlParser {
    dialect: Box<dyn Dialect>,
}

impl SqlParser {
    /// Create a new SQL parser with the PostgreSQL dialect
    pub fn new() -> Self {
        Self::postgres()
    }

    /// Create a SQL parser for PostgreSQL
    pub fn postgres() -> Self {
        Self {
            dialect: Box::new(PostgreSqlDialect {}),
        }
    }

    /// Create a SQL parser accepting the union of supported dialects
    pub fn generic() -> Self {
        Self {
            dialect: Box::new(GenericDialect {}),
        }
    }

    /// Create a SQL parser for strict ANSI SQL
    pub fn ansi() -> Self {
        Self {
            dialect: Box::new(AnsiDialect {}),
        }
    }

    /// Create a parser from a dialect config
    pub fn from_dialect(dialect: &DialectConfig) -> Self {
        match dialect {
            DialectConfig::Postgres => Self::postgres(),
            DialectConfig::Generic => Self::generic(),
            DialectConfig::Ansi => Self::ansi(),
        }
    }

    /// Parse SQL string into statements
    pub fn parse(&self, sql: &str, file_path: Option<&Path>) -> Result<ParsedSql, ParseError> {
        match Parser::parse_sql(&*self.dialect, sql) {
            Ok(statements) => Ok(ParsedSql {
                statements,
                file_path: file_path.map(Path::to_path_buf),
            }),
            Err(error) => Err(ParseError {
                error,
                file_path: file_path.map(Path::to_path_buf),
            }),
        }
    }

    /// Parse SQL from a file
    pub fn parse_file(&self, path: &Path) -> Result<ParsedSql, ParseError> {
        let sql = std::fs::read_to_string(path).map_err(|e| ParseError {
            error: ParserError::ParserError(format!("Failed to read file: {}", e)),
            file_path: Some(path.to_path_buf()),
        })?;

        self.parse(&sql, Some(path))
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Successfully parsed SQL
#[derive(Debug, Clone)]
pub struct ParsedSql {
    /// Parsed statements in source order
    pub statements: Vec<Statement>,

    /// Source file path (if parsed from file)
    pub file_path: Option<PathBuf>,
}

impl ParsedSql {
    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    /// Location used for diagnostics raised by these statements
    pub fn location(&self) -> Option<Location> {
        self.file_path
            .as_ref()
            .map(|path| Location::new(path.display().to_string()))
    }
}

/// SQL parsing error with diagnostic information
#[derive(Debug)]
pub struct ParseError {
    /// Parser error from sqlparser
    pub error: ParserError,

    /// Source file path
    pub file_path: Option<PathBuf>,
}

impl ParseError {
    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::new(
            DiagnosticCode::SqlParseError,
            Severity::Error,
            format!("Failed to parse SQL: {}", self.error),
        );

        if let Some(path) = &self.file_path {
            let mut location = Location::new(path.display().to_string());
            if let Some((line, column)) = self.position() {
                location.line = Some(line);
                location.column = Some(column);
            }
            diag = diag.with_location(location);
        }

        diag
    }

    /// Line and column of the failure, when the parser reported one
    ///
    /// sqlparser appends `at Line: N, Column: M` to its messages.
    pub fn position(&self) -> Option<(usize, usize)> {
        let message = self.error.to_string();
        let tail = &message[message.rfind("Line: ")? + "Line: ".len()..];
        let (line, rest) = tail.split_once(", Column: ")?;
        let column: String = rest.chars().take_while(char::is_ascii_digit).collect();
        Some((line.trim().parse().ok()?, column.parse().ok()?))
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.file_path {
            Some(path) => write!(f, "SQL parse error in {}: {}", path.display(), self.error),
            None => write!(f, "SQL parse error: {}", self.error),
        }
    }
}

impl std::error::Error for ParseError {}

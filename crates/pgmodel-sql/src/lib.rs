//! SQL front end
//!
//! This crate handles:
//! - Parsing DDL using datafusion-sqlparser-rs
//! - Folding identifiers and resolving object names
//! - Compiling CREATE/ALTER/DROP statements into a `pgmodel_catalog::Catalog`
//! - Turning failures into diagnostics for the compile report

pub mod parser;
pub mod names;
pub mod error;
pub mod compiler;

pub use parser::{SqlParser, ParsedSql, ParseError};
pub use error::CompileError;
pub use compiler::{Compiler, CompileOutcome};

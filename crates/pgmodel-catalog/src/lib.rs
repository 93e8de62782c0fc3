//! Semantic catalog for compiled DDL
//!
//! This crate models a database schema in memory:
//! - Ordered namespaces: catalog -> schema -> table -> column
//! - Constraints (primary key, unique, foreign key) with drop behaviour
//! - A dependency registry mapping columns to the constraints that use them
//! - Cascading and restricted drops driven by that registry
//!
//! ## Example
//!
//! ```rust
//! use pgmodel_catalog::{Catalog, Column, ColumnType, Constraint, Table, TableRef};
//!
//! let mut catalog = Catalog::new();
//! catalog.add_schema("public")?;
//!
//! let mut users = Table::new("public", "users");
//! users.add_column(Column::new("id", ColumnType::new("INTEGER")))?;
//! catalog.add_table(users)?;
//!
//! let users = TableRef::new("public", "users");
//! catalog.register_constraint(Constraint::primary_key("users_pkey", users.clone(), ["id"]))?;
//! assert!(catalog.column(&users.column("id")).unwrap().attrs.primary_key());
//! # Ok::<(), pgmodel_catalog::CatalogError>(())
//! ```

pub mod collections;
pub mod error;
pub mod refs;
pub mod column;
pub mod table;
pub mod schema;
pub mod constraint;
pub mod depends;
pub mod catalog;
pub mod drop;
mod render;

pub use collections::{DuplicateKey, Multimap, OrderedMap};
pub use error::{CatalogError, ObjectKind};
pub use refs::{ColumnRef, TableRef};
pub use column::{Column, ColumnAttributes, ColumnType};
pub use table::Table;
pub use schema::Schema;
pub use constraint::{Constraint, ConstraintKind, DropBehaviour};
pub use depends::Depends;
pub use catalog::Catalog;
pub use drop::Dropped;

//! Deterministic containers backing the catalog
//!
//! Both containers iterate in insertion order so that catalog dumps are
//! reproducible from run to run.

pub mod ordered_map;
pub mod multimap;

pub use ordered_map::{DuplicateKey, OrderedMap};
pub use multimap::Multimap;

//! Rowsearch Core: shared types, storage collaborator traits and errors.
//!
//! This crate provides the foundational types used across all rowsearch
//! crates. It has no internal rowsearch dependencies.
//!
//! # Modules
//!
//! - [`error`]: Error taxonomy and Result alias
//! - [`value`]: Tagged storage values and column types
//! - [`key`]: Partitioners, tokens and decorated keys
//! - [`row`]: Columns, rows, mutations and table metadata
//! - [`store`]: The `RowStore` read-through contract and `MemoryStore`

pub mod error;
pub mod key;
pub mod row;
pub mod store;
pub mod value;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use key::{DecoratedKey, Partitioner, Token};
pub use row::{Column, ColumnDefinition, DeletionInfo, Mutation, Row, TableMetadata};
pub use store::{MemoryStore, RowStore};
pub use value::{CellType, Value};

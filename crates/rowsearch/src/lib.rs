//! Rowsearch umbrella crate.
//!
//! Re-exports the rowsearch components under short module names. The
//! Tantivy backend is behind the `index-tantivy` feature, on by default.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use rowsearch::core::{CellType, Column, MemoryStore, Mutation, Partitioner, TableMetadata};
//! use rowsearch::service::{IndexConfig, RowService, TokenRange};
//!
//! # fn main() -> rowsearch::core::Result<()> {
//! let config = IndexConfig::from_json(r#"{"schema": {"fields": {"bio": {"type": "text"}}}}"#)?;
//! let table = TableMetadata::new("users").with_column("bio", CellType::Text);
//! let store = Arc::new(MemoryStore::new(Partitioner::Murmur3));
//! let service = RowService::with_default_backend(config, table, store.clone())?;
//!
//! let mutation = Mutation::upsert(vec![Column::new("bio", "Writes Rust", 1)]);
//! store.apply(b"user:1", &mutation)?;
//! service.index(b"user:1", &mutation, 1)?;
//!
//! let query = service.schema().match_query("bio", "rust")?;
//! let rows = service.search(&query, &TokenRange::all(), 10, 1)?;
//! assert_eq!(rows.len(), 1);
//! # Ok(())
//! # }
//! ```

pub use rowsearch_core as core;
pub use rowsearch_index as index;
pub use rowsearch_mapping as mapping;
pub use rowsearch_service as service;

//! Row service for rowsearch.
//!
//! Keeps a search index consistent with mutations of a column-family store,
//! scopes searches to token ranges and rebuilds result rows with an
//! injected relevance score.
//!
//! # Features
//!
//! - `index-tantivy`: Enable the Tantivy backend (default)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    rowsearch-service                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RowService                                                 │
//! │  ├── index / index_batch / delete   (write path)            │
//! │  └── search / row                   (read path)             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TokenMapper (token ↔ `_token`, range filters, token sort)  │
//! │  PartitionKeyMapper (key ↔ `_partition_key` term)           │
//! │  RowComparator (token order, score order)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  IndexConfig (score column, schema, engine settings)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use rowsearch_service::{IndexConfig, RowService, TokenRange};
//!
//! let config = IndexConfig::from_json(r#"{"schema": {"fields": {"price": {"type": "float"}}}}"#)?;
//! let service = RowService::with_default_backend(config, table, store)?;
//!
//! service.index(b"user:1", &mutation, now)?;
//! let rows = service.search(&query, &TokenRange::all(), 10, now)?;
//! ```

pub mod comparator;
pub mod config;
pub mod key;
pub mod row_service;
pub mod token;

// Re-exports
pub use comparator::{RowComparator, ScoreRowComparator, TokenRowComparator};
pub use config::IndexConfig;
pub use key::PartitionKeyMapper;
pub use row_service::{BatchReport, IndexOutcome, RowService};
pub use token::{TokenMapper, TokenRange};

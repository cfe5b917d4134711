//! Search engine layer for rowsearch.
//!
//! This crate defines the engine-neutral document and query model, the
//! `IndexBackend` trait, and two backends: a linear-scan `MemoryIndex` and
//! a Tantivy inverted index (feature-gated).
//!
//! # Features
//!
//! - `index-tantivy`: Enable the Tantivy backend (default)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     rowsearch-index                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  IndexBackend trait                                         │
//! │  ├── MemoryIndex (linear scan, reference semantics)         │
//! │  └── TantivyIndex (inverted index with Tantivy)             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  FieldSpec / FieldValue / IndexDocument / Term              │
//! │  Query (term, range, match, boolean, boost) / Sort          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TantivySchema (field specs to Tantivy field options)       │
//! │  IndexSettings (backend, path, writer budget, auto commit)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use rowsearch_index::{open_backend, FieldKind, FieldSpec, IndexSettings, Query, Sort};
//!
//! let specs = vec![FieldSpec::new("_partition_key", FieldKind::Keyword).stored()];
//! let backend = open_backend(&IndexSettings::default(), &specs)?;
//!
//! let hits = backend.search(&Query::All, None, &Sort::relevance(), &load, 10)?;
//! ```

// Core modules (always available)
pub mod backend;
pub mod document;
pub mod query;
pub mod types;

// Feature-gated Tantivy modules
#[cfg(feature = "index-tantivy")]
pub mod schema;

#[cfg(feature = "index-tantivy")]
pub mod tantivy_index;

// Re-exports
pub use backend::{IndexBackend, MemoryIndex, open_backend};
pub use document::{
    FieldKind, FieldSpec, FieldValue, IndexDocument, IndexField, ScoredDocument, Term,
};
pub use query::{Query, Sort, SortCriterion, analyze};
pub use types::IndexSettings;

#[cfg(feature = "index-tantivy")]
pub use schema::TantivySchema;

#[cfg(feature = "index-tantivy")]
pub use tantivy_index::TantivyIndex;

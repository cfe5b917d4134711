//! Column mapping for rowsearch.
//!
//! Bridges the storage column type system to index field types. Each index
//! field is backed by one [`ColumnMapper`]; a [`Schema`] names them, checks
//! them against the indexed table and turns rows into index fields.
//!
//! # Mappers
//!
//! | Type | Accepts | Index field |
//! |------|---------|-------------|
//! | `integer` | text, numbers | Long (32-bit range) |
//! | `long` | text, numbers | Long |
//! | `float` | text, numbers | Double (32-bit precision) |
//! | `double` | text, numbers | Double |
//! | `string` | text, numbers, booleans | Keyword |
//! | `text` | text | Text (analyzed) |
//! | `boolean` | text, booleans | Keyword |
//! | `blob` | text, blobs | Keyword (lower-case hex) |
//!
//! # Example
//!
//! ```rust,ignore
//! use rowsearch_mapping::Schema;
//!
//! let schema: Schema = serde_json::from_str(r#"{"fields": {"price": {"type": "float"}}}"#)?;
//! schema.validate(&table)?;
//!
//! let mut document = IndexDocument::new();
//! schema.add_fields(&mut document, &table, &row)?;
//! ```

pub mod blob;
pub mod keyword;
pub mod mapper;
pub mod numeric;
pub mod schema;

// Re-exports
pub use blob::BlobMapper;
pub use keyword::{BooleanMapper, KeywordNormalizer, StringMapper, TextMapper};
pub use mapper::{ColumnMapper, ColumnMapperKind};
pub use numeric::{DoubleMapper, FloatMapper, IntegerMapper, LongMapper};
pub use schema::{PARTITION_KEY_FIELD, RESERVED_FIELDS, Schema, TOKEN_FIELD};

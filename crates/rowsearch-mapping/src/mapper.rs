//! The column mapper contract and the closed set of mapper variants.
//!
//! A mapper bridges one storage column to one index field. Mappers are
//! decoded from the index definition with a `"type"` tag:
//!
//! ```json
//! { "type": "float", "boost": 2.0 }
//! ```

use rowsearch_core::{CellType, Result, Value};
use rowsearch_index::{FieldSpec, FieldValue, IndexField, SortCriterion};
use serde::{Deserialize, Serialize};

use crate::blob::BlobMapper;
use crate::keyword::{BooleanMapper, StringMapper, TextMapper};
use crate::numeric::{DoubleMapper, FloatMapper, IntegerMapper, LongMapper};

/// Bridge between a storage column and an index field.
pub trait ColumnMapper {
    /// Coerce a raw storage value to the field's index value.
    ///
    /// `None` in gives `None` out, and the field is left out of the document.
    /// With `validate` set the input is treated as untrusted and checked in
    /// full; without it the mapper takes its fast path for values it produced
    /// itself.
    fn to_index_value(
        &self,
        field: &str,
        raw: Option<&Value>,
        validate: bool,
    ) -> Result<Option<FieldValue>>;

    /// Index fields holding `value`.
    fn build_fields(&self, field: &str, value: &FieldValue) -> Vec<IndexField> {
        vec![IndexField::new(field, value.clone())]
    }

    /// Sort criterion over the field.
    fn sort_criterion(&self, field: &str, reverse: bool) -> SortCriterion {
        SortCriterion {
            field: field.to_string(),
            reverse,
        }
    }

    /// Returns whether a column of `cell_type` can feed this mapper.
    fn accepts_storage_type(&self, cell_type: CellType) -> bool;

    /// Declaration of the field for engines that need it up front.
    fn field_spec(&self, field: &str) -> FieldSpec;

    /// Query-time score multiplier.
    fn boost(&self) -> f32 {
        1.0
    }
}

pub(crate) fn default_boost() -> f32 {
    1.0
}

/// Any supported column mapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnMapperKind {
    /// 32-bit integer field.
    Integer(IntegerMapper),
    /// 64-bit integer field.
    Long(LongMapper),
    /// 32-bit floating point field.
    Float(FloatMapper),
    /// 64-bit floating point field.
    Double(DoubleMapper),
    /// Exact-match keyword field.
    String(StringMapper),
    /// Analyzed full-text field.
    Text(TextMapper),
    /// Boolean keyword field.
    Boolean(BooleanMapper),
    /// Hex-encoded binary field.
    Blob(BlobMapper),
}

impl ColumnMapperKind {
    /// Variant name, as written in the `"type"` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnMapperKind::Integer(_) => "integer",
            ColumnMapperKind::Long(_) => "long",
            ColumnMapperKind::Float(_) => "float",
            ColumnMapperKind::Double(_) => "double",
            ColumnMapperKind::String(_) => "string",
            ColumnMapperKind::Text(_) => "text",
            ColumnMapperKind::Boolean(_) => "boolean",
            ColumnMapperKind::Blob(_) => "blob",
        }
    }

    fn as_mapper(&self) -> &dyn ColumnMapper {
        match self {
            ColumnMapperKind::Integer(m) => m,
            ColumnMapperKind::Long(m) => m,
            ColumnMapperKind::Float(m) => m,
            ColumnMapperKind::Double(m) => m,
            ColumnMapperKind::String(m) => m,
            ColumnMapperKind::Text(m) => m,
            ColumnMapperKind::Boolean(m) => m,
            ColumnMapperKind::Blob(m) => m,
        }
    }
}

impl ColumnMapper for ColumnMapperKind {
    fn to_index_value(
        &self,
        field: &str,
        raw: Option<&Value>,
        validate: bool,
    ) -> Result<Option<FieldValue>> {
        self.as_mapper().to_index_value(field, raw, validate)
    }

    fn build_fields(&self, field: &str, value: &FieldValue) -> Vec<IndexField> {
        self.as_mapper().build_fields(field, value)
    }

    fn sort_criterion(&self, field: &str, reverse: bool) -> SortCriterion {
        self.as_mapper().sort_criterion(field, reverse)
    }

    fn accepts_storage_type(&self, cell_type: CellType) -> bool {
        self.as_mapper().accepts_storage_type(cell_type)
    }

    fn field_spec(&self, field: &str) -> FieldSpec {
        self.as_mapper().field_spec(field)
    }

    fn boost(&self) -> f32 {
        self.as_mapper().boost()
    }
}

macro_rules! impl_from_mapper {
    ($($mapper:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$mapper> for ColumnMapperKind {
                fn from(mapper: $mapper) -> Self {
                    ColumnMapperKind::$variant(mapper)
                }
            }
        )*
    };
}

impl_from_mapper!(
    IntegerMapper => Integer,
    LongMapper => Long,
    FloatMapper => Float,
    DoubleMapper => Double,
    StringMapper => String,
    TextMapper => Text,
    BooleanMapper => Boolean,
    BlobMapper => Blob,
);

// ============================================================================
// Tests
// ============================================================================

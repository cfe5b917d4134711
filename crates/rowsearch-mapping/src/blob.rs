//! Binary column mapper.
//!
//! Blobs are indexed as lower-case hex keywords. The checked path decodes
//! and re-encodes hex text so casing is normalized and malformed input is
//! rejected; the fast path only strips the `0x` prefix and lower-cases.

use rowsearch_core::{CellType, Error, Result, Value};
use rowsearch_index::{FieldKind, FieldSpec, FieldValue};
use serde::{Deserialize, Serialize};

use crate::keyword::KeywordNormalizer;
use crate::mapper::{ColumnMapper, default_boost};

/// Maps binary values to a hex keyword field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobMapper {
    /// Query-time score multiplier.
    #[serde(default = "default_boost")]
    pub boost: f32,
    #[serde(skip)]
    normalizer: KeywordNormalizer,
}

impl BlobMapper {
    /// Create a blob mapper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Blob mapper with a query-time boost.
    pub fn with_boost(boost: f32) -> Self {
        Self {
            boost,
            ..Self::default()
        }
    }
}

impl Default for BlobMapper {
    fn default() -> Self {
        Self {
            boost: default_boost(),
            normalizer: KeywordNormalizer::default(),
        }
    }
}

fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

impl ColumnMapper for BlobMapper {
    fn to_index_value(
        &self,
        field: &str,
        raw: Option<&Value>,
        validate: bool,
    ) -> Result<Option<FieldValue>> {
        let Some(raw) = raw else { return Ok(None) };
        if !validate {
            let text = self.normalizer.normalize(&raw.to_string());
            return Ok(Some(FieldValue::Keyword(strip_hex_prefix(&text).to_string())));
        }
        let hex = match raw {
            Value::Blob(bytes) => hex::encode(bytes),
            Value::Text(text) => {
                let bytes = hex::decode(strip_hex_prefix(text.trim())).map_err(|e| {
                    let message =
                        format!("Field \"{field}\" requires hex bytes, but found \"{text}\": {e}");
                    Error::validation(field, message)
                })?;
                hex::encode(bytes)
            }
            other => return Err(Error::type_mismatch(field, other)),
        };
        Ok(Some(FieldValue::Keyword(hex)))
    }

    fn accepts_storage_type(&self, cell_type: CellType) -> bool {
        cell_type.is_text() || cell_type == CellType::Blob
    }

    fn field_spec(&self, field: &str) -> FieldSpec {
        FieldSpec::new(field, FieldKind::Keyword).sortable()
    }

    fn boost(&self) -> f32 {
        self.boost
    }
}

// ============================================================================
// Tests
// ============================================================================

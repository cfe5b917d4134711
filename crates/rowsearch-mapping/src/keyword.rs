//! String-like column mappers.
//!
//! [`KeywordNormalizer`] holds the text normalization shared by every
//! keyword-indexed mapper, including [`BlobMapper`](crate::BlobMapper),
//! which embeds one rather than extending [`StringMapper`].

use rowsearch_core::{CellType, Error, Result, Value};
use rowsearch_index::{FieldKind, FieldSpec, FieldValue};
use serde::{Deserialize, Serialize};

use crate::mapper::{ColumnMapper, default_boost};

/// Normalizes text before it is indexed as a keyword.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordNormalizer {
    case_sensitive: bool,
}

impl KeywordNormalizer {
    /// Normalizer that keeps case when `case_sensitive` is set.
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive }
    }

    /// Normalized keyword text.
    pub fn normalize(&self, text: &str) -> String {
        if self.case_sensitive {
            text.to_string()
        } else {
            text.to_lowercase()
        }
    }

    /// Normalized keyword value.
    pub fn keyword(&self, text: &str) -> FieldValue {
        FieldValue::Keyword(self.normalize(text))
    }
}

/// Maps scalar values to an exact-match keyword field.
///
/// Matching is case-insensitive unless `case_sensitive` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringMapper {
    /// Keep the original case of values.
    #[serde(default)]
    pub case_sensitive: bool,
    /// Query-time score multiplier.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl StringMapper {
    fn normalizer(&self) -> KeywordNormalizer {
        KeywordNormalizer::new(self.case_sensitive)
    }
}

impl Default for StringMapper {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            boost: default_boost(),
        }
    }
}

impl ColumnMapper for StringMapper {
    fn to_index_value(
        &self,
        field: &str,
        raw: Option<&Value>,
        _validate: bool,
    ) -> Result<Option<FieldValue>> {
        match raw {
            None => Ok(None),
            Some(blob @ Value::Blob(_)) => Err(Error::type_mismatch(field, blob)),
            Some(value) => Ok(Some(self.normalizer().keyword(&value.to_string()))),
        }
    }

    fn accepts_storage_type(&self, cell_type: CellType) -> bool {
        cell_type != CellType::Blob
    }

    fn field_spec(&self, field: &str) -> FieldSpec {
        FieldSpec::new(field, FieldKind::Keyword).sortable()
    }

    fn boost(&self) -> f32 {
        self.boost
    }
}

/// Maps text to an analyzed full-text field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMapper {
    /// Query-time score multiplier.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl Default for TextMapper {
    fn default() -> Self {
        Self { boost: default_boost() }
    }
}

impl ColumnMapper for TextMapper {
    fn to_index_value(
        &self,
        field: &str,
        raw: Option<&Value>,
        _validate: bool,
    ) -> Result<Option<FieldValue>> {
        match raw {
            None => Ok(None),
            Some(Value::Text(text)) => Ok(Some(FieldValue::Text(text.clone()))),
            Some(other) => Err(Error::type_mismatch(field, other)),
        }
    }

    fn accepts_storage_type(&self, cell_type: CellType) -> bool {
        cell_type.is_text()
    }

    fn field_spec(&self, field: &str) -> FieldSpec {
        FieldSpec::new(field, FieldKind::Text).sortable()
    }

    fn boost(&self) -> f32 {
        self.boost
    }
}

/// Maps booleans to a `"true"`/`"false"` keyword field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanMapper {
    /// Query-time score multiplier.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl Default for BooleanMapper {
    fn default() -> Self {
        Self { boost: default_boost() }
    }
}

impl ColumnMapper for BooleanMapper {
    fn to_index_value(
        &self,
        field: &str,
        raw: Option<&Value>,
        _validate: bool,
    ) -> Result<Option<FieldValue>> {
        let flag = match raw {
            None => return Ok(None),
            Some(Value::Boolean(flag)) => *flag,
            Some(Value::Text(text)) => {
                match KeywordNormalizer::default().normalize(text.trim()).as_str() {
                    "true" => true,
                    "false" => false,
                    _ => {
                        return Err(Error::validation(
                            field,
                            format!("Field \"{field}\" requires a boolean, but found \"{text}\""),
                        ));
                    }
                }
            }
            Some(other) => return Err(Error::type_mismatch(field, other)),
        };
        Ok(Some(FieldValue::Keyword(flag.to_string())))
    }

    fn accepts_storage_type(&self, cell_type: CellType) -> bool {
        cell_type.is_text() || cell_type == CellType::Boolean
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

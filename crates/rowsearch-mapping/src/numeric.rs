//! Numeric column mappers.
//!
//! All four accept numeric columns and numeric text. Integral inputs keep
//! their full precision until narrowed to the mapper's width; text and
//! decimals are parsed as `f64` first. Narrowing follows `as` casts, so
//! out-of-range reals saturate and wide integers keep their low bits.

use rowsearch_core::{CellType, Error, Result, Value};
use rowsearch_index::{FieldKind, FieldSpec, FieldValue};
use serde::{Deserialize, Serialize};

use crate::mapper::{ColumnMapper, default_boost};

/// A number read from a storage value, before narrowing.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Integral(i128),
    Real(f64),
}

/// Storage types every numeric mapper accepts.
fn accepts_numeric(cell_type: CellType) -> bool {
    cell_type.is_text() || cell_type.is_numeric()
}

/// Read a number from `raw`, naming `requires` in the error.
///
/// Coercion does not depend on validation: the fast path and the checked
/// path parse the same way.
fn number(field: &str, raw: &Value, requires: &str) -> Result<Number> {
    let parse = |text: &str| {
        text.trim().parse::<f64>().map(Number::Real).map_err(|_| {
            Error::validation(
                field,
                format!("Field \"{field}\" requires {requires}, but found \"{text}\""),
            )
        })
    };
    match raw {
        Value::Int(v) => Ok(Number::Integral(i128::from(*v))),
        Value::BigInt(v) => Ok(Number::Integral(i128::from(*v))),
        Value::VarInt(v) => Ok(Number::Integral(*v)),
        Value::Float(v) => Ok(Number::Real(f64::from(*v))),
        Value::Double(v) => Ok(Number::Real(*v)),
        Value::Decimal(text) | Value::Text(text) => parse(text),
        other => Err(Error::type_mismatch(field, other)),
    }
}

/// Maps numbers to a 32-bit integer field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegerMapper {
    /// Query-time score multiplier.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl Default for IntegerMapper {
    fn default() -> Self {
        Self { boost: default_boost() }
    }
}

impl ColumnMapper for IntegerMapper {
    fn to_index_value(
        &self,
        field: &str,
        raw: Option<&Value>,
        _validate: bool,
    ) -> Result<Option<FieldValue>> {
        let Some(raw) = raw else { return Ok(None) };
        let value = match number(field, raw, "an integer")? {
            Number::Integral(v) => v as i32,
            Number::Real(v) => v as i32,
        };
        Ok(Some(FieldValue::Long(i64::from(value))))
    }

    fn accepts_storage_type(&self, cell_type: CellType) -> bool {
        accepts_numeric(cell_type)
    }

    fn field_spec(&self, field: &str) -> FieldSpec {
        FieldSpec::new(field, FieldKind::Long).sortable()
    }

    fn boost(&self) -> f32 {
        self.boost
    }
}

/// Maps numbers to a 64-bit integer field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongMapper {
    /// Query-time score multiplier.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl Default for LongMapper {
    fn default() -> Self {
        Self { boost: default_boost() }
    }
}

impl ColumnMapper for LongMapper {
    fn to_index_value(
        &self,
        field: &str,
        raw: Option<&Value>,
        _validate: bool,
    ) -> Result<Option<FieldValue>> {
        let Some(raw) = raw else { return Ok(None) };
        let value = match number(field, raw, "a long")? {
            Number::Integral(v) => v as i64,
            Number::Real(v) => v as i64,
        };
        Ok(Some(FieldValue::Long(value)))
    }

    fn accepts_storage_type(&self, cell_type: CellType) -> bool {
        accepts_numeric(cell_type)
    }

    fn field_spec(&self, field: &str) -> FieldSpec {
        FieldSpec::new(field, FieldKind::Long).sortable()
    }

    fn boost(&self) -> f32 {
        self.boost
    }
}

/// Maps numbers to a 32-bit float, indexed as a double.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatMapper {
    /// Query-time score multiplier.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl Default for FloatMapper {
    fn default() -> Self {
        Self { boost: default_boost() }
    }
}

impl ColumnMapper for FloatMapper {
    fn to_index_value(
        &self,
        field: &str,
        raw: Option<&Value>,
        _validate: bool,
    ) -> Result<Option<FieldValue>> {
        let Some(raw) = raw else { return Ok(None) };
        let value = match number(field, raw, "a float")? {
            Number::Integral(v) => v as f32,
            Number::Real(v) => v as f32,
        };
        Ok(Some(FieldValue::Double(f64::from(value))))
    }

    fn accepts_storage_type(&self, cell_type: CellType) -> bool {
        accepts_numeric(cell_type)
    }

    fn field_spec(&self, field: &str) -> FieldSpec {
        FieldSpec::new(field, FieldKind::Double).sortable()
    }

    fn boost(&self) -> f32 {
        self.boost
    }
}

/// Maps numbers to a 64-bit float field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoubleMapper {
    /// Query-time score multiplier.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl Default for DoubleMapper {
    fn default() -> Self {
        Self { boost: default_boost() }
    }
}

impl ColumnMapper for DoubleMapper {
    fn to_index_value(
        &self,
        field: &str,
        raw: Option<&Value>,
        _validate: bool,
    ) -> Result<Option<FieldValue>> {
        let Some(raw) = raw else { return Ok(None) };
        let value = match number(field, raw, "a double")? {
            Number::Integral(v) => v as f64,
            Number::Real(v) => v,
        };
        Ok(Some(FieldValue::Double(value)))
    }

    fn accepts_storage_type(&self, cell_type: CellType) -> bool {
        accepts_numeric(cell_type)
    }

    fn field_spec(&self, field: &str) -> FieldSpec {
        FieldSpec::new(field, FieldKind::Double).sortable()
    }

    fn boost(&self) -> f32 {
        self.boost
    }
}

// ============================================================================
// Tests
// ============================================================================

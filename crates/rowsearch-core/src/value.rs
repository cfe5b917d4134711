//! Tagged storage values.
//!
//! Column values cross the storage boundary as a closed [`Value`] enum, so
//! mappers match on the tag instead of inspecting runtime types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Storage column types understood by the column mappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    /// US-ASCII text.
    Ascii,
    /// UTF-8 text.
    Text,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    BigInt,
    /// Arbitrary precision integer.
    VarInt,
    /// 32-bit IEEE-754 float.
    Float,
    /// 64-bit IEEE-754 float.
    Double,
    /// Arbitrary precision decimal.
    Decimal,
    /// Boolean.
    Boolean,
    /// Raw bytes.
    Blob,
}

impl CellType {
    /// Returns whether values of this type are text.
    pub fn is_text(self) -> bool {
        matches!(self, CellType::Ascii | CellType::Text)
    }

    /// Returns whether values of this type are numbers.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            CellType::Int
                | CellType::BigInt
                | CellType::VarInt
                | CellType::Float
                | CellType::Double
                | CellType::Decimal
        )
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellType::Ascii => "ascii",
            CellType::Text => "text",
            CellType::Int => "int",
            CellType::BigInt => "bigint",
            CellType::VarInt => "varint",
            CellType::Float => "float",
            CellType::Double => "double",
            CellType::Decimal => "decimal",
            CellType::Boolean => "boolean",
            CellType::Blob => "blob",
        };
        f.write_str(name)
    }
}

/// A decoded storage cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// `int` value.
    Int(i32),
    /// `bigint` value.
    BigInt(i64),
    /// `varint` value.
    VarInt(i128),
    /// `float` value.
    Float(f32),
    /// `double` value.
    Double(f64),
    /// `decimal` value in its textual form.
    Decimal(String),
    /// `text` or `ascii` value.
    Text(String),
    /// `boolean` value.
    Boolean(bool),
    /// `blob` value.
    Blob(Vec<u8>),
}

impl Value {
    /// Storage type of this value.
    ///
    /// Text values always report [`CellType::Text`]; ASCII-ness is a column
    /// property, not a value property.
    pub fn cell_type(&self) -> CellType {
        match self {
            Value::Int(_) => CellType::Int,
            Value::BigInt(_) => CellType::BigInt,
            Value::VarInt(_) => CellType::VarInt,
            Value::Float(_) => CellType::Float,
            Value::Double(_) => CellType::Double,
            Value::Decimal(_) => CellType::Decimal,
            Value::Text(_) => CellType::Text,
            Value::Boolean(_) => CellType::Boolean,
            Value::Blob(_) => CellType::Blob,
        }
    }

    /// Returns the value as text if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::BigInt(v) => write!(f, "{v}"),
            Value::VarInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Decimal(v) => f.write_str(v),
            Value::Text(v) => f.write_str(v),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Blob(v) => write!(f, "0x{}", hex::encode(v)),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Index document representation.
//!
//! Documents are unordered sets of named, typed fields. Engines that need
//! their schema up front learn it from [`FieldSpec`]s declared by the
//! mappers before the first document is written.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of an index field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// 64-bit signed integer, range-filterable.
    Long,
    /// 64-bit float, range-filterable.
    Double,
    /// Untokenized string, matched exactly.
    Keyword,
    /// Analyzed full text.
    Text,
}

/// Declaration of one index field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,
    /// Field kind.
    pub kind: FieldKind,
    /// Whether the value can be loaded back from a hit.
    pub stored: bool,
    /// Whether results can be ordered by this field.
    pub sortable: bool,
}

impl FieldSpec {
    /// Declare an indexed field that is neither stored nor sortable.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            stored: false,
            sortable: false,
        }
    }

    /// Mark the field as stored.
    pub fn stored(mut self) -> Self {
        self.stored = true;
        self
    }

    /// Mark the field as sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

/// A typed index value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Long value.
    Long(i64),
    /// Double value.
    Double(f64),
    /// Keyword value.
    Keyword(String),
    /// Full text value.
    Text(String),
}

impl FieldValue {
    /// Kind of this value.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Long(_) => FieldKind::Long,
            FieldValue::Double(_) => FieldKind::Double,
            FieldValue::Keyword(_) => FieldKind::Keyword,
            FieldValue::Text(_) => FieldKind::Text,
        }
    }

    /// Returns the value as a string if it is a keyword or text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Keyword(v) | FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value as a long.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            FieldValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a double.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            FieldValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Compare two values of the same kind.
    ///
    /// Doubles use IEEE-754 total order. Values of different kinds are not
    /// comparable.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Long(a), FieldValue::Long(b)) => Some(a.cmp(b)),
            (FieldValue::Double(a), FieldValue::Double(b)) => Some(a.total_cmp(b)),
            (FieldValue::Keyword(a), FieldValue::Keyword(b)) => Some(a.cmp(b)),
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Long(v) => write!(f, "{v}"),
            FieldValue::Double(v) => write!(f, "{v}"),
            FieldValue::Keyword(v) | FieldValue::Text(v) => f.write_str(v),
        }
    }
}

/// A named value inside a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexField {
    /// Field name.
    pub name: String,
    /// Field value.
    pub value: FieldValue,
}

impl IndexField {
    /// Create a field.
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// An exact-match term used to upsert, delete and look up one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Term {
    /// Keyword field holding the term.
    pub field: String,
    /// Term text.
    pub text: String,
}

impl Term {
    /// Create a term.
    pub fn new(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.text)
    }
}

/// A document to be indexed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    fields: Vec<IndexField>,
}

impl IndexDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    pub fn add(&mut self, field: IndexField) {
        self.fields.push(field);
    }

    /// Append several fields.
    pub fn extend(&mut self, fields: impl IntoIterator<Item = IndexField>) {
        self.fields.extend(fields);
    }

    /// All fields, in insertion order.
    pub fn fields(&self) -> &[IndexField] {
        &self.fields
    }

    /// First value of the field named `name`.
    pub fn get_first(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// All values of the field named `name`.
    pub fn values<'s, 'n>(
        &'s self,
        name: &'n str,
    ) -> impl Iterator<Item = &'s FieldValue> + use<'s, 'n> {
        self.fields
            .iter()
            .filter(move |f| f.name == name)
            .map(|f| &f.value)
    }

    /// Returns whether `term` identifies this document.
    pub fn has_term(&self, term: &Term) -> bool {
        self.values(&term.field)
            .any(|v| matches!(v, FieldValue::Keyword(text) if *text == term.text))
    }

    /// A copy of this document restricted to the named fields.
    pub fn project(&self, names: &BTreeSet<String>) -> IndexDocument {
        IndexDocument {
            fields: self
                .fields
                .iter()
                .filter(|f| names.contains(&f.name))
                .cloned()
                .collect(),
        }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns whether the document has no field.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A document returned by a search, with its relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    /// The loaded projection of the document.
    pub document: IndexDocument,
    /// Relevance score.
    pub score: f32,
}

impl ScoredDocument {
    /// Create a scored document.
    pub fn new(document: IndexDocument, score: f32) -> Self {
        Self { document, score }
    }
}

// ============================================================================
// Tests
// ============================================================================

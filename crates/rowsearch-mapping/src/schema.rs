//! Index schema: the named column mappers of one index.
//!
//! Decoded from the `schema` section of the index definition:
//!
//! ```json
//! {
//!     "fields": {
//!         "price": { "type": "float", "boost": 2.0 },
//!         "city": { "type": "string" },
//!         "bio": { "type": "text" }
//!     }
//! }
//! ```
//!
//! Fields are kept ordered by name. A schema is built once, validated
//! against the table, and then shared read-only.

use std::collections::BTreeMap;
use std::ops::Bound;

use rowsearch_core::{Error, Result, Row, TableMetadata, Value};
use rowsearch_index::{FieldSpec, FieldValue, IndexDocument, IndexField, Query, SortCriterion};
use serde::{Deserialize, Serialize};

use crate::mapper::{ColumnMapper, ColumnMapperKind};

/// Field holding the encoded partition token.
pub const TOKEN_FIELD: &str = "_token";

/// Field holding the hex-encoded partition key.
pub const PARTITION_KEY_FIELD: &str = "_partition_key";

/// Field names used internally and unavailable to mappers.
pub const RESERVED_FIELDS: [&str; 2] = [TOKEN_FIELD, PARTITION_KEY_FIELD];

/// Named, ordered collection of column mappers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    fields: BTreeMap<String, ColumnMapperKind>,
}

impl Schema {
    /// Create a schema from `(field, mapper)` pairs.
    pub fn new<N, M>(mappers: impl IntoIterator<Item = (N, M)>) -> Self
    where
        N: Into<String>,
        M: Into<ColumnMapperKind>,
    {
        Self {
            fields: mappers
                .into_iter()
                .map(|(name, mapper)| (name.into(), mapper.into()))
                .collect(),
        }
    }

    /// Add or replace the mapper of a field.
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        mapper: impl Into<ColumnMapperKind>,
    ) -> Self {
        self.fields.insert(name.into(), mapper.into());
        self
    }

    /// Mapper of the field named `name`.
    pub fn mapper(&self, name: &str) -> Option<&ColumnMapperKind> {
        self.fields.get(name)
    }

    /// Iterate over `(field, mapper)` pairs in field order.
    pub fn mappers(&self) -> impl Iterator<Item = (&str, &ColumnMapperKind)> {
        self.fields.iter().map(|(name, mapper)| (name.as_str(), mapper))
    }

    /// Number of mapped fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns whether no field is mapped.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check the schema against the table it indexes.
    ///
    /// Every mapper named after a table column must accept that column's
    /// type. Mappers without a column are allowed; their field is simply
    /// never filled.
    pub fn validate(&self, table: &TableMetadata) -> Result<()> {
        for (name, mapper) in &self.fields {
            if name.is_empty() {
                return Err(Error::configuration("Field names must not be empty"));
            }
            if RESERVED_FIELDS.contains(&name.as_str()) {
                return Err(Error::configuration(format!("Field name '{name}' is reserved")));
            }
            let Some(column) = table.column(name) else {
                log::debug!("Schema field '{name}' has no column in table '{}'", table.name);
                continue;
            };
            if !mapper.accepts_storage_type(column.cell_type) {
                return Err(Error::configuration(format!(
                    "Type '{}' of column '{name}' is not supported by mapper '{}'",
                    column.cell_type,
                    mapper.type_name()
                )));
            }
        }
        Ok(())
    }

    /// Declarations of every mapped field.
    pub fn field_specs(&self) -> Vec<FieldSpec> {
        self.fields
            .iter()
            .map(|(name, mapper)| mapper.field_spec(name))
            .collect()
    }

    /// Append the fields of `row` to `document`.
    ///
    /// Values are checked in full. Either every mapper succeeds and all
    /// fields are appended, or the document is left untouched.
    pub fn add_fields(
        &self,
        document: &mut IndexDocument,
        table: &TableMetadata,
        row: &Row,
    ) -> Result<()> {
        let mut fields: Vec<IndexField> = Vec::new();
        for (name, mapper) in &self.fields {
            let raw = table.column(name).and_then(|_| row.value(name));
            if let Some(value) = mapper.to_index_value(name, raw, true)? {
                fields.extend(mapper.build_fields(name, &value));
            }
        }
        log::trace!("Schema: {} fields for row {}", fields.len(), row.key());
        document.extend(fields);
        Ok(())
    }

    /// Sort criterion over a mapped field.
    pub fn sort(&self, field: &str, reverse: bool) -> Result<SortCriterion> {
        Ok(self.require(field)?.sort_criterion(field, reverse))
    }

    /// Query matching rows whose `field` equals `value`.
    ///
    /// Text fields are matched by their analyzed tokens.
    pub fn term_query(&self, field: &str, value: &Value) -> Result<Query> {
        let mapper = self.require(field)?;
        let query = match self.coerce(field, mapper, value)? {
            FieldValue::Text(text) => Query::matching(field, text),
            other => Query::term(field, other),
        };
        Ok(query.boosted(mapper.boost()))
    }

    /// Query matching rows whose `field` lies between the given bounds.
    ///
    /// A missing bound leaves that side open.
    pub fn range_query(
        &self,
        field: &str,
        lower: Option<&Value>,
        upper: Option<&Value>,
        include_lower: bool,
        include_upper: bool,
    ) -> Result<Query> {
        let mapper = self.require(field)?;
        let bound = |value: Option<&Value>, inclusive: bool| -> Result<Bound<FieldValue>> {
            Ok(match value {
                None => Bound::Unbounded,
                Some(v) if inclusive => Bound::Included(self.coerce(field, mapper, v)?),
                Some(v) => Bound::Excluded(self.coerce(field, mapper, v)?),
            })
        };
        let query = Query::range(field, bound(lower, include_lower)?, bound(upper, include_upper)?);
        Ok(query.boosted(mapper.boost()))
    }

    /// Full-text query over a mapped field.
    pub fn match_query(&self, field: &str, text: &str) -> Result<Query> {
        let mapper = self.require(field)?;
        Ok(Query::matching(field, text).boosted(mapper.boost()))
    }

    fn require(&self, field: &str) -> Result<&ColumnMapperKind> {
        self.mapper(field).ok_or_else(|| {
            Error::validation(field, format!("No mapper found for field \"{field}\""))
        })
    }

    fn coerce(&self, field: &str, mapper: &ColumnMapperKind, value: &Value) -> Result<FieldValue> {
        mapper
            .to_index_value(field, Some(value), true)?
            .ok_or_else(|| Error::validation(field, format!("Field \"{field}\" requires a value")))
    }
}

// ============================================================================
// Tests
// ============================================================================

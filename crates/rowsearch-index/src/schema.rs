//! Tantivy schema derived from declared field specs.
//!
//! Field options by kind:
//!
//! | Kind | Tantivy type | Options |
//! |------|--------------|---------|
//! | `Long` | i64 | INDEXED \| FAST, STORED when stored or sortable |
//! | `Double` | f64 | INDEXED \| FAST, STORED when stored or sortable |
//! | `Keyword` | text, `raw` tokenizer | STRING, STORED \| FAST when sortable, STORED when stored |
//! | `Text` | text, `default` tokenizer | TEXT with positions, STORED when stored or sortable |
//!
//! Sortable fields are fast so the collector can order by them, and stored
//! so loaded hits can be ordered again when a sort cannot be pushed down.

use std::collections::HashMap;

use rowsearch_core::{Error, Result};
use tantivy::schema::{
    Field, FieldType, IndexRecordOption, NumericOptions, Schema, SchemaBuilder, TextFieldIndexing,
    TextOptions,
};

use crate::backend::specs_by_name;
use crate::document::{FieldKind, FieldSpec};

/// Search schema holding field references and the Tantivy schema.
///
/// Provides typed access to fields by name, avoiding repeated schema lookups
/// during indexing and querying.
#[derive(Clone)]
pub struct TantivySchema {
    schema: Schema,
    fields: HashMap<String, (Field, FieldKind)>,
}

impl TantivySchema {
    /// Build a fresh schema for the declared fields.
    pub fn build(specs: &[FieldSpec]) -> Result<Self> {
        specs_by_name(specs)?;
        let mut builder = SchemaBuilder::new();
        for spec in specs {
            let keep = spec.stored || spec.sortable;
            match spec.kind {
                FieldKind::Long => {
                    builder.add_i64_field(&spec.name, numeric_options(keep));
                }
                FieldKind::Double => {
                    builder.add_f64_field(&spec.name, numeric_options(keep));
                }
                FieldKind::Keyword => {
                    let mut options = text_options("raw", IndexRecordOption::Basic, keep);
                    if spec.sortable {
                        options = options.set_fast(Some("raw"));
                    }
                    builder.add_text_field(&spec.name, options);
                }
                FieldKind::Text => {
                    builder.add_text_field(
                        &spec.name,
                        text_options("default", IndexRecordOption::WithFreqsAndPositions, keep),
                    );
                }
            }
        }
        Self::resolve(builder.build(), specs)
    }

    /// Bind declared fields to an existing schema, checking their types.
    pub fn resolve(schema: Schema, specs: &[FieldSpec]) -> Result<Self> {
        let mut fields = HashMap::with_capacity(specs.len());
        for spec in specs {
            let field = schema.get_field(&spec.name).map_err(|_| {
                Error::configuration(format!("Index has no field '{}'", spec.name))
            })?;
            let compatible = matches!(
                (spec.kind, schema.get_field_entry(field).field_type()),
                (FieldKind::Long, FieldType::I64(_))
                    | (FieldKind::Double, FieldType::F64(_))
                    | (FieldKind::Keyword, FieldType::Str(_))
                    | (FieldKind::Text, FieldType::Str(_))
            );
            if !compatible {
                return Err(Error::configuration(format!(
                    "Index field '{}' is not of kind {:?}",
                    spec.name, spec.kind
                )));
            }
            fields.insert(spec.name.clone(), (field, spec.kind));
        }
        Ok(Self { schema, fields })
    }

    /// Get the underlying Tantivy schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Field handle and kind for a declared field.
    pub fn field(&self, name: &str) -> Result<(Field, FieldKind)> {
        self.fields
            .get(name)
            .copied()
            .ok_or_else(|| Error::index(format!("Field '{name}' is not declared")))
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns whether no field is declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn numeric_options(stored: bool) -> NumericOptions {
    let options = NumericOptions::default().set_indexed().set_fast();
    if stored { options.set_stored() } else { options }
}

fn text_options(tokenizer: &str, record: IndexRecordOption, stored: bool) -> TextOptions {
    let options = TextOptions::default().set_indexing_options(
        TextFieldIndexing::default()
            .set_tokenizer(tokenizer)
            .set_index_option(record),
    );
    if stored { options.set_stored() } else { options }
}

impl std::fmt::Debug for TantivySchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TantivySchema")
            .field("field_count", &self.fields.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Partition keys as index terms.

use std::collections::BTreeSet;

use rowsearch_core::{DecoratedKey, Error, Result, RowStore};
use rowsearch_index::{FieldKind, FieldSpec, FieldValue, IndexDocument, IndexField, Term};
use rowsearch_mapping::PARTITION_KEY_FIELD;

/// Maps partition keys to the stored `_partition_key` field.
///
/// The field holds the lower-case hex of the raw key, which makes it both
/// the identifying term of the row's document and the projection needed to
/// find the row again from a hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionKeyMapper;

impl PartitionKeyMapper {
    /// Create a partition key mapper.
    pub fn new() -> Self {
        Self
    }

    /// Declaration of the partition key field.
    pub fn field_spec(&self) -> FieldSpec {
        FieldSpec::new(PARTITION_KEY_FIELD, FieldKind::Keyword).stored()
    }

    /// Identifying term of the document of `key`.
    pub fn term(&self, key: &DecoratedKey) -> Term {
        Term::new(PARTITION_KEY_FIELD, hex::encode(key.key()))
    }

    /// Append the partition key field of `key` to `document`.
    pub fn add_fields(&self, document: &mut IndexDocument, key: &DecoratedKey) {
        document.add(IndexField::new(
            PARTITION_KEY_FIELD,
            FieldValue::Keyword(hex::encode(key.key())),
        ));
    }

    /// Fields a hit must carry to recover its key.
    pub fn fields_to_load(&self) -> BTreeSet<String> {
        BTreeSet::from([PARTITION_KEY_FIELD.to_string()])
    }

    /// Recover the decorated key of a loaded hit.
    pub fn decorated_key(
        &self,
        document: &IndexDocument,
        store: &dyn RowStore,
    ) -> Result<DecoratedKey> {
        let encoded = document
            .get_first(PARTITION_KEY_FIELD)
            .and_then(FieldValue::as_str)
            .ok_or_else(|| Error::index(format!("Hit has no {PARTITION_KEY_FIELD} field")))?;
        let key = hex::decode(encoded)
            .map_err(|e| Error::index(format!("Malformed partition key '{encoded}': {e}")))?;
        Ok(store.decorate_key(&key))
    }
}

// ============================================================================
// Tests
// ============================================================================

//! The storage collaborator contract.
//!
//! The index never owns row data. It reads rows through [`RowStore`] at
//! index time (read-before-write) and again at query time (read-through).
//!
//! [`MemoryStore`] is a small in-memory implementation used by tests and
//! embedders that do not have a storage engine at hand.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::key::{DecoratedKey, Partitioner};
use crate::row::{Column, DeletionInfo, Mutation, Row};

/// Read access to the primary store.
pub trait RowStore: Send + Sync {
    /// Partitioner used by the store.
    fn partitioner(&self) -> Partitioner;

    /// Decorate a raw partition key with its token.
    fn decorate_key(&self, key: &[u8]) -> DecoratedKey;

    /// Read the live cells of a partition as of `timestamp`.
    ///
    /// Returns `Ok(None)` when the partition does not exist. A partition
    /// whose cells are all deleted may be returned as an empty row.
    fn read(&self, key: &DecoratedKey, timestamp: i64) -> Result<Option<Row>>;
}

impl<T: RowStore + ?Sized> RowStore for Arc<T> {
    fn partitioner(&self) -> Partitioner {
        (**self).partitioner()
    }

    fn decorate_key(&self, key: &[u8]) -> DecoratedKey {
        (**self).decorate_key(key)
    }

    fn read(&self, key: &DecoratedKey, timestamp: i64) -> Result<Option<Row>> {
        (**self).read(key, timestamp)
    }
}

#[derive(Debug, Default)]
struct Partition {
    deletion: Option<DeletionInfo>,
    cells: BTreeMap<String, Column>,
}

impl Partition {
    fn apply(&mut self, mutation: &Mutation) {
        if let Some(deletion) = mutation.deletion {
            let newer = self
                .deletion
                .is_none_or(|d| d.marked_for_delete_at < deletion.marked_for_delete_at);
            if newer {
                self.deletion = Some(deletion);
            }
            self.cells.retain(|_, cell| !deletion.shadows(cell.timestamp));
        }
        for column in &mutation.columns {
            if self.deletion.is_some_and(|d| d.shadows(column.timestamp)) {
                continue;
            }
            let replace = self
                .cells
                .get(&column.name)
                .is_none_or(|existing| existing.timestamp <= column.timestamp);
            if replace {
                self.cells.insert(column.name.clone(), column.clone());
            }
        }
    }
}

/// In-memory [`RowStore`].
///
/// Keeps the latest cell per column plus the latest partition deletion.
/// Reads at a timestamp ignore cells written after it.
#[derive(Debug)]
pub struct MemoryStore {
    partitioner: Partitioner,
    partitions: RwLock<BTreeMap<DecoratedKey, Partition>>,
}

impl MemoryStore {
    /// Create an empty store using the reference token function of
    /// `partitioner`.
    pub fn new(partitioner: Partitioner) -> Self {
        Self {
            partitioner,
            partitions: RwLock::new(BTreeMap::new()),
        }
    }

    /// Apply a mutation to the partition identified by `key`.
    pub fn apply(&self, key: &[u8], mutation: &Mutation) -> Result<DecoratedKey> {
        let decorated = self.decorate_key(key);
        let mut partitions = self
            .partitions
            .write()
            .map_err(|_| Error::storage("memory store lock poisoned"))?;
        partitions
            .entry(decorated.clone())
            .or_default()
            .apply(mutation);
        Ok(decorated)
    }

    /// Drop a partition entirely, as if it had never been written.
    pub fn purge(&self, key: &[u8]) -> Result<bool> {
        let decorated = self.decorate_key(key);
        let mut partitions = self
            .partitions
            .write()
            .map_err(|_| Error::storage("memory store lock poisoned"))?;
        Ok(partitions.remove(&decorated).is_some())
    }

    /// Number of partitions, including fully deleted ones.
    pub fn len(&self) -> usize {
        self.partitions.read().map(|p| p.len()).unwrap_or(0)
    }

    /// Returns whether the store holds no partition.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RowStore for MemoryStore {
    fn partitioner(&self) -> Partitioner {
        self.partitioner
    }

    fn decorate_key(&self, key: &[u8]) -> DecoratedKey {
        DecoratedKey::new(self.partitioner.token(key), key.to_vec())
    }

    fn read(&self, key: &DecoratedKey, timestamp: i64) -> Result<Option<Row>> {
        let partitions = self
            .partitions
            .read()
            .map_err(|_| Error::storage("memory store lock poisoned"))?;
        let Some(partition) = partitions.get(key) else {
            return Ok(None);
        };
        let cells = partition
            .cells
            .values()
            .filter(|cell| cell.timestamp <= timestamp)
            .cloned();
        Ok(Some(Row::new(key.clone(), cells)))
    }
}

// ============================================================================
// Tests
// ============================================================================

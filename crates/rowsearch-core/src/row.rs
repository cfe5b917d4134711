//! Rows, mutations and table metadata as seen from the index.

use serde::{Deserialize, Serialize};

use crate::key::DecoratedKey;
use crate::value::{CellType, Value};

/// A named cell.
///
/// A cell without a value is a tombstone: it records the deletion of the
/// column at `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Cell value, `None` for a tombstone.
    pub value: Option<Value>,
    /// Write timestamp.
    pub timestamp: i64,
}

impl Column {
    /// A live cell.
    pub fn new(name: impl Into<String>, value: impl Into<Value>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            timestamp,
        }
    }

    /// A cell tombstone.
    pub fn tombstone(name: impl Into<String>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            value: None,
            timestamp,
        }
    }

    /// Returns whether the cell holds a value.
    pub fn is_live(&self) -> bool {
        self.value.is_some()
    }
}

/// Partition-level deletion carried by a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionInfo {
    /// Cells written at or before this timestamp are deleted.
    pub marked_for_delete_at: i64,
}

impl DeletionInfo {
    /// Create a deletion covering everything written at or before `timestamp`.
    pub fn at(timestamp: i64) -> Self {
        Self {
            marked_for_delete_at: timestamp,
        }
    }

    /// Returns whether this deletion shadows a cell written at `timestamp`.
    pub fn shadows(&self, timestamp: i64) -> bool {
        timestamp <= self.marked_for_delete_at
    }
}

/// A mutation delta as delivered by the storage engine's write path.
///
/// A delta may be partial; the index never builds documents from it
/// directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    /// Partition deletion, if any.
    pub deletion: Option<DeletionInfo>,
    /// Written cells, live or tombstones.
    pub columns: Vec<Column>,
}

impl Mutation {
    /// A mutation writing the given cells.
    pub fn upsert(columns: Vec<Column>) -> Self {
        Self {
            deletion: None,
            columns,
        }
    }

    /// A partition deletion.
    pub fn delete_partition(timestamp: i64) -> Self {
        Self {
            deletion: Some(DeletionInfo::at(timestamp)),
            columns: Vec::new(),
        }
    }

    /// Returns whether this mutation deletes anything, at partition or cell
    /// level.
    pub fn is_deletion(&self) -> bool {
        self.deletion.is_some() || self.columns.iter().any(|c| !c.is_live())
    }

    /// Live cells carried by this mutation.
    pub fn live_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_live())
    }
}

/// A fully materialized partition: its key and live cells sorted by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    key: DecoratedKey,
    columns: Vec<Column>,
}

impl Row {
    /// Build a row; tombstones are dropped and cells are sorted by name.
    ///
    /// When several cells share a name the one with the highest timestamp
    /// wins.
    pub fn new(key: DecoratedKey, columns: impl IntoIterator<Item = Column>) -> Self {
        let mut columns: Vec<Column> = columns.into_iter().collect();
        columns.sort_by(|a, b| a.name.cmp(&b.name).then(b.timestamp.cmp(&a.timestamp)));
        columns.dedup_by(|later, first| later.name == first.name);
        columns.retain(Column::is_live);
        Self { key, columns }
    }

    /// The partition key.
    pub fn key(&self) -> &DecoratedKey {
        &self.key
    }

    /// Live cells, sorted by name.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns whether the row has no live cells.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Cell named `name`.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .binary_search_by(|c| c.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.columns[i])
    }

    /// Value of the cell named `name`.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.column(name).and_then(|c| c.value.as_ref())
    }

    /// Returns a copy of this row with `column` added, replacing any cell
    /// with the same name. The other cells are left untouched.
    pub fn with_column(&self, column: Column) -> Row {
        let mut columns = self.columns.clone();
        match columns.binary_search_by(|c| c.name.cmp(&column.name)) {
            Ok(i) => columns[i] = column,
            Err(i) => columns.insert(i, column),
        }
        columns.retain(Column::is_live);
        Row {
            key: self.key.clone(),
            columns,
        }
    }
}

/// Definition of one table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,
    /// Column storage type.
    #[serde(rename = "type")]
    pub cell_type: CellType,
}

/// Metadata of the indexed table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Table name.
    pub name: String,
    /// Regular columns.
    pub columns: Vec<ColumnDefinition>,
}

impl TableMetadata {
    /// Create metadata for a table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Add a column definition.
    pub fn with_column(mut self, name: impl Into<String>, cell_type: CellType) -> Self {
        self.columns.push(ColumnDefinition {
            name: name.into(),
            cell_type,
        });
        self
    }

    /// Definition of the column named `name`.
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }
}

// ============================================================================
// Tests
// ============================================================================

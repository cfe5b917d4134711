//! Row service: keeps the index consistent with the store and turns hits
//! back into rows.
//!
//! # Write path
//!
//! ```text
//! mutation ──► index(key, mutation, ts)
//!                │  read full row at ts (read-before-write)
//!                ├─ live columns ─────────► document(row) ──► upsert(term, doc)
//!                ├─ deletion, no columns ─► delete(term)
//!                └─ otherwise ────────────► skipped
//! ```
//!
//! # Read path
//!
//! ```text
//! search(query, range) ──► filter_spec(range) + sort_spec()
//!                            │
//!                            ▼
//!                      backend.search ──► hits (key projection + score)
//!                            │
//!                            ▼
//!                      row(hit, ts): read row at ts, inject score column
//!                            └─ row gone ──► miss, dropped
//! ```
//!
//! Rows are never cached between the two paths. A row deleted after its hit
//! was produced shows up as a miss, never as a stale row.

use std::collections::BTreeSet;

use rowsearch_core::{
    Column, DecoratedKey, Error, Mutation, Result, Row, RowStore, TableMetadata, Value,
};
use rowsearch_index::{
    FieldSpec, IndexBackend, IndexDocument, IndexSettings, Query, ScoredDocument, Sort,
};
use rowsearch_mapping::Schema;

use crate::comparator::{self, RowComparator, ScoreRowComparator, TokenRowComparator};
use crate::config::IndexConfig;
use crate::key::PartitionKeyMapper;
use crate::token::{TokenMapper, TokenRange};

/// What [`RowService::index`] did with a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    /// The row has live columns and its document was written.
    Upserted,
    /// The row is gone and its document was removed.
    Deleted,
    /// Nothing to index and nothing deleted.
    Skipped,
}

/// Result of [`RowService::index_batch`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Rows whose document was written.
    pub upserted: usize,
    /// Rows whose document was removed.
    pub deleted: usize,
    /// Mutations with nothing to do.
    pub skipped: usize,
    /// Raw keys of the rows that failed, with their error.
    pub failures: Vec<(Vec<u8>, Error)>,
}

impl BatchReport {
    /// Returns whether every row was handled.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, outcome: IndexOutcome) {
        match outcome {
            IndexOutcome::Upserted => self.upserted += 1,
            IndexOutcome::Deleted => self.deleted += 1,
            IndexOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// Secondary index over one table.
///
/// Holds no mutable state of its own; concurrency is whatever the store
/// and the backend provide.
pub struct RowService<S, B> {
    table: TableMetadata,
    column: String,
    schema: Schema,
    tokens: TokenMapper,
    keys: PartitionKeyMapper,
    store: S,
    index: B,
}

impl<S: RowStore, B: IndexBackend> RowService<S, B> {
    /// Build the service for `table`.
    ///
    /// Validates the schema against the table, derives the field
    /// declarations and hands them to `open_backend` together with the
    /// engine settings.
    pub fn open<F>(
        config: IndexConfig,
        table: TableMetadata,
        store: S,
        open_backend: F,
    ) -> Result<Self>
    where
        F: FnOnce(&IndexSettings, &[FieldSpec]) -> Result<B>,
    {
        if config.column.is_empty() {
            return Err(Error::configuration("Score column name must not be empty"));
        }
        if table.column(&config.column).is_some() {
            return Err(Error::configuration(format!(
                "Score column '{}' collides with a column of table '{}'",
                config.column, table.name
            )));
        }
        config.schema.validate(&table)?;

        let tokens = TokenMapper::new(store.partitioner());
        let keys = PartitionKeyMapper::new();
        let mut specs = vec![tokens.field_spec(), keys.field_spec()];
        specs.extend(config.schema.field_specs());

        let index = open_backend(&config.settings, &specs)?;
        log::info!(
            "Opened row index on '{}' ({} partitioner, {} backend, {} fields)",
            table.name,
            tokens.partitioner(),
            index.name(),
            specs.len()
        );

        Ok(Self {
            table,
            column: config.column,
            schema: config.schema,
            tokens,
            keys,
            store,
            index,
        })
    }

    /// Index the row identified by the raw `key` after `mutation`.
    ///
    /// The full row is read back at `timestamp`, since the mutation may
    /// only carry some of its columns. A mutation carrying a deletion while
    /// live columns remain is an upsert.
    pub fn index(&self, key: &[u8], mutation: &Mutation, timestamp: i64) -> Result<IndexOutcome> {
        let partition_key = self.store.decorate_key(key);
        let row = self.store.read(&partition_key, timestamp)?;
        match row {
            Some(row) if !row.is_empty() => {
                let document = self.document(&row)?;
                self.index.upsert(&self.keys.term(&partition_key), document)?;
                log::debug!("Indexed {partition_key}");
                Ok(IndexOutcome::Upserted)
            }
            _ if mutation.is_deletion() => {
                self.delete(&partition_key)?;
                Ok(IndexOutcome::Deleted)
            }
            _ => {
                log::trace!("Nothing to index for {partition_key}");
                Ok(IndexOutcome::Skipped)
            }
        }
    }

    /// Index a batch of mutations, one row at a time.
    ///
    /// A failing row is recorded and never stops the rest of the batch.
    pub fn index_batch<'a, I>(&self, mutations: I, timestamp: i64) -> BatchReport
    where
        I: IntoIterator<Item = (&'a [u8], &'a Mutation)>,
    {
        let mut report = BatchReport::default();
        for (key, mutation) in mutations {
            match self.index(key, mutation, timestamp) {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    log::warn!("Failed to index row {}: {e}", hex::encode(key));
                    report.failures.push((key.to_vec(), e));
                }
            }
        }
        report
    }

    /// Document of a fully materialized row.
    pub fn document(&self, row: &Row) -> Result<IndexDocument> {
        let mut document = IndexDocument::new();
        self.tokens.add_fields(&mut document, row.key())?;
        self.keys.add_fields(&mut document, row.key());
        self.schema.add_fields(&mut document, &self.table, row)?;
        Ok(document)
    }

    /// Remove the document of `key`. No row is read.
    pub fn delete(&self, key: &DecoratedKey) -> Result<()> {
        self.index.delete(&self.keys.term(key))?;
        log::debug!("Deleted {key}");
        Ok(())
    }

    /// Rebuild the row behind a hit, with its score injected.
    ///
    /// The row is read again at `timestamp`. A row that no longer exists is
    /// a miss and yields `None`.
    pub fn row(&self, hit: &ScoredDocument, timestamp: i64) -> Result<Option<Row>> {
        let key = self.keys.decorated_key(&hit.document, &self.store)?;
        let row = match self.store.read(&key, timestamp)? {
            Some(row) if !row.is_empty() => row,
            _ => {
                log::debug!("Missed {key}: row is gone");
                return Ok(None);
            }
        };
        let score = Column::new(self.column.clone(), Value::Text(hit.score.to_string()), timestamp);
        Ok(Some(row.with_column(score)))
    }

    /// Sort returning hits in token order.
    pub fn sort_spec(&self) -> Sort {
        Sort::by(self.tokens.sort_criteria())
    }

    /// Filter scoping a search to `range`; `None` when unrestricted.
    pub fn filter_spec(&self, range: &TokenRange) -> Result<Option<Query>> {
        self.tokens.filter(range)
    }

    /// Fields a hit must load to be turned back into a row.
    pub fn fields_to_load(&self) -> BTreeSet<String> {
        self.keys.fields_to_load()
    }

    /// Search rows of `range` matching `query`, in token order.
    ///
    /// Returns at most `limit` rows as of `timestamp`; hits whose row is
    /// gone are dropped.
    pub fn search(
        &self,
        query: &Query,
        range: &TokenRange,
        limit: usize,
        timestamp: i64,
    ) -> Result<Vec<Row>> {
        let filter = self.filter_spec(range)?;
        let hits = self
            .index
            .search(query, filter.as_ref(), &self.sort_spec(), &self.fields_to_load(), limit)?;

        let mut rows = Vec::with_capacity(hits.len());
        for hit in &hits {
            if let Some(row) = self.row(hit, timestamp)? {
                rows.push(row);
            }
        }
        log::debug!("Search returned {} of {} hits", rows.len(), hits.len());
        Ok(rows)
    }

    /// Score injected into a reconstructed row.
    pub fn score(&self, row: &Row) -> Option<f32> {
        comparator::score(row, &self.column)
    }

    /// Comparator for merging result rows, by score or by token.
    pub fn comparator(&self, by_relevance: bool) -> Box<dyn RowComparator> {
        if by_relevance {
            Box::new(ScoreRowComparator::new(self.column.clone()))
        } else {
            Box::new(TokenRowComparator)
        }
    }

    /// Make pending index changes durable and visible.
    pub fn commit(&self) -> Result<()> {
        self.index.commit()
    }

    /// Schema of the index.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Metadata of the indexed table.
    pub fn table(&self) -> &TableMetadata {
        &self.table
    }

    /// Name of the score column.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Token mapper in use.
    pub fn token_mapper(&self) -> TokenMapper {
        self.tokens
    }

    /// The search backend.
    pub fn backend(&self) -> &B {
        &self.index
    }

    /// The storage collaborator.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: RowStore> RowService<S, Box<dyn IndexBackend>> {
    /// Build the service with the backend named in the settings.
    pub fn with_default_backend(
        config: IndexConfig,
        table: TableMetadata,
        store: S,
    ) -> Result<Self> {
        Self::open(config, table, store, rowsearch_index::open_backend)
    }
}

impl<S, B: IndexBackend> std::fmt::Debug for RowService<S, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowService")
            .field("table", &self.table.name)
            .field("column", &self.column)
            .field("fields", &self.schema.len())
            .field("tokens", &self.tokens)
            .field("backend", &self.index.name())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

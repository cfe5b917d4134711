//! Common test utilities and harness for row service integration tests.

use std::sync::Arc;

use rowsearch_core::{CellType, Column, MemoryStore, Mutation, Partitioner, Row, TableMetadata};
use rowsearch_index::{IndexBackend, IndexSettings};
use rowsearch_mapping::{FloatMapper, IntegerMapper, Schema, StringMapper, TextMapper};
use rowsearch_service::{IndexConfig, IndexOutcome, RowService};

/// Backends every consistency test runs against.
pub const BACKENDS: [&str; 2] = ["memory", "tantivy"];

/// Service type used by the harness.
pub type Service = RowService<Arc<MemoryStore>, Box<dyn IndexBackend>>;

/// Test harness for integration tests.
///
/// Owns an in-memory store and a row service indexing its `users` table.
pub struct TestHarness {
    /// The primary store.
    pub store: Arc<MemoryStore>,
    /// The service under test.
    pub service: Service,
}

impl TestHarness {
    /// Creates a harness over the given backend with Murmur3 tokens.
    pub fn new(backend: &str) -> Self {
        Self::with_settings(
            Partitioner::Murmur3,
            IndexSettings {
                backend: backend.to_string(),
                ..Default::default()
            },
        )
    }

    /// Creates a harness with explicit partitioner and engine settings.
    pub fn with_settings(partitioner: Partitioner, settings: IndexSettings) -> Self {
        Self::with_store(Arc::new(MemoryStore::new(partitioner)), settings)
    }

    /// Creates a harness over an existing store.
    pub fn with_store(store: Arc<MemoryStore>, settings: IndexSettings) -> Self {
        let config = IndexConfig::new(schema()).with_settings(settings);
        let service = RowService::with_default_backend(config, table(), store.clone())
            .expect("service should open");
        Self { store, service }
    }

    /// Writes a user row to the store and indexes it.
    pub fn put(
        &self,
        key: &str,
        name: &str,
        age: i32,
        price: &str,
        bio: &str,
        ts: i64,
    ) -> IndexOutcome {
        let mutation = Mutation::upsert(vec![
            Column::new("name", name, ts),
            Column::new("age", age, ts),
            Column::new("price", price, ts),
            Column::new("bio", bio, ts),
        ]);
        self.store.apply(key.as_bytes(), &mutation).unwrap();
        self.service.index(key.as_bytes(), &mutation, ts).unwrap()
    }

    /// Deletes a partition in the store and indexes the deletion.
    pub fn remove(&self, key: &str, ts: i64) -> IndexOutcome {
        let mutation = Mutation::delete_partition(ts);
        self.store.apply(key.as_bytes(), &mutation).unwrap();
        self.service.index(key.as_bytes(), &mutation, ts).unwrap()
    }
}

/// The indexed table.
pub fn table() -> TableMetadata {
    TableMetadata::new("users")
        .with_column("name", CellType::Text)
        .with_column("age", CellType::Int)
        .with_column("price", CellType::Text)
        .with_column("bio", CellType::Text)
}

/// Mappers over the `users` table.
pub fn schema() -> Schema {
    Schema::default()
        .with_field("name", StringMapper::default())
        .with_field("age", IntegerMapper::default())
        .with_field("price", FloatMapper::default())
        .with_field("bio", TextMapper::default())
}

/// Names of the given rows, in order.
pub fn names(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .map(|row| row.value("name").map(ToString::to_string).unwrap_or_default())
        .collect()
}

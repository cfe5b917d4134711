//! Tantivy index persisted under a temporary directory.

use std::sync::Arc;

use rowsearch_core::{MemoryStore, Partitioner, Value};
use rowsearch_index::{IndexBackend, IndexSettings, Query};
use rowsearch_service::TokenRange;

use crate::common::{TestHarness, names};

fn settings(path: &std::path::Path) -> IndexSettings {
    IndexSettings {
        backend: "tantivy".to_string(),
        path: Some(path.join("users")),
        ..Default::default()
    }
}

#[test]
fn test_index_survives_reopen() {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new(Partitioner::Murmur3));

    {
        let harness = TestHarness::with_store(store.clone(), settings(temp_dir.path()));
        harness.put("a", "Ann", 41, "5.0", "Writes Rust", 1);
        harness.put("b", "Bob", 25, "7.5", "Plays chess", 1);
        // harness is dropped here, releasing the index lock
    }

    let harness = TestHarness::with_store(store, settings(temp_dir.path()));
    assert_eq!(harness.service.backend().num_docs().unwrap(), 2);

    let query = harness
        .service
        .schema()
        .term_query("name", &Value::Text("BOB".into()))
        .unwrap();
    let rows = harness.service.search(&query, &TokenRange::all(), 10, 1).unwrap();
    assert_eq!(names(&rows), vec!["Bob"]);
}

#[test]
fn test_manual_commit_controls_visibility() {
    let temp_dir = tempfile::tempdir().unwrap();
    let settings = IndexSettings {
        auto_commit: false,
        ..settings(temp_dir.path())
    };
    let harness = TestHarness::with_settings(Partitioner::Random, settings);
    harness.put("a", "Ann", 41, "5.0", "bio", 1);

    let search = || harness.service.search(&Query::All, &TokenRange::all(), 10, 1).unwrap();
    assert!(search().is_empty());
    harness.service.commit().unwrap();
    assert_eq!(names(&search()), vec!["Ann"]);
}

#[test]
fn test_byte_ordered_ranges_on_disk() {
    let temp_dir = tempfile::tempdir().unwrap();
    let harness = TestHarness::with_settings(Partitioner::ByteOrdered, settings(temp_dir.path()));
    for (key, name) in [("a", "Ann"), ("b", "Bob"), ("c", "Cid"), ("d", "Dee")] {
        harness.put(key, name, 30, "1", "bio", 1);
    }

    let range = TokenRange {
        lower: Some(rowsearch_core::Token::ByteOrdered(b"b".to_vec())),
        upper: None,
        include_lower: true,
        include_upper: true,
    };
    let rows = harness.service.search(&Query::All, &range, 10, 1).unwrap();
    assert_eq!(names(&rows), vec!["Bob", "Cid", "Dee"]);
}

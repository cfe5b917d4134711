//! Index consistency under updates, deletes and concurrent removal.

use std::sync::Arc;
use std::thread;

use rowsearch_core::{Column, Mutation, RowStore, Value};
use rowsearch_index::{IndexBackend, Query};
use rowsearch_service::{IndexOutcome, TokenRange};

use crate::common::{BACKENDS, TestHarness, names};

fn by_name(harness: &TestHarness, name: &str) -> Vec<String> {
    let query = harness
        .service
        .schema()
        .term_query("name", &Value::Text(name.into()))
        .unwrap();
    names(&harness.service.search(&query, &TokenRange::all(), 10, i64::MAX).unwrap())
}

#[test]
fn test_upsert_is_idempotent_by_term() {
    for backend in BACKENDS {
        let harness = TestHarness::new(backend);
        harness.put("k", "Ann", 41, "5.0", "first", 1);
        harness.put("k", "Bea", 42, "6.0", "second", 2);

        assert_eq!(harness.service.backend().num_docs().unwrap(), 1, "backend {backend}");
        assert!(by_name(&harness, "Ann").is_empty(), "backend {backend}");
        assert_eq!(by_name(&harness, "Bea"), vec!["Bea"], "backend {backend}");
    }
}

#[test]
fn test_partial_update_reindexes_full_row() {
    for backend in BACKENDS {
        let harness = TestHarness::new(backend);
        harness.put("k", "Ann", 41, "5.0", "bio", 1);

        // Only the age changes; the document must still carry the name.
        let partial = Mutation::upsert(vec![Column::new("age", 50, 2)]);
        harness.store.apply(b"k", &partial).unwrap();
        harness.service.index(b"k", &partial, 2).unwrap();

        assert_eq!(by_name(&harness, "Ann"), vec!["Ann"], "backend {backend}");
        let fifty = harness
            .service
            .schema()
            .term_query("age", &Value::Int(50))
            .unwrap();
        let rows = harness.service.search(&fifty, &TokenRange::all(), 10, 2).unwrap();
        assert_eq!(names(&rows), vec!["Ann"], "backend {backend}");
    }
}

#[test]
fn test_delete_then_search() {
    for backend in BACKENDS {
        let harness = TestHarness::new(backend);
        harness.put("a", "Ann", 41, "5.0", "bio", 1);
        harness.put("b", "Bob", 25, "7.5", "bio", 1);

        assert_eq!(harness.remove("a", 2), IndexOutcome::Deleted);
        assert!(by_name(&harness, "Ann").is_empty(), "backend {backend}");
        assert_eq!(harness.service.backend().num_docs().unwrap(), 1);

        // Explicit delete by key, no row read.
        let key = harness.store.decorate_key(b"b");
        harness.service.delete(&key).unwrap();
        assert!(by_name(&harness, "Bob").is_empty(), "backend {backend}");

        // Deleted rows can come back.
        assert_eq!(harness.put("a", "Ann", 41, "5.0", "bio", 3), IndexOutcome::Upserted);
        assert_eq!(by_name(&harness, "Ann"), vec!["Ann"], "backend {backend}");
    }
}

#[test]
fn test_row_deleted_after_hit_is_a_miss() {
    for backend in BACKENDS {
        let harness = TestHarness::new(backend);
        harness.put("a", "Ann", 41, "5.0", "bio", 1);
        harness.put("b", "Bob", 25, "7.5", "bio", 1);
        let service = &harness.service;

        let hits = service
            .backend()
            .search(&Query::All, None, &service.sort_spec(), &service.fields_to_load(), 10)
            .unwrap();
        assert_eq!(hits.len(), 2);

        // The store loses "a" between the search and the read-through.
        harness.store.purge(b"a").unwrap();
        let rows: Vec<_> = hits
            .iter()
            .filter_map(|hit| service.row(hit, 2).unwrap())
            .collect();
        assert_eq!(names(&rows), vec!["Bob"], "backend {backend}");
    }
}

#[test]
fn test_batch_keeps_going_after_a_bad_row() {
    for backend in BACKENDS {
        let harness = TestHarness::new(backend);
        let rows = [
            ("a", Mutation::upsert(vec![Column::new("price", "1.0", 1)])),
            ("b", Mutation::upsert(vec![Column::new("price", "free", 1)])),
            ("c", Mutation::upsert(vec![Column::new("price", "3.0", 1)])),
            ("d", Mutation::delete_partition(1)),
        ];
        for (key, mutation) in &rows {
            harness.store.apply(key.as_bytes(), mutation).unwrap();
        }

        let report = harness
            .service
            .index_batch(rows.iter().map(|(key, m)| (key.as_bytes(), m)), 1);
        assert_eq!(report.upserted, 2, "backend {backend}");
        assert_eq!(report.deleted, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, b"b".to_vec());
        assert_eq!(report.failures[0].1.field(), Some("price"));
        assert_eq!(harness.service.backend().num_docs().unwrap(), 2);
    }
}

#[test]
fn test_concurrent_indexing_of_distinct_rows() {
    for backend in BACKENDS {
        let harness = Arc::new(TestHarness::new(backend));
        let workers: Vec<_> = (0..4)
            .map(|worker| {
                let harness = Arc::clone(&harness);
                thread::spawn(move || {
                    for i in 0..10 {
                        let key = format!("w{worker}:{i}");
                        harness.put(&key, &key, i, "1.0", "bio", 1);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(harness.service.backend().num_docs().unwrap(), 40, "backend {backend}");
        let rows = harness
            .service
            .search(&Query::All, &TokenRange::all(), 100, 1)
            .unwrap();
        assert_eq!(rows.len(), 40);
    }
}

//! End-to-end: index a row, search its token range, get the row back with
//! its score.

use std::sync::Arc;

use rowsearch_core::{
    CellType, Column, Error, MemoryStore, Mutation, Partitioner, RowStore, Token, Value,
};
use rowsearch_index::{IndexBackend, IndexSettings, Query};
use rowsearch_service::{IndexConfig, IndexOutcome, RowService, TokenRange};

use crate::common::{self, BACKENDS, TestHarness, names};

#[test]
fn test_indexed_row_comes_back_with_its_score() {
    for backend in BACKENDS {
        let harness = TestHarness::new(backend);
        let service = &harness.service;
        assert_eq!(harness.put("k", "Ann", 41, "5.0", "Writes Rust", 1), IndexOutcome::Upserted);
        harness.put("other", "Bob", 25, "7.5", "Plays chess", 1);

        let key = harness.store.decorate_key(b"k");
        let Token::Murmur3(t) = *key.token() else {
            unreachable!("murmur3 store");
        };
        let range = TokenRange::left_open(Token::Murmur3(t.saturating_sub(1)), Token::Murmur3(t));
        let query = service
            .schema()
            .term_query("price", &Value::Text("5.0".into()))
            .unwrap();

        let hits = service
            .backend()
            .search(
                &query,
                service.filter_spec(&range).unwrap().as_ref(),
                &service.sort_spec(),
                &service.fields_to_load(),
                10,
            )
            .unwrap();
        assert_eq!(hits.len(), 1, "backend {backend}");

        let rows = service.search(&query, &range, 10, 2).unwrap();
        assert_eq!(rows.len(), 1, "backend {backend}");
        let row = &rows[0];
        assert_eq!(row.key(), &key);

        // One added column holding the score, originals untouched.
        let original = harness.store.read(&key, 2).unwrap().unwrap();
        assert_eq!(row.columns().len(), original.columns().len() + 1);
        for column in original.columns() {
            assert_eq!(row.column(&column.name), Some(column));
        }
        assert_eq!(row.value("score"), Some(&Value::Text(hits[0].score.to_string())));
        assert_eq!(service.score(row), Some(hits[0].score));
    }
}

#[test]
fn test_score_column_never_replaces_a_table_column() {
    for backend in BACKENDS {
        let store = Arc::new(MemoryStore::new(Partitioner::Murmur3));
        let table = common::table().with_column("score", CellType::Int);
        let settings = IndexSettings {
            backend: backend.to_string(),
            ..Default::default()
        };
        let config = IndexConfig::new(common::schema()).with_settings(settings);

        let err = RowService::with_default_backend(config.clone(), table.clone(), store.clone())
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }), "backend {backend}");

        let service =
            RowService::with_default_backend(config.with_column("relevance"), table, store.clone())
                .unwrap();
        let mutation = Mutation::upsert(vec![
            Column::new("name", "Ann", 1),
            Column::new("score", 99, 1),
        ]);
        store.apply(b"k", &mutation).unwrap();
        service.index(b"k", &mutation, 1).unwrap();

        let rows = service.search(&Query::All, &TokenRange::all(), 10, 1).unwrap();
        assert_eq!(rows.len(), 1, "backend {backend}");
        assert_eq!(rows[0].value("score"), Some(&Value::Int(99)));
        assert_eq!(service.score(&rows[0]), Some(1.0));
    }
}

#[test]
fn test_full_text_and_range_queries() {
    for backend in BACKENDS {
        let harness = TestHarness::new(backend);
        harness.put("a", "Ann", 41, "5.0", "Writes Rust and plays chess", 1);
        harness.put("b", "Bob", 25, "7.5", "Plays guitar", 1);
        harness.put("c", "Cid", 33, "1.0", "Rust compilers", 1);
        let schema = harness.service.schema();

        let rust = schema.match_query("bio", "rust").unwrap();
        let mut found = names(&harness.service.search(&rust, &TokenRange::all(), 10, 1).unwrap());
        found.sort();
        assert_eq!(found, vec!["Ann", "Cid"], "backend {backend}");

        let adults = schema
            .range_query("age", Some(&Value::Int(30)), None, true, false)
            .unwrap();
        let mut found = names(&harness.service.search(&adults, &TokenRange::all(), 10, 1).unwrap());
        found.sort();
        assert_eq!(found, vec!["Ann", "Cid"], "backend {backend}");

        let cheap = schema
            .range_query("price", None, Some(&Value::Text("5".into())), false, false)
            .unwrap();
        let found = names(&harness.service.search(&cheap, &TokenRange::all(), 10, 1).unwrap());
        assert_eq!(found, vec!["Cid"], "backend {backend}");
    }
}

#[test]
fn test_results_follow_token_order() {
    for backend in BACKENDS {
        let harness = TestHarness::new(backend);
        for (i, name) in ["Ann", "Bob", "Cid", "Dee", "Eve", "Fay"].iter().enumerate() {
            harness.put(&format!("user:{i}"), name, 20, "1", "x", 1);
        }
        let rows = harness
            .service
            .search(&Query::All, &TokenRange::all(), 10, 1)
            .unwrap();
        assert_eq!(rows.len(), 6);
        assert!(rows.windows(2).all(|w| w[0].key() < w[1].key()), "backend {backend}");

        let limited = harness
            .service
            .search(&Query::All, &TokenRange::all(), 3, 1)
            .unwrap();
        assert_eq!(limited, rows[..3].to_vec());
    }
}

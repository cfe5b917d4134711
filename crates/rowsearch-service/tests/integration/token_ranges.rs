//! Token range scoping on every backend and partitioner.

use rowsearch_core::{Partitioner, RowStore, Token};
use rowsearch_index::{IndexSettings, Query};
use rowsearch_service::TokenRange;

use crate::common::{BACKENDS, TestHarness, names};

const PARTITIONERS: [Partitioner; 3] =
    [Partitioner::Murmur3, Partitioner::Random, Partitioner::ByteOrdered];

/// Eight indexed rows, with their tokens in token order.
fn populated(backend: &str, partitioner: Partitioner) -> (TestHarness, Vec<(Token, String)>) {
    let settings = IndexSettings {
        backend: backend.to_string(),
        ..Default::default()
    };
    let harness = TestHarness::with_settings(partitioner, settings);
    let mut rows = Vec::new();
    for i in 0..8 {
        let key = format!("key{i}");
        harness.put(&key, &key, 30, "1.0", "bio", 1);
        let token = harness.store.decorate_key(key.as_bytes()).token().clone();
        rows.push((token, key));
    }
    rows.sort();
    (harness, rows)
}

#[test]
fn test_token_ranges_match_contains() {
    for backend in BACKENDS {
        for partitioner in PARTITIONERS {
            let (harness, rows) = populated(backend, partitioner);
            let token = |i: usize| Some(rows[i].0.clone());
            let minimum = Some(partitioner.minimum_token());
            let lowers = [None, minimum.clone(), token(1), token(3)];
            let uppers = [None, minimum, token(3), token(6)];

            for lower in &lowers {
                for upper in &uppers {
                    for (include_lower, include_upper) in
                        [(true, true), (true, false), (false, true), (false, false)]
                    {
                        let range = TokenRange {
                            lower: lower.clone(),
                            upper: upper.clone(),
                            include_lower,
                            include_upper,
                        };
                        let expected: Vec<String> = rows
                            .iter()
                            .filter(|(token, _)| range.contains(token))
                            .map(|(_, key)| key.clone())
                            .collect();
                        let found = harness.service.search(&Query::All, &range, 100, 1).unwrap();
                        assert_eq!(
                            names(&found),
                            expected,
                            "backend {backend}, {partitioner} partitioner, range {range:?}"
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_minimum_token_bounds_are_open() {
    for backend in BACKENDS {
        for partitioner in PARTITIONERS {
            let (harness, rows) = populated(backend, partitioner);
            let minimum = partitioner.minimum_token();
            let everything = TokenRange::between(minimum.clone(), minimum.clone());
            let found = harness.service.search(&Query::All, &everything, 100, 1).unwrap();
            assert_eq!(found.len(), rows.len(), "backend {backend}, {partitioner}");

            let upper = rows[4].0.clone();
            let from_minimum = TokenRange::left_open(minimum, upper.clone());
            let open = TokenRange {
                lower: None,
                upper: Some(upper),
                include_lower: true,
                include_upper: true,
            };
            assert_eq!(
                names(&harness.service.search(&Query::All, &from_minimum, 100, 1).unwrap()),
                names(&harness.service.search(&Query::All, &open, 100, 1).unwrap()),
                "backend {backend}, {partitioner}"
            );
        }
    }
}

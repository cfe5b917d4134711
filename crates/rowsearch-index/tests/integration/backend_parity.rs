//! Backend parity: the linear scan and the inverted index agree.

use std::collections::BTreeSet;
use std::ops::Bound;

use rowsearch_index::{
    FieldKind, FieldSpec, FieldValue, IndexBackend, IndexDocument, IndexField, IndexSettings,
    Query, Sort, SortCriterion, Term, open_backend,
};

fn specs() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("_partition_key", FieldKind::Keyword).stored(),
        FieldSpec::new("_token", FieldKind::Long).sortable(),
        FieldSpec::new("age", FieldKind::Long),
        FieldSpec::new("city", FieldKind::Keyword),
        FieldSpec::new("bio", FieldKind::Text),
    ]
}

fn backends() -> Vec<Box<dyn IndexBackend>> {
    ["memory", "tantivy"]
        .into_iter()
        .map(|backend| {
            let settings = IndexSettings {
                backend: backend.to_string(),
                ..Default::default()
            };
            open_backend(&settings, &specs()).expect("backend should open")
        })
        .collect()
}

fn person(key: &str, token: i64, age: i64, city: &str, bio: &str) -> IndexDocument {
    let mut doc = IndexDocument::new();
    doc.add(IndexField::new("_partition_key", FieldValue::Keyword(key.to_string())));
    doc.add(IndexField::new("_token", FieldValue::Long(token)));
    doc.add(IndexField::new("age", FieldValue::Long(age)));
    doc.add(IndexField::new("city", FieldValue::Keyword(city.to_string())));
    doc.add(IndexField::new("bio", FieldValue::Text(bio.to_string())));
    doc
}

fn populate(backend: &dyn IndexBackend) {
    let people = [
        ("ann", 30, 41, "paris", "Writes Rust and plays chess"),
        ("bob", -20, 25, "oslo", "Plays guitar"),
        ("cid", 10, 33, "paris", "Rust compilers"),
        ("dee", 50, 58, "rome", "Chess coach"),
        ("eve", -70, 19, "oslo", "Student of rust and iron"),
    ];
    for (key, token, age, city, bio) in people {
        backend
            .upsert(&Term::new("_partition_key", key), person(key, token, age, city, bio))
            .unwrap();
    }
    backend.commit().unwrap();
}

fn keys(
    backend: &dyn IndexBackend,
    query: &Query,
    filter: Option<&Query>,
    limit: usize,
) -> Vec<String> {
    let load: BTreeSet<String> = ["_partition_key".to_string()].into_iter().collect();
    let sort = Sort::by(vec![SortCriterion::asc("_token")]);
    backend
        .search(query, filter, &sort, &load, limit)
        .unwrap()
        .into_iter()
        .map(|hit| hit.document.get_first("_partition_key").unwrap().to_string())
        .collect()
}

#[test]
fn test_backends_agree_on_token_sorted_queries() {
    let cases: Vec<(Query, Option<Query>, Vec<&str>)> = vec![
        (Query::All, None, vec!["eve", "bob", "cid", "ann", "dee"]),
        (
            Query::term("city", FieldValue::Keyword("paris".into())),
            None,
            vec!["cid", "ann"],
        ),
        (
            Query::range("age", Bound::Included(FieldValue::Long(30)), Bound::Unbounded),
            None,
            vec!["cid", "ann", "dee"],
        ),
        (Query::matching("bio", "RUST"), None, vec!["eve", "cid", "ann"]),
        (
            Query::matching("bio", "chess"),
            Some(Query::range(
                "_token",
                Bound::Excluded(FieldValue::Long(-20)),
                Bound::Included(FieldValue::Long(30)),
            )),
            vec!["ann"],
        ),
        (
            Query::not(Query::term("city", FieldValue::Keyword("oslo".into()))),
            None,
            vec!["cid", "ann", "dee"],
        ),
    ];

    for backend in backends() {
        populate(backend.as_ref());
        for (query, filter, expected) in &cases {
            assert_eq!(
                keys(backend.as_ref(), query, filter.as_ref(), 10),
                *expected,
                "backend {} query {query:?}",
                backend.name()
            );
        }
    }
}

#[test]
fn test_backends_apply_limit_after_sorting() {
    for backend in backends() {
        populate(backend.as_ref());
        assert_eq!(keys(backend.as_ref(), &Query::All, None, 2), vec!["eve", "bob"]);
        assert!(keys(backend.as_ref(), &Query::All, None, 0).is_empty());
    }
}

#[test]
fn test_backends_agree_after_replace_and_delete() {
    for backend in backends() {
        populate(backend.as_ref());
        backend
            .upsert(
                &Term::new("_partition_key", "bob"),
                person("bob", -20, 26, "rome", "Moved"),
            )
            .unwrap();
        backend.delete(&Term::new("_partition_key", "dee")).unwrap();
        backend.commit().unwrap();

        assert_eq!(backend.num_docs().unwrap(), 4, "backend {}", backend.name());
        let rome = Query::term("city", FieldValue::Keyword("rome".into()));
        assert_eq!(keys(backend.as_ref(), &rome, None, 10), vec!["bob"]);
    }
}

#[test]
fn test_unknown_backend_is_rejected() {
    let settings = IndexSettings {
        backend: "lucene".to_string(),
        ..Default::default()
    };
    assert!(open_backend(&settings, &specs()).is_err());
}

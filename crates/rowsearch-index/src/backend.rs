//! Search backend trait and factory.
//!
//! This module defines the `IndexBackend` trait that all search engine
//! collaborators must satisfy.
//!
//! # Backends
//!
//! - `TantivyIndex`: Inverted index with Tantivy (requires `index-tantivy` feature)
//! - `MemoryIndex`: Linear scan over documents held in memory
//!
//! Both honour the same contract: `upsert` and `delete` are atomic and
//! linearizable per term, and `search` returns hits ordered by the requested
//! sort with only the requested stored fields loaded.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use rowsearch_core::{Error, Result};

use crate::document::{FieldSpec, IndexDocument, ScoredDocument, Term};
use crate::query::{Query, Sort};
use crate::types::IndexSettings;

/// Abstract search engine.
pub trait IndexBackend: Send + Sync {
    /// Replace every document identified by `term` with `document`.
    fn upsert(&self, term: &Term, document: IndexDocument) -> Result<()>;

    /// Remove every document identified by `term`.
    fn delete(&self, term: &Term) -> Result<()>;

    /// Run `query`, restricted by the non-scoring `filter`.
    ///
    /// Returns at most `limit` hits in `sort` order, each carrying only the
    /// stored fields named in `fields_to_load`.
    fn search(
        &self,
        query: &Query,
        filter: Option<&Query>,
        sort: &Sort,
        fields_to_load: &BTreeSet<String>,
        limit: usize,
    ) -> Result<Vec<ScoredDocument>>;

    /// Make staged changes durable and visible.
    fn commit(&self) -> Result<()>;

    /// Number of live documents visible to searches.
    fn num_docs(&self) -> Result<usize>;

    /// Backend name for diagnostics.
    fn name(&self) -> &str;
}

impl<T: IndexBackend + ?Sized> IndexBackend for Box<T> {
    fn upsert(&self, term: &Term, document: IndexDocument) -> Result<()> {
        (**self).upsert(term, document)
    }

    fn delete(&self, term: &Term) -> Result<()> {
        (**self).delete(term)
    }

    fn search(
        &self,
        query: &Query,
        filter: Option<&Query>,
        sort: &Sort,
        fields_to_load: &BTreeSet<String>,
        limit: usize,
    ) -> Result<Vec<ScoredDocument>> {
        (**self).search(query, filter, sort, fields_to_load, limit)
    }

    fn commit(&self) -> Result<()> {
        (**self).commit()
    }

    fn num_docs(&self) -> Result<usize> {
        (**self).num_docs()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Open a backend for the declared fields based on settings.
///
/// Selection logic:
/// 1. `"memory"` → `MemoryIndex`
/// 2. `"tantivy"` with the `index-tantivy` feature → `TantivyIndex`
/// 3. `"tantivy"` without the feature → `MemoryIndex`, with a warning
///
/// # Errors
///
/// Returns an error for an unknown backend name or if the index cannot be
/// opened.
pub fn open_backend(
    settings: &IndexSettings,
    specs: &[FieldSpec],
) -> Result<Box<dyn IndexBackend>> {
    match settings.backend.as_str() {
        "memory" => Ok(Box::new(MemoryIndex::new(specs)?)),
        #[cfg(feature = "index-tantivy")]
        "tantivy" => Ok(Box::new(crate::tantivy_index::TantivyIndex::open(
            settings, specs,
        )?)),
        #[cfg(not(feature = "index-tantivy"))]
        "tantivy" => {
            log::warn!("index-tantivy feature disabled, falling back to memory index");
            Ok(Box::new(MemoryIndex::new(specs)?))
        }
        other => Err(Error::configuration(format!("Unknown index backend '{other}'"))),
    }
}

/// Index the declared field specs by name, rejecting duplicates.
pub(crate) fn specs_by_name(specs: &[FieldSpec]) -> Result<HashMap<String, FieldSpec>> {
    let mut by_name = HashMap::with_capacity(specs.len());
    for spec in specs {
        if by_name.insert(spec.name.clone(), spec.clone()).is_some() {
            return Err(Error::configuration(format!(
                "Field '{}' is declared twice",
                spec.name
            )));
        }
    }
    Ok(by_name)
}

/// Check that every field of `document` is declared with a matching kind.
pub(crate) fn check_document(
    specs: &HashMap<String, FieldSpec>,
    document: &IndexDocument,
) -> Result<()> {
    for field in document.fields() {
        match specs.get(&field.name) {
            Some(spec) if spec.kind == field.value.kind() => {}
            Some(spec) => {
                return Err(Error::index(format!(
                    "Field '{}' is declared as {:?} but got {:?}",
                    field.name,
                    spec.kind,
                    field.value.kind()
                )));
            }
            None => {
                return Err(Error::index(format!("Field '{}' is not declared", field.name)));
            }
        }
    }
    Ok(())
}

/// Linear-scan search backend.
///
/// Keeps documents in memory and evaluates queries with
/// [`Query::score`]. Used by tests and small embedded deployments.
///
/// # Limitations
///
/// - O(n) upsert, delete and search
/// - Nothing is persisted
pub struct MemoryIndex {
    specs: HashMap<String, FieldSpec>,
    documents: RwLock<Vec<IndexDocument>>,
}

impl MemoryIndex {
    /// Create an empty index for the declared fields.
    pub fn new(specs: &[FieldSpec]) -> Result<Self> {
        Ok(Self {
            specs: specs_by_name(specs)?,
            documents: RwLock::new(Vec::new()),
        })
    }

    fn loadable(&self, fields_to_load: &BTreeSet<String>) -> BTreeSet<String> {
        fields_to_load
            .iter()
            .filter(|name| self.specs.get(*name).is_some_and(|s| s.stored))
            .cloned()
            .collect()
    }
}

impl IndexBackend for MemoryIndex {
    fn upsert(&self, term: &Term, document: IndexDocument) -> Result<()> {
        check_document(&self.specs, &document)?;
        let mut documents = self
            .documents
            .write()
            .map_err(|_| Error::index("memory index lock poisoned"))?;
        documents.retain(|d| !d.has_term(term));
        documents.push(document);
        log::trace!("MemoryIndex: upserted {term}");
        Ok(())
    }

    fn delete(&self, term: &Term) -> Result<()> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| Error::index("memory index lock poisoned"))?;
        documents.retain(|d| !d.has_term(term));
        log::trace!("MemoryIndex: deleted {term}");
        Ok(())
    }

    fn search(
        &self,
        query: &Query,
        filter: Option<&Query>,
        sort: &Sort,
        fields_to_load: &BTreeSet<String>,
        limit: usize,
    ) -> Result<Vec<ScoredDocument>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let documents = self
            .documents
            .read()
            .map_err(|_| Error::index("memory index lock poisoned"))?;

        let mut hits: Vec<ScoredDocument> = documents
            .iter()
            .filter(|d| filter.is_none_or(|f| f.score(d).is_some()))
            .filter_map(|d| query.score(d).map(|score| ScoredDocument::new(d.clone(), score)))
            .collect();
        hits.sort_by(|a, b| sort.compare(a, b));
        hits.truncate(limit);

        let loadable = self.loadable(fields_to_load);
        log::debug!("MemoryIndex: {} hits, limit={limit}", hits.len());
        Ok(hits
            .into_iter()
            .map(|hit| ScoredDocument::new(hit.document.project(&loadable), hit.score))
            .collect())
    }

    fn commit(&self) -> Result<()> {
        Ok(())
    }

    fn num_docs(&self) -> Result<usize> {
        self.documents
            .read()
            .map(|d| d.len())
            .map_err(|_| Error::index("memory index lock poisoned"))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

impl std::fmt::Debug for MemoryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryIndex")
            .field("fields", &self.specs.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

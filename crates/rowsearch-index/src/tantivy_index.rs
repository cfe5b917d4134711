//! Tantivy search backend implementation.
//!
//! Provides `TantivyIndex`, the inverted-index backend. This module is only
//! available with the `index-tantivy` feature.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rowsearch_index::{FieldKind, FieldSpec, IndexSettings, TantivyIndex};
//!
//! let specs = vec![FieldSpec::new("_partition_key", FieldKind::Keyword).stored()];
//! let index = TantivyIndex::open(&IndexSettings::default(), &specs)?;
//! index.upsert(&term, document)?;
//! ```
//!
//! Relevance sorts and single-field sorts over fast fields are applied by
//! the collector, so only the first `limit` hits are loaded; their scores
//! are recomputed with `explain`. Other sorts collect every hit, load the
//! sort fields and order them before the limit is applied. Either way a
//! limited token-ordered search returns the first tokens rather than the
//! best scores.

use std::collections::BTreeSet;
use std::ops::Bound;
use std::sync::Mutex;

use rowsearch_core::{Error, Result};
use tantivy::collector::TopDocs;
use tantivy::query::{
    AllQuery, BooleanQuery, BoostQuery, ConstScoreQuery, Occur, Query as TantivyQuery, RangeQuery,
    TermQuery,
};
use tantivy::schema::{Field, IndexRecordOption, Value as _};
use tantivy::{
    DocAddress, Index, IndexReader, IndexWriter, Order, ReloadPolicy, Score, Searcher,
    TantivyDocument, TantivyError, Term as TantivyTerm,
};

use crate::backend::IndexBackend;
use crate::document::{
    FieldKind, FieldSpec, FieldValue, IndexDocument, IndexField, ScoredDocument, Term,
};
use crate::query::{Query, Sort};
use crate::schema::TantivySchema;
use crate::types::IndexSettings;

/// Smallest writer budget Tantivy accepts for one indexing thread.
const MIN_WRITER_BUFFER: usize = 15_000_000;

/// Sort pushed down into the collector.
enum EngineOrder {
    Score,
    Fast {
        field: String,
        kind: FieldKind,
        order: Order,
    },
}

/// Tantivy-based search backend.
pub struct TantivyIndex {
    index: Index,
    writer: Mutex<IndexWriter>,
    reader: IndexReader,
    schema: TantivySchema,
    auto_commit: bool,
}

impl TantivyIndex {
    /// Create or open an index for the declared fields.
    ///
    /// Without `settings.path` the index lives in RAM. With a path, an
    /// existing index is opened and its fields are checked against `specs`;
    /// otherwise a new one is created there.
    pub fn open(settings: &IndexSettings, specs: &[FieldSpec]) -> Result<Self> {
        let fresh = TantivySchema::build(specs)?;
        let (index, schema) = match &settings.path {
            Some(path) if Self::index_exists(path) => {
                let index = Index::open_in_dir(path)
                    .map_err(|e| Error::index(format!("Failed to open index: {e}")))?;
                let schema = TantivySchema::resolve(index.schema(), specs)?;
                log::info!("Opened index at {}", path.display());
                (index, schema)
            }
            Some(path) => {
                std::fs::create_dir_all(path).map_err(|e| {
                    Error::index(format!("Failed to create {}: {e}", path.display()))
                })?;
                let index = Index::create_in_dir(path, fresh.schema().clone())
                    .map_err(|e| Error::index(format!("Failed to create index: {e}")))?;
                log::info!("Created index at {}", path.display());
                (index, fresh)
            }
            None => (Index::create_in_ram(fresh.schema().clone()), fresh),
        };

        let writer = index
            .writer_with_num_threads(1, settings.ram_buffer_bytes().max(MIN_WRITER_BUFFER))
            .map_err(|e| Error::index(format!("Failed to create index writer: {e}")))?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| Error::index(format!("Failed to create index reader: {e}")))?;

        Ok(Self {
            index,
            writer: Mutex::new(writer),
            reader,
            schema,
            auto_commit: settings.auto_commit,
        })
    }

    /// Create an in-memory index (for testing).
    pub fn new_in_memory(specs: &[FieldSpec]) -> Result<Self> {
        Self::open(&IndexSettings::default(), specs)
    }

    /// Check if an index exists at the given path.
    pub fn index_exists(path: &std::path::Path) -> bool {
        path.join("meta.json").exists()
    }

    /// Get the schema.
    pub fn schema(&self) -> &TantivySchema {
        &self.schema
    }

    fn term(&self, field: Field, kind: FieldKind, value: &FieldValue) -> Result<TantivyTerm> {
        match (kind, value) {
            (FieldKind::Long, FieldValue::Long(v)) => Ok(TantivyTerm::from_field_i64(field, *v)),
            (FieldKind::Double, FieldValue::Double(v)) => {
                Ok(TantivyTerm::from_field_f64(field, *v))
            }
            (FieldKind::Keyword, FieldValue::Keyword(v)) => {
                Ok(TantivyTerm::from_field_text(field, v))
            }
            _ => Err(Error::index(format!(
                "Value {value} cannot be used as a {kind:?} term"
            ))),
        }
    }

    fn convert_document(&self, document: &IndexDocument) -> Result<TantivyDocument> {
        let mut out = TantivyDocument::default();
        for IndexField { name, value } in document.fields() {
            let (field, kind) = self.schema.field(name)?;
            match (kind, value) {
                (FieldKind::Long, FieldValue::Long(v)) => out.add_i64(field, *v),
                (FieldKind::Double, FieldValue::Double(v)) => out.add_f64(field, *v),
                (FieldKind::Keyword, FieldValue::Keyword(v))
                | (FieldKind::Text, FieldValue::Text(v)) => out.add_text(field, v),
                _ => {
                    return Err(Error::index(format!(
                        "Field '{name}' is declared as {kind:?} but got {:?}",
                        value.kind()
                    )));
                }
            }
        }
        Ok(out)
    }

    fn convert_query(&self, query: &Query) -> Result<Box<dyn TantivyQuery>> {
        match query {
            Query::All => Ok(Box::new(AllQuery)),
            Query::Term { field, value } => {
                let (handle, kind) = self.schema.field(field)?;
                if kind == FieldKind::Text {
                    return self.convert_query(&Query::matching(field.clone(), value.to_string()));
                }
                let term = self.term(handle, kind, value)?;
                Ok(Box::new(TermQuery::new(term, IndexRecordOption::Basic)))
            }
            Query::Range { field, lower, upper } => {
                let (handle, kind) = self.schema.field(field)?;
                let lower = self.bound(handle, kind, lower)?;
                let upper = self.bound(handle, kind, upper)?;
                if matches!((&lower, &upper), (Bound::Unbounded, Bound::Unbounded)) {
                    return Ok(Box::new(AllQuery));
                }
                Ok(Box::new(RangeQuery::new(lower, upper)))
            }
            Query::Match { field, text } => {
                let (handle, _) = self.schema.field(field)?;
                let mut analyzer = self
                    .index
                    .tokenizer_for_field(handle)
                    .map_err(|e| Error::index(format!("No analyzer for '{field}': {e}")))?;
                let mut stream = analyzer.token_stream(text);
                let mut seen = BTreeSet::new();
                while stream.advance() {
                    seen.insert(stream.token().text.clone());
                }
                let terms = seen
                    .iter()
                    .map(|text| TantivyTerm::from_field_text(handle, text))
                    .collect();
                Ok(Box::new(BooleanQuery::new_multiterms_query(terms)))
            }
            Query::Boolean {
                must,
                should,
                must_not,
            } => {
                let mut clauses: Vec<(Occur, Box<dyn TantivyQuery>)> = Vec::new();
                for q in must {
                    clauses.push((Occur::Must, self.convert_query(q)?));
                }
                for q in should {
                    clauses.push((Occur::Should, self.convert_query(q)?));
                }
                for q in must_not {
                    clauses.push((Occur::MustNot, self.convert_query(q)?));
                }
                Ok(Box::new(BooleanQuery::new(clauses)))
            }
            Query::Boost { query, boost } => {
                Ok(Box::new(BoostQuery::new(self.convert_query(query)?, *boost)))
            }
        }
    }

    fn bound(
        &self,
        field: Field,
        kind: FieldKind,
        bound: &Bound<FieldValue>,
    ) -> Result<Bound<TantivyTerm>> {
        Ok(match bound {
            Bound::Included(v) => Bound::Included(self.term(field, kind, v)?),
            Bound::Excluded(v) => Bound::Excluded(self.term(field, kind, v)?),
            Bound::Unbounded => Bound::Unbounded,
        })
    }

    fn stored_values(&self, document: &TantivyDocument, name: &str) -> Vec<FieldValue> {
        let Ok((field, kind)) = self.schema.field(name) else {
            return Vec::new();
        };
        document
            .get_all(field)
            .filter_map(|value| match kind {
                FieldKind::Long => value.as_i64().map(FieldValue::Long),
                FieldKind::Double => value.as_f64().map(FieldValue::Double),
                FieldKind::Keyword => value.as_str().map(|s| FieldValue::Keyword(s.to_string())),
                FieldKind::Text => value.as_str().map(|s| FieldValue::Text(s.to_string())),
            })
            .collect()
    }

    fn load(&self, document: &TantivyDocument, names: &BTreeSet<String>) -> IndexDocument {
        let mut loaded = IndexDocument::new();
        for name in names {
            for value in self.stored_values(document, name) {
                loaded.add(IndexField::new(name.clone(), value));
            }
        }
        loaded
    }

    /// Order the engine can apply while collecting, if any.
    ///
    /// Relevance and a single criterion over a fast field are pushed down;
    /// anything else is sorted after loading.
    fn engine_order(&self, sort: &Sort) -> Option<EngineOrder> {
        let criterion = match sort.criteria() {
            [] => return Some(EngineOrder::Score),
            [criterion] => criterion,
            _ => return None,
        };
        let (field, kind) = self.schema.field(&criterion.field).ok()?;
        if kind == FieldKind::Text || !self.schema.schema().get_field_entry(field).is_fast() {
            return None;
        }
        let order = if criterion.reverse { Order::Desc } else { Order::Asc };
        Some(EngineOrder::Fast {
            field: criterion.field.clone(),
            kind,
            order,
        })
    }

    /// Addresses of the hits to load, with their score when already known.
    fn collect(
        &self,
        searcher: &Searcher,
        query: &dyn TantivyQuery,
        sort: &Sort,
        limit: usize,
        total: usize,
    ) -> Result<Vec<(Option<Score>, DocAddress)>> {
        let failed = |e: TantivyError| Error::index(format!("Search failed: {e}"));
        let candidates = match self.engine_order(sort) {
            Some(EngineOrder::Score) => searcher
                .search(query, &TopDocs::with_limit(limit).order_by_score())
                .map_err(failed)?
                .into_iter()
                .map(|(score, address)| (Some(score), address))
                .collect(),
            Some(EngineOrder::Fast {
                field,
                kind: FieldKind::Long,
                order,
            }) => {
                let collector = TopDocs::with_limit(limit).order_by_fast_field::<i64>(field, order);
                unscored(searcher.search(query, &collector).map_err(failed)?)
            }
            Some(EngineOrder::Fast {
                field,
                kind: FieldKind::Double,
                order,
            }) => {
                let collector = TopDocs::with_limit(limit).order_by_fast_field::<f64>(field, order);
                unscored(searcher.search(query, &collector).map_err(failed)?)
            }
            Some(EngineOrder::Fast { field, order, .. }) => {
                let collector = TopDocs::with_limit(limit).order_by_string_fast_field(field, order);
                unscored(searcher.search(query, &collector).map_err(failed)?)
            }
            None => {
                log::trace!("TantivyIndex: sorting {total} candidates after loading");
                searcher
                    .search(query, &TopDocs::with_limit(total).order_by_score())
                    .map_err(failed)?
                    .into_iter()
                    .map(|(score, address)| (Some(score), address))
                    .collect()
            }
        };
        Ok(candidates)
    }

    fn refresh(&self, writer: &mut IndexWriter) -> Result<()> {
        writer
            .commit()
            .map_err(|e| Error::index(format!("Failed to commit index: {e}")))?;
        self.reader
            .reload()
            .map_err(|e| Error::index(format!("Failed to reload index reader: {e}")))
    }
}

fn unscored<T>(hits: Vec<(T, DocAddress)>) -> Vec<(Option<Score>, DocAddress)> {
    hits.into_iter().map(|(_, address)| (None, address)).collect()
}

impl IndexBackend for TantivyIndex {
    fn upsert(&self, term: &Term, document: IndexDocument) -> Result<()> {
        let (field, kind) = self.schema.field(&term.field)?;
        let key = self.term(field, kind, &FieldValue::Keyword(term.text.clone()))?;
        let converted = self.convert_document(&document)?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| Error::index("index writer lock poisoned"))?;
        writer.delete_term(key);
        writer
            .add_document(converted)
            .map_err(|e| Error::index(format!("Failed to add document: {e}")))?;
        if self.auto_commit {
            self.refresh(&mut writer)?;
        }
        Ok(())
    }

    fn delete(&self, term: &Term) -> Result<()> {
        let (field, kind) = self.schema.field(&term.field)?;
        let key = self.term(field, kind, &FieldValue::Keyword(term.text.clone()))?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| Error::index("index writer lock poisoned"))?;
        writer.delete_term(key);
        if self.auto_commit {
            self.refresh(&mut writer)?;
        }
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
        let searcher = self.reader.searcher();
        let total = searcher.num_docs() as usize;
        if limit == 0 || total == 0 {
            return Ok(Vec::new());
        }

        let mut tantivy_query = self.convert_query(query)?;
        if let Some(filter) = filter {
            let filter: Box<dyn TantivyQuery> =
                Box::new(ConstScoreQuery::new(self.convert_query(filter)?, 0.0));
            tantivy_query = Box::new(BooleanQuery::new(vec![
                (Occur::Must, tantivy_query),
                (Occur::Must, filter),
            ]));
        }

        let candidates = self.collect(&searcher, tantivy_query.as_ref(), sort, limit, total)?;

        let mut needed = fields_to_load.clone();
        needed.extend(sort.fields().map(str::to_string));

        let mut hits = Vec::with_capacity(candidates.len());
        for (score, address) in candidates {
            let document: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| Error::index(format!("Failed to load document: {e}")))?;
            let score = match score {
                Some(score) => score,
                None => tantivy_query
                    .explain(&searcher, address)
                    .map_err(|e| Error::index(format!("Failed to score document: {e}")))?
                    .value(),
            };
            hits.push(ScoredDocument::new(self.load(&document, &needed), score));
        }
        hits.sort_by(|a, b| sort.compare(a, b));
        hits.truncate(limit);

        log::debug!("TantivyIndex: {} hits of {total} docs, limit={limit}", hits.len());
        Ok(hits
            .into_iter()
            .map(|hit| ScoredDocument::new(hit.document.project(fields_to_load), hit.score))
            .collect())
    }

    fn commit(&self) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| Error::index("index writer lock poisoned"))?;
        self.refresh(&mut writer)
    }

    fn num_docs(&self) -> Result<usize> {
        Ok(self.reader.searcher().num_docs() as usize)
    }

    fn name(&self) -> &str {
        "tantivy"
    }
}

impl std::fmt::Debug for TantivyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TantivyIndex")
            .field("index", &"<tantivy::Index>")
            .field("schema", &self.schema)
            .field("auto_commit", &self.auto_commit)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

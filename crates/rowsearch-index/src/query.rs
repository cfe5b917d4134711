//! Engine-neutral queries and sort specifications.
//!
//! Queries are built by the mappers and the row service and translated by
//! each backend. [`Query::score`] is the reference evaluation used by
//! [`MemoryIndex`](crate::MemoryIndex).

use std::cmp::Ordering;
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use crate::document::{FieldValue, IndexDocument, ScoredDocument};

/// Tokens longer than this are dropped by the analyzer.
const MAX_TOKEN_LEN: usize = 40;

/// A search query or filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    /// Matches every document.
    All,
    /// Exact value match.
    Term {
        /// Field name.
        field: String,
        /// Value to match.
        value: FieldValue,
    },
    /// Values within bounds, compared in the field's own order.
    Range {
        /// Field name.
        field: String,
        /// Lower bound.
        lower: Bound<FieldValue>,
        /// Upper bound.
        upper: Bound<FieldValue>,
    },
    /// Analyzed full-text match: any token of `text` matches.
    Match {
        /// Field name.
        field: String,
        /// Query text.
        text: String,
    },
    /// Boolean combination.
    Boolean {
        /// Clauses that must match; they contribute to the score.
        must: Vec<Query>,
        /// Clauses that should match; at least one when `must` is empty.
        should: Vec<Query>,
        /// Clauses that must not match.
        must_not: Vec<Query>,
    },
    /// Scales the score of the inner query.
    Boost {
        /// Inner query.
        query: Box<Query>,
        /// Score multiplier.
        boost: f32,
    },
}

impl Query {
    /// Exact match on a field.
    pub fn term(field: impl Into<String>, value: FieldValue) -> Self {
        Query::Term {
            field: field.into(),
            value,
        }
    }

    /// Range over a field.
    pub fn range(
        field: impl Into<String>,
        lower: Bound<FieldValue>,
        upper: Bound<FieldValue>,
    ) -> Self {
        Query::Range {
            field: field.into(),
            lower,
            upper,
        }
    }

    /// Full-text match on a field.
    pub fn matching(field: impl Into<String>, text: impl Into<String>) -> Self {
        Query::Match {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Conjunction of queries.
    pub fn and(queries: Vec<Query>) -> Self {
        Query::Boolean {
            must: queries,
            should: Vec::new(),
            must_not: Vec::new(),
        }
    }

    /// Disjunction of queries.
    pub fn or(queries: Vec<Query>) -> Self {
        Query::Boolean {
            must: Vec::new(),
            should: queries,
            must_not: Vec::new(),
        }
    }

    /// Everything except what `query` matches.
    pub fn not(query: Query) -> Self {
        Query::Boolean {
            must: vec![Query::All],
            should: Vec::new(),
            must_not: vec![query],
        }
    }

    /// Wrap this query with a score multiplier; a boost of 1 is a no-op.
    pub fn boosted(self, boost: f32) -> Self {
        if boost == 1.0 {
            self
        } else {
            Query::Boost {
                query: Box::new(self),
                boost,
            }
        }
    }

    /// Score `document` against this query, `None` when it does not match.
    ///
    /// Exact and range matches score 1, full-text matches score the number
    /// of distinct query tokens found, boolean queries sum their matching
    /// clauses.
    pub fn score(&self, document: &IndexDocument) -> Option<f32> {
        match self {
            Query::All => Some(1.0),
            Query::Term { field, value } => document
                .values(field)
                .any(|v| v.compare(value) == Some(Ordering::Equal))
                .then_some(1.0),
            Query::Range { field, lower, upper } => document
                .values(field)
                .any(|v| within(v, lower, upper))
                .then_some(1.0),
            Query::Match { field, text } => {
                let mut wanted = analyze(text);
                wanted.sort();
                wanted.dedup();
                let present: Vec<String> = document
                    .values(field)
                    .filter_map(FieldValue::as_str)
                    .flat_map(analyze)
                    .collect();
                let hits = wanted.iter().filter(|t| present.contains(*t)).count();
                (hits > 0).then_some(hits as f32)
            }
            Query::Boolean {
                must,
                should,
                must_not,
            } => {
                if must_not.iter().any(|q| q.score(document).is_some()) {
                    return None;
                }
                let mut total = 0.0;
                for query in must {
                    total += query.score(document)?;
                }
                let mut matched_should = false;
                for query in should {
                    if let Some(score) = query.score(document) {
                        total += score;
                        matched_should = true;
                    }
                }
                if must.is_empty() && !matched_should {
                    return None;
                }
                Some(total)
            }
            Query::Boost { query, boost } => query.score(document).map(|s| s * boost),
        }
    }
}

fn within(value: &FieldValue, lower: &Bound<FieldValue>, upper: &Bound<FieldValue>) -> bool {
    let above = match lower {
        Bound::Unbounded => true,
        Bound::Included(b) => matches!(value.compare(b), Some(Ordering::Greater | Ordering::Equal)),
        Bound::Excluded(b) => value.compare(b) == Some(Ordering::Greater),
    };
    let below = match upper {
        Bound::Unbounded => true,
        Bound::Included(b) => matches!(value.compare(b), Some(Ordering::Less | Ordering::Equal)),
        Bound::Excluded(b) => value.compare(b) == Some(Ordering::Less),
    };
    above && below
}

/// Split text into lower-cased alphanumeric tokens.
///
/// Mirrors the default analyzer of the Tantivy backend.
pub fn analyze(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty() && t.len() <= MAX_TOKEN_LEN)
        .map(str::to_lowercase)
        .collect()
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortCriterion {
    /// Field to sort by.
    pub field: String,
    /// Descending when set.
    #[serde(default)]
    pub reverse: bool,
}

impl SortCriterion {
    /// Ascending sort on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reverse: false,
        }
    }

    /// Descending sort on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reverse: true,
        }
    }
}

/// Result ordering.
///
/// An empty sort orders by relevance, highest score first. Otherwise hits
/// are ordered by each criterion in turn; documents missing a sort value
/// come last, and ties fall back to relevance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    criteria: Vec<SortCriterion>,
}

impl Sort {
    /// Order by relevance.
    pub fn relevance() -> Self {
        Self::default()
    }

    /// Order by the given criteria.
    pub fn by(criteria: Vec<SortCriterion>) -> Self {
        Self { criteria }
    }

    /// The sort criteria.
    pub fn criteria(&self) -> &[SortCriterion] {
        &self.criteria
    }

    /// Names of the fields that must be loaded to apply this sort.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.criteria.iter().map(|c| c.field.as_str())
    }

    /// Compare two hits under this sort.
    pub fn compare(&self, a: &ScoredDocument, b: &ScoredDocument) -> Ordering {
        for criterion in &self.criteria {
            let left = a.document.get_first(&criterion.field);
            let right = b.document.get_first(&criterion.field);
            let ordering = match (left, right) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(l), Some(r)) => {
                    let ordering = l.compare(r).unwrap_or(Ordering::Equal);
                    if criterion.reverse {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                }
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        b.score.total_cmp(&a.score)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::IndexField;

    fn doc(token: i64, body: &str) -> IndexDocument {
        let mut doc = IndexDocument::new();
        doc.add(IndexField::new("_token", FieldValue::Long(token)));
        doc.add(IndexField::new("body", FieldValue::Text(body.to_string())));
        doc.add(IndexField::new("kind", FieldValue::Keyword("book".to_string())));
        doc
    }

    #[test]
    fn test_term_and_range() {
        let d = doc(5, "hello");
        assert_eq!(Query::term("_token", FieldValue::Long(5)).score(&d), Some(1.0));
        assert!(Query::term("_token", FieldValue::Long(6)).score(&d).is_none());
        let range = Query::range(
            "_token",
            Bound::Excluded(FieldValue::Long(5)),
            Bound::Unbounded,
        );
        assert!(range.score(&d).is_none());
        let range = Query::range(
            "_token",
            Bound::Included(FieldValue::Long(5)),
            Bound::Included(FieldValue::Long(5)),
        );
        assert_eq!(range.score(&d), Some(1.0));
    }

    #[test]
    fn test_range_never_matches_other_kinds() {
        let d = doc(5, "hello");
        let upper = Bound::Included(FieldValue::Double(9.0));
        let range = Query::range("_token", Bound::Unbounded, upper);
        assert!(range.score(&d).is_none());
    }

    #[test]
    fn test_match_counts_distinct_tokens() {
        let d = doc(1, "The quick brown fox");
        assert_eq!(Query::matching("body", "QUICK fox fox").score(&d), Some(2.0));
        assert!(Query::matching("body", "slow").score(&d).is_none());
    }

    #[test]
    fn test_boolean() {
        let d = doc(1, "quick fox");
        let q = Query::and(vec![
            Query::matching("body", "fox"),
            Query::term("kind", FieldValue::Keyword("book".into())),
        ]);
        assert_eq!(q.score(&d), Some(2.0));
        let q = Query::or(vec![Query::matching("body", "dog"), Query::matching("body", "quick")]);
        assert_eq!(q.score(&d), Some(1.0));
        let q = Query::not(Query::matching("body", "fox"));
        assert!(q.score(&d).is_none());
        assert!(Query::or(vec![]).score(&d).is_none());
    }

    #[test]
    fn test_boost() {
        let d = doc(1, "fox");
        assert_eq!(Query::matching("body", "fox").boosted(2.5).score(&d), Some(2.5));
        assert_eq!(Query::All.boosted(1.0), Query::All);
    }

    #[test]
    fn test_analyze() {
        assert_eq!(analyze("Hello, World-42!"), vec!["hello", "world", "42"]);
        assert!(analyze(&"x".repeat(41)).is_empty());
    }

    #[test]
    fn test_sort_compare() {
        let sort = Sort::by(vec![SortCriterion::asc("_token")]);
        let a = ScoredDocument::new(doc(1, ""), 0.1);
        let b = ScoredDocument::new(doc(2, ""), 9.0);
        assert_eq!(sort.compare(&a, &b), Ordering::Less);

        let sort = Sort::by(vec![SortCriterion::desc("_token")]);
        assert_eq!(sort.compare(&a, &b), Ordering::Greater);

        // Relevance breaks ties.
        let sort = Sort::by(vec![SortCriterion::asc("missing")]);
        assert_eq!(sort.compare(&a, &b), Ordering::Greater);
        assert_eq!(Sort::relevance().compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_query_serialization() {
        let q = Query::range("_token", Bound::Included(FieldValue::Long(1)), Bound::Unbounded);
        let json = serde_json::to_string(&q).unwrap();
        let back: Query = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }
}

//! Orderings of reconstructed rows.
//!
//! Used by callers that merge the rows of several token ranges or nodes.

use std::cmp::Ordering;

use rowsearch_core::Row;

/// Total order over result rows.
pub trait RowComparator: Send + Sync {
    /// Compare two rows.
    fn compare(&self, a: &Row, b: &Row) -> Ordering;
}

/// Orders rows by partition token, then by key bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenRowComparator;

impl RowComparator for TokenRowComparator {
    fn compare(&self, a: &Row, b: &Row) -> Ordering {
        a.key().cmp(b.key())
    }
}

/// Orders rows by their injected score, highest first.
///
/// Rows without a readable score come last; ties fall back to token order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRowComparator {
    column: String,
}

impl ScoreRowComparator {
    /// Comparator reading scores from `column`.
    pub fn new(column: impl Into<String>) -> Self {
        Self { column: column.into() }
    }
}

impl RowComparator for ScoreRowComparator {
    fn compare(&self, a: &Row, b: &Row) -> Ordering {
        let by_score = match (score(a, &self.column), score(b, &self.column)) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_score.then_with(|| a.key().cmp(b.key()))
    }
}

/// Score injected into `row` under `column`, if present and numeric.
pub fn score(row: &Row, column: &str) -> Option<f32> {
    row.value(column)?.as_text()?.parse().ok()
}

// ============================================================================
// Tests
// ============================================================================

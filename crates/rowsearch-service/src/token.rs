//! Partition tokens as index fields.
//!
//! Each partitioner gets one encoding of its tokens into the `_token` field,
//! chosen so that field order is token order:
//!
//! | Partitioner | Field kind | Encoding |
//! |-------------|------------|----------|
//! | Murmur3 | Long | the token itself |
//! | Random | Keyword | 32-digit zero-padded lower-case hex |
//! | ByteOrdered | Keyword | lower-case hex of the key bytes |
//!
//! Token ranges become range filters on that field. The partitioner's
//! minimum token is a sentinel, not a data point, so as a bound it means
//! "unbounded".

use std::ops::Bound;

use rowsearch_core::{DecoratedKey, Error, Partitioner, Result, Token};
use rowsearch_index::{
    FieldKind, FieldSpec, FieldValue, IndexDocument, IndexField, Query, SortCriterion,
};
use rowsearch_mapping::TOKEN_FIELD;

/// A token interval as handed down by the storage engine.
///
/// `None` bounds and minimum-token bounds are both open. Wrapping ranges
/// are split by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRange {
    /// Start of the range.
    pub lower: Option<Token>,
    /// End of the range.
    pub upper: Option<Token>,
    /// Whether `lower` itself is in the range.
    pub include_lower: bool,
    /// Whether `upper` itself is in the range.
    pub include_upper: bool,
}

impl TokenRange {
    /// Every token.
    pub fn all() -> Self {
        Self {
            lower: None,
            upper: None,
            include_lower: true,
            include_upper: true,
        }
    }

    /// Closed range `[lower, upper]`.
    pub fn between(lower: Token, upper: Token) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
            include_lower: true,
            include_upper: true,
        }
    }

    /// Half-open range `(lower, upper]`, the shape of a token ring slice.
    pub fn left_open(lower: Token, upper: Token) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
            include_lower: false,
            include_upper: true,
        }
    }

    /// Returns whether `token` lies in this range.
    pub fn contains(&self, token: &Token) -> bool {
        let above = match self.lower.as_ref().filter(|t| !t.is_minimum()) {
            None => true,
            Some(lower) if self.include_lower => token >= lower,
            Some(lower) => token > lower,
        };
        let below = match self.upper.as_ref().filter(|t| !t.is_minimum()) {
            None => true,
            Some(upper) if self.include_upper => token <= upper,
            Some(upper) => token < upper,
        };
        above && below
    }
}

/// Maps partition tokens to the `_token` index field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenMapper {
    /// Tokens of [`Partitioner::Murmur3`].
    Murmur3,
    /// Tokens of [`Partitioner::Random`].
    Random,
    /// Tokens of [`Partitioner::ByteOrdered`].
    ByteOrdered,
}

impl TokenMapper {
    /// The mapper for `partitioner`.
    pub fn new(partitioner: Partitioner) -> Self {
        match partitioner {
            Partitioner::Murmur3 => TokenMapper::Murmur3,
            Partitioner::Random => TokenMapper::Random,
            Partitioner::ByteOrdered => TokenMapper::ByteOrdered,
        }
    }

    /// The partitioner whose tokens this mapper encodes.
    pub fn partitioner(self) -> Partitioner {
        match self {
            TokenMapper::Murmur3 => Partitioner::Murmur3,
            TokenMapper::Random => Partitioner::Random,
            TokenMapper::ByteOrdered => Partitioner::ByteOrdered,
        }
    }

    /// Declaration of the token field.
    pub fn field_spec(self) -> FieldSpec {
        let kind = match self {
            TokenMapper::Murmur3 => FieldKind::Long,
            TokenMapper::Random | TokenMapper::ByteOrdered => FieldKind::Keyword,
        };
        FieldSpec::new(TOKEN_FIELD, kind).sortable()
    }

    /// Encode `token` as a value of the token field.
    pub fn encode(self, token: &Token) -> Result<FieldValue> {
        match (self, token) {
            (TokenMapper::Murmur3, Token::Murmur3(v)) => Ok(FieldValue::Long(*v)),
            (TokenMapper::Random, Token::Random(v)) if *v >= 0 => {
                Ok(FieldValue::Keyword(format!("{:032x}", v.unsigned_abs())))
            }
            (TokenMapper::ByteOrdered, Token::ByteOrdered(bytes)) => {
                Ok(FieldValue::Keyword(hex::encode(bytes)))
            }
            _ => Err(Error::type_mismatch(TOKEN_FIELD, token)),
        }
    }

    /// Append the token field of `key` to `document`.
    pub fn add_fields(self, document: &mut IndexDocument, key: &DecoratedKey) -> Result<()> {
        document.add(IndexField::new(TOKEN_FIELD, self.encode(key.token())?));
        Ok(())
    }

    /// Filter matching exactly `token`.
    pub fn exact_query(self, token: &Token) -> Result<Query> {
        let value = self.encode(token)?;
        Ok(Query::range(
            TOKEN_FIELD,
            Bound::Included(value.clone()),
            Bound::Included(value),
        ))
    }

    /// Filter matching tokens between the given bounds.
    ///
    /// Returns `None` when both bounds are open, meaning no restriction.
    pub fn range_filter(
        self,
        lower: Option<&Token>,
        upper: Option<&Token>,
        include_lower: bool,
        include_upper: bool,
    ) -> Result<Option<Query>> {
        let lower = self.bound(lower, include_lower)?;
        let upper = self.bound(upper, include_upper)?;
        if matches!((&lower, &upper), (Bound::Unbounded, Bound::Unbounded)) {
            return Ok(None);
        }
        Ok(Some(Query::range(TOKEN_FIELD, lower, upper)))
    }

    /// Filter restricting results to `range`.
    pub fn filter(self, range: &TokenRange) -> Result<Option<Query>> {
        self.range_filter(
            range.lower.as_ref(),
            range.upper.as_ref(),
            range.include_lower,
            range.include_upper,
        )
    }

    /// Sort that returns hits in token order.
    pub fn sort_criteria(self) -> Vec<SortCriterion> {
        vec![SortCriterion::asc(TOKEN_FIELD)]
    }

    fn bound(self, token: Option<&Token>, inclusive: bool) -> Result<Bound<FieldValue>> {
        let Some(token) = token.filter(|t| !t.is_minimum()) else {
            return Ok(Bound::Unbounded);
        };
        let value = self.encode(token)?;
        Ok(if inclusive {
            Bound::Included(value)
        } else {
            Bound::Excluded(value)
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

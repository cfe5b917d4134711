//! Partitioners, partition tokens and decorated keys.
//!
//! Tokens are opaque coordinates in a partitioner's key space. Within one
//! partitioner they are totally ordered, and each partitioner has a minimum
//! sentinel that is never the token of a real key.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::{xxh3_128, xxh3_64};

/// Partitioner algorithms whose tokens can be mapped to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partitioner {
    /// 64-bit signed hash tokens.
    Murmur3,
    /// 127-bit non-negative hash tokens.
    Random,
    /// Tokens are the raw key bytes.
    ByteOrdered,
}

impl Partitioner {
    /// The minimum sentinel token of this partitioner.
    pub fn minimum_token(self) -> Token {
        match self {
            Partitioner::Murmur3 => Token::Murmur3(i64::MIN),
            Partitioner::Random => Token::Random(-1),
            Partitioner::ByteOrdered => Token::ByteOrdered(Vec::new()),
        }
    }

    /// Reference token function used by [`MemoryStore`](crate::MemoryStore).
    ///
    /// Murmur3 and Random tokens come from xxh3 rather than the hash of any
    /// particular storage engine, so they are stable and well spread but not
    /// wire compatible. Real stores supply their own tokens through
    /// [`RowStore::decorate_key`](crate::RowStore::decorate_key).
    pub fn token(self, key: &[u8]) -> Token {
        match self {
            Partitioner::Murmur3 => {
                let hash = xxh3_64(key) as i64;
                // The minimum is reserved for the sentinel.
                Token::Murmur3(if hash == i64::MIN { i64::MAX } else { hash })
            }
            Partitioner::Random => Token::Random((xxh3_128(key) >> 1) as i128),
            Partitioner::ByteOrdered => Token::ByteOrdered(key.to_vec()),
        }
    }
}

impl fmt::Display for Partitioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Partitioner::Murmur3 => "murmur3",
            Partitioner::Random => "random",
            Partitioner::ByteOrdered => "byte_ordered",
        };
        f.write_str(name)
    }
}

/// A partition token.
///
/// Tokens of different partitioners are never compared by the index; the
/// derived ordering between variants only exists so keys can live in ordered
/// collections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "partitioner", content = "value", rename_all = "snake_case")]
pub enum Token {
    /// Murmur3 token.
    Murmur3(i64),
    /// Random partitioner token, `-1` being the sentinel.
    Random(i128),
    /// Byte ordered token.
    ByteOrdered(Vec<u8>),
}

impl Token {
    /// Partitioner this token belongs to.
    pub fn partitioner(&self) -> Partitioner {
        match self {
            Token::Murmur3(_) => Partitioner::Murmur3,
            Token::Random(_) => Partitioner::Random,
            Token::ByteOrdered(_) => Partitioner::ByteOrdered,
        }
    }

    /// Returns whether this token is its partitioner's minimum sentinel.
    pub fn is_minimum(&self) -> bool {
        *self == self.partitioner().minimum_token()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Murmur3(v) => write!(f, "{v}"),
            Token::Random(v) => write!(f, "{v}"),
            Token::ByteOrdered(v) => f.write_str(&hex::encode(v)),
        }
    }
}

/// A partition key together with its token.
///
/// Ordered by token first, then by raw key bytes, which is the order the
/// storage engine scans partitions in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecoratedKey {
    token: Token,
    key: Vec<u8>,
}

impl DecoratedKey {
    /// Create a decorated key from its token and raw bytes.
    pub fn new(token: Token, key: impl Into<Vec<u8>>) -> Self {
        Self {
            token,
            key: key.into(),
        }
    }

    /// The partition token.
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// The raw partition key bytes.
    pub fn key(&self) -> &[u8] {
        &self.key
    }
}

impl Ord for DecoratedKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.token
            .cmp(&other.token)
            .then_with(|| self.key.cmp(&other.key))
    }
}

impl PartialOrd for DecoratedKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DecoratedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DecoratedKey({}, {})", self.token, hex::encode(&self.key))
    }
}

// ============================================================================
// Tests
// ============================================================================

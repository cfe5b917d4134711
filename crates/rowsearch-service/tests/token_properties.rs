//! Property tests for token range filters.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rowsearch_core::{DecoratedKey, Partitioner, Token};
use rowsearch_index::IndexDocument;
use rowsearch_service::{TokenMapper, TokenRange};

fn murmur3_token() -> impl Strategy<Value = i64> {
    prop_oneof![
        1 => Just(i64::MIN),
        1 => Just(i64::MAX),
        8 => any::<i64>(),
    ]
}

/// Whether the filter of `range` selects a document carrying `token`.
fn selects(mapper: TokenMapper, range: &TokenRange, token: &Token) -> bool {
    let mut document = IndexDocument::new();
    let key = DecoratedKey::new(token.clone(), Vec::new());
    mapper.add_fields(&mut document, &key).unwrap();
    match mapper.filter(range).unwrap() {
        Some(filter) => filter.score(&document).is_some(),
        None => true,
    }
}

proptest! {
    #[test]
    fn murmur3_filter_agrees_with_range(
        lower in proptest::option::of(murmur3_token()),
        upper in proptest::option::of(murmur3_token()),
        include_lower in any::<bool>(),
        include_upper in any::<bool>(),
        token in murmur3_token(),
    ) {
        let range = TokenRange {
            lower: lower.map(Token::Murmur3),
            upper: upper.map(Token::Murmur3),
            include_lower,
            include_upper,
        };
        let token = Token::Murmur3(token);
        prop_assert_eq!(selects(TokenMapper::Murmur3, &range, &token), range.contains(&token));
    }

    #[test]
    fn byte_ordered_filter_agrees_with_range(
        lower in proptest::collection::vec(any::<u8>(), 0..4),
        upper in proptest::collection::vec(any::<u8>(), 0..4),
        key in proptest::collection::vec(any::<u8>(), 0..4),
        include_lower in any::<bool>(),
        include_upper in any::<bool>(),
    ) {
        let partitioner = Partitioner::ByteOrdered;
        let range = TokenRange {
            lower: Some(partitioner.token(&lower)),
            upper: Some(partitioner.token(&upper)),
            include_lower,
            include_upper,
        };
        let token = partitioner.token(&key);
        prop_assert_eq!(selects(TokenMapper::ByteOrdered, &range, &token), range.contains(&token));
    }

    #[test]
    fn random_filter_agrees_with_range(
        lower in 0..i128::MAX,
        upper in 0..i128::MAX,
        token in 0..i128::MAX,
    ) {
        let range = TokenRange::left_open(Token::Random(lower), Token::Random(upper));
        let token = Token::Random(token);
        prop_assert_eq!(selects(TokenMapper::Random, &range, &token), range.contains(&token));
    }
}

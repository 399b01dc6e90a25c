//! Serialized index properties.
//!
//! - Any built index survives serialization unchanged
//! - Any single flipped bit is rejected, never loaded and never a panic
//! - Any truncation is rejected

use biosift::{build_inverted_index, Domain, FieldType, SearchDoc, SerializedIndex};
use proptest::prelude::*;

fn corpus() -> impl Strategy<Value = Vec<SearchDoc>> {
    prop::collection::vec(
        (
            "[a-z]{2,8}( [a-z]{2,8}){0,3}",
            prop::collection::vec("[a-z0-9]{1,10}", 0..6),
            prop::sample::select(vec![FieldType::Title, FieldType::Keyword, FieldType::Content]),
        ),
        0..30,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (title, words, field_type))| {
                SearchDoc::new(format!("MGI:{i}"))
                    .with_field(FieldType::Title, title)
                    .with_field(field_type, words.join(" "))
            })
            .collect()
    })
}

fn domain() -> impl Strategy<Value = Domain> {
    prop::sample::select(Domain::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_round_trip(docs in corpus(), domain in domain()) {
        let original = SerializedIndex::new(domain, build_inverted_index(&docs));
        let bytes = original.to_bytes().unwrap();
        let loaded = SerializedIndex::from_bytes_for(&bytes, domain).unwrap();
        prop_assert_eq!(loaded, original);
    }

    #[test]
    fn prop_bit_flip_rejected(docs in corpus(), pos in any::<prop::sample::Index>(), bit in 0u8..8) {
        let mut bytes = SerializedIndex::new(Domain::Genes, build_inverted_index(&docs))
            .to_bytes()
            .unwrap();
        let at = pos.index(bytes.len());
        bytes[at] ^= 1 << bit;
        prop_assert!(SerializedIndex::from_bytes(&bytes).is_err());
    }

    #[test]
    fn prop_truncation_rejected(docs in corpus(), cut in any::<prop::sample::Index>()) {
        let bytes = SerializedIndex::new(Domain::Phenotypes, build_inverted_index(&docs))
            .to_bytes()
            .unwrap();
        let len = cut.index(bytes.len());
        prop_assert!(SerializedIndex::from_bytes(&bytes[..len]).is_err());
    }

    #[test]
    fn prop_summary_matches_build(docs in corpus()) {
        let index = build_inverted_index(&docs);
        let (doc_count, term_count) = (index.doc_count(), index.term_count());
        let bytes = SerializedIndex::new(Domain::AllPublications, index).to_bytes().unwrap();

        let summary = SerializedIndex::summarize(&bytes).unwrap();
        prop_assert!(summary.checksum_ok());
        prop_assert_eq!(summary.domain(), Some(Domain::AllPublications));
        prop_assert_eq!(summary.header.doc_count as usize, doc_count);
        prop_assert_eq!(summary.header.term_count as usize, term_count);
        prop_assert_eq!(summary.file_len, bytes.len());
    }
}

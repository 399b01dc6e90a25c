//! Inverted index construction.
//!
//! # INVARIANTS (DO NOT VIOLATE)
//!
//! 1. **VOCABULARY_SORTED**: terms are unique and in byte order, so prefix
//!    lookups can binary search
//! 2. **POSTING_LIST_SORTED**: each posting list is sorted by document ordinal
//! 3. **NON_EMPTY**: every term has at least one posting
//! 4. **ORDINAL_IS_INSERTION_ORDER**: document ordinal `n` is the `n`th input
//!    document; relevance ties fall back to it
//!
//! The query side tokenizes with [`tokenize_query`], which splits and
//! normalizes exactly like [`tokenize`] so a query term and an indexed term
//! compare byte for byte.

use crate::types::{InvertedIndex, Posting, SearchDoc};
use crate::utils::normalize;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

/// Word boundary detection: checks if character is a word separator.
fn is_word_boundary(c: char) -> bool {
    !c.is_alphanumeric()
}

/// Stop words loaded from data/stop_words.json.
///
/// Function words that would otherwise match nearly every publication title.
static STOP_WORDS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    let json_str = include_str!("../data/stop_words.json");
    parse_stop_words_json(json_str)
});

/// Parse stop words from JSON, flattening all language arrays into a single set.
fn parse_stop_words_json(json_str: &str) -> HashSet<String> {
    let by_language: HashMap<String, Vec<String>> = match serde_json::from_str(json_str) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "stop word list unreadable, indexing without stop words");
            return HashSet::new();
        }
    };

    by_language
        .into_values()
        .flatten()
        .map(|word| normalize(&word))
        .filter(|word| !word.is_empty())
        .collect()
}

/// Check if a word is a stop word.
#[inline]
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

/// Tokenize text into normalized search terms.
///
/// Splits on every non-alphanumeric character, so `Tg(ACTB-cre)` yields
/// `tg`, `actb`, `cre` and `MP:0001186` yields `mp`, `0001186`. Stop words
/// are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(is_word_boundary)
        .filter(|word| !word.is_empty() && !is_stop_word(word))
        .map(str::to_string)
        .collect()
}

/// Tokenize search box text.
///
/// Same terms as [`tokenize`], except that the final word survives even when
/// it is a stop word: the user may still be typing it (`in` on the way to
/// `insulin`), and it can only ever prefix-match, since indexed text never
/// contains stop words.
pub fn tokenize_query(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    let words: Vec<&str> = normalized
        .split(is_word_boundary)
        .filter(|word| !word.is_empty())
        .collect();
    let last = words.len().saturating_sub(1);

    words
        .iter()
        .enumerate()
        .filter(|&(i, word)| i == last || !is_stop_word(word))
        .map(|(_, word)| word.to_string())
        .collect()
}

/// Boosted term frequencies and token count for one document.
fn document_terms(doc: &SearchDoc) -> (HashMap<String, u32>, u32) {
    let mut weights: HashMap<String, u32> = HashMap::new();
    let mut length = 0u32;

    for field in &doc.fields {
        let boost = field.field_type.boost();
        for term in tokenize(&field.text) {
            *weights.entry(term).or_default() += boost;
            length += 1;
        }
    }

    (weights, length)
}

/// Build an inverted index from documents.
///
/// Creates a map from terms to posting lists. Document ordinals follow the
/// order of `docs`.
pub fn build_inverted_index(docs: &[SearchDoc]) -> InvertedIndex {
    // MAP PHASE: per-document term weights
    #[cfg(feature = "parallel")]
    let per_doc: Vec<(HashMap<String, u32>, u32)> = docs.par_iter().map(document_terms).collect();
    #[cfg(not(feature = "parallel"))]
    let per_doc: Vec<(HashMap<String, u32>, u32)> = docs.iter().map(document_terms).collect();

    // REDUCE PHASE: merge in document order, which keeps every posting list sorted
    let mut terms: BTreeMap<String, Vec<Posting>> = BTreeMap::new();
    let mut doc_lengths = Vec::with_capacity(docs.len());

    for (doc, (weights, length)) in per_doc.into_iter().enumerate() {
        doc_lengths.push(length);
        for (term, weight) in weights {
            terms.entry(term).or_default().push(Posting {
                doc: doc as u32,
                weight,
            });
        }
    }

    let (vocabulary, postings): (Vec<String>, Vec<Vec<Posting>>) = terms.into_iter().unzip();

    InvertedIndex {
        ids: docs.iter().map(|d| d.id.clone()).collect(),
        vocabulary,
        postings,
        doc_lengths,
    }
}

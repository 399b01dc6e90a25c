// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Query execution against a loaded index.
//!
//! A query is tokenized like indexed text (keeping a trailing stop word, which
//! may be a word in progress), deduplicated, and treated as an AND: a document is returned only if every query term hits it. Each
//! query term hits through the identical vocabulary term or through any term
//! it is a prefix of, which is what makes search-as-you-type work on partial
//! words ("pax" finds "pax6"). Per term, a document keeps its best hit; the
//! document's score is the sum over terms.
//!
//! The searcher never sees row content, only ordinals and ids. It is
//! immutable after construction and never locks.

use std::collections::HashMap;

use crate::error::{Result, SearchError};
use crate::inverted::tokenize_query;
use crate::scoring::{
    bm25, compare_matches, idf, ScoredMatch, EXACT_MATCH_FACTOR, PREFIX_MATCH_FACTOR,
};
use crate::types::{DocumentRef, InvertedIndex};

/// Longest query text the searcher accepts (bytes).
pub const MAX_QUERY_LEN: usize = 1024;

/// Accumulator for multi-term search score summing.
///
/// Tracks, per document, the best score each query term contributed.
struct MultiTermAccumulator {
    /// doc ordinal → best score per query term (None until the term hits)
    per_doc: HashMap<u32, Vec<Option<f64>>>,
    num_terms: usize,
}

impl MultiTermAccumulator {
    fn new(num_terms: usize) -> Self {
        Self {
            per_doc: HashMap::new(),
            num_terms,
        }
    }

    /// Record a hit of query term `term_idx` on `doc`, keeping the best score.
    #[inline]
    fn add_match(&mut self, term_idx: usize, doc: u32, score: f64) {
        let slots = self
            .per_doc
            .entry(doc)
            .or_insert_with(|| vec![None; self.num_terms]);
        let slot = &mut slots[term_idx];
        match slot {
            Some(best) if *best >= score => {}
            _ => *slot = Some(score),
        }
    }

    /// Documents hit by ALL query terms, ranked.
    fn into_matches(self) -> Vec<ScoredMatch> {
        let mut matches: Vec<ScoredMatch> = self
            .per_doc
            .into_iter()
            .filter_map(|(doc, slots)| {
                slots
                    .into_iter()
                    .sum::<Option<f64>>()
                    .map(|score| ScoredMatch { doc, score })
            })
            .collect();
        matches.sort_by(compare_matches);
        matches
    }
}

/// Answers free-text queries against one loaded [`InvertedIndex`].
#[derive(Debug, Clone)]
pub struct Searcher {
    index: InvertedIndex,
    avg_doc_len: f64,
}

impl Searcher {
    pub fn from_index(index: InvertedIndex) -> Self {
        let total: u64 = index.doc_lengths.iter().map(|&l| u64::from(l)).sum();
        let avg_doc_len = if index.doc_lengths.is_empty() || total == 0 {
            1.0
        } else {
            total as f64 / index.doc_lengths.len() as f64
        };
        Self { index, avg_doc_len }
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn doc_count(&self) -> usize {
        self.index.doc_count()
    }

    pub fn term_count(&self) -> usize {
        self.index.term_count()
    }

    /// Matching document ids, most relevant first.
    pub fn search(&self, query: &str) -> Result<Vec<DocumentRef>> {
        let matches = self.search_scored(query)?;
        matches
            .into_iter()
            .map(|m| {
                self.index
                    .ids
                    .get(m.doc as usize)
                    .cloned()
                    .ok_or_else(|| {
                        SearchError::IndexCorrupted(format!(
                            "posting points at document {} of {}",
                            m.doc,
                            self.index.ids.len()
                        ))
                    })
            })
            .collect()
    }

    /// Ranked matches with ordinals and scores (for inspection and display).
    pub fn search_scored(&self, query: &str) -> Result<Vec<ScoredMatch>> {
        if query.len() > MAX_QUERY_LEN {
            return Err(SearchError::InvalidQuery(format!(
                "query is {} bytes (max {})",
                query.len(),
                MAX_QUERY_LEN
            )));
        }

        let mut terms = tokenize_query(query);
        let mut seen = std::collections::HashSet::new();
        terms.retain(|t| seen.insert(t.clone()));
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut acc = MultiTermAccumulator::new(terms.len());
        for (term_idx, term) in terms.iter().enumerate() {
            for ord in self.vocabulary_range(term) {
                let factor = if self.index.vocabulary[ord] == *term {
                    EXACT_MATCH_FACTOR
                } else {
                    PREFIX_MATCH_FACTOR
                };
                self.score_term(ord, factor, term_idx, &mut acc)?;
            }
        }

        Ok(acc.into_matches())
    }

    /// Ordinals of every vocabulary term starting with `prefix` (the exact
    /// term, if present, sorts first).
    fn vocabulary_range(&self, prefix: &str) -> std::ops::Range<usize> {
        let vocab = &self.index.vocabulary;
        let start = vocab.partition_point(|t| t.as_str() < prefix);
        let len = vocab[start..]
            .iter()
            .take_while(|t| t.starts_with(prefix))
            .count();
        start..start + len
    }

    fn score_term(
        &self,
        ord: usize,
        factor: f64,
        term_idx: usize,
        acc: &mut MultiTermAccumulator,
    ) -> Result<()> {
        let postings = &self.index.postings[ord];
        let term_idf = idf(self.index.doc_count(), postings.len());
        for posting in postings {
            let doc_len = self
                .index
                .doc_lengths
                .get(posting.doc as usize)
                .copied()
                .ok_or_else(|| {
                    SearchError::IndexCorrupted(format!(
                        "no length for document {}",
                        posting.doc
                    ))
                })?;
            let score = factor * bm25(term_idf, posting.weight, doc_len, self.avg_doc_len);
            acc.add_match(term_idx, posting.doc, score);
        }
        Ok(())
    }
}

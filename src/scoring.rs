// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Relevance scoring and result ordering.
//!
//! Scores are Okapi BM25 over field-boosted term frequencies. A query term
//! that equals an indexed term counts fully; a query term that is only a
//! prefix of an indexed term (the user is still typing) counts at
//! [`PREFIX_MATCH_FACTOR`].
//!
//! Ordering is score descending, then document ordinal ascending. The
//! ordinal is insertion order in the index, so two equally relevant rows keep
//! the order the builder saw them in.
//!
//! # References
//!
//! - **BM25**: Robertson & Zaragoza (2009): "The Probabilistic Relevance
//!   Framework: BM25 and Beyond", Foundations and Trends in IR 3(4).

use std::cmp::Ordering;

/// Term frequency saturation.
pub const BM25_K1: f64 = 1.2;

/// Document length normalization strength.
pub const BM25_B: f64 = 0.75;

/// Weight of an exact term match.
pub const EXACT_MATCH_FACTOR: f64 = 1.0;

/// Weight of a prefix-only match.
pub const PREFIX_MATCH_FACTOR: f64 = 0.5;

/// Inverse document frequency with the +1 floor that keeps it positive.
pub fn idf(doc_count: usize, doc_freq: usize) -> f64 {
    let n = doc_count as f64;
    let df = doc_freq as f64;
    (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
}

/// BM25 contribution of one term to one document.
///
/// `weight` is the boosted term frequency, `doc_len` the document's token
/// count and `avg_doc_len` the corpus mean (callers pass a value > 0).
pub fn bm25(idf: f64, weight: u32, doc_len: u32, avg_doc_len: f64) -> f64 {
    let tf = f64::from(weight);
    let norm = 1.0 - BM25_B + BM25_B * (f64::from(doc_len) / avg_doc_len);
    idf * (tf * (BM25_K1 + 1.0)) / (tf + BM25_K1 * norm)
}

/// A document that matched every query term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMatch {
    /// Document ordinal (insertion order)
    pub doc: u32,
    pub score: f64,
}

/// Compare two matches for ranking.
///
/// Sort order:
/// 1. **Score** - descending
/// 2. **Ordinal** - ascending, i.e. index insertion order
pub fn compare_matches(a: &ScoredMatch, b: &ScoredMatch) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.doc.cmp(&b.doc))
}

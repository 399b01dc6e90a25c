// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The building blocks shared by the builder, the worker and the page.
//!
//! Three groups live here:
//!
//! - **Identity**: [`Domain`] names which dataset an index covers, and
//!   [`DocumentRef`] correlates a hit with a row the page already fetched.
//!   The search core never holds row content, only these ids.
//! - **Index shape**: [`SearchDoc`] is what the builder indexes,
//!   [`InvertedIndex`] is what a worker searches.
//! - **Protocol**: [`Command`] flows page → worker, [`Event`] flows back.
//!
//! # Invariants
//!
//! - **InvertedIndex**: `doc_lengths.len() == ids.len()`, `postings.len() == vocabulary.len()`,
//!   `vocabulary` sorted and deduplicated, every posting list non-empty and sorted by `doc`,
//!   every `posting.doc < ids.len()`.
//! - **Event::IndexLoaded** is emitted at most once per worker, before any `QueryResult`.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// File extension of serialized index assets.
pub const ASSET_EXTENSION: &str = "bsx";

// =============================================================================
// IDENTITY
// =============================================================================

/// Which dataset a search surface covers.
///
/// Each domain ships its own index asset and gets its own worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    Genes,
    Phenotypes,
    ConsortiumPublications,
    AllPublications,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Genes,
        Domain::Phenotypes,
        Domain::ConsortiumPublications,
        Domain::AllPublications,
    ];

    /// The tag used in asset names, logs and manifests.
    pub fn tag(self) -> &'static str {
        match self {
            Domain::Genes => "genes",
            Domain::Phenotypes => "phenotypes",
            Domain::ConsortiumPublications => "consortium-publications",
            Domain::AllPublications => "all-publications",
        }
    }

    /// Single-byte code stored in the asset header.
    pub fn code(self) -> u8 {
        match self {
            Domain::Genes => 1,
            Domain::Phenotypes => 2,
            Domain::ConsortiumPublications => 3,
            Domain::AllPublications => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.code() == code)
    }

    /// Well-known asset file name: `<domain>_search_index.bsx`.
    pub fn asset_file_name(self) -> String {
        format!("{}_search_index.{}", self.tag(), ASSET_EXTENSION)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.tag() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|d| d.tag()).collect();
                format!("unknown domain `{}` (expected one of {})", s, known.join(", "))
            })
    }
}

/// Opaque id correlating an index entry with a row of the fetched dataset
/// (gene accession, phenotype id, publication id).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentRef(String);

impl DocumentRef {
    pub fn new(id: impl Into<String>) -> Self {
        DocumentRef(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for DocumentRef {
    fn from(id: &str) -> Self {
        DocumentRef(id.to_string())
    }
}

impl From<String> for DocumentRef {
    fn from(id: String) -> Self {
        DocumentRef(id)
    }
}

impl Borrow<str> for DocumentRef {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// INDEX SHAPE
// =============================================================================

/// How much an occurrence in a field counts toward term frequency.
///
/// Symbols and accession-like titles dominate, synonyms and keywords come
/// next, free text is the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Title,
    Keyword,
    #[default]
    Content,
}

impl FieldType {
    /// Integer boost added to a term's weighted frequency per occurrence.
    pub fn boost(self) -> u32 {
        match self {
            FieldType::Title => 10,
            FieldType::Keyword => 3,
            FieldType::Content => 1,
        }
    }
}

/// One searchable text field of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocField {
    pub field_type: FieldType,
    pub text: String,
}

/// A document as the offline builder sees it: an id plus its text fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDoc {
    pub id: DocumentRef,
    pub fields: Vec<DocField>,
}

impl SearchDoc {
    pub fn new(id: impl Into<DocumentRef>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field_type: FieldType, text: impl Into<String>) -> Self {
        self.fields.push(DocField {
            field_type,
            text: text.into(),
        });
        self
    }
}

/// A term occurrence summary for one document.
///
/// `doc` is the insertion ordinal (position in `InvertedIndex::ids`), and
/// `weight` is the field-boosted term frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Posting {
    pub doc: u32,
    pub weight: u32,
}

/// The decoded form of a serialized index: everything a worker needs to
/// answer queries, nothing a page needs to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvertedIndex {
    /// Document ids in insertion order (ordinal = position)
    pub ids: Vec<DocumentRef>,
    /// Sorted, unique terms
    pub vocabulary: Vec<String>,
    /// Posting list per vocabulary term, sorted by `doc`
    pub postings: Vec<Vec<Posting>>,
    /// Indexed token count per document
    pub doc_lengths: Vec<u32>,
}

impl InvertedIndex {
    pub fn doc_count(&self) -> usize {
        self.ids.len()
    }

    pub fn term_count(&self) -> usize {
        self.vocabulary.len()
    }

    /// Ordinal of `term` in the vocabulary, if indexed.
    pub fn term_ordinal(&self, term: &str) -> Option<usize> {
        self.vocabulary
            .binary_search_by(|t| t.as_str().cmp(term))
            .ok()
    }

    /// Check the structural invariants listed in the module docs.
    pub fn validate(&self) -> Result<(), String> {
        if self.doc_lengths.len() != self.ids.len() {
            return Err(format!(
                "doc_lengths has {} entries for {} documents",
                self.doc_lengths.len(),
                self.ids.len()
            ));
        }
        if self.postings.len() != self.vocabulary.len() {
            return Err(format!(
                "{} posting lists for {} terms",
                self.postings.len(),
                self.vocabulary.len()
            ));
        }
        if let Some(pair) = self.vocabulary.windows(2).find(|w| w[0] >= w[1]) {
            return Err(format!(
                "vocabulary not strictly sorted at `{}` / `{}`",
                pair[0], pair[1]
            ));
        }
        for (ord, list) in self.postings.iter().enumerate() {
            if list.is_empty() {
                return Err(format!("term `{}` has no postings", self.vocabulary[ord]));
            }
            if list.windows(2).any(|w| w[0].doc >= w[1].doc) {
                return Err(format!("postings of `{}` not sorted", self.vocabulary[ord]));
            }
            if let Some(p) = list.iter().find(|p| p.doc as usize >= self.ids.len()) {
                return Err(format!(
                    "posting of `{}` points at document {} (have {})",
                    self.vocabulary[ord],
                    p.doc,
                    self.ids.len()
                ));
            }
        }
        Ok(())
    }
}

// =============================================================================
// PROTOCOL
// =============================================================================

/// Message from a page to its worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "camelCase")]
pub enum Command {
    Query(String),
}

/// Outcome of one processed `Query`, echoing the text that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Matching ids, most relevant first
    pub matching_ids: Vec<DocumentRef>,
    pub no_matches: bool,
    pub query_echo: String,
}

impl QueryResult {
    pub fn new(query_echo: impl Into<String>, matching_ids: Vec<DocumentRef>) -> Self {
        Self {
            no_matches: matching_ids.is_empty(),
            matching_ids,
            query_echo: query_echo.into(),
        }
    }

    /// The result reported when execution failed: nothing matched.
    pub fn failed(query_echo: impl Into<String>) -> Self {
        Self::new(query_echo, Vec::new())
    }
}

/// Message from a worker to its page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    /// The index finished loading; queries are now answered.
    #[serde(rename_all = "camelCase")]
    IndexLoaded { doc_count: usize, term_count: usize },
    /// The index could not be fetched or parsed; search is unavailable.
    IndexLoadFailed { reason: String },
    QueryResult(QueryResult),
}

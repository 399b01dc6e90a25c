//! Fixtures shared across unit tests, integration tests and benches.
//!
//! This module is always compiled but hidden from documentation.

#![doc(hidden)]

use crate::binary::SerializedIndex;
use crate::error::Result;
use crate::inverted::build_inverted_index;
use crate::source::MemorySource;
use crate::types::{Domain, FieldType, SearchDoc};

/// A document with a single content field.
pub fn make_doc(id: &str, text: &str) -> SearchDoc {
    SearchDoc::new(id).with_field(FieldType::Content, text)
}

/// The three-document index: `a` "alpha gene", `b` "beta gene", `c` "gamma".
pub fn scenario_docs() -> Vec<SearchDoc> {
    vec![
        make_doc("a", "alpha gene"),
        make_doc("b", "beta gene"),
        make_doc("c", "gamma"),
    ]
}

/// The ids of [`scenario_docs`], in dataset order.
pub fn scenario_rows() -> Vec<String> {
    vec!["a".into(), "b".into(), "c".into()]
}

/// A handful of mouse genes with symbols, names and synonyms.
pub fn gene_docs() -> Vec<SearchDoc> {
    [
        ("MGI:97490", "Pax6", "paired box 6", "Dey Gsfaey"),
        ("MGI:98364", "Sox2", "SRY-box transcription factor 2", "Sox-2"),
        ("MGI:88276", "Ctnnb1", "catenin beta 1", "Catnb"),
        ("MGI:96677", "Krt5", "keratin 5", "K5"),
        ("MGI:1346344", "Nes", "nestin", "ESTM46"),
        ("MGI:95664", "Gata1", "GATA binding protein 1", "Gf-1 Eryf1"),
    ]
    .into_iter()
    .map(|(id, symbol, name, synonyms)| {
        SearchDoc::new(id)
            .with_field(FieldType::Title, symbol)
            .with_field(FieldType::Keyword, synonyms)
            .with_field(FieldType::Content, name)
    })
    .collect()
}

/// Serialize `docs` as `domain`'s asset.
pub fn asset_bytes(domain: Domain, docs: &[SearchDoc]) -> Result<Vec<u8>> {
    SerializedIndex::new(domain, build_inverted_index(docs)).to_bytes()
}

/// A source serving the scenario index as the genes asset.
pub fn scenario_source() -> Result<MemorySource> {
    let bytes = asset_bytes(Domain::Genes, &scenario_docs())?;
    Ok(MemorySource::new().with_asset(Domain::Genes, bytes))
}

/// `n` synthetic documents over a small vocabulary, for benches and
/// property tests.
pub fn synthetic_docs(n: usize) -> Vec<SearchDoc> {
    const WORDS: [&str; 12] = [
        "abnormal", "retina", "morphology", "heart", "kidney", "decreased", "increased",
        "circulating", "glucose", "level", "embryonic", "lethality",
    ];
    (0..n)
        .map(|i| {
            let text: Vec<&str> = (0..6).map(|k| WORDS[(i * 7 + k * 5 + k * k) % WORDS.len()]).collect();
            SearchDoc::new(format!("MP:{:07}", i))
                .with_field(FieldType::Title, text[..2].join(" "))
                .with_field(FieldType::Content, text[2..].join(" "))
        })
        .collect()
}

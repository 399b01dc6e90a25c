//! Relevance ordering over the gene fixture.

use biosift::{build_inverted_index, FieldType, SearchDoc, Searcher};

use super::common::{gene_docs, make_doc};

fn genes() -> Searcher {
    Searcher::from_index(build_inverted_index(&gene_docs()))
}

fn ids(searcher: &Searcher, query: &str) -> Vec<String> {
    searcher
        .search(query)
        .unwrap()
        .into_iter()
        .map(|id| id.into_string())
        .collect()
}

#[test]
fn symbol_lookup_is_case_insensitive() {
    let s = genes();
    assert_eq!(ids(&s, "pax6"), vec!["MGI:97490"]);
    assert_eq!(ids(&s, "PAX6"), vec!["MGI:97490"]);
}

#[test]
fn synonyms_are_searchable() {
    assert_eq!(ids(&genes(), "catnb"), vec!["MGI:88276"]);
}

#[test]
fn multi_word_name_requires_every_word() {
    let s = genes();
    assert_eq!(ids(&s, "catenin beta"), vec!["MGI:88276"]);
    assert!(ids(&s, "catenin keratin").is_empty());
}

#[test]
fn title_outranks_content() {
    let docs = vec![
        make_doc("content", "a nestin reporter line"),
        SearchDoc::new("title").with_field(FieldType::Title, "nestin"),
    ];
    let s = Searcher::from_index(build_inverted_index(&docs));
    assert_eq!(ids(&s, "nestin"), vec!["title", "content"]);
}

#[test]
fn exact_term_outranks_longer_prefix_match() {
    let docs = vec![
        make_doc("prefix", "retinal degeneration"),
        make_doc("exact", "retina degeneration"),
    ];
    let s = Searcher::from_index(build_inverted_index(&docs));
    assert_eq!(ids(&s, "retina"), vec!["exact", "prefix"]);
}

#[test]
fn rare_term_outweighs_common_term() {
    let docs = vec![
        make_doc("common", "abnormal abnormal"),
        make_doc("rare", "lens"),
        make_doc("other1", "abnormal heart"),
        make_doc("other2", "abnormal kidney"),
    ];
    let s = Searcher::from_index(build_inverted_index(&docs));
    let scored = s.search_scored("abnormal").unwrap();
    assert_eq!(scored.len(), 3);
    let lens = s.search_scored("lens").unwrap();
    assert!(lens[0].score > scored[0].score);
}

#[test]
fn equal_scores_keep_insertion_order() {
    let docs: Vec<SearchDoc> = (0..10).map(|i| make_doc(&format!("d{i}"), "gene")).collect();
    let s = Searcher::from_index(build_inverted_index(&docs));
    let expected: Vec<String> = (0..10).map(|i| format!("d{i}")).collect();
    assert_eq!(ids(&s, "gene"), expected);
}

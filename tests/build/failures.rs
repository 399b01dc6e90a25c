//! Inputs the builder refuses.

use std::fs;

use tempfile::TempDir;

use biosift::run_build;

fn manifest(dir: &TempDir, json: &str) {
    fs::write(dir.path().join("manifest.json"), json).unwrap();
}

#[test]
fn missing_id_fails_the_whole_build() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    manifest(
        &input,
        r#"{"version": 1, "domains": [
            {"domain": "genes", "documents": "genes.json", "idField": "mgiAccessionId",
             "fields": [{"name": "markerSymbol", "type": "title"}]}
        ]}"#,
    );
    fs::write(
        input.path().join("genes.json"),
        r#"[{"mgiAccessionId": "MGI:1", "markerSymbol": "Pax6"}, {"markerSymbol": "Sox2"}]"#,
    )
    .unwrap();

    let err = run_build(input.path(), output.path()).unwrap_err();
    assert_eq!(err.error_type(), "INVALID_INPUT");
    assert!(err.to_string().contains("row 1"), "{err}");
    assert!(!output.path().join("genes_search_index.bsx").exists());
}

#[test]
fn unknown_manifest_key_is_rejected() {
    let input = TempDir::new().unwrap();
    manifest(&input, r#"{"version": 1, "domains": [], "extra": true}"#);
    let err = run_build(input.path(), input.path()).unwrap_err();
    assert_eq!(err.error_type(), "SERIALIZATION_ERROR");
}

#[test]
fn empty_manifest_builds_nothing() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    manifest(&input, r#"{"version": 1, "domains": []}"#);
    let report = run_build(input.path(), output.path()).unwrap();
    assert!(report.assets.is_empty());
    assert_eq!(report.total_bytes(), 0);
}

#[test]
fn empty_dataset_builds_an_empty_index() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    manifest(
        &input,
        r#"{"version": 1, "domains": [
            {"domain": "all-publications", "documents": "pubs.json", "idField": "id",
             "fields": [{"name": "title"}]}
        ]}"#,
    );
    fs::write(input.path().join("pubs.json"), "[]").unwrap();

    let report = run_build(input.path(), output.path()).unwrap();
    assert_eq!(report.assets.len(), 1);
    assert_eq!(report.assets[0].1.doc_count, 0);
    assert_eq!(report.assets[0].1.term_count, 0);
}

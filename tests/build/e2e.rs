//! Build assets from JSON datasets, then search them through sessions.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use tempfile::TempDir;

use biosift::{run_build, Domain, SearchConfig, SearchSession, SerializedIndex};

use super::common::WAIT;

fn write_inputs(dir: &Path) -> Vec<Value> {
    fs::write(
        dir.join("manifest.json"),
        r#"{
            "version": 1,
            "domains": [
                {"domain": "phenotypes", "documents": "phenotypes.json", "idField": "id",
                 "fields": [{"name": "name", "type": "title"},
                            {"name": "synonyms", "type": "keyword"},
                            {"name": "definition"}]},
                {"domain": "consortium-publications", "documents": "pubs.json", "idField": "pmid",
                 "fields": [{"name": "title", "type": "title"}, {"name": "journal"}]}
            ]
        }"#,
    )
    .unwrap();

    let phenotypes = vec![
        json!({"id": "MP:0001293", "name": "anophthalmia", "synonyms": ["absent eyes"],
               "definition": "absence of one or both eyes"}),
        json!({"id": "MP:0001286", "name": "abnormal eye development",
               "definition": "anomaly in the formation of the eye"}),
        json!({"id": "MP:0000001", "name": "mammalian phenotype"}),
    ];
    fs::write(dir.join("phenotypes.json"), serde_json::to_string(&phenotypes).unwrap()).unwrap();
    fs::write(
        dir.join("pubs.json"),
        r#"[{"pmid": 27626380, "title": "High-throughput discovery of novel developmental phenotypes",
             "journal": "Nature"}]"#,
    )
    .unwrap();
    phenotypes
}

#[test]
fn built_assets_serve_searches() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let rows = write_inputs(input.path());

    let report = run_build(input.path(), output.path()).unwrap();
    assert_eq!(report.assets.len(), 2);
    assert_eq!(report.total_docs(), 4);

    let config = SearchConfig {
        index_dir: output.path().to_path_buf(),
        quiet_period_ms: 0,
        ..SearchConfig::default()
    };
    let mut session = SearchSession::open(Domain::Phenotypes, config.source(), &config).unwrap();
    assert!(session.settle(WAIT).unwrap());
    assert!(session.state().index_loaded);

    session.on_type("eye");
    assert!(session.settle(WAIT).unwrap());
    let visible: Vec<&str> = session
        .visible(&rows)
        .into_iter()
        .map(|row| row["id"].as_str().unwrap())
        .collect();
    assert_eq!(visible, vec!["MP:0001293", "MP:0001286"]);

    session.on_type("absent eyes");
    assert!(session.settle(WAIT).unwrap());
    assert_eq!(session.visible(&rows).len(), 1);
}

#[test]
fn numeric_ids_are_searchable_as_text_ids() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_inputs(input.path());
    run_build(input.path(), output.path()).unwrap();

    let bytes = fs::read(output.path().join("consortium-publications_search_index.bsx")).unwrap();
    let loaded = SerializedIndex::from_bytes_for(&bytes, Domain::ConsortiumPublications).unwrap();
    assert_eq!(loaded.index.ids[0].as_str(), "27626380");
}

#[test]
fn config_file_points_sessions_at_assets() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_inputs(input.path());
    run_build(input.path(), output.path()).unwrap();

    let config_path = input.path().join("search.json");
    fs::write(
        &config_path,
        serde_json::to_string(&json!({"index_dir": output.path(), "quiet_period_ms": 0})).unwrap(),
    )
    .unwrap();
    let config = SearchConfig::from_file(&config_path).unwrap();

    let mut session =
        SearchSession::open(Domain::ConsortiumPublications, config.source(), &config).unwrap();
    session.on_type("developmental phenotypes");
    assert!(session.settle(WAIT).unwrap());
    assert_eq!(session.state().search_result_ids.len(), 1);
    assert!(!session.state().no_matches);
}

#[test]
fn summary_describes_written_asset() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_inputs(input.path());
    let report = run_build(input.path(), output.path()).unwrap();

    for (path, built) in &report.assets {
        let bytes = fs::read(path).unwrap();
        let summary = SerializedIndex::summarize(&bytes).unwrap();
        assert!(summary.checksum_ok());
        assert_eq!(summary.domain(), Some(built.domain));
        assert_eq!(summary.stored_crc32, Some(built.crc32));
        assert_eq!(summary.header.doc_count as usize, built.doc_count);
    }
}

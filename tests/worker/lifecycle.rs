//! Load, failure and dispose behavior of a worker.

use std::time::Duration;

use super::common::{
    asset_bytes, collect_results, ids, scenario_docs, scenario_source, GatedSource, PanickingSource,
    QUIET_WINDOW, WAIT,
};
use biosift::{Command, DirSource, Domain, Event, MemorySource, WorkerBridge, WorkerOptions};

#[test]
fn index_loaded_precedes_every_result() {
    let gated = GatedSource::new(scenario_source().unwrap());
    let mut bridge = WorkerBridge::create(Domain::Genes, gated.clone(), &WorkerOptions::default()).unwrap();

    assert!(gated.wait_for_fetch(WAIT));
    bridge.send(Command::Query("gene".into())).unwrap();
    bridge.send(Command::Query("gamma".into())).unwrap();
    assert_eq!(bridge.recv_timeout(QUIET_WINDOW), None, "nothing before the index loads");

    gated.open();
    assert!(matches!(
        bridge.recv_timeout(WAIT),
        Some(Event::IndexLoaded { doc_count: 3, .. })
    ));
    let results = collect_results(&mut bridge, 2);
    assert_eq!(results.len(), 2);
    assert_eq!(ids(&results[0]), vec!["a", "b"]);
    assert_eq!(ids(&results[1]), vec!["c"]);
}

#[test]
fn index_loaded_is_emitted_once() {
    let mut bridge = WorkerBridge::create(Domain::Genes, scenario_source().unwrap(), &WorkerOptions::default())
        .unwrap();
    for _ in 0..3 {
        bridge.send(Command::Query("alpha".into())).unwrap();
    }

    let mut loaded = 0;
    let mut answered = 0;
    while let Some(event) = bridge.recv_timeout(Duration::from_millis(500)) {
        match event {
            Event::IndexLoaded { .. } => loaded += 1,
            Event::QueryResult(_) => answered += 1,
            Event::IndexLoadFailed { reason } => panic!("unexpected failure: {reason}"),
        }
        if answered == 3 {
            break;
        }
    }
    assert_eq!(loaded, 1);
    assert_eq!(answered, 3);
}

#[test]
fn panicking_source_reports_load_failure() {
    let mut bridge = WorkerBridge::create(Domain::Genes, PanickingSource, &WorkerOptions::default()).unwrap();

    match bridge.recv_timeout(WAIT) {
        Some(Event::IndexLoadFailed { reason }) => {
            assert!(reason.contains("transport for genes asset crashed"), "{reason}")
        }
        other => panic!("expected IndexLoadFailed, got {other:?}"),
    }

    // the worker outlives the panic and keeps ignoring queries
    bridge.send(Command::Query("gene".into())).unwrap();
    assert_eq!(bridge.recv_timeout(QUIET_WINDOW), None);
    assert!(!bridge.has_exited());
    bridge.shutdown();
}

#[test]
fn missing_asset_reports_load_failure() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut bridge =
        WorkerBridge::create(Domain::Phenotypes, DirSource::new(dir.path()), &WorkerOptions::default()).unwrap();

    match bridge.recv_timeout(WAIT) {
        Some(Event::IndexLoadFailed { reason }) => {
            assert!(reason.contains("phenotypes_search_index.bsx"), "{reason}");
        }
        other => panic!("expected IndexLoadFailed, got {other:?}"),
    }

    // A failed worker ignores queries but stays connected.
    bridge.send(Command::Query("retina".into())).unwrap();
    assert_eq!(bridge.recv_timeout(QUIET_WINDOW), None);
}

#[test]
fn asset_for_another_domain_is_rejected() {
    let bytes = asset_bytes(Domain::Phenotypes, &scenario_docs()).unwrap();
    let source = MemorySource::new().with_asset(Domain::Genes, bytes);
    let mut bridge = WorkerBridge::create(Domain::Genes, source, &WorkerOptions::default()).unwrap();

    assert!(matches!(
        bridge.recv_timeout(WAIT),
        Some(Event::IndexLoadFailed { .. })
    ));
}

#[test]
fn corrupted_asset_is_rejected() {
    let mut bytes = asset_bytes(Domain::Genes, &scenario_docs()).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xff;
    let source = MemorySource::new().with_asset(Domain::Genes, bytes);
    let mut bridge = WorkerBridge::create(Domain::Genes, source, &WorkerOptions::default()).unwrap();

    match bridge.recv_timeout(WAIT) {
        Some(Event::IndexLoadFailed { reason }) => assert!(reason.contains("CRC32"), "{reason}"),
        other => panic!("expected IndexLoadFailed, got {other:?}"),
    }
}

#[test]
fn dispose_during_load_is_silent() {
    let gated = GatedSource::new(scenario_source().unwrap());
    let mut bridge = WorkerBridge::create(Domain::Genes, gated.clone(), &WorkerOptions::default()).unwrap();
    assert!(gated.wait_for_fetch(WAIT));

    bridge.dispose();
    gated.open();

    std::thread::sleep(QUIET_WINDOW);
    assert_eq!(bridge.try_recv(), None);
    assert_eq!(bridge.latest_event(), None);
    assert!(bridge.send(Command::Query("gene".into())).is_err());
}

#[test]
fn dispose_is_idempotent_and_shutdown_joins() {
    let mut bridge = WorkerBridge::create(Domain::Genes, scenario_source().unwrap(), &WorkerOptions::default())
        .unwrap();
    bridge.dispose();
    bridge.dispose();
    assert!(bridge.is_disposed());
    bridge.shutdown();
}

#[test]
fn independent_workers_do_not_share_state() {
    let genes = scenario_source().unwrap();
    let mut first = WorkerBridge::create(Domain::Genes, genes.clone(), &WorkerOptions::default()).unwrap();
    let mut second = WorkerBridge::create(Domain::Genes, genes, &WorkerOptions::default()).unwrap();

    first.dispose();
    assert!(matches!(second.recv_timeout(WAIT), Some(Event::IndexLoaded { .. })));
    second.send(Command::Query("beta".into())).unwrap();
    let results = collect_results(&mut second, 1);
    assert_eq!(ids(&results[0]), vec!["b"]);
}

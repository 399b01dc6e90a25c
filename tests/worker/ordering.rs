//! Result ordering, stale discard and pre-load behavior.

use std::time::{Duration, Instant};

use super::common::{collect_results, gene_docs, ids, loaded_scenario_bridge, scenario_rows, asset_bytes};
use biosift::{
    reconcile, Command, DebounceConfig, DebouncedQueryController, Domain, Event, IndexHost,
    MemorySource, QueryResult, DocumentRef,
};

#[test]
fn results_arrive_in_send_order() {
    let mut bridge = loaded_scenario_bridge();
    let queries = ["gene", "alpha", "zzz", "be", "gamma", "gene", "", "alpha gene"];
    for q in queries {
        bridge.send(Command::Query(q.into())).unwrap();
    }

    let results = collect_results(&mut bridge, queries.len());
    let echoes: Vec<&str> = results.iter().map(|r| r.query_echo.as_str()).collect();
    assert_eq!(echoes, queries);
}

#[test]
fn large_burst_keeps_order() {
    let bytes = asset_bytes(Domain::Genes, &gene_docs()).unwrap();
    let source = MemorySource::new().with_asset(Domain::Genes, bytes);
    let mut bridge = biosift::WorkerBridge::create(Domain::Genes, source, &Default::default()).unwrap();

    let queries: Vec<String> = (0..200).map(|i| format!("q{i} pax")).collect();
    for q in &queries {
        bridge.send(Command::Query(q.clone())).unwrap();
    }
    let results = collect_results(&mut bridge, queries.len());
    let echoes: Vec<&String> = results.iter().map(|r| &r.query_echo).collect();
    assert_eq!(echoes, queries.iter().collect::<Vec<_>>());
}

#[test]
fn out_of_order_responses_only_latest_applies() {
    let t0 = Instant::now();
    let mut controller = DebouncedQueryController::new(DebounceConfig {
        quiet_period: Duration::from_millis(100),
    });
    let mut sent = Vec::new();

    controller.on_type("al", t0);
    controller.poll(t0 + Duration::from_millis(100), &mut sent).unwrap();
    controller.on_type("alpha", t0 + Duration::from_millis(150));
    controller.poll(t0 + Duration::from_millis(250), &mut sent).unwrap();
    assert_eq!(sent, vec!["al", "alpha"]);

    let alpha = Event::QueryResult(QueryResult::new("alpha", vec![DocumentRef::new("a")]));
    let al = Event::QueryResult(QueryResult::new("al", vec![DocumentRef::new("a"), DocumentRef::new("c")]));

    assert!(controller.on_event(&alpha));
    assert!(!controller.on_event(&al), "response for an earlier query is stale");
    assert_eq!(controller.state().search_result_ids, vec![DocumentRef::new("a")]);
    assert!(!controller.state().is_searching);

    let rows = scenario_rows();
    assert_eq!(reconcile(&rows, controller.query(), controller.state()), vec!["a"]);
}

#[test]
fn early_response_for_superseded_query_is_ignored() {
    let t0 = Instant::now();
    let mut controller = DebouncedQueryController::new(DebounceConfig {
        quiet_period: Duration::ZERO,
    });
    let mut sent = Vec::new();

    controller.on_type("gene", t0);
    controller.poll(t0, &mut sent).unwrap();
    controller.on_type("gamma", t0);
    controller.poll(t0, &mut sent).unwrap();

    let gene = Event::QueryResult(QueryResult::new("gene", vec![DocumentRef::new("a"), DocumentRef::new("b")]));
    assert!(!controller.on_event(&gene));
    assert!(controller.state().is_searching, "still waiting for gamma");
    assert!(controller.state().search_result_ids.is_empty());
}

#[test]
fn host_ignores_queries_before_load() {
    let host = IndexHost::new(Domain::Genes);
    assert!(!host.is_loaded());
    assert_eq!(host.handle_query("gene"), None);
    assert_eq!(host.handle_query(""), None);
}

#[test]
fn bridge_answers_match_host() {
    let mut bridge = loaded_scenario_bridge();
    bridge.send(Command::Query("gene".into())).unwrap();
    let results = collect_results(&mut bridge, 1);
    assert_eq!(ids(&results[0]), vec!["a", "b"]);
    assert!(!results[0].no_matches);
}

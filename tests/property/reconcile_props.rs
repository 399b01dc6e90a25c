//! Reconciler properties over random datasets and search states.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use biosift::{
    reconcile, DebounceConfig, DebouncedQueryController, DocumentRef, Event, QueryResult, SearchState,
};
use proptest::prelude::*;

fn dataset() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[A-Z]{2}:[0-9]{1,5}", 0..40).prop_map(|ids| ids.into_iter().collect())
}

fn state_over(rows: &[String], picks: &[prop::sample::Index], no_matches: bool) -> SearchState {
    let search_result_ids = if rows.is_empty() {
        Vec::new()
    } else {
        picks.iter().map(|ix| DocumentRef::new(ix.get(rows).as_str())).collect()
    };
    SearchState {
        index_loaded: true,
        search_result_ids,
        no_matches,
        ..SearchState::default()
    }
}

proptest! {
    #[test]
    fn prop_no_matches_hides_everything(
        rows in dataset(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
        query in "[a-z ]{0,8}",
    ) {
        let state = state_over(&rows, &picks, true);
        prop_assert!(reconcile(&rows, &query, &state).is_empty());
    }

    #[test]
    fn prop_filter_keeps_dataset_order(
        rows in dataset(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..10),
        query in "[a-z]{1,8}",
    ) {
        let state = state_over(&rows, &picks, false);
        let visible = reconcile(&rows, &query, &state);

        let wanted: HashSet<&str> = state.search_result_ids.iter().map(|id| id.as_str()).collect();
        let expected: Vec<&String> = rows.iter().filter(|r| wanted.contains(r.as_str())).collect();
        if rows.is_empty() {
            prop_assert!(visible.is_empty());
        } else {
            prop_assert_eq!(visible, expected);
        }
    }

    #[test]
    fn prop_blank_query_shows_every_row(
        rows in dataset(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
        blank in "[ \t]{0,3}",
    ) {
        let state = state_over(&rows, &picks, false);
        prop_assert_eq!(reconcile(&rows, &blank, &state), rows.iter().collect::<Vec<_>>());
    }

    #[test]
    fn prop_clearing_restores_full_dataset(
        rows in dataset(),
        typed in prop::collection::vec("[a-z]{1,4}", 1..6),
        answer_empty in any::<bool>(),
    ) {
        let mut controller = DebouncedQueryController::new(DebounceConfig { quiet_period: Duration::ZERO });
        let mut sent: Vec<String> = Vec::new();
        let now = Instant::now();
        for text in &typed {
            controller.on_type(text, now);
            controller.poll(now, &mut sent).unwrap();
        }
        let last = typed.last().unwrap();
        let ids = if answer_empty {
            Vec::new()
        } else {
            rows.iter().take(3).map(|r| DocumentRef::new(r.as_str())).collect()
        };
        controller.on_event(&Event::QueryResult(QueryResult::new(last.as_str(), ids)));

        controller.on_type("", now);
        prop_assert_eq!(
            reconcile(&rows, controller.query(), controller.state()),
            rows.iter().collect::<Vec<_>>()
        );
    }
}

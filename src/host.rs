// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The worker-resident half of search: one index, loaded once, answering
//! point-in-time queries.
//!
//! `IndexHost` knows nothing about threads or channels. The worker loop in
//! [`crate::worker`] drives it; tests drive it directly.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::binary::SerializedIndex;
use crate::search::Searcher;
use crate::source::IndexSource;
use crate::types::{Domain, Event, QueryResult};

#[derive(Debug)]
enum HostState {
    Empty,
    Loaded(Searcher),
    Failed(String),
}

/// Holds one domain's index and executes queries against it.
///
/// Lifecycle: `Empty` → `Loaded` (or `Failed`) on the first [`start`]; never
/// back. A failed host ignores queries.
///
/// [`start`]: IndexHost::start
#[derive(Debug)]
pub struct IndexHost {
    domain: Domain,
    state: HostState,
}

impl IndexHost {
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            state: HostState::Empty,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, HostState::Loaded(_))
    }

    /// Fetch, validate and load the domain's index.
    ///
    /// Returns the event to report: `IndexLoaded` with the index's counts, or
    /// `IndexLoadFailed` with the reason. Calling again after the first call
    /// returns the same outcome without fetching.
    pub fn start(&mut self, source: &dyn IndexSource) -> Event {
        match &self.state {
            HostState::Loaded(searcher) => return loaded_event(searcher),
            HostState::Failed(reason) => {
                return Event::IndexLoadFailed {
                    reason: reason.clone(),
                }
            }
            HostState::Empty => {}
        }

        // a source that panics must still produce a failure event
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let location = source.describe(self.domain);
            let loaded = source
                .fetch(self.domain)
                .and_then(|bytes| SerializedIndex::from_bytes_for(&bytes, self.domain));
            (location, loaded)
        }));

        match outcome {
            Ok((location, Ok(serialized))) => {
                let searcher = Searcher::from_index(serialized.index);
                tracing::info!(
                    domain = %self.domain,
                    docs = searcher.doc_count(),
                    terms = searcher.term_count(),
                    %location,
                    "index loaded"
                );
                let event = loaded_event(&searcher);
                self.state = HostState::Loaded(searcher);
                event
            }
            Ok((location, Err(e))) => {
                tracing::warn!(
                    domain = %self.domain,
                    error = %e,
                    kind = e.error_type(),
                    %location,
                    "index load failed, search unavailable"
                );
                self.fail(e.to_string())
            }
            Err(payload) => {
                let reason = format!("index load panicked: {}", panic_message(&*payload));
                tracing::error!(domain = %self.domain, %reason, "search unavailable");
                self.fail(reason)
            }
        }
    }

    fn fail(&mut self, reason: String) -> Event {
        self.state = HostState::Failed(reason.clone());
        Event::IndexLoadFailed { reason }
    }

    /// Execute one query.
    ///
    /// `None` while no index is loaded: the query is dropped without a
    /// response. Otherwise always `Some`; a query that errors or panics
    /// reports no matches and the host keeps serving.
    pub fn handle_query(&self, text: &str) -> Option<QueryResult> {
        let HostState::Loaded(searcher) = &self.state else {
            tracing::debug!(domain = %self.domain, "query before index load ignored");
            return None;
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| searcher.search(text)));
        let result = match outcome {
            Ok(Ok(ids)) => QueryResult::new(text, ids),
            Ok(Err(e)) => {
                tracing::warn!(domain = %self.domain, error = %e, "query failed");
                QueryResult::failed(text)
            }
            Err(payload) => {
                tracing::warn!(
                    domain = %self.domain,
                    cause = panic_message(&*payload),
                    "query panicked"
                );
                QueryResult::failed(text)
            }
        };

        tracing::debug!(
            domain = %self.domain,
            query = text,
            hits = result.matching_ids.len(),
            "query answered"
        );
        Some(result)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause")
}

fn loaded_event(searcher: &Searcher) -> Event {
    Event::IndexLoaded {
        doc_count: searcher.doc_count(),
        term_count: searcher.term_count(),
    }
}

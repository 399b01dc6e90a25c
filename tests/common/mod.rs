//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use biosift::{Domain, Event, IndexSource, MemorySource, QueryResult, Result, WorkerBridge, WorkerOptions};

// Re-export canonical fixtures from biosift::testing
pub use biosift::testing::{
    asset_bytes, gene_docs, make_doc, scenario_docs, scenario_rows, scenario_source, synthetic_docs,
};

/// Upper bound for anything a worker should do in a test.
pub const WAIT: Duration = Duration::from_secs(5);

/// How long to watch for an event that must never arrive.
pub const QUIET_WINDOW: Duration = Duration::from_millis(150);

// ============================================================================
// SOURCES
// ============================================================================

/// A source whose fetch blocks until [`GatedSource::open`] is called.
///
/// Lets a test hold a worker in its loading phase.
#[derive(Clone)]
pub struct GatedSource {
    inner: MemorySource,
    gate: Arc<(Mutex<bool>, Condvar)>,
    fetches: Arc<AtomicUsize>,
}

impl GatedSource {
    pub fn new(inner: MemorySource) -> Self {
        Self {
            inner,
            gate: Arc::new((Mutex::new(false), Condvar::new())),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn open(&self) {
        let (lock, cvar) = &*self.gate;
        *lock.lock() = true;
        cvar.notify_all();
    }

    /// Number of fetches started so far.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Block until a fetch has started.
    pub fn wait_for_fetch(&self, timeout: Duration) -> bool {
        let give_up = Instant::now() + timeout;
        while self.fetches() == 0 {
            if Instant::now() >= give_up {
                return false;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        true
    }
}

impl IndexSource for GatedSource {
    fn fetch(&self, domain: Domain) -> Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let (lock, cvar) = &*self.gate;
        let mut open = lock.lock();
        while !*open {
            cvar.wait(&mut open);
        }
        drop(open);
        self.inner.fetch(domain)
    }

    fn describe(&self, domain: Domain) -> String {
        format!("gated {}", self.inner.describe(domain))
    }
}

/// A source whose fetch panics, as a broken asset transport might.
#[derive(Clone, Copy, Debug)]
pub struct PanickingSource;

impl IndexSource for PanickingSource {
    fn fetch(&self, domain: Domain) -> Result<Vec<u8>> {
        panic!("transport for {domain} asset crashed");
    }

    fn describe(&self, domain: Domain) -> String {
        format!("broken transport for {domain}")
    }
}

// ============================================================================
// WORKER HELPERS
// ============================================================================

/// A bridge over the scenario index that has finished loading.
pub fn loaded_scenario_bridge() -> WorkerBridge {
    let source = scenario_source().unwrap();
    let mut bridge = WorkerBridge::create(Domain::Genes, source, &WorkerOptions::default()).unwrap();
    match bridge.recv_timeout(WAIT) {
        Some(Event::IndexLoaded { .. }) => bridge,
        other => panic!("expected IndexLoaded, got {other:?}"),
    }
}

/// Collect query results until `count` have arrived or `WAIT` passes.
pub fn collect_results(bridge: &mut WorkerBridge, count: usize) -> Vec<QueryResult> {
    let give_up = Instant::now() + WAIT;
    let mut results = Vec::new();
    while results.len() < count {
        let now = Instant::now();
        if now >= give_up {
            break;
        }
        if let Some(Event::QueryResult(result)) = bridge.recv_timeout(give_up - now) {
            results.push(result);
        }
    }
    results
}

pub fn ids(result: &QueryResult) -> Vec<&str> {
    result.matching_ids.iter().map(|id| id.as_str()).collect()
}

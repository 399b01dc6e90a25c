// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! One search surface: a worker, a debounce controller, and the glue between.
//!
//! Each page (or each independent search box) opens its own session and
//! disposes it on teardown. Nothing is shared between sessions; two boxes
//! searching the same domain run two workers.
//!
//! The session never blocks on its own. The owner calls [`pump`] from its
//! event loop (on a timer tick, after a keystroke, when woken), or
//! [`wait`] when it has nothing better to do.
//!
//! [`pump`]: SearchSession::pump
//! [`wait`]: SearchSession::wait

use std::time::{Duration, Instant};

use crate::config::SearchConfig;
use crate::debounce::{DebounceConfig, DebouncedQueryController, SearchState};
use crate::error::Result;
use crate::reconcile::{reconcile, Identified};
use crate::source::IndexSource;
use crate::types::Domain;
use crate::worker::{WorkerBridge, WorkerOptions};

#[derive(Debug)]
pub struct SearchSession {
    bridge: WorkerBridge,
    controller: DebouncedQueryController,
}

impl SearchSession {
    /// Spawn the domain's worker and start loading its index.
    pub fn open<S: IndexSource>(domain: Domain, source: S, config: &SearchConfig) -> Result<Self> {
        Self::with_options(domain, source, config.debounce(), &config.worker_options())
    }

    pub fn with_options<S: IndexSource>(
        domain: Domain,
        source: S,
        debounce: DebounceConfig,
        options: &WorkerOptions,
    ) -> Result<Self> {
        let bridge = WorkerBridge::create(domain, source, options)?;
        Ok(Self {
            bridge,
            controller: DebouncedQueryController::new(debounce),
        })
    }

    pub fn domain(&self) -> Domain {
        self.bridge.domain()
    }

    pub fn state(&self) -> &SearchState {
        self.controller.state()
    }

    pub fn query(&self) -> &str {
        self.controller.query()
    }

    pub fn controller(&self) -> &DebouncedQueryController {
        &self.controller
    }

    pub fn on_type(&mut self, text: &str) {
        self.on_type_at(text, Instant::now());
    }

    pub fn on_type_at(&mut self, text: &str, now: Instant) {
        self.controller.on_type(text, now);
    }

    /// Apply every ready event, then dispatch if the quiet period is over.
    ///
    /// Returns whether the search state changed.
    pub fn pump(&mut self) -> Result<bool> {
        self.pump_at(Instant::now())
    }

    pub fn pump_at(&mut self, now: Instant) -> Result<bool> {
        let mut changed = false;
        for event in self.bridge.drain() {
            changed |= self.controller.on_event(&event);
        }
        changed |= self.check_worker();
        let dispatched = self.controller.poll(now, &mut self.bridge)?;
        Ok(changed || dispatched.is_some())
    }

    /// Notice a worker that ended on its own. Returns whether that changed
    /// the search state.
    fn check_worker(&mut self) -> bool {
        if !self.bridge.has_exited() || self.controller.state().search_unavailable {
            return false;
        }
        self.controller.on_worker_lost();
        true
    }

    /// Block until an event arrives, the pending query is due, or `timeout`
    /// passes, then pump.
    pub fn wait(&mut self, timeout: Duration) -> Result<bool> {
        let now = Instant::now();
        let until_due = self
            .controller
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now));
        let budget = until_due.map_or(timeout, |due| due.min(timeout));

        let mut changed = false;
        if let Some(event) = self.bridge.recv_timeout(budget) {
            changed |= self.controller.on_event(&event);
        }
        Ok(self.pump()? || changed)
    }

    /// Wait until nothing is pending or awaited, up to `timeout`.
    ///
    /// Returns whether the session settled in time.
    pub fn settle(&mut self, timeout: Duration) -> Result<bool> {
        let give_up = Instant::now() + timeout;
        loop {
            if self.is_disposed() {
                return Ok(false);
            }
            let state = self.controller.state();
            let loading = !state.index_loaded && !state.search_unavailable;
            let busy = loading || state.is_searching || self.controller.next_deadline().is_some();
            if !busy {
                return Ok(true);
            }
            let now = Instant::now();
            if now >= give_up {
                return Ok(false);
            }
            self.wait(give_up - now)?;
        }
    }

    /// The rows this surface should render.
    pub fn visible<'a, R: Identified>(&self, dataset: &'a [R]) -> Vec<&'a R> {
        reconcile(dataset, self.controller.query(), self.controller.state())
    }

    /// Terminate the worker. The session stays usable for reading state, but
    /// nothing further is dispatched or received.
    pub fn dispose(&mut self) {
        self.bridge.dispose();
        self.controller.on_worker_terminated();
    }

    pub fn is_disposed(&self) -> bool {
        self.bridge.is_disposed()
    }
}

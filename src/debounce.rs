// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Keystrokes in, rate-limited queries out.
//!
//! The controller is a plain state machine with injected time, so it can be
//! driven by a UI loop, a timer wheel, or a test, with no clock of its own:
//!
//! ```text
//!          on_type(text)            poll(now ≥ deadline)
//!   Idle ───────────────▶ Pending ──────────────────────▶ Dispatched
//!    ▲                     │  ▲ on_type restarts timer        │
//!    │   on_type("")       │  └───────────────────────────────┤
//!    ├─────────────────────┘                                  │
//!    └──────────────── matching QueryResult ──────────────────┘
//! ```
//!
//! Results are matched to the most recently sent text by echo. A result for
//! anything else is stale and leaves [`SearchState`] untouched.

use std::time::{Duration, Instant};

use crate::error::Result;
use crate::types::{DocumentRef, Event};

/// Default quiet period between the last keystroke and dispatch.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Timing configuration for a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    pub quiet_period: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            quiet_period: DEFAULT_QUIET_PERIOD,
        }
    }
}

/// Where dispatched query text goes. The worker bridge in production.
pub trait QuerySink {
    fn send_query(&mut self, text: &str) -> Result<()>;
}

/// Records dispatched queries; handy for driving a controller without a worker.
impl QuerySink for Vec<String> {
    fn send_query(&mut self, text: &str) -> Result<()> {
        self.push(text.to_string());
        Ok(())
    }
}

/// Where the controller is in the debounce cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Pending { text: String, deadline: Instant },
    Dispatched { text: String },
}

/// The signals a page renders from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub index_loaded: bool,
    pub is_searching: bool,
    pub search_result_ids: Vec<DocumentRef>,
    pub no_matches: bool,
    /// The worker reported that its index cannot be loaded
    pub search_unavailable: bool,
}

/// Turns a per-keystroke text stream into a debounced query stream.
///
/// One controller per search surface; never shared.
#[derive(Debug, Clone)]
pub struct DebouncedQueryController {
    config: DebounceConfig,
    phase: ControllerState,
    state: SearchState,
    query: String,
    last_sent: Option<String>,
}

impl Default for DebouncedQueryController {
    fn default() -> Self {
        Self::new(DebounceConfig::default())
    }
}

impl DebouncedQueryController {
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            phase: ControllerState::Idle,
            state: SearchState::default(),
            query: String::new(),
            last_sent: None,
        }
    }

    pub fn config(&self) -> DebounceConfig {
        self.config
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn phase(&self) -> &ControllerState {
        &self.phase
    }

    /// The text currently in the search box.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The text of the most recent dispatch still awaiting or owning results.
    pub fn last_sent(&self) -> Option<&str> {
        self.last_sent.as_deref()
    }

    /// When the pending query will be dispatched, if one is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.phase {
            ControllerState::Pending { deadline, .. } => Some(deadline),
            _ => None,
        }
    }

    /// Record a keystroke.
    ///
    /// Non-empty text (re)starts the quiet period. Empty or whitespace-only
    /// text clears results at once: nothing pending, nothing awaited, no
    /// query ever sent for it.
    pub fn on_type(&mut self, text: &str, now: Instant) {
        self.query.clear();
        self.query.push_str(text);

        if text.trim().is_empty() {
            self.state.search_result_ids.clear();
            self.state.no_matches = false;
            self.state.is_searching = false;
            self.phase = ControllerState::Idle;
            self.last_sent = None;
            return;
        }

        self.phase = ControllerState::Pending {
            text: text.to_string(),
            deadline: now + self.config.quiet_period,
        };
    }

    /// Dispatch the pending query if its quiet period has elapsed.
    ///
    /// Returns the dispatched text. Nothing is dispatched while search is
    /// unavailable. If the sink refuses the query, the controller returns to
    /// `Idle`, stops awaiting any earlier dispatch, and passes the error on.
    pub fn poll(&mut self, now: Instant, sink: &mut impl QuerySink) -> Result<Option<String>> {
        let ControllerState::Pending { deadline, .. } = &self.phase else {
            return Ok(None);
        };
        if now < *deadline {
            return Ok(None);
        }

        let ControllerState::Pending { text, .. } =
            std::mem::replace(&mut self.phase, ControllerState::Idle)
        else {
            return Ok(None);
        };

        if self.state.search_unavailable {
            tracing::debug!(query = %text, "search unavailable, query not sent");
            return Ok(None);
        }

        if let Err(e) = sink.send_query(&text) {
            // the older dispatch was superseded by this text
            self.state.is_searching = false;
            self.last_sent = None;
            return Err(e);
        }

        tracing::debug!(query = %text, "query dispatched");
        self.state.is_searching = true;
        self.state.no_matches = false;
        self.last_sent = Some(text.clone());
        self.phase = ControllerState::Dispatched { text: text.clone() };
        Ok(Some(text))
    }

    /// Apply a worker event. Returns whether [`SearchState`] changed.
    pub fn on_event(&mut self, event: &Event) -> bool {
        match event {
            Event::IndexLoaded { .. } => {
                let changed = !self.state.index_loaded || self.state.search_unavailable;
                self.state.index_loaded = true;
                self.state.search_unavailable = false;
                changed
            }
            Event::IndexLoadFailed { reason } => {
                tracing::warn!(%reason, "search unavailable");
                self.state.index_loaded = false;
                self.state.search_unavailable = true;
                self.state.is_searching = false;
                if matches!(self.phase, ControllerState::Dispatched { .. }) {
                    self.phase = ControllerState::Idle;
                }
                true
            }
            Event::QueryResult(result) => {
                if self.last_sent.as_deref() != Some(result.query_echo.as_str()) {
                    tracing::debug!(
                        echo = %result.query_echo,
                        expected = self.last_sent.as_deref().unwrap_or(""),
                        "stale result discarded"
                    );
                    return false;
                }

                self.state.search_result_ids.clone_from(&result.matching_ids);
                self.state.no_matches = result.no_matches;
                self.state.is_searching = false;
                if matches!(self.phase, ControllerState::Dispatched { .. }) {
                    self.phase = ControllerState::Idle;
                }
                true
            }
        }
    }

    /// The worker is gone: forget everything in flight.
    ///
    /// Typed text and the last applied results stay, so a recreated worker
    /// can pick up where this one left off.
    pub fn on_worker_terminated(&mut self) {
        self.phase = ControllerState::Idle;
        self.last_sent = None;
        self.state.is_searching = false;
        self.state.index_loaded = false;
    }

    /// The worker died without being disposed: search stays unavailable and
    /// the page falls back to every row.
    pub fn on_worker_lost(&mut self) {
        self.on_worker_terminated();
        self.state.search_result_ids.clear();
        self.state.no_matches = false;
        self.state.search_unavailable = true;
    }
}

// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Background search workers and the handle the owning thread holds.
//!
//! Each search surface gets one worker: a named OS thread that owns an
//! [`IndexHost`] and talks to its owner over two channels, [`Command`]s in
//! and [`Event`]s out. The worker loads its index before it reads a single
//! command, then answers queries one at a time in arrival order. That single
//! FIFO is the whole ordering story: results come back in the order their
//! queries were sent, so the owner never needs sequence numbers.
//!
//! ```text
//!   owner thread                         worker thread
//!   ────────────                         ─────────────
//!   WorkerBridge::create ──spawn──────▶  IndexHost::start
//!                        ◀──Event────    IndexLoaded | IndexLoadFailed
//!   send(Query "gene")   ───Command──▶   handle_query
//!                        ◀──Event────    QueryResult { echo: "gene" }
//!   dispose()            ──drop both──▶  loop ends, thread exits
//! ```
//!
//! A worker that ends without being disposed closes its event channel. The
//! bridge notices on the next receive and reports it through
//! [`WorkerBridge::has_exited`].
//!
//! Disposal never blocks the owner. The bridge flips a shared flag, drops
//! both channel ends and detaches the thread. A query already executing
//! finishes, but its result is never delivered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::debounce::QuerySink;
use crate::error::{Result, SearchError};
use crate::host::IndexHost;
use crate::source::IndexSource;
use crate::types::{Command, Domain, Event};

/// Thread-level knobs for a worker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerOptions {
    /// Stack size for the worker thread; platform default when `None`
    pub stack_size: Option<usize>,
}

/// The owner's handle to one background worker.
///
/// Not `Clone`: exactly one owner sends queries and consumes events.
/// Dropping the bridge disposes the worker.
#[derive(Debug)]
pub struct WorkerBridge {
    domain: Domain,
    commands: Option<Sender<Command>>,
    events: Option<Receiver<Event>>,
    alive: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    latest: Option<Event>,
    exited: bool,
}

impl WorkerBridge {
    /// Spawn a worker for `domain` that loads its index from `source`.
    ///
    /// Returns as soon as the thread exists; loading happens in the
    /// background and is reported by the first event.
    pub fn create<S: IndexSource>(domain: Domain, source: S, options: &WorkerOptions) -> Result<Self> {
        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let alive = Arc::new(AtomicBool::new(true));

        let mut builder = thread::Builder::new().name(format!("biosift-{}", domain.tag()));
        if let Some(size) = options.stack_size {
            builder = builder.stack_size(size);
        }

        let worker_alive = Arc::clone(&alive);
        let handle = builder
            .spawn(move || run_worker(domain, &source, command_rx, event_tx, worker_alive))
            .map_err(SearchError::WorkerSpawn)?;

        tracing::debug!(%domain, "worker spawned");

        Ok(Self {
            domain,
            commands: Some(command_tx),
            events: Some(event_rx),
            alive,
            handle: Some(handle),
            latest: None,
            exited: false,
        })
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Queue a command. Never blocks.
    pub fn send(&self, command: Command) -> Result<()> {
        let commands = self
            .commands
            .as_ref()
            .ok_or(SearchError::WorkerDisconnected)?;
        commands
            .send(command)
            .map_err(|_| SearchError::WorkerDisconnected)
    }

    /// Next event if one is ready.
    pub fn try_recv(&mut self) -> Option<Event> {
        let event = match self.events.as_ref()?.try_recv() {
            Ok(event) => event,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                self.mark_exited();
                return None;
            }
        };
        self.latest = Some(event.clone());
        Some(event)
    }

    /// Next event, waiting up to `timeout`.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<Event> {
        let event = match self.events.as_ref()?.recv_timeout(timeout) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => {
                self.mark_exited();
                return None;
            }
        };
        self.latest = Some(event.clone());
        Some(event)
    }

    /// Whether the worker thread ended on its own, without a dispose.
    ///
    /// Set once a receive finds the event channel closed with nothing left
    /// in it. No further events will arrive.
    pub fn has_exited(&self) -> bool {
        self.exited
    }

    fn mark_exited(&mut self) {
        if !self.exited {
            tracing::error!(domain = %self.domain, "worker exited unexpectedly");
            self.exited = true;
        }
    }

    /// Every event that is ready now, in emission order.
    pub fn drain(&mut self) -> Vec<Event> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// The most recent event received through this bridge.
    pub fn latest_event(&self) -> Option<&Event> {
        self.latest.as_ref()
    }

    /// Terminate the worker. Idempotent, never blocks.
    ///
    /// No event is observable through this bridge afterwards, including
    /// results of queries that were already in flight.
    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.alive.store(false, Ordering::SeqCst);
        self.commands = None;
        self.events = None;
        self.latest = None;
        // detach: the thread exits on its own once it sees the closed channels
        self.handle = None;
        tracing::debug!(domain = %self.domain, "worker disposed");
    }

    pub fn is_disposed(&self) -> bool {
        !self.alive.load(Ordering::SeqCst)
    }

    /// Dispose and wait for the thread to exit.
    ///
    /// For tools that want a clean shutdown; a page tearing down calls
    /// [`dispose`](Self::dispose) instead.
    pub fn shutdown(mut self) {
        let handle = self.handle.take();
        self.dispose();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::warn!(domain = %self.domain, "worker thread panicked");
            }
        }
    }
}

#[cfg(test)]
impl WorkerBridge {
    /// Swap in an event channel whose sender is gone, as after a worker
    /// thread that died without unwinding through its loop.
    pub(crate) fn sever_events(&mut self) {
        let (_, closed) = mpsc::channel();
        self.events = Some(closed);
    }
}

impl Drop for WorkerBridge {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl QuerySink for WorkerBridge {
    fn send_query(&mut self, text: &str) -> Result<()> {
        self.send(Command::Query(text.to_string()))
    }
}

/// Emit an event unless the owner has disposed the worker.
///
/// Returns false when the worker should stop.
fn emit(events: &Sender<Event>, alive: &AtomicBool, event: Event) -> bool {
    if !alive.load(Ordering::SeqCst) {
        return false;
    }
    events.send(event).is_ok()
}

fn run_worker(
    domain: Domain,
    source: &dyn IndexSource,
    commands: Receiver<Command>,
    events: Sender<Event>,
    alive: Arc<AtomicBool>,
) {
    let mut host = IndexHost::new(domain);
    let loaded = host.start(source);
    if !emit(&events, &alive, loaded) {
        tracing::debug!(%domain, "worker disposed during load");
        return;
    }

    for command in commands {
        match command {
            Command::Query(text) => {
                let Some(result) = host.handle_query(&text) else {
                    continue;
                };
                if !emit(&events, &alive, Event::QueryResult(result)) {
                    break;
                }
            }
        }
    }

    tracing::debug!(%domain, "worker exiting");
}

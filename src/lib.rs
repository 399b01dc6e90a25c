//! Background full-text search for a biological data portal.
//!
//! Each search surface (genes, phenotypes, publications) gets its own worker
//! thread that loads a prebuilt index asset once and answers free-text
//! queries off the UI thread. The page side debounces keystrokes, drops
//! stale answers by their query echo, and filters the rows it already
//! fetched down to the matching ids.
//!
//! # Architecture
//!
//! ```text
//!   offline                         page thread                    worker thread
//! ┌──────────┐   .bsx asset   ┌────────────────────────┐  Command ┌──────────────┐
//! │  build   │──────────────▶ │ DebouncedQueryController│────────▶│  IndexHost   │
//! │ (rayon)  │                │   on_type / poll        │         │  Searcher    │
//! └──────────┘                │   on_event ◀────────────│◀────────│  (BM25)      │
//!                             └───────────┬─────────────┘  Event  └──────┬───────┘
//!                                         │ SearchState                  │ fetch
//!                                         ▼                              ▼
//!                                   reconcile(rows)               IndexSource
//! ```
//!
//! [`SearchSession`] bundles one [`WorkerBridge`] with one
//! [`DebouncedQueryController`]; most callers only need that.
//!
//! # Usage
//!
//! ```ignore
//! use biosift::{Domain, SearchConfig, SearchSession};
//!
//! let config = SearchConfig::default();
//! let mut session = SearchSession::open(Domain::Genes, config.source(), &config)?;
//! session.on_type("pax");
//! session.settle(std::time::Duration::from_secs(2))?;
//! let rows = session.visible(&fetched_rows);
//! ```

pub mod binary;
pub mod build;
pub mod config;
pub mod debounce;
pub mod error;
pub mod host;
mod inverted;
pub mod reconcile;
mod scoring;
pub mod search;
pub mod session;
pub mod source;
pub mod testing;
mod types;
mod utils;
pub mod worker;

pub use binary::SerializedIndex;
pub use build::{build_domain_index, run_build, BuildReport, BuiltIndex};
pub use config::SearchConfig;
pub use debounce::{
    ControllerState, DebounceConfig, DebouncedQueryController, QuerySink, SearchState,
    DEFAULT_QUIET_PERIOD,
};
pub use error::{Result, SearchError};
pub use host::IndexHost;
pub use inverted::{build_inverted_index, is_stop_word, tokenize, tokenize_query};
pub use reconcile::{reconcile, Identified};
pub use scoring::{compare_matches, ScoredMatch};
pub use search::{Searcher, MAX_QUERY_LEN};
pub use session::SearchSession;
pub use source::{DirSource, IndexSource, MemorySource};
pub use types::{
    Command, DocField, DocumentRef, Domain, Event, FieldType, InvertedIndex, Posting,
    QueryResult, SearchDoc, ASSET_EXTENSION,
};
pub use utils::normalize;
pub use worker::{WorkerBridge, WorkerOptions};

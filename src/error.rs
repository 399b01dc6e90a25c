// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error types for index loading, query execution, and worker lifecycle.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::Domain;

/// Result type alias for search operations
pub type Result<T> = std::result::Result<T, SearchError>;

/// Everything that can go wrong between an index asset and a rendered result list.
///
/// Stale results are deliberately absent: a superseded response is an expected
/// race and is dropped by the query controller, never reported.
#[derive(Debug, Error)]
pub enum SearchError {
    /// No asset exists for the requested domain
    #[error("Index asset for `{domain}` not found at {}", .path.display())]
    AssetNotFound { domain: Domain, path: PathBuf },

    /// Asset bytes failed validation (checksum, bounds, malformed sections)
    #[error("Index corrupted: {0}")]
    IndexCorrupted(String),

    /// Asset was written by an incompatible format version
    #[error("Unsupported index version: {found} (expected {expected})")]
    UnsupportedVersion { found: u8, expected: u8 },

    /// Asset was built for a different search domain
    #[error("Index built for `{found}`, expected `{expected}`")]
    DomainMismatch { expected: Domain, found: Domain },

    /// Query text the searcher refuses to execute
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The environment refused to start a worker thread
    #[error("Failed to spawn search worker: {0}")]
    WorkerSpawn(#[source] io::Error),

    /// The worker is gone (disposed or exited) and cannot take commands
    #[error("Search worker disconnected")]
    WorkerDisconnected,

    /// Offline build input that cannot be indexed
    #[error("Invalid build input: {0}")]
    InvalidInput(String),

    /// I/O error while reading or writing assets
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Manifest, dataset or config JSON could not be parsed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SearchError {
    /// Stable identifier for the error kind (used in JSON output and logs)
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::AssetNotFound { .. } => "ASSET_NOT_FOUND",
            Self::IndexCorrupted(_) => "INDEX_CORRUPTED",
            Self::UnsupportedVersion { .. } => "UNSUPPORTED_VERSION",
            Self::DomainMismatch { .. } => "DOMAIN_MISMATCH",
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::WorkerSpawn(_) => "WORKER_SPAWN",
            Self::WorkerDisconnected => "WORKER_DISCONNECTED",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether this error means the worker can never serve its domain.
    ///
    /// These are the failures reported to the page as `IndexLoadFailed`.
    #[must_use]
    pub const fn is_index_load_failure(&self) -> bool {
        matches!(
            self,
            Self::AssetNotFound { .. }
                | Self::IndexCorrupted(_)
                | Self::UnsupportedVersion { .. }
                | Self::DomainMismatch { .. }
                | Self::Io(_)
        )
    }
}

//! Runtime configuration.
//!
//! Read from a JSON file; every field has a default, so `{}` is a valid
//! config. CLI flags override what the file says.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::debounce::DebounceConfig;
use crate::error::{Result, SearchError};
use crate::source::DirSource;
use crate::worker::WorkerOptions;

/// Default directory holding `<domain>_search_index.bsx` assets.
pub const DEFAULT_INDEX_DIR: &str = "./search-indexes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Directory the workers load assets from
    pub index_dir: PathBuf,
    /// Quiet period before a typed query is dispatched
    pub quiet_period_ms: u64,
    /// Worker thread stack size in bytes
    pub worker_stack_size: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_dir: PathBuf::from(DEFAULT_INDEX_DIR),
            quiet_period_ms: 500,
            worker_stack_size: None,
        }
    }
}

impl SearchConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.quiet_period_ms > 60_000 {
            return Err(SearchError::InvalidInput(format!(
                "quiet_period_ms {} exceeds one minute",
                self.quiet_period_ms
            )));
        }
        if let Some(size) = self.worker_stack_size {
            if size < 64 * 1024 {
                return Err(SearchError::InvalidInput(format!(
                    "worker_stack_size {} is below 64 KiB",
                    size
                )));
            }
        }
        Ok(())
    }

    pub fn debounce(&self) -> DebounceConfig {
        DebounceConfig {
            quiet_period: Duration::from_millis(self.quiet_period_ms),
        }
    }

    pub fn worker_options(&self) -> WorkerOptions {
        WorkerOptions {
            stack_size: self.worker_stack_size,
        }
    }

    pub fn source(&self) -> DirSource {
        DirSource::new(&self.index_dir)
    }
}

//! Where a worker fetches its index asset from.
//!
//! Assets are static files named `<domain>_search_index.bsx`. A deployed
//! portal reads them from a directory; tests and embedders can hand bytes
//! over directly.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Result, SearchError};
use crate::types::Domain;

/// Fetches the raw bytes of a domain's serialized index.
///
/// Called once per worker, on the worker thread.
pub trait IndexSource: Send + Sync + 'static {
    fn fetch(&self, domain: Domain) -> Result<Vec<u8>>;

    /// Human-readable location for logs.
    fn describe(&self, domain: Domain) -> String;
}

/// Assets laid out flat in one directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn asset_path(&self, domain: Domain) -> PathBuf {
        self.root.join(domain.asset_file_name())
    }
}

impl IndexSource for DirSource {
    fn fetch(&self, domain: Domain) -> Result<Vec<u8>> {
        let path = self.asset_path(domain);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SearchError::AssetNotFound { domain, path })
            }
            Err(e) => Err(SearchError::Io(e)),
        }
    }

    fn describe(&self, domain: Domain) -> String {
        self.asset_path(domain).display().to_string()
    }
}

/// Assets held in memory. Clones share the same store.
#[derive(Clone, Default)]
pub struct MemorySource {
    assets: Arc<RwLock<HashMap<Domain, Arc<Vec<u8>>>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(self, domain: Domain, bytes: Vec<u8>) -> Self {
        self.insert(domain, bytes);
        self
    }

    pub fn insert(&self, domain: Domain, bytes: Vec<u8>) {
        self.assets.write().insert(domain, Arc::new(bytes));
    }

    pub fn remove(&self, domain: Domain) {
        self.assets.write().remove(&domain);
    }
}

impl fmt::Debug for MemorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let assets = self.assets.read();
        let mut domains: Vec<&str> = assets.keys().map(|d| d.tag()).collect();
        domains.sort_unstable();
        f.debug_struct("MemorySource")
            .field("domains", &domains)
            .finish()
    }
}

impl IndexSource for MemorySource {
    fn fetch(&self, domain: Domain) -> Result<Vec<u8>> {
        self.assets
            .read()
            .get(&domain)
            .map(|bytes| bytes.as_ref().clone())
            .ok_or_else(|| SearchError::AssetNotFound {
                domain,
                path: PathBuf::from(domain.asset_file_name()),
            })
    }

    fn describe(&self, domain: Domain) -> String {
        format!("memory:{}", domain.asset_file_name())
    }
}

impl<S: IndexSource + ?Sized> IndexSource for Arc<S> {
    fn fetch(&self, domain: Domain) -> Result<Vec<u8>> {
        (**self).fetch(domain)
    }

    fn describe(&self, domain: Domain) -> String {
        (**self).describe(domain)
    }
}

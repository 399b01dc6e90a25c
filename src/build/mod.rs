//! Offline index builder.
//!
//! Reads `manifest.json` from an input directory, turns each listed dataset
//! into documents, and writes one `<domain>_search_index.bsx` per domain.
//! Domains are independent, so they build in parallel.

pub mod document;
pub mod manifest;

use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use indicatif::{ProgressBar, ProgressStyle};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::binary::{IndexFooter, SerializedIndex};
use crate::error::{Result, SearchError};
use crate::inverted::build_inverted_index;
use crate::types::{Domain, SearchDoc};

pub use document::*;
pub use manifest::*;

/// One serialized domain index, ready to write.
#[derive(Debug, Clone)]
pub struct BuiltIndex {
    pub domain: Domain,
    pub bytes: Vec<u8>,
    pub doc_count: usize,
    pub term_count: usize,
    pub crc32: u32,
}

/// What a build wrote.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub assets: Vec<(PathBuf, BuiltIndex)>,
}

impl BuildReport {
    pub fn total_docs(&self) -> usize {
        self.assets.iter().map(|(_, i)| i.doc_count).sum()
    }

    pub fn total_bytes(&self) -> usize {
        self.assets.iter().map(|(_, i)| i.bytes.len()).sum()
    }
}

/// Create a progress style for the build progress bar
#[cfg(feature = "parallel")]
fn create_progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {prefix:<12} [{bar:40.cyan/dim}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━━╸")
}

/// Index and serialize one domain's documents.
pub fn build_domain_index(domain: Domain, docs: &[SearchDoc]) -> Result<BuiltIndex> {
    let index = build_inverted_index(docs);
    let doc_count = index.doc_count();
    let term_count = index.term_count();
    let bytes = SerializedIndex::new(domain, index).to_bytes()?;
    let crc32 = IndexFooter::compute_crc32(&bytes[..bytes.len() - IndexFooter::SIZE]);
    Ok(BuiltIndex {
        domain,
        bytes,
        doc_count,
        term_count,
        crc32,
    })
}

fn load_and_build(input_dir: &Path, def: &DomainDefinition) -> Result<BuiltIndex> {
    let docs = load_domain_documents(input_dir, def)?;
    if docs.is_empty() {
        tracing::warn!(domain = %def.domain, file = %def.documents, "dataset is empty");
    }
    build_domain_index(def.domain, &docs)
}

/// Build every domain listed in `<input_dir>/manifest.json` into `output_dir`.
///
/// Nothing is written unless every domain builds.
pub fn run_build(input_dir: &Path, output_dir: &Path) -> Result<BuildReport> {
    let manifest_path = input_dir.join("manifest.json");
    let manifest_content = fs::read_to_string(&manifest_path).map_err(|e| {
        SearchError::InvalidInput(format!("cannot read {}: {}", manifest_path.display(), e))
    })?;
    let manifest = InputManifest::parse(&manifest_content)?;

    if manifest.domains.is_empty() {
        tracing::warn!(manifest = %manifest_path.display(), "manifest lists no domains");
        return Ok(BuildReport::default());
    }

    #[cfg(feature = "parallel")]
    let built: Vec<BuiltIndex> = {
        let pb = ProgressBar::new(manifest.domains.len() as u64);
        pb.set_style(create_progress_style());
        pb.set_prefix("Building");
        pb.set_message("domains...");

        let built = manifest
            .domains
            .par_iter()
            .map(|def| {
                let result = load_and_build(input_dir, def);
                pb.inc(1);
                result
            })
            .collect::<Result<Vec<_>>>();

        pb.finish_and_clear();
        built?
    };
    #[cfg(not(feature = "parallel"))]
    let built: Vec<BuiltIndex> = manifest
        .domains
        .iter()
        .map(|def| load_and_build(input_dir, def))
        .collect::<Result<Vec<_>>>()?;

    fs::create_dir_all(output_dir)?;

    let mut report = BuildReport::default();
    for index in built {
        let path = output_dir.join(index.domain.asset_file_name());
        fs::write(&path, &index.bytes)?;
        tracing::info!(
            domain = %index.domain,
            docs = index.doc_count,
            terms = index.term_count,
            bytes = index.bytes.len(),
            crc32 = %format!("{:08x}", index.crc32),
            path = %path.display(),
            "index written"
        );
        report.assets.push((path, index));
    }

    Ok(report)
}

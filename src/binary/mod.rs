// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary format for serialized search indexes.
//!
//! An asset is built offline, shipped as a static file, loaded once by a
//! worker and never mutated. The format is designed to be safely parsed from
//! untrusted sources:
//! - All counts are validated against MAX_* constants
//! - Bounds checking prevents buffer overreads
//! - CRC32 footer detects corruption/truncation
//! - Varint decoder has maximum iteration limits
//! - The header names the domain, so a phenotypes asset served under the
//!   genes URL is rejected instead of searched
//!
//! # Format Overview (v1)
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ HEADER (32 bytes)                                          │
//! │   magic: [u8; 4] = "BSFT"                                  │
//! │   version: u8 = 1, domain: u8, flags: u8, reserved: u8     │
//! │   doc_count: u32, term_count: u32                          │
//! │   ids_len: u32, vocab_len: u32                             │
//! │   postings_len: u32, lengths_len: u32                      │
//! ├────────────────────────────────────────────────────────────┤
//! │ 1. IDS (length-prefixed document ids, insertion order)     │
//! ├────────────────────────────────────────────────────────────┤
//! │ 2. VOCABULARY (front-compressed, sorted)                   │
//! ├────────────────────────────────────────────────────────────┤
//! │ 3. POSTINGS (delta+varint, one list per term)              │
//! ├────────────────────────────────────────────────────────────┤
//! │ 4. DOC_LENGTHS (varint token count per document)           │
//! ├────────────────────────────────────────────────────────────┤
//! │ FOOTER (8 bytes): crc32 + magic "TFSB"                     │
//! └────────────────────────────────────────────────────────────┘
//! ```

mod encoding;
mod header;
mod postings;

pub use encoding::{
    decode_doc_lengths, decode_string_table, decode_varint, decode_vocabulary,
    encode_doc_lengths, encode_string_table, encode_varint, encode_vocabulary,
};
pub use header::{
    FormatFlags, IndexFooter, IndexHeader, SectionOffsets, FOOTER_MAGIC, MAGIC, MAX_DOC_COUNT,
    MAX_FILE_SIZE, MAX_POSTING_SIZE, MAX_STRING_LEN, MAX_TERM_COUNT, MAX_VARINT_BYTES, VERSION,
};
pub use postings::{decode_postings, encode_postings};

use std::io;

use crate::error::{Result, SearchError};
use crate::types::{Domain, InvertedIndex};

/// An index snapshot bound to the domain it was built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedIndex {
    pub domain: Domain,
    pub flags: FormatFlags,
    pub index: InvertedIndex,
}

/// What `inspect` reports about an asset without trusting its sections.
#[derive(Debug, Clone)]
pub struct AssetSummary {
    pub header: IndexHeader,
    pub offsets: SectionOffsets,
    pub file_len: usize,
    pub stored_crc32: Option<u32>,
    pub computed_crc32: u32,
}

impl AssetSummary {
    pub fn checksum_ok(&self) -> bool {
        self.stored_crc32 == Some(self.computed_crc32)
    }

    pub fn domain(&self) -> Option<Domain> {
        Domain::from_code(self.header.domain_code)
    }
}

fn corrupted(e: io::Error) -> SearchError {
    SearchError::IndexCorrupted(e.to_string())
}

fn section<'a>(bytes: &'a [u8], range: (usize, usize), name: &str) -> Result<&'a [u8]> {
    bytes
        .get(range.0..range.1)
        .ok_or_else(|| SearchError::IndexCorrupted(format!("{} section truncated", name)))
}

fn section_len(len: usize, name: &str) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| SearchError::InvalidInput(format!("{} section exceeds 4 GiB", name)))
}

impl SerializedIndex {
    pub fn new(domain: Domain, index: InvertedIndex) -> Self {
        Self {
            domain,
            flags: FormatFlags::current(),
            index,
        }
    }

    /// Serialize to the v1 asset layout.
    ///
    /// Fails with `InvalidInput` if the index violates its structural
    /// invariants or exceeds the format's limits.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.index.validate().map_err(SearchError::InvalidInput)?;

        let doc_count = u32::try_from(self.index.doc_count())
            .ok()
            .filter(|&n| n <= MAX_DOC_COUNT)
            .ok_or_else(|| {
                SearchError::InvalidInput(format!(
                    "{} documents (max {})",
                    self.index.doc_count(),
                    MAX_DOC_COUNT
                ))
            })?;
        let term_count = u32::try_from(self.index.term_count())
            .ok()
            .filter(|&n| n <= MAX_TERM_COUNT)
            .ok_or_else(|| {
                SearchError::InvalidInput(format!(
                    "{} terms (max {})",
                    self.index.term_count(),
                    MAX_TERM_COUNT
                ))
            })?;
        if let Some(id) = self.index.ids.iter().find(|id| id.as_str().len() > MAX_STRING_LEN) {
            return Err(SearchError::InvalidInput(format!(
                "document id `{}…` longer than {} bytes",
                id.as_str().chars().take(32).collect::<String>(),
                MAX_STRING_LEN
            )));
        }

        let mut ids_bytes = Vec::new();
        let ids: Vec<&str> = self.index.ids.iter().map(|id| id.as_str()).collect();
        encode_string_table(&ids, &mut ids_bytes);

        let mut vocab_bytes = Vec::new();
        encode_vocabulary(&self.index.vocabulary, &mut vocab_bytes);

        let mut postings_bytes = Vec::new();
        for list in &self.index.postings {
            encode_postings(list, &mut postings_bytes);
        }

        let mut lengths_bytes = Vec::new();
        encode_doc_lengths(&self.index.doc_lengths, &mut lengths_bytes);

        let header = IndexHeader {
            version: VERSION,
            domain_code: self.domain.code(),
            flags: self.flags,
            doc_count,
            term_count,
            ids_len: section_len(ids_bytes.len(), "IDS")?,
            vocab_len: section_len(vocab_bytes.len(), "VOCABULARY")?,
            postings_len: section_len(postings_bytes.len(), "POSTINGS")?,
            lengths_len: section_len(lengths_bytes.len(), "DOC_LENGTHS")?,
        };
        let total_size = header.section_offsets().total_size();

        let mut buf = Vec::with_capacity(total_size);
        header.write(&mut buf)?;
        buf.extend_from_slice(&ids_bytes);
        buf.extend_from_slice(&vocab_bytes);
        buf.extend_from_slice(&postings_bytes);
        buf.extend_from_slice(&lengths_bytes);

        let crc32 = IndexFooter::compute_crc32(&buf);
        IndexFooter { crc32 }.write(&mut buf)?;

        Ok(buf)
    }

    /// Deserialize from bytes (with CRC32 validation)
    ///
    /// # Validation
    ///
    /// 1. File size is within limits (MAX_FILE_SIZE)
    /// 2. Footer magic is valid ("TFSB") and the CRC32 checksum matches
    /// 3. Header magic is valid ("BSFT") and the version is supported
    /// 4. The domain code is known
    /// 5. Section lengths add up to the file size
    /// 6. Every section decodes exactly and the result passes
    ///    `InvertedIndex::validate`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_FILE_SIZE {
            return Err(SearchError::IndexCorrupted(format!(
                "File too large: {} bytes (max {})",
                bytes.len(),
                MAX_FILE_SIZE
            )));
        }

        let min_size = IndexHeader::SIZE + IndexFooter::SIZE;
        if bytes.len() < min_size {
            return Err(SearchError::IndexCorrupted(format!(
                "File too small: {} bytes (minimum {})",
                bytes.len(),
                min_size
            )));
        }

        let footer = IndexFooter::read(bytes).map_err(corrupted)?;
        let content = &bytes[..bytes.len() - IndexFooter::SIZE];
        let computed_crc32 = IndexFooter::compute_crc32(content);
        if footer.crc32 != computed_crc32 {
            return Err(SearchError::IndexCorrupted(format!(
                "CRC32 mismatch: expected {:#010x}, got {:#010x} (file corrupted)",
                footer.crc32, computed_crc32
            )));
        }

        let header = IndexHeader::read(&mut io::Cursor::new(bytes)).map_err(corrupted)?;
        if header.version != VERSION {
            return Err(SearchError::UnsupportedVersion {
                found: header.version,
                expected: VERSION,
            });
        }
        let domain = Domain::from_code(header.domain_code).ok_or_else(|| {
            SearchError::IndexCorrupted(format!("Unknown domain code {}", header.domain_code))
        })?;

        if header.doc_count > MAX_DOC_COUNT {
            return Err(SearchError::IndexCorrupted(format!(
                "Too many documents: {} (max {})",
                header.doc_count, MAX_DOC_COUNT
            )));
        }
        if header.term_count > MAX_TERM_COUNT {
            return Err(SearchError::IndexCorrupted(format!(
                "Too many terms: {} (max {})",
                header.term_count, MAX_TERM_COUNT
            )));
        }

        let offsets = header.section_offsets();
        if offsets.content_size() != content.len() {
            return Err(SearchError::IndexCorrupted(format!(
                "Section lengths mismatch: header claims {} bytes, got {} bytes",
                offsets.content_size(),
                content.len()
            )));
        }

        let doc_count = header.doc_count as usize;
        let term_count = header.term_count as usize;

        let ids = decode_string_table(section(bytes, offsets.ids, "IDS")?, doc_count)
            .map_err(corrupted)?
            .into_iter()
            .map(Into::into)
            .collect();
        let vocabulary =
            decode_vocabulary(section(bytes, offsets.vocabulary, "Vocabulary")?, term_count)
                .map_err(corrupted)?;

        let postings_bytes = section(bytes, offsets.postings, "Postings")?;
        let mut postings = Vec::with_capacity(term_count);
        let mut pos = 0;
        for _ in 0..term_count {
            let (list, used) =
                decode_postings(&postings_bytes[pos..], header.doc_count).map_err(corrupted)?;
            pos += used;
            postings.push(list);
        }
        encoding::expect_consumed(postings_bytes, pos, "postings").map_err(corrupted)?;

        let doc_lengths = decode_doc_lengths(section(bytes, offsets.doc_lengths, "Doc lengths")?, doc_count)
            .map_err(corrupted)?;

        let index = InvertedIndex {
            ids,
            vocabulary,
            postings,
            doc_lengths,
        };
        index.validate().map_err(SearchError::IndexCorrupted)?;

        if header.flags.folded_diacritics() != FormatFlags::current().folded_diacritics() {
            tracing::warn!(
                %domain,
                "index and runtime disagree on diacritic folding, accented queries may miss"
            );
        }

        Ok(Self {
            domain,
            flags: header.flags,
            index,
        })
    }

    /// Deserialize and require the asset to belong to `expected`.
    pub fn from_bytes_for(bytes: &[u8], expected: Domain) -> Result<Self> {
        let loaded = Self::from_bytes(bytes)?;
        if loaded.domain != expected {
            return Err(SearchError::DomainMismatch {
                expected,
                found: loaded.domain,
            });
        }
        Ok(loaded)
    }

    /// Read the header and checksum without decoding any section.
    pub fn summarize(bytes: &[u8]) -> Result<AssetSummary> {
        let header = IndexHeader::read(&mut io::Cursor::new(bytes)).map_err(corrupted)?;
        let stored_crc32 = IndexFooter::read(bytes).ok().map(|f| f.crc32);
        let content_end = bytes.len().saturating_sub(IndexFooter::SIZE);
        let computed_crc32 = IndexFooter::compute_crc32(&bytes[..content_end]);
        Ok(AssetSummary {
            offsets: header.section_offsets(),
            header,
            file_len: bytes.len(),
            stored_crc32,
            computed_crc32,
        })
    }
}

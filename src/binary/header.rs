// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary format header and footer structures.
//!
//! The header is 32 bytes of fixed-size fields, parsed before anything else.
//! It names the domain the asset was built for and the length of every
//! section, so a loader can reject a wrong or truncated asset before decoding.
//!
//! The footer is 8 bytes: a CRC32 checksum over everything before it, plus a
//! magic number ("TFSB", the header magic reversed). If the footer is wrong,
//! something got corrupted or truncated. Don't trust the data.
//!
//! `SectionOffsets` is the single source of truth for the v1 layout. Every
//! piece of code that reads or writes sections MUST use it.

use std::io::{self, Read, Write};

use crc32fast::Hasher as Crc32Hasher;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Magic bytes: "BSFT" in ASCII (header)
pub const MAGIC: [u8; 4] = [0x42, 0x53, 0x46, 0x54];

/// Footer magic: "TFSB" (reversed, marks valid file end)
pub const FOOTER_MAGIC: [u8; 4] = [0x54, 0x46, 0x53, 0x42];

/// Current format version
pub const VERSION: u8 = 1;

// ============================================================================
// SECURITY LIMITS (prevent resource exhaustion from malicious input)
// ============================================================================

/// Maximum file size: 256 MB (the all-publications index is the largest)
pub const MAX_FILE_SIZE: usize = 256 * 1024 * 1024;

/// Maximum number of documents
pub const MAX_DOC_COUNT: u32 = 10_000_000;

/// Maximum number of terms
pub const MAX_TERM_COUNT: u32 = 10_000_000;

/// Maximum posting list size per term
pub const MAX_POSTING_SIZE: usize = 10_000_000;

/// Maximum length of one document id or vocabulary term, in bytes
pub const MAX_STRING_LEN: usize = 64 * 1024;

/// Maximum varint bytes (u64 needs at most 10 bytes)
pub const MAX_VARINT_BYTES: usize = 10;

// ============================================================================
// FLAGS
// ============================================================================

/// Format flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatFlags(pub(crate) u8);

impl FormatFlags {
    /// Terms were NFD-folded (diacritics stripped) at build time
    pub const FOLDED_DIACRITICS: u8 = 0b0000_0001;

    pub fn new() -> Self {
        Self(0)
    }

    /// Flags describing how this build normalizes text.
    pub fn current() -> Self {
        if cfg!(feature = "unicode-normalization") {
            Self::new().with_folded_diacritics()
        } else {
            Self::new()
        }
    }

    pub fn with_folded_diacritics(mut self) -> Self {
        self.0 |= Self::FOLDED_DIACRITICS;
        self
    }

    pub fn folded_diacritics(self) -> bool {
        self.0 & Self::FOLDED_DIACRITICS != 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

// ============================================================================
// HEADER
// ============================================================================

/// Binary format header (32 bytes fixed size)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHeader {
    pub version: u8,
    /// `Domain::code` of the domain the asset was built for
    pub domain_code: u8,
    pub flags: FormatFlags,
    pub doc_count: u32,
    pub term_count: u32,
    pub ids_len: u32,
    pub vocab_len: u32,
    pub postings_len: u32,
    pub lengths_len: u32,
}

impl IndexHeader {
    // 4 (magic) + 1 (version) + 1 (domain) + 1 (flags) + 1 (reserved) + 6*4 (u32s) = 32
    pub const SIZE: usize = 32;

    /// Compute section byte offsets for this header.
    pub fn section_offsets(&self) -> SectionOffsets {
        SectionOffsets::from_header(self)
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&MAGIC)?;
        w.write_all(&[self.version, self.domain_code, self.flags.0, 0])?;
        w.write_all(&self.doc_count.to_le_bytes())?;
        w.write_all(&self.term_count.to_le_bytes())?;
        w.write_all(&self.ids_len.to_le_bytes())?;
        w.write_all(&self.vocab_len.to_le_bytes())?;
        w.write_all(&self.postings_len.to_le_bytes())?;
        w.write_all(&self.lengths_len.to_le_bytes())?;
        Ok(())
    }

    pub fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid magic: expected BSFT, got {:?}", magic),
            ));
        }

        let mut buf = [0u8; 28]; // 32 - 4 (magic) = 28
        r.read_exact(&mut buf)?;

        let u32_at = |i: usize| u32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]);

        Ok(Self {
            version: buf[0],
            domain_code: buf[1],
            flags: FormatFlags(buf[2]),
            // buf[3] is reserved
            doc_count: u32_at(4),
            term_count: u32_at(8),
            ids_len: u32_at(12),
            vocab_len: u32_at(16),
            postings_len: u32_at(20),
            lengths_len: u32_at(24),
        })
    }
}

// ============================================================================
// FOOTER (8 bytes)
// ============================================================================

/// Footer with CRC32 checksum and magic number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexFooter {
    /// CRC32 checksum of header + all sections (everything before footer)
    pub crc32: u32,
}

impl IndexFooter {
    pub const SIZE: usize = 8; // 4 bytes CRC32 + 4 bytes magic

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.crc32.to_le_bytes())?;
        w.write_all(&FOOTER_MAGIC)?;
        Ok(())
    }

    pub fn read(bytes: &[u8]) -> io::Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "File too short for footer",
            ));
        }

        let footer_start = bytes.len() - Self::SIZE;

        let magic = &bytes[footer_start + 4..];
        if magic != FOOTER_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid footer magic: expected TFSB, got {:?}", magic),
            ));
        }

        let crc32 = u32::from_le_bytes([
            bytes[footer_start],
            bytes[footer_start + 1],
            bytes[footer_start + 2],
            bytes[footer_start + 3],
        ]);

        Ok(Self { crc32 })
    }

    /// Compute CRC32 over the given bytes
    pub fn compute_crc32(data: &[u8]) -> u32 {
        let mut hasher = Crc32Hasher::new();
        hasher.update(data);
        hasher.finalize()
    }
}

// ============================================================================
// SECTION OFFSETS
// ============================================================================

/// Section byte offsets for the v1 file layout.
///
/// Layout order:
/// 1. HEADER      [32B]
/// 2. IDS         [ids_len]      - document ids in insertion order
/// 3. VOCABULARY  [vocab_len]    - front-coded sorted terms
/// 4. POSTINGS    [postings_len] - one list per vocabulary term
/// 5. DOC_LENGTHS [lengths_len]  - token count per document
/// 6. FOOTER      [8B]           - CRC32 validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionOffsets {
    pub ids: (usize, usize),
    pub vocabulary: (usize, usize),
    pub postings: (usize, usize),
    pub doc_lengths: (usize, usize),
    pub footer: (usize, usize),
}

impl SectionOffsets {
    pub fn from_header(h: &IndexHeader) -> Self {
        let mut pos = IndexHeader::SIZE;
        let mut next = |len: u32| {
            let start = pos;
            pos += len as usize;
            (start, pos)
        };

        let ids = next(h.ids_len);
        let vocabulary = next(h.vocab_len);
        let postings = next(h.postings_len);
        let doc_lengths = next(h.lengths_len);
        let footer = (pos, pos + IndexFooter::SIZE);

        Self {
            ids,
            vocabulary,
            postings,
            doc_lengths,
            footer,
        }
    }

    /// Expected content size (everything before footer)
    pub fn content_size(&self) -> usize {
        self.footer.0
    }

    /// Total file size including footer
    pub fn total_size(&self) -> usize {
        self.footer.1
    }

    /// Get a slice for a section from the bytes
    #[inline]
    pub fn slice<'a>(&self, bytes: &'a [u8], section: (usize, usize)) -> Option<&'a [u8]> {
        bytes.get(section.0..section.1)
    }
}

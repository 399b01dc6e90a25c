// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Postings list encoding/decoding.
//!
//! For each term, which documents contain it and how strongly. Document
//! ordinals are delta encoded since a posting list is sorted: if documents
//! 100, 102, 105 all contain "retina", we store [100, 2, 3]. Small deltas
//! fit in one varint byte.
//!
//! # References
//!
//! - **Delta Encoding for Postings**: Zobel & Moffat (2006): "Inverted Files
//!   for Text Search Engines", ACM Computing Surveys.

use std::io;

use super::encoding::{decode_varint, decode_varint_u32, encode_varint};
use super::header::MAX_POSTING_SIZE;
use crate::types::Posting;

/// Encode one posting list with delta+varint compression.
///
/// Format:
/// - doc_freq: varint
/// - For each entry (sorted by doc):
///   - doc_delta: varint (delta from previous doc ordinal, first is absolute)
///   - weight: varint (boosted term frequency)
///
/// `entries` must be sorted by `doc` with no duplicates.
pub fn encode_postings(entries: &[Posting], buf: &mut Vec<u8>) {
    encode_varint(entries.len() as u64, buf);

    let mut prev_doc = 0u32;
    for entry in entries {
        encode_varint(u64::from(entry.doc - prev_doc), buf);
        encode_varint(u64::from(entry.weight), buf);
        prev_doc = entry.doc;
    }
}

/// Decode one posting list, returning it and the bytes consumed.
///
/// Rejects lists that are empty, unsorted, or would address a document at or
/// beyond `doc_count`.
pub fn decode_postings(bytes: &[u8], doc_count: u32) -> io::Result<(Vec<Posting>, usize)> {
    let (doc_freq, mut pos) = decode_varint(bytes)?;
    let doc_freq = doc_freq as usize;

    if doc_freq > MAX_POSTING_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Posting list too large: {} (max {})", doc_freq, MAX_POSTING_SIZE),
        ));
    }
    if doc_freq == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "Empty posting list",
        ));
    }
    // Security: each entry needs two varint bytes
    if doc_freq > bytes.len().saturating_sub(pos) / 2 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("Posting list of {} entries truncated", doc_freq),
        ));
    }

    let mut entries = Vec::with_capacity(doc_freq);
    let mut prev_doc: Option<u32> = None;

    for _ in 0..doc_freq {
        let (delta, consumed) = decode_varint_u32(&bytes[pos..], "Document delta")?;
        pos += consumed;

        let doc = match prev_doc {
            None => delta,
            Some(_) if delta == 0 => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "Duplicate document in posting list",
                ));
            }
            Some(prev) => prev.checked_add(delta).ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "Document ordinal overflow")
            })?,
        };
        if doc >= doc_count {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Posting references document {} of {}", doc, doc_count),
            ));
        }
        prev_doc = Some(doc);

        let (weight, consumed) = decode_varint_u32(&bytes[pos..], "Term weight")?;
        pos += consumed;

        entries.push(Posting { doc, weight });
    }

    Ok((entries, pos))
}

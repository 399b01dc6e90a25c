// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary encoding primitives: varint, length-prefixed strings, and front
//! compression.
//!
//! Varint for integers that are usually small (ordinal deltas, weights, token
//! counts). Length-prefixed strings for document ids, which share little.
//! Front compression for the sorted vocabulary, where neighbours share long
//! prefixes ("abnormal", "abnormalities", "abnormality").
//!
//! # References
//!
//! - **Varint (LEB128)**: Little-endian base-128 variable-length integer encoding.
//!   See Google Protocol Buffers encoding: <https://protobuf.dev/programming-guides/encoding/>
//!
//! - **Front Compression**: Witten, Moffat, Bell (1999): "Managing Gigabytes:
//!   Compressing and Indexing Documents and Images", §3.3 "Front Coding".

use std::io;

use super::header::{MAX_STRING_LEN, MAX_VARINT_BYTES};
use crate::utils::common_prefix_len;

// ============================================================================
// VARINT ENCODING
// ============================================================================

/// Encode a varint to bytes
pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        } else {
            buf.push(byte | 0x80);
        }
    }
}

/// Decode a varint from bytes, returning (value, bytes_consumed)
///
/// Returns an error if:
/// - Buffer is empty
/// - Varint exceeds MAX_VARINT_BYTES (malformed/malicious input)
pub fn decode_varint(bytes: &[u8]) -> io::Result<(u64, usize)> {
    if bytes.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Empty buffer for varint",
        ));
    }

    let mut result: u64 = 0;
    let mut shift = 0;
    let mut i = 0;

    while i < bytes.len() && i < MAX_VARINT_BYTES {
        let byte = bytes[i];
        result |= ((byte & 0x7F) as u64) << shift;
        i += 1;
        if byte & 0x80 == 0 {
            return Ok((result, i));
        }
        shift += 7;
    }

    if i >= MAX_VARINT_BYTES {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "Varint exceeds maximum length (possible corruption)",
        ))
    } else {
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Incomplete varint",
        ))
    }
}

/// Decode a varint that must fit in a u32.
pub fn decode_varint_u32(bytes: &[u8], what: &str) -> io::Result<(u32, usize)> {
    let (value, consumed) = decode_varint(bytes)?;
    let value = u32::try_from(value).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} {} does not fit in 32 bits", what, value),
        )
    })?;
    Ok((value, consumed))
}

// ============================================================================
// STRING TABLE ENCODING (document ids)
// ============================================================================

/// Encode strings as `[len: varint][utf8 bytes]`, in order.
pub fn encode_string_table(strings: &[&str], buf: &mut Vec<u8>) {
    for s in strings {
        let bytes = s.as_bytes();
        encode_varint(bytes.len() as u64, buf);
        buf.extend_from_slice(bytes);
    }
}

/// Decode exactly `count` length-prefixed strings.
///
/// Rejects trailing bytes: the section must hold exactly `count` entries.
pub fn decode_string_table(bytes: &[u8], count: usize) -> io::Result<Vec<String>> {
    // Security: each entry needs at least one length byte
    if count > bytes.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("String table count {} exceeds available bytes {}", count, bytes.len()),
        ));
    }

    let mut table = Vec::with_capacity(count);
    let mut pos = 0;

    for i in 0..count {
        let (len, consumed) = decode_varint(&bytes[pos..])?;
        pos += consumed;

        let len = len as usize;
        if len > MAX_STRING_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("String {} too long: {} bytes (max {})", i, len, MAX_STRING_LEN),
            ));
        }
        let end_pos = pos + len;
        if end_pos > bytes.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("Truncated string {} (expected {} bytes)", i, len),
            ));
        }

        let s = std::str::from_utf8(&bytes[pos..end_pos]).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid UTF-8 in string {}: {}", i, e),
            )
        })?;
        table.push(s.to_string());
        pos = end_pos;
    }

    expect_consumed(bytes, pos, "string table")?;
    Ok(table)
}

// ============================================================================
// VOCABULARY ENCODING (front compression)
// ============================================================================

/// Encode vocabulary with front compression.
///
/// Since vocabulary is sorted, consecutive terms share prefixes.
/// Format: [shared_prefix_len: varint][suffix_len: varint][suffix: bytes]
///
/// Example:
/// - "abnormal" -> [0][8]["abnormal"]
/// - "abnormality" -> [8][3]["ity"]
/// - "abnormally" -> [9][1]["ly"]
pub fn encode_vocabulary(vocabulary: &[String], out: &mut Vec<u8>) {
    let mut prev: &[u8] = &[];

    for term in vocabulary {
        let bytes = term.as_bytes();
        let shared = common_prefix_len(prev, bytes);
        let suffix = &bytes[shared..];

        encode_varint(shared as u64, out);
        encode_varint(suffix.len() as u64, out);
        out.extend_from_slice(suffix);

        prev = bytes;
    }
}

/// Decode vocabulary with front compression.
pub fn decode_vocabulary(bytes: &[u8], term_count: usize) -> io::Result<Vec<String>> {
    // Security: each term needs at least one byte
    if term_count > bytes.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Term count {} exceeds available bytes {}", term_count, bytes.len()),
        ));
    }

    let mut terms = Vec::with_capacity(term_count);
    let mut pos = 0;
    let mut prev_bytes: Vec<u8> = Vec::new();

    for i in 0..term_count {
        let (shared, consumed) = decode_varint(&bytes[pos..])?;
        pos += consumed;
        let shared = shared as usize;

        if shared > prev_bytes.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Invalid shared prefix length {} (prev term len {})",
                    shared,
                    prev_bytes.len()
                ),
            ));
        }

        let (suffix_len, consumed) = decode_varint(&bytes[pos..])?;
        pos += consumed;
        let suffix_len = suffix_len as usize;
        if shared.saturating_add(suffix_len) > MAX_STRING_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Term {} too long: {} + {} bytes", i, shared, suffix_len),
            ));
        }

        let end_pos = pos + suffix_len;
        if end_pos > bytes.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("Truncated term {} suffix (expected {} bytes)", i, suffix_len),
            ));
        }

        // Reconstruct term: shared prefix + suffix
        prev_bytes.truncate(shared);
        prev_bytes.extend_from_slice(&bytes[pos..end_pos]);
        pos = end_pos;

        let term = std::str::from_utf8(&prev_bytes).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid UTF-8 in term {}: {}", i, e),
            )
        })?;
        terms.push(term.to_string());
    }

    expect_consumed(bytes, pos, "vocabulary")?;
    Ok(terms)
}

// ============================================================================
// DOC LENGTHS
// ============================================================================

pub fn encode_doc_lengths(lengths: &[u32], buf: &mut Vec<u8>) {
    for &len in lengths {
        encode_varint(u64::from(len), buf);
    }
}

pub fn decode_doc_lengths(bytes: &[u8], doc_count: usize) -> io::Result<Vec<u32>> {
    if doc_count > bytes.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Doc count {} exceeds available bytes {}", doc_count, bytes.len()),
        ));
    }

    let mut lengths = Vec::with_capacity(doc_count);
    let mut pos = 0;
    for _ in 0..doc_count {
        let (len, consumed) = decode_varint_u32(&bytes[pos..], "Document length")?;
        pos += consumed;
        lengths.push(len);
    }

    expect_consumed(bytes, pos, "doc lengths")?;
    Ok(lengths)
}

/// A section must be consumed exactly; leftovers mean the header lied.
pub(crate) fn expect_consumed(bytes: &[u8], pos: usize, section: &str) -> io::Result<()> {
    if pos != bytes.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "{} has {} trailing bytes",
                section,
                bytes.len().saturating_sub(pos)
            ),
        ));
    }
    Ok(())
}

// crates/sqlfixture-core/src/normalize.rs
// ============================================================================
// Module: SQL Fixture Normalization
// Description: Canonical lookup keys for SQL query text.
// Purpose: Map whitespace/case-equivalent queries onto one fixture key.
// Dependencies: serde, sha2
// ============================================================================

//! ## Overview
//! Query text is lower-cased, stripped of every whitespace character and of one
//! trailing statement terminator, then digested. The digest is the lookup key,
//! so keys stay constant-size regardless of query length.
//! Invariants:
//! - [`normalize`] is pure and deterministic.
//! - Keys are 32 lowercase hex characters (128 bits).
//! - Distinct queries with equal digests are treated as the same query.
//!
//! Keys are the first 16 bytes of SHA-256. They do not match MD5-based keys,
//! so dumps produced by MD5-keyed fixture tools cannot be compared key for key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Number of digest bytes retained in a canonical key.
pub const CANONICAL_KEY_BYTES: usize = 16;

/// Statement terminator stripped from the end of normalized text.
const STATEMENT_TERMINATOR: char = ';';

// ============================================================================
// SECTION: Canonical Key
// ============================================================================

/// Canonical lookup key derived from SQL query text.
///
/// # Invariants
/// - Always [`CANONICAL_KEY_BYTES`] bytes rendered as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Returns the key as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Returns the normalized query text that feeds the digest.
///
/// Lower-cases the text, removes all whitespace, and strips one trailing `;`.
/// Whitespace is [`char::is_whitespace`] (Unicode `White_Space`): U+0085 is
/// removed while U+FEFF is kept.
#[must_use]
pub fn normalized_text(query: &str) -> String {
    let mut text: String =
        query.to_lowercase().chars().filter(|ch| !ch.is_whitespace()).collect();
    if text.ends_with(STATEMENT_TERMINATOR) {
        text.pop();
    }
    text
}

/// Computes the canonical key for the provided query text.
#[must_use]
pub fn normalize(query: &str) -> CanonicalKey {
    let text = normalized_text(query);
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    CanonicalKey(hex_encode(&digest[.. CANONICAL_KEY_BYTES]))
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

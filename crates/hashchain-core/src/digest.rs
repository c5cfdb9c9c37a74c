//! # Content Digest — 32-Byte SHA-256 Values
//!
//! Defines `ContentDigest`, the fixed-width hash value carried by every
//! hashchain header: the previous-version pointer, the body Merkle root
//! reference, and the header digest that names a file version.
//!
//! ## Security Invariant
//!
//! Digests of structured data are computed only from `CanonicalBytes`
//! through [`sha256_digest()`]. Raw-byte hashing stays crate-private and
//! serves the Merkle tree, whose inputs are fixed 32- or 64-byte blocks.
//!
//! ## Rendering
//!
//! The external form is lower-case hex, two characters per byte, 64 in
//! total. The all-zero digest is the "no predecessor" marker.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::HashChainError;

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// The all-zero digest. Marks "no predecessor" in a header.
    pub const ZERO: ContentDigest = ContentDigest([0u8; 32]);

    /// Wrap raw digest bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Copy a digest out of a byte slice.
    ///
    /// # Errors
    ///
    /// Returns `HashChainError::InvalidDigest` unless the slice is exactly
    /// 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, HashChainError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            HashChainError::InvalidDigest(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }

    /// Parse a 64-character hex string. Upper-case input is accepted.
    ///
    /// # Errors
    ///
    /// Returns `HashChainError::InvalidDigest` for a wrong length or a
    /// non-hex character.
    pub fn from_hex(hex: &str) -> Result<Self, HashChainError> {
        let hex = hex.trim();
        if hex.len() != 64 {
            return Err(HashChainError::InvalidDigest(format!(
                "expected 64 hex chars, got {}",
                hex.len()
            )));
        }
        let mut out = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let s = std::str::from_utf8(chunk)
                .map_err(|e| HashChainError::InvalidDigest(format!("invalid hex: {e}")))?;
            out[i] = u8::from_str_radix(s, 16)
                .map_err(|e| HashChainError::InvalidDigest(format!("invalid hex at {i}: {e}")))?;
        }
        Ok(Self(out))
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether this is the all-zero "no predecessor" digest.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.to_hex())
    }
}

impl AsRef<[u8]> for ContentDigest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ContentDigest::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Compute a SHA-256 digest from canonical bytes.
///
/// Accepts only `&CanonicalBytes`, so every digest of structured data flows
/// through the canonicalization pipeline.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    sha256_raw(data.as_bytes())
}

/// Compute a SHA-256 hex string from canonical bytes.
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    sha256_digest(data).to_hex()
}

/// SHA-256 over raw bytes. Merkle leaves and nodes only.
pub(crate) fn sha256_raw(b: &[u8]) -> ContentDigest {
    let hash = Sha256::digest(b);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hash);
    ContentDigest(out)
}

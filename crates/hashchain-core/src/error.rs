//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout the hashchain workspace. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Write-once rejections and compare-and-swap mismatches are NOT errors.
//!   They are reported through `bool` results on the write path.
//! - Canonicalization and decode failures fail loudly with full context.
//! - Integrity failures name both the expected and the recomputed value.

use thiserror::Error;

/// Top-level error type for hashchain operations.
#[derive(Error, Debug)]
pub enum HashChainError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Stored bytes could not be decoded into a file document.
    #[error("decode error: {0}")]
    Decode(String),

    /// A digest string or byte slice is not a 32-byte SHA-256 value.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    /// Recomputed content does not match its claimed address or reference.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// No stored file exists for the requested reference id.
    #[error("file not found: {0}")]
    NotFound(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Numbers must be integers; fractional quantities belong in strings.
    #[error("float values are not permitted in canonical representations; use string or integer: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

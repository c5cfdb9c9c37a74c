//! # hashchain-core — Foundational Types for Hashchain Files
//!
//! The leaf crate of the workspace. It defines everything a version-chained
//! file needs below the level of "header" and "body":
//!
//! - **`CanonicalBytes`** — the only byte form that is ever hashed. JCS
//!   canonical JSON with float rejection.
//! - **`ContentDigest`** — a 32-byte SHA-256 value with hex rendering and
//!   the all-zero "no predecessor" constant.
//! - **Merkle content digest** — the recursive 32-byte-block tree that
//!   fingerprints a body's encoding.
//! - **`FieldContainer`** — the write-once field map under header and body.
//! - **Codec** — stateless `encode_fields` / `decode_fields`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `hashchain-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod codec;
pub mod digest;
pub mod error;
pub mod fields;
pub mod merkle;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use codec::{decode_fields, encode_fields};
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::{CanonicalizationError, HashChainError};
pub use fields::{FieldContainer, FieldMap};
pub use merkle::{merkle_root, MerkleNode, MerkleTree};
pub use temporal::Timestamp;

//! # Chained File — Version-Chain State Machine
//!
//! `ChainedFile` pairs a [`Header`] with a [`Body`] and keeps the two in
//! balance: whenever the file is serialized or its reference id is read, the
//! header's Merkle root reference is brought up to date with the body, and
//! the chain is extended if this instance is allowed to extend it.
//!
//! ## States
//!
//! ```text
//!                 new(custom)                    from_bytes(bytes)
//!                      │                                │
//!                      ▼                                ▼
//!            writable, initial                  readonly, derived
//!                                                       │
//!                                              make_writable()
//!                                                       │
//!                                                       ▼
//!                                              writable, derived
//! ```
//!
//! ## Chain Extension
//!
//! On the first body change an instance observes, it links its header to
//! the digest the header had before the change (the stored version it was
//! loaded from) and increments the chain height. It then locks that
//! pointer. Every later change only moves the Merkle root reference.
//!
//! A single in-memory file can therefore never produce two "next versions"
//! that claim different predecessors. To start another version after
//! writing one out, decode the written bytes into a new instance.
//!
//! The very first version of a chain (initial, zero previous hash) never
//! extends on its own edits: it stays at height 0 until it is written out
//! and read back as a derived instance.
//!
//! ## Persisted Layout
//!
//! `{"body": {...}, "header": {...}}`, canonical JSON.

use serde::Serialize;
use serde_json::Value;

use hashchain_core::codec::take_object;
use hashchain_core::{decode_fields, CanonicalBytes, ContentDigest, FieldMap, HashChainError};

use crate::body::Body;
use crate::header::Header;

/// Document key holding the encoded header.
pub const HEADER_KEY: &str = "header";
/// Document key holding the encoded body.
pub const BODY_KEY: &str = "body";

/// One version of a hash-chained file.
#[derive(Debug, Clone)]
pub struct ChainedFile {
    header: Header,
    body: Body,
    is_initial: bool,
    locked_previous_hash: Option<ContentDigest>,
    readonly: bool,
}

#[derive(Serialize)]
struct Document<'a> {
    body: &'a Body,
    header: &'a Header,
}

impl ChainedFile {
    /// Start a new chain: a writable, initial file with the given custom
    /// header fields.
    pub fn new(custom_header: FieldMap) -> Self {
        Self {
            header: Header::with_fields(custom_header),
            body: Body::new().to_writable_copy(),
            is_initial: true,
            locked_previous_hash: None,
            readonly: false,
        }
    }

    /// Decode a stored file version.
    ///
    /// The result is read-only and always derived, even when its previous
    /// hash is zero: it came from stored bytes, so it is not the first
    /// version ever created and may extend the chain once made writable.
    ///
    /// # Errors
    ///
    /// Returns `HashChainError::Decode` if the bytes are not a file
    /// document.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HashChainError> {
        let mut doc = decode_fields(bytes)?;
        let header = Header::from_map(take_object(&mut doc, HEADER_KEY)?)?;
        let body = Body::from_map(take_object(&mut doc, BODY_KEY)?);
        if let Some(extra) = doc.keys().next() {
            return Err(HashChainError::Decode(format!(
                "unexpected top-level field {extra:?}"
            )));
        }
        Ok(Self {
            header,
            body,
            is_initial: false,
            locked_previous_hash: None,
            readonly: true,
        })
    }

    /// Allow body edits. The body is replaced by an independent writable
    /// copy; the initial/derived status and the chain lock are kept.
    pub fn make_writable(&mut self) {
        self.body = self.body.to_writable_copy();
        self.readonly = false;
    }

    /// Write a body field. Ignored (returns `false`) while read-only.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> bool {
        if self.readonly {
            return false;
        }
        self.body.set(name, value)
    }

    /// Snapshot a borrowed caller structure into a body field. Ignored
    /// while read-only.
    ///
    /// # Errors
    ///
    /// Fails loudly if the structure has no JSON representation.
    pub fn set_serialized<T: Serialize + ?Sized>(
        &mut self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<bool, HashChainError> {
        if self.readonly {
            return Ok(false);
        }
        Ok(self.body.set_serialized(name, value)?)
    }

    /// A body field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }

    /// Mutable access to a body field; `None` while read-only.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        if self.readonly {
            return None;
        }
        self.body.get_mut(name)
    }

    /// Add a custom header field. Existing header fields never change.
    pub fn set_header_value(&mut self, name: impl Into<String>, value: impl Into<Value>) -> bool {
        self.header.set(name, value)
    }

    /// A custom header field.
    pub fn header_value(&self, name: &str) -> Option<&Value> {
        self.header.get(name)
    }

    /// The header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The body.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Whether body writes are ignored.
    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Whether this instance was freshly constructed rather than decoded.
    pub fn is_initial(&self) -> bool {
        self.is_initial
    }

    /// The predecessor digest this instance committed to, if it has
    /// extended the chain.
    pub fn locked_previous_hash(&self) -> Option<ContentDigest> {
        self.locked_previous_hash
    }

    /// Number of chain extensions behind this version.
    pub fn chain_height(&self) -> u64 {
        self.header.chain_height()
    }

    /// Hex form of the predecessor's reference id; 64 zeros for the first
    /// version of a chain.
    pub fn previous_reference(&self) -> String {
        self.header.previous_hash().to_hex()
    }

    /// Balance the header, then return the header digest.
    pub fn reference_digest(&mut self) -> Result<ContentDigest, HashChainError> {
        self.balance_header()?;
        Ok(self.header.digest()?)
    }

    /// Balance the header, then return the hex reference id.
    pub fn reference_id(&mut self) -> Result<String, HashChainError> {
        Ok(self.reference_digest()?.to_hex())
    }

    /// Balance the header, then encode the whole file for storage.
    pub fn get_content(&mut self) -> Result<Vec<u8>, HashChainError> {
        self.balance_header()?;
        let doc = Document {
            body: &self.body,
            header: &self.header,
        };
        Ok(CanonicalBytes::new(&doc)?.into_bytes())
    }

    /// Whether the header's Merkle root reference matches the body.
    ///
    /// Always true right after [`get_content`](Self::get_content) or
    /// [`reference_id`](Self::reference_id); false while an edit is pending.
    pub fn verify_integrity(&self) -> Result<bool, HashChainError> {
        Ok(self.body.merkle_root()? == self.header.merkle_root_reference())
    }

    /// Bring the header in line with the current body.
    pub fn balance_header(&mut self) -> Result<(), HashChainError> {
        let current_root = self.body.merkle_root()?;
        if current_root == self.header.merkle_root_reference() {
            return Ok(());
        }
        tracing::trace!(root = %current_root, "body changed; rebalancing header");
        self.extend_chain(current_root)
    }

    fn can_extend(&self) -> bool {
        let linked = !self.header.previous_hash().is_zero() || !self.is_initial;
        linked && self.locked_previous_hash.is_none()
    }

    fn extend_chain(&mut self, current_root: ContentDigest) -> Result<(), HashChainError> {
        if self.can_extend() {
            let current_header_hash = self.header.digest()?;
            let expected = self.header.previous_hash();
            if !self.header.set_previous_hash(&expected, current_header_hash) {
                return Err(HashChainError::Integrity(format!(
                    "cannot extend chain past height {}",
                    self.header.chain_height()
                )));
            }
            self.locked_previous_hash = Some(current_header_hash);
            tracing::debug!(
                previous = %current_header_hash,
                height = self.header.chain_height(),
                "extended version chain"
            );
        }
        let expected = self.header.merkle_root_reference();
        self.header.set_merkle_root_reference(&expected, current_root);
        Ok(())
    }
}

//! # Body — User Content
//!
//! The body holds arbitrary caller fields. It starts in the read-only
//! posture (write-once and auto-clone on), which is how every body decoded
//! from storage begins life. Editing requires an explicit
//! [`Body::to_writable_copy`], which yields an independent body so the
//! loaded original is never changed behind its reader's back.
//!
//! The body's Merkle root is recomputed from the live fields on every call.
//! There is no cache to go stale, so any edit, including one made through
//! [`Body::get_mut`], shows up at the next balance.

use serde::{Serialize, Serializer};
use serde_json::Value;

use hashchain_core::{
    merkle_root, CanonicalBytes, CanonicalizationError, ContentDigest, FieldContainer, FieldMap,
    MerkleTree,
};

/// User content of one file version.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    fields: FieldContainer,
}

impl Default for Body {
    fn default() -> Self {
        Self::new()
    }
}

impl Body {
    /// An empty body in the read-only posture.
    pub fn new() -> Self {
        Self {
            fields: FieldContainer::write_once(),
        }
    }

    /// A read-only body holding decoded `fields`.
    pub fn from_map(fields: FieldMap) -> Self {
        let mut fields = FieldContainer::from(fields);
        fields.enable_write_once();
        Self { fields }
    }

    /// Write a field; returns whether the write was applied.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> bool {
        self.fields.set(name, value)
    }

    /// Snapshot a borrowed caller structure into a field.
    pub fn set_serialized<T: Serialize + ?Sized>(
        &mut self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<bool, CanonicalizationError> {
        self.fields.set_serialized(name, value)
    }

    /// A field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Mutable access to a field; `None` in the read-only posture.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Whether a field holds a value.
    pub fn is_set(&self, name: &str) -> bool {
        self.fields.is_set(name)
    }

    /// The underlying fields.
    pub fn fields(&self) -> &FieldContainer {
        &self.fields
    }

    /// Whether fields may be overwritten.
    pub fn is_writable(&self) -> bool {
        !self.fields.is_write_once()
    }

    /// Canonical encoding of the current fields.
    pub fn encode(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(self)
    }

    /// Merkle root of the canonical encoding of the current fields.
    pub fn merkle_root(&self) -> Result<ContentDigest, CanonicalizationError> {
        Ok(merkle_root(self.encode()?.as_bytes()))
    }

    /// The full Merkle tree, for leaf-level inspection.
    pub fn merkle_tree(&self) -> Result<MerkleTree, CanonicalizationError> {
        Ok(MerkleTree::build(self.encode()?.as_bytes()))
    }

    /// An independent, writable copy: write-once and auto-clone both off.
    pub fn to_writable_copy(&self) -> Self {
        let mut fields = self.fields.to_writable_copy();
        fields.disable_auto_clone();
        Self { fields }
    }
}

impl Serialize for Body {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.as_map().serialize(serializer)
    }
}

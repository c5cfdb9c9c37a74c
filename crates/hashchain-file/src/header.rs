//! # Header — Chain Metadata
//!
//! A header carries the caller's custom fields plus three privileged chain
//! fields:
//!
//! - `previous_hash` — digest of the predecessor's header, all-zero for the
//!   first version in a chain.
//! - `merkle_root` — the body Merkle root this header vouches for.
//! - `chain_height` — number of chain extensions behind this version.
//!
//! Custom fields are write-once for the life of the header. The privileged
//! fields change only through compare-and-swap: the caller names the value
//! it believes is current, and a stale belief leaves the header untouched.
//!
//! ## Encoding
//!
//! ```text
//! {"chain_height":<u64>,"fields":{...},"merkle_root":"<hex>","previous_hash":"<hex>"}
//! ```
//!
//! The SHA-256 of this canonical encoding is the header digest, the file's
//! reference id.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use hashchain_core::{
    merkle_root, sha256_digest, CanonicalBytes, CanonicalizationError, ContentDigest,
    FieldContainer, FieldMap, HashChainError, Timestamp,
};

/// Custom field that receives a creation timestamp when the caller omits it.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Names of the privileged chain fields, always present on a header.
pub const CHAIN_FIELDS: [&str; 3] = ["chain_height", "merkle_root", "previous_hash"];

/// Chain metadata for one file version.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    fields: FieldContainer,
    previous_hash: ContentDigest,
    merkle_root: ContentDigest,
    chain_height: u64,
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

impl Header {
    /// An empty header: no custom fields, zero digests, height 0.
    pub fn new() -> Self {
        Self {
            fields: FieldContainer::write_once(),
            previous_hash: ContentDigest::ZERO,
            merkle_root: ContentDigest::ZERO,
            chain_height: 0,
        }
    }

    /// A header holding `custom` fields, each written once.
    ///
    /// A [`TIMESTAMP_FIELD`] with the current UTC time is added when
    /// `custom` does not supply one.
    pub fn with_fields(custom: FieldMap) -> Self {
        let mut header = Self::new();
        for (name, value) in custom {
            header.set(name, value);
        }
        if !header.is_set(TIMESTAMP_FIELD) {
            header.set(TIMESTAMP_FIELD, Timestamp::now().to_iso8601());
        }
        header
    }

    /// Write a custom field. Existing fields are never replaced; returns
    /// whether the write was applied.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> bool {
        self.fields.set(name, value)
    }

    /// A custom field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Whether `name` holds a value: one of the [`CHAIN_FIELDS`], which
    /// always do, or a non-null custom field.
    pub fn is_set(&self, name: &str) -> bool {
        CHAIN_FIELDS.contains(&name) || self.fields.is_set(name)
    }

    /// The custom fields.
    pub fn fields(&self) -> &FieldContainer {
        &self.fields
    }

    /// Digest of the predecessor's header; zero for a chain's first version.
    pub fn previous_hash(&self) -> ContentDigest {
        self.previous_hash
    }

    /// The body Merkle root this header currently vouches for.
    pub fn merkle_root_reference(&self) -> ContentDigest {
        self.merkle_root
    }

    /// Number of chain extensions behind this version.
    pub fn chain_height(&self) -> u64 {
        self.chain_height
    }

    /// Replace the previous-hash pointer if it still equals `expected`.
    ///
    /// On success the chain height grows by one. Returns whether the swap
    /// happened; a `false` result means the caller's view was stale, or the
    /// height is already `u64::MAX`, and nothing changed.
    pub fn set_previous_hash(&mut self, expected: &ContentDigest, new_hash: ContentDigest) -> bool {
        if self.previous_hash != *expected {
            return false;
        }
        let Some(height) = self.chain_height.checked_add(1) else {
            return false;
        };
        self.previous_hash = new_hash;
        self.chain_height = height;
        true
    }

    /// Replace the Merkle root reference if it still equals `expected`.
    pub fn set_merkle_root_reference(
        &mut self,
        expected: &ContentDigest,
        new_root: ContentDigest,
    ) -> bool {
        if self.merkle_root != *expected {
            return false;
        }
        self.merkle_root = new_root;
        true
    }

    /// Canonical encoding of the current header state.
    pub fn encode(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(self)
    }

    /// SHA-256 of the canonical encoding: this version's reference digest.
    pub fn digest(&self) -> Result<ContentDigest, CanonicalizationError> {
        Ok(sha256_digest(&self.encode()?))
    }

    /// Merkle root over the canonical encoding.
    pub fn content_digest(&self) -> Result<ContentDigest, CanonicalizationError> {
        Ok(merkle_root(self.encode()?.as_bytes()))
    }

    /// Rebuild a header from its decoded encoding.
    ///
    /// # Errors
    ///
    /// Returns `HashChainError::Decode` for missing or unknown keys, a
    /// malformed digest, or a height that is not an unsigned integer.
    pub fn from_map(map: FieldMap) -> Result<Self, HashChainError> {
        let stored: StoredHeader = serde_json::from_value(Value::Object(map))
            .map_err(|e| HashChainError::Decode(format!("invalid header: {e}")))?;
        let mut header = Self::new();
        for (name, value) in stored.fields {
            header.set(name, value);
        }
        header.previous_hash = stored.previous_hash;
        header.merkle_root = stored.merkle_root;
        header.chain_height = stored.chain_height;
        Ok(header)
    }
}

/// Borrowed wire form of a header.
#[derive(Serialize)]
struct EncodedHeader<'a> {
    chain_height: u64,
    fields: &'a FieldMap,
    merkle_root: ContentDigest,
    previous_hash: ContentDigest,
}

/// Owned wire form of a header, as decoded.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StoredHeader {
    chain_height: u64,
    fields: FieldMap,
    merkle_root: ContentDigest,
    previous_hash: ContentDigest,
}

impl Serialize for Header {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EncodedHeader {
            chain_height: self.chain_height,
            fields: self.fields.as_map(),
            merkle_root: self.merkle_root,
            previous_hash: self.previous_hash,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sha2::{Digest, Sha256};

    fn custom(v: Value) -> FieldMap {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    fn sample() -> Header {
        Header::with_fields(custom(json!({
            "created_by": "Jared",
            "number_field": 1,
            "timestamp": "2018-07-10T00:00:00Z"
        })))
    }

    #[test]
    fn new_header_is_zeroed() {
        let h = Header::new();
        assert!(h.previous_hash().is_zero());
        assert!(h.merkle_root_reference().is_zero());
        assert_eq!(h.chain_height(), 0);
        assert!(h.fields().is_empty());
    }

    #[test]
    fn custom_fields_are_write_once() {
        let mut h = sample();
        assert!(!h.set("created_by", "John"));
        assert_eq!(h.get("created_by"), Some(&json!("Jared")));
        assert!(h.set("new_field", true));
    }

    #[test]
    fn timestamp_defaulted_when_omitted() {
        let h = Header::with_fields(custom(json!({"created_by": "Jared"})));
        let ts = h.get(TIMESTAMP_FIELD).and_then(Value::as_str).unwrap();
        assert!(Timestamp::parse(ts).is_ok());
    }

    #[test]
    fn caller_timestamp_is_kept() {
        assert_eq!(
            sample().get(TIMESTAMP_FIELD),
            Some(&json!("2018-07-10T00:00:00Z"))
        );
    }

    #[test]
    fn previous_hash_cas_accepts_current_value() {
        let mut h = sample();
        let next = ContentDigest::new([3; 32]);
        assert!(h.set_previous_hash(&ContentDigest::ZERO, next));
        assert_eq!(h.previous_hash(), next);
        assert_eq!(h.chain_height(), 1);
    }

    #[test]
    fn previous_hash_cas_rejects_stale_value() {
        let mut h = sample();
        let stale = ContentDigest::new([9; 32]);
        assert!(!h.set_previous_hash(&stale, ContentDigest::new([3; 32])));
        assert!(h.previous_hash().is_zero());
        assert_eq!(h.chain_height(), 0);
    }

    #[test]
    fn previous_hash_cas_rejects_height_overflow() {
        let mut value = custom(serde_json::to_value(sample()).unwrap());
        value.insert("chain_height".into(), json!(u64::MAX));
        let mut h = Header::from_map(value).unwrap();
        assert!(!h.set_previous_hash(&ContentDigest::ZERO, ContentDigest::new([3; 32])));
        assert!(h.previous_hash().is_zero());
        assert_eq!(h.chain_height(), u64::MAX);
    }

    #[test]
    fn chain_fields_are_always_set() {
        let h = Header::new();
        for name in CHAIN_FIELDS {
            assert!(h.is_set(name), "{name} should count as set");
        }
        assert!(!h.is_set("created_by"));
        assert!(sample().is_set("created_by"));
    }

    #[test]
    fn merkle_root_cas_leaves_height_alone() {
        let mut h = sample();
        let root = ContentDigest::new([5; 32]);
        assert!(h.set_merkle_root_reference(&ContentDigest::ZERO, root));
        assert!(!h.set_merkle_root_reference(&ContentDigest::ZERO, ContentDigest::new([6; 32])));
        assert_eq!(h.merkle_root_reference(), root);
        assert_eq!(h.chain_height(), 0);
    }

    #[test]
    fn digest_is_sha256_of_encoding() {
        let h = sample();
        let encoded = h.encode().unwrap();
        let expected = ContentDigest::from_slice(&Sha256::digest(encoded.as_bytes())).unwrap();
        assert_eq!(h.digest().unwrap(), expected);
        assert_eq!(h.content_digest().unwrap(), merkle_root(encoded.as_bytes()));
    }

    #[test]
    fn encoding_layout() {
        let h = Header::with_fields(custom(json!({"timestamp": "2018-07-10T00:00:00Z"})));
        let s = String::from_utf8(h.encode().unwrap().into_bytes()).unwrap();
        let zeros = "0".repeat(64);
        assert_eq!(
            s,
            format!(
                r#"{{"chain_height":0,"fields":{{"timestamp":"2018-07-10T00:00:00Z"}},"merkle_root":"{zeros}","previous_hash":"{zeros}"}}"#
            )
        );
    }

    #[test]
    fn digest_tracks_chain_fields() {
        let mut h = sample();
        let before = h.digest().unwrap();
        h.set_merkle_root_reference(&ContentDigest::ZERO, ContentDigest::new([1; 32]));
        assert_ne!(h.digest().unwrap(), before);
    }

    #[test]
    fn from_map_roundtrips() {
        let mut h = sample();
        h.set_previous_hash(&ContentDigest::ZERO, ContentDigest::new([2; 32]));
        let value = serde_json::to_value(&h).unwrap();
        let back = Header::from_map(custom(value)).unwrap();
        assert_eq!(back, h);
        assert_eq!(back.digest().unwrap(), h.digest().unwrap());
    }

    #[test]
    fn from_map_rejects_unknown_keys() {
        let mut value = custom(serde_json::to_value(sample()).unwrap());
        value.insert("extra".into(), json!(1));
        assert!(matches!(
            Header::from_map(value),
            Err(HashChainError::Decode(_))
        ));
    }

    #[test]
    fn from_map_rejects_bad_digest() {
        let mut value = custom(serde_json::to_value(sample()).unwrap());
        value.insert("previous_hash".into(), json!("abc"));
        assert!(Header::from_map(value).is_err());
    }

    #[test]
    fn from_map_rejects_negative_height() {
        let mut value = custom(serde_json::to_value(sample()).unwrap());
        value.insert("chain_height".into(), json!(-1));
        assert!(Header::from_map(value).is_err());
    }

    #[test]
    fn float_custom_field_fails_digest() {
        let mut h = Header::new();
        h.set("ratio", 0.5);
        assert!(matches!(
            h.digest(),
            Err(CanonicalizationError::FloatRejected(_))
        ));
    }
}

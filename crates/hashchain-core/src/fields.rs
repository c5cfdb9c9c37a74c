//! # Field Container — Write-Once Field Maps
//!
//! `FieldContainer` is the ordered field map underneath both the header and
//! the body of a hashchain file. It enforces two lifecycle properties:
//!
//! - **Write-once.** With `write_once` enabled, a field holding a value can
//!   never be reassigned through [`FieldContainer::set`]. The rejected write
//!   is dropped silently and `set` returns `false`. This is a contract, not
//!   an error: callers that care check the return value or [`is_set`].
//! - **Isolation.** Stored values are owned `serde_json::Value` trees. A
//!   value enters either by move or, for borrowed caller structures, as a
//!   snapshot taken by [`FieldContainer::materialize`]. No later change to
//!   the caller's structure can reach the stored content, which keeps
//!   digests stable.
//!
//! The `auto_clone` flag records the isolation posture of a container. Read
//! postures (header, freshly loaded body) carry it; a body's writable
//! working copy drops it, mirroring the lifecycle of the file around it.
//!
//! A field holding JSON `null` counts as absent: it may still receive its
//! one write. Keys iterate in sorted order, matching the canonical encoding.
//!
//! [`is_set`]: FieldContainer::is_set

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CanonicalizationError;

/// An ordered map from field name to value.
pub type FieldMap = Map<String, Value>;

/// Field map with write-once enforcement and owned-value isolation.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldContainer {
    fields: FieldMap,
    write_once: bool,
    auto_clone: bool,
}

impl Default for FieldContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldContainer {
    /// An empty, freely writable container with auto-clone enabled.
    pub fn new() -> Self {
        Self {
            fields: FieldMap::new(),
            write_once: false,
            auto_clone: true,
        }
    }

    /// An empty container in the read-only posture: write-once and
    /// auto-clone both enabled.
    pub fn write_once() -> Self {
        Self {
            fields: FieldMap::new(),
            write_once: true,
            auto_clone: true,
        }
    }

    /// Store `value` at `name` unless write-once forbids it.
    ///
    /// The write is applied when write-once is disabled or the field is
    /// currently absent. Returns whether the write was applied.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> bool {
        let name = name.into();
        if self.write_once && self.is_set(&name) {
            return false;
        }
        self.fields.insert(name, value.into());
        true
    }

    /// Snapshot a borrowed caller structure and store it at `name`.
    ///
    /// Later mutation of `value` by the caller leaves the stored field
    /// untouched. Returns whether the write was applied.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` when the
    /// structure has no JSON representation (e.g. a map with non-string
    /// keys). Nothing is stored in that case.
    pub fn set_serialized<T: Serialize + ?Sized>(
        &mut self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<bool, CanonicalizationError> {
        let snapshot = Self::materialize(value)?;
        Ok(self.set(name, snapshot))
    }

    /// Deep-copy a borrowed structure into an owned value tree.
    ///
    /// Sequences, maps and nested records are copied element by element, so
    /// the result shares nothing with `value`. Values handed to [`set`] by
    /// move need no copy: ownership already detaches them from the caller.
    ///
    /// Isolation therefore never depends on the `auto_clone` flag; no read
    /// or write path branches on it.
    ///
    /// [`set`]: FieldContainer::set
    pub fn materialize<T: Serialize + ?Sized>(value: &T) -> Result<Value, CanonicalizationError> {
        Ok(serde_json::to_value(value)?)
    }

    /// The stored value, if any. Values are not cloned on read.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Mutable access to a stored value.
    ///
    /// Returns `None` while write-once is enabled, since an in-place edit
    /// would bypass the write-once rule. Edits made through this reference
    /// are picked up by the next digest computation.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        if self.write_once {
            return None;
        }
        self.fields.get_mut(name)
    }

    /// Whether `name` holds a non-null value.
    pub fn is_set(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(|v| !v.is_null())
    }

    /// Number of stored fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the container holds no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// The underlying field map.
    pub fn as_map(&self) -> &FieldMap {
        &self.fields
    }

    /// A deep copy with write-once disabled. The auto-clone flag is kept.
    pub fn to_writable_copy(&self) -> Self {
        let mut copy = self.clone();
        copy.disable_write_once();
        copy
    }

    /// Turn on write-once enforcement.
    pub fn enable_write_once(&mut self) {
        self.write_once = true;
    }

    /// Turn off write-once enforcement.
    pub fn disable_write_once(&mut self) {
        self.write_once = false;
    }

    /// Turn on auto-clone.
    pub fn enable_auto_clone(&mut self) {
        self.auto_clone = true;
    }

    /// Turn off auto-clone.
    pub fn disable_auto_clone(&mut self) {
        self.auto_clone = false;
    }

    /// Whether write-once enforcement is on.
    pub fn is_write_once(&self) -> bool {
        self.write_once
    }

    /// Whether auto-clone is on.
    pub fn is_auto_clone(&self) -> bool {
        self.auto_clone
    }
}

impl From<FieldMap> for FieldContainer {
    /// A writable container holding `fields`.
    fn from(fields: FieldMap) -> Self {
        Self {
            fields,
            write_once: false,
            auto_clone: true,
        }
    }
}

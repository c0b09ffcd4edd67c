//! `PropertySet` shared between every block of one workflow run.
//!
//! The property set is the communication channel between passes: a block can
//! publish values that later blocks (or the caller) read back. A workflow with
//! `store_final_output` enabled publishes `{name: {"final_output": payload}}`
//! under its own name, which is how a downstream workflow can pick up an
//! upstream workflow's result without being handed it directly.
//!
//! Missing keys resolve to the [`PropertyValue::Null`] sentinel rather than
//! failing; writes are total replacements, last-write-wins.
//!
//! # Example
//!
//! ```
//! use quflow::{Payload, PropertySet, PropertyValue};
//!
//! let mut props = PropertySet::new();
//! assert!(props.get("anything").is_null());
//!
//! props.set_final_output("converter", Payload::Bits(vec![1, 0]));
//! let entry = props.get("converter").get("final_output");
//! assert_eq!(
//!     entry.and_then(PropertyValue::as_payload),
//!     Some(&Payload::Bits(vec![1, 0]))
//! );
//! ```

use rustc_hash::FxHashMap;

use crate::payload::Payload;

/// Key under which a workflow publishes its final payload.
pub const FINAL_OUTPUT_KEY: &str = "final_output";

/// A value stored in a [`PropertySet`]: the null sentinel, a payload, or a
/// nested string-keyed map.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PropertyValue {
    /// Sentinel for absent entries.
    #[default]
    Null,
    /// A workflow payload.
    Payload(Payload),
    /// A nested map, supporting keyed lookup.
    Map(FxHashMap<String, PropertyValue>),
}

impl PropertyValue {
    /// Check whether this is the null sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Keyed lookup. Returns `None` unless this value is a map containing
    /// the key.
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        match self {
            PropertyValue::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// View this value as a payload, if it is one.
    pub fn as_payload(&self) -> Option<&Payload> {
        match self {
            PropertyValue::Payload(payload) => Some(payload),
            _ => None,
        }
    }
}

static NULL: PropertyValue = PropertyValue::Null;

/// String-keyed properties shared by every block within one workflow run.
#[derive(Debug, Clone, Default)]
pub struct PropertySet {
    entries: FxHashMap<String, PropertyValue>,
}

impl PropertySet {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a stored value, or the null sentinel if the key is absent.
    pub fn get(&self, key: &str) -> &PropertyValue {
        self.entries.get(key).unwrap_or(&NULL)
    }

    /// Store a value under a key, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: PropertyValue) {
        self.entries.insert(key.into(), value);
    }

    /// Publish a workflow's final payload as `{name: {"final_output": payload}}`.
    pub fn set_final_output(&mut self, name: impl Into<String>, payload: Payload) {
        let mut map = FxHashMap::default();
        map.insert(FINAL_OUTPUT_KEY.to_string(), PropertyValue::Payload(payload));
        self.entries.insert(name.into(), PropertyValue::Map(map));
    }

    /// Check whether a key has been written.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no entries have been stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_null() {
        let props = PropertySet::new();
        assert!(props.get("missing").is_null());
        assert!(!props.contains("missing"));
    }

    #[test]
    fn test_last_write_wins() {
        let mut props = PropertySet::new();
        props.set("key", PropertyValue::Payload(Payload::Bits(vec![0])));
        props.set("key", PropertyValue::Payload(Payload::Bits(vec![1])));

        assert_eq!(
            props.get("key").as_payload(),
            Some(&Payload::Bits(vec![1]))
        );
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn test_final_output_layout() {
        let mut props = PropertySet::new();
        props.set_final_output("stage", Payload::Bits(vec![1, 1]));

        let value = props.get("stage").get(FINAL_OUTPUT_KEY);
        assert_eq!(
            value.and_then(PropertyValue::as_payload),
            Some(&Payload::Bits(vec![1, 1]))
        );
        // Keyed lookup on non-map values yields nothing.
        assert!(props.get("stage").as_payload().is_none());
    }
}

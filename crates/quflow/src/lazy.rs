//! Deferred lookup of a value behind a key path.

use crate::error::{WorkflowError, WorkflowResult};
use crate::property::PropertyValue;

/// A deferred reference to a value reachable from a root [`PropertyValue`]
/// through an ordered key path.
///
/// A producer hands out a `LazyHandle` when the value should not be looked
/// up until it is actually consumed. The first call to [`force`](Self::force)
/// walks the key path and caches the result; every later call returns the
/// cached value without re-resolving.
///
/// # Example
///
/// ```
/// use quflow::{LazyHandle, Payload, PropertySet};
///
/// let mut props = PropertySet::new();
/// props.set_final_output("converter", Payload::Bits(vec![1]));
///
/// let mut handle = LazyHandle::new(props.get("converter").clone(), ["final_output"]);
/// assert!(!handle.is_resolved());
///
/// let value = handle.force().unwrap();
/// assert_eq!(value.as_payload(), Some(&Payload::Bits(vec![1])));
/// assert!(handle.is_resolved());
/// ```
#[derive(Debug, Clone)]
pub struct LazyHandle {
    root: PropertyValue,
    keys: Vec<String>,
    resolved: Option<PropertyValue>,
}

impl LazyHandle {
    /// Create a handle over a root value and an ordered key path.
    pub fn new(
        root: PropertyValue,
        keys: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            root,
            keys: keys.into_iter().map(Into::into).collect(),
            resolved: None,
        }
    }

    /// Check whether the handle has already been resolved.
    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// Resolve the key path, caching the result. Idempotent: the walk runs
    /// at most once per handle.
    pub fn force(&mut self) -> WorkflowResult<&PropertyValue> {
        match self.resolved {
            Some(ref value) => Ok(value),
            None => {
                let value = resolve(&self.root, &self.keys)?;
                Ok(self.resolved.insert(value))
            }
        }
    }
}

fn resolve(root: &PropertyValue, keys: &[String]) -> WorkflowResult<PropertyValue> {
    let mut current = root;
    for key in keys {
        current = current
            .get(key)
            .ok_or_else(|| WorkflowError::LookupFailed { key: key.clone() })?;
    }
    Ok(current.clone())
}

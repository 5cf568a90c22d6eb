//! Ordered map type for decoded hashes.
//!
//! This module provides [`MarshalMap`], a wrapper around [`IndexMap`] that keeps
//! hash pairs in stream order. Keys are text: the decoder feeds every pair
//! through [`MarshalMap::insert_decoded`], which narrows the Ruby key with
//! [`Value::into_key`](crate::Value::into_key). Keys that collide after
//! narrowing resolve last-write-wins at the first key's position.
//!
//! ## Examples
//!
//! ```rust
//! use serde_marshal::{MarshalMap, Value};
//!
//! let mut map = MarshalMap::new();
//! map.insert("name".to_string(), Value::from("Alice"));
//! map.insert("age".to_string(), Value::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use indexmap::IndexMap;
use std::collections::HashMap;

/// An ordered map of string keys to decoded values.
///
/// Inserting a key that is already present replaces its value but keeps the
/// key at its original position.
///
/// # Examples
///
/// ```rust
/// use serde_marshal::{MarshalMap, Value};
///
/// let mut map = MarshalMap::new();
/// map.insert("first".to_string(), Value::from(1));
/// map.insert("second".to_string(), Value::from(2));
/// map.insert("first".to_string(), Value::from(3));
///
/// let keys: Vec<_> = map.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// assert_eq!(map.get("first").and_then(|v| v.as_i64()), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MarshalMap(IndexMap<String, crate::Value>);

impl MarshalMap {
    /// Creates an empty `MarshalMap`.
    #[must_use]
    pub fn new() -> Self {
        MarshalMap(IndexMap::new())
    }

    /// Creates an empty `MarshalMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        MarshalMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// Last write wins: an existing key keeps its position, takes the new
    /// value, and the old value is returned.
    pub fn insert(&mut self, key: String, value: crate::Value) -> Option<crate::Value> {
        self.0.insert(key, value)
    }

    /// Inserts a pair whose key is still a decoded value.
    ///
    /// The key is narrowed with [`Value::into_key`](crate::Value::into_key)
    /// first. Distinct Ruby keys can narrow to the same text (`1` and `"1"`,
    /// or `nil` and `[]`); the later pair wins and the collision is logged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_marshal::{MarshalMap, Value};
    ///
    /// let mut map = MarshalMap::new();
    /// map.insert_decoded(Value::Integer(1), Value::from("int"));
    /// let old = map.insert_decoded(Value::from("1"), Value::from("str"));
    ///
    /// assert_eq!(old, Some(Value::from("int")));
    /// assert_eq!(map.get("1"), Some(&Value::from("str")));
    /// ```
    pub fn insert_decoded(
        &mut self,
        key: crate::Value,
        value: crate::Value,
    ) -> Option<crate::Value> {
        let key = key.into_key();
        match self.0.get_full_mut(&key) {
            Some((index, _, slot)) => {
                tracing::debug!(key = %key, index, "hash key collision, later value kept");
                Some(std::mem::replace(slot, value))
            }
            None => {
                self.0.insert(key, value);
                None
            }
        }
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&crate::Value> {
        self.0.get(key)
    }

    /// Returns `true` if the map contains the key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of elements in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, crate::Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, crate::Value> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, crate::Value> {
        self.0.iter()
    }
}

impl Default for MarshalMap {
    fn default() -> Self {
        Self::new()
    }
}

impl From<MarshalMap> for HashMap<String, crate::Value> {
    fn from(map: MarshalMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for MarshalMap {
    type Item = (String, crate::Value);
    type IntoIter = indexmap::map::IntoIter<String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MarshalMap {
    type Item = (&'a String, &'a crate::Value);
    type IntoIter = indexmap::map::Iter<'a, String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, crate::Value)> for MarshalMap {
    fn from_iter<T: IntoIterator<Item = (String, crate::Value)>>(iter: T) -> Self {
        MarshalMap(IndexMap::from_iter(iter))
    }
}

//! Insertion-ordered key to many-values store

use indexmap::IndexMap;
use std::borrow::Borrow;
use std::hash::Hash;

/// Maps each key to the values added under it, in insertion order
///
/// Removal is by `(key, value)` pair: taking one value out of a key never
/// disturbs the other values stored under that key. A key whose last value is
/// removed disappears entirely, so `add` followed by `remove` is a no-op on the
/// observable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multimap<K: Hash + Eq, V> {
    entries: IndexMap<K, Vec<V>>,
}

impl<K: Hash + Eq, V> Multimap<K, V> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Append `value` to the values of `key`
    ///
    /// Adding the same pair twice stores two entries; each needs its own
    /// `remove`.
    pub fn add(&mut self, key: K, value: V) {
        self.entries.entry(key).or_default().push(value);
    }

    /// Remove one occurrence of the `(key, value)` pair
    ///
    /// Returns false if the pair was not present.
    pub fn remove<Q>(&mut self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: PartialEq,
    {
        let Some(values) = self.entries.get_mut(key) else {
            return false;
        };
        let Some(position) = values.iter().position(|v| v == value) else {
            return false;
        };

        values.remove(position);
        if values.is_empty() {
            self.entries.shift_remove(key);
        }
        true
    }

    /// Values stored under `key`; empty if the key is absent
    pub fn get<Q>(&self, key: &Q) -> &[V]
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains<Q>(&self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: PartialEq,
    {
        self.get(key).contains(value)
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, K, Vec<V>> {
        self.entries.keys()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Hash + Eq, V> Default for Multimap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

//! A dictionary that can hold multiple values per key.
//!
//! [`MultiValueDict`] is the shape of submitted form data: a single field
//! name may appear more than once (multi-selects, repeated checkboxes), and
//! the order in which names first appeared is preserved so that a collected
//! submission reads back in document order.

use std::collections::HashMap;
use std::hash::Hash;

/// A dictionary that maps keys to lists of values, remembering key order.
///
/// [`get`](MultiValueDict::get) returns the **last** value for a key, while
/// [`get_list`](MultiValueDict::get_list) returns all values.
///
/// # Examples
///
/// ```
/// use inlines_core::utils::MultiValueDict;
///
/// let mut d = MultiValueDict::new();
/// d.append("task-0-tags".to_string(), "red");
/// d.append("task-0-tags".to_string(), "blue");
///
/// assert_eq!(d.get(&"task-0-tags".to_string()), Some(&"blue"));
/// assert_eq!(d.get_list(&"task-0-tags".to_string()), Some(&vec!["red", "blue"]));
/// ```
#[derive(Debug, Clone)]
pub struct MultiValueDict<K: Eq + Hash + Clone, V> {
    inner: HashMap<K, Vec<V>>,
    order: Vec<K>,
}

impl<K: Eq + Hash + Clone, V> Default for MultiValueDict<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone, V> MultiValueDict<K, V> {
    /// Creates an empty `MultiValueDict`.
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Returns a reference to the **last** value associated with the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.inner.get(key).and_then(|v| v.last())
    }

    /// Returns all values associated with the key.
    pub fn get_list(&self, key: &K) -> Option<&Vec<V>> {
        self.inner.get(key)
    }

    /// Sets the value for a key, replacing any existing values.
    ///
    /// A key that already exists keeps its original position.
    pub fn set(&mut self, key: K, value: V) {
        if !self.inner.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.inner.insert(key, vec![value]);
    }

    /// Appends a value to the list for the given key.
    pub fn append(&mut self, key: K, value: V) {
        if !self.inner.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.inner.entry(key).or_default().push(value);
    }

    /// Removes a key and returns its values.
    pub fn remove(&mut self, key: &K) -> Option<Vec<V>> {
        let removed = self.inner.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    /// Returns the keys in first-insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    /// Returns (key, value-list) pairs in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Vec<V>)> {
        self.order
            .iter()
            .filter_map(|k| self.inner.get(k).map(|v| (k, v)))
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the dictionary contains no keys.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns `true` if the dictionary contains the specified key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }
}

impl<K: Eq + Hash + Clone, V> FromIterator<(K, V)> for MultiValueDict<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut d = Self::new();
        for (k, v) in iter {
            d.append(k, v);
        }
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let d: MultiValueDict<String, String> = MultiValueDict::new();
        assert!(d.is_empty());
        assert_eq!(d.len(), 0);
    }

    #[test]
    fn test_append_and_get_returns_last() {
        let mut d = MultiValueDict::new();
        d.append("color", "red");
        d.append("color", "blue");

        assert_eq!(d.get(&"color"), Some(&"blue"));
        assert_eq!(d.get_list(&"color"), Some(&vec!["red", "blue"]));
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn test_set_replaces_existing_and_keeps_position() {
        let mut d = MultiValueDict::new();
        d.append("a", 1);
        d.append("b", 2);
        d.set("a", 3);
        let keys: Vec<_> = d.keys().copied().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(d.get_list(&"a"), Some(&vec![3]));
    }

    #[test]
    fn test_keys_follow_insertion_order() {
        let d: MultiValueDict<&str, i32> =
            [("z", 1), ("a", 2), ("m", 3), ("a", 4)].into_iter().collect();
        let keys: Vec<_> = d.keys().copied().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(d.get(&"a"), Some(&4));
    }

    #[test]
    fn test_remove() {
        let mut d = MultiValueDict::new();
        d.set("x", 1);
        d.set("y", 2);
        assert_eq!(d.remove(&"x"), Some(vec![1]));
        assert!(!d.contains_key(&"x"));
        assert_eq!(d.keys().count(), 1);
        assert_eq!(d.remove(&"x"), None);
    }

    #[test]
    fn test_iter_pairs() {
        let mut d = MultiValueDict::new();
        d.append("a", 1);
        d.append("a", 2);
        d.append("b", 3);
        let items: Vec<_> = d.iter().map(|(k, v)| (*k, v.clone())).collect();
        assert_eq!(items, vec![("a", vec![1, 2]), ("b", vec![3])]);
    }
}

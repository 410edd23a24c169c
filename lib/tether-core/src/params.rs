//! Ordered, duplicate-preserving parameter collections.

use crate::{KeyPair, Value};

/// Insertion-ordered list of [`KeyPair`]s.
///
/// Keys may repeat; nothing is deduplicated.
///
/// ```
/// use tether_core::ParamCollection;
///
/// let mut params = ParamCollection::new();
/// params.append("tag", "a");
/// params.append("tag", "b");
///
/// assert!(params.is_multi_value("tag"));
/// assert_eq!(params.lookup("tag").len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamCollection {
    pairs: Vec<KeyPair>,
}

impl ParamCollection {
    /// Create an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a key/value pair. Existing pairs with the same key are kept.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.pairs.push(KeyPair::new(key, value));
    }

    /// Append a prepared pair.
    pub fn push(&mut self, pair: KeyPair) {
        self.pairs.push(pair);
    }

    /// All values stored under `key`, in insertion order.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Vec<&Value> {
        self.pairs
            .iter()
            .filter(|pair| pair.key() == key)
            .map(KeyPair::value)
            .collect()
    }

    /// First value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.pairs
            .iter()
            .find(|pair| pair.key() == key)
            .map(KeyPair::value)
    }

    /// `true` when more than one pair uses `key`.
    #[must_use]
    pub fn is_multi_value(&self, key: &str) -> bool {
        self.pairs.iter().filter(|pair| pair.key() == key).count() > 1
    }

    /// Number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// `true` when there are no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over the pairs in order.
    pub fn iter(&self) -> std::slice::Iter<'_, KeyPair> {
        self.pairs.iter()
    }

    /// Borrow the pairs as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[KeyPair] {
        &self.pairs
    }
}

impl<'a> IntoIterator for &'a ParamCollection {
    type Item = &'a KeyPair;
    type IntoIter = std::slice::Iter<'a, KeyPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

impl IntoIterator for ParamCollection {
    type Item = KeyPair;
    type IntoIter = std::vec::IntoIter<KeyPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

impl FromIterator<KeyPair> for ParamCollection {
    fn from_iter<I: IntoIterator<Item = KeyPair>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParamCollection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(key, value)| KeyPair::new(key, value))
            .collect()
    }
}

impl Extend<KeyPair> for ParamCollection {
    fn extend<I: IntoIterator<Item = KeyPair>>(&mut self, iter: I) {
        self.pairs.extend(iter);
    }
}

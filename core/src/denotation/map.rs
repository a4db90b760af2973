use crate::types::identity_key;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// **IDENTITY-KEYED MAP**
///
/// Maps a shared descriptor to a value by the identity of its `Arc`
/// allocation, never by structural equality. Two denotations with equal
/// content are different keys. The map holds a clone of each key `Arc`, so an
/// address cannot be recycled for another object while its entry exists.
pub struct DenotationMap<K: ?Sized, V> {
    entries: HashMap<usize, (Arc<K>, V)>,
}

impl<K: ?Sized, V> DenotationMap<K, V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: Arc<K>, value: V) -> Option<V> {
        self.entries
            .insert(identity_key(&key), (key, value))
            .map(|(_, previous)| previous)
    }

    pub fn get(&self, key: &Arc<K>) -> Option<&V> {
        self.entries.get(&identity_key(key)).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &Arc<K>) -> Option<&mut V> {
        self.entries.get_mut(&identity_key(key)).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &Arc<K>) -> bool {
        self.entries.contains_key(&identity_key(key))
    }

    pub fn remove(&mut self, key: &Arc<K>) -> Option<V> {
        self.entries.remove(&identity_key(key)).map(|(_, v)| v)
    }

    pub fn get_or_insert_with(&mut self, key: &Arc<K>, make: impl FnOnce() -> V) -> &mut V {
        let (_, value) = self
            .entries
            .entry(identity_key(key))
            .or_insert_with(|| (Arc::clone(key), make()));
        value
    }

    /// First key whose value satisfies `predicate`.
    pub fn find_key(&self, mut predicate: impl FnMut(&V) -> bool) -> Option<Arc<K>> {
        self.entries
            .values()
            .find(|(_, v)| predicate(v))
            .map(|(k, _)| Arc::clone(k))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Arc<K>> {
        self.entries.values().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: ?Sized, V> Default for DenotationMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ?Sized, V> fmt::Debug for DenotationMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenotationMap")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

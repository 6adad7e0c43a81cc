use log::debug;
use std::collections::HashMap;
use std::hash::Hash;

/// Process-lifetime memo table keyed by the arguments of the memoized call.
/// Only successful results are stored, a failed call runs again next time.
#[derive(Debug)]
pub struct Memo<K, V> {
    name: &'static str,
    entries: HashMap<K, V>,
    misses: usize,
}

impl<K, V> Memo<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn new(name: &'static str) -> Memo<K, V> {
        Memo {
            name,
            entries: HashMap::new(),
            misses: 0,
        }
    }

    /// Return the stored value for `key`, or compute, store and return it.
    pub fn get_or_try_insert_with<F, E>(&mut self, key: &K, compute: F) -> Result<V, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        if let Some(v) = self.entries.get(key) {
            debug!("{} cache hit for {:?}", self.name, key);
            return Ok(v.clone());
        }
        debug!("{} cache miss for {:?}", self.name, key);
        self.misses += 1;
        let v = compute(key)?;
        self.entries.insert(key.clone(), v.clone());
        Ok(v)
    }

    pub fn invalidate(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        debug!("{} cache cleared ({} entries)", self.name, self.entries.len());
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of times the computation actually ran.
    pub fn misses(&self) -> usize {
        self.misses
    }
}

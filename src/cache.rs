// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

/// String-keyed memo for fetched lists. Entries live until `invalidate` or
/// `clear`; nothing expires on its own.
#[derive(Debug)]
pub struct QueryCache<V> {
    entries: HashMap<String, V>,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        QueryCache {
            entries: HashMap::new(),
        }
    }
}

impl<V: Clone> QueryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.get(key).cloned()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.entries.insert(key.into(), value);
    }

    /// Return the cached value or compute and store it. Errors are not cached.
    pub fn get_or_try_insert_with<E, F>(&mut self, key: &str, f: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(v) = self.entries.get(key) {
            return Ok(v.clone());
        }
        let v = f()?;
        self.entries.insert(key.to_string(), v.clone());
        Ok(v)
    }

    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_once_until_cleared() {
        let mut cache: QueryCache<Vec<u32>> = QueryCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            let v: Result<_, ()> = cache.get_or_try_insert_with("k", || {
                calls += 1;
                Ok(vec![1, 2])
            });
            assert_eq!(v.unwrap(), vec![1, 2]);
        }
        assert_eq!(calls, 1);

        cache.clear();
        assert!(cache.is_empty());
        let _: Result<_, ()> = cache.get_or_try_insert_with("k", || {
            calls += 1;
            Ok(vec![3])
        });
        assert_eq!(calls, 2);
        assert_eq!(cache.get("k"), Some(vec![3]));
    }

    #[test]
    fn errors_are_not_cached() {
        let mut cache: QueryCache<u8> = QueryCache::new();
        let r: Result<u8, &str> = cache.get_or_try_insert_with("k", || Err("down"));
        assert!(r.is_err());
        assert!(cache.get("k").is_none());
        cache.insert("k", 7);
        assert!(cache.invalidate("k"));
        assert!(!cache.invalidate("k"));
        assert_eq!(cache.len(), 0);
    }
}

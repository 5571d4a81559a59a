//! LRU (Least Recently Used) cache implementation
//!
//! A hash index maps each key to a [`Handle`] into the recency list; both
//! structures are only ever mutated together, so they always agree on
//! membership and on which entry sits at each end.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;
use std::mem;
use std::num::NonZeroUsize;

use ahash::RandomState;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::recency::{Entry, Handle, RecencyList};

/// Outcome of [`LruCache::push`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Put<K, V> {
    /// The key was absent and there was room for it
    Inserted,
    /// The key was present; carries the value it replaced
    Updated(V),
    /// The key was absent and the cache was full; carries the evicted entry
    Evicted {
        /// Key of the evicted entry
        key: K,
        /// Value of the evicted entry
        value: V,
    },
}

/// LRU cache with fixed capacity
pub struct LruCache<K, V> {
    map: HashMap<K, Handle, RandomState>,
    order: RecencyList<K, V>,
    capacity: NonZeroUsize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new LRU cache holding at most `capacity` entries
    ///
    /// # Errors
    /// * `Error::InvalidArgument` - `capacity` is zero or negative
    ///
    /// # Example
    /// ```
    /// use lrukv::{Error, LruCache};
    ///
    /// let mut cache = LruCache::new(2)?;
    /// cache.put("a", 1);
    /// assert_eq!(cache.get(&"a"), Some(&1));
    ///
    /// assert!(LruCache::<&str, i32>::new(0).is_err());
    /// # Ok::<(), Error>(())
    /// ```
    pub fn new<C: TryInto<usize>>(capacity: C) -> Result<Self> {
        let capacity = capacity
            .try_into()
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or_else(Error::invalid_capacity)?;

        Ok(Self::with_capacity(capacity))
    }

    /// Create a new LRU cache from an already validated capacity
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        debug!(capacity = capacity.get(), "creating LRU cache");

        Self {
            map: HashMap::with_capacity_and_hasher(capacity.get(), RandomState::new()),
            order: RecencyList::with_capacity(capacity.get()),
            capacity,
        }
    }

    /// Get a value from the cache, marking it most recently used
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = *self.map.get(key)?;
        self.order.move_to_most_recent(handle);
        Some(&self.order.entry(handle).value)
    }

    /// Get a mutable value from the cache, marking it most recently used
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = *self.map.get(key)?;
        self.order.move_to_most_recent(handle);
        Some(&mut self.order.entry_mut(handle).value)
    }

    /// Get a value without touching its recency
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = *self.map.get(key)?;
        Some(&self.order.entry(handle).value)
    }

    /// Check for a key without touching its recency
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Insert a key-value pair, returning the value it replaced
    ///
    /// When the key is new and the cache is full, the least recently used
    /// entry is evicted first.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        match self.push(key, value) {
            Put::Updated(previous) => Some(previous),
            Put::Inserted | Put::Evicted { .. } => None,
        }
    }

    /// Insert a key-value pair and report what happened to the cache
    pub fn push(&mut self, key: K, value: V) -> Put<K, V> {
        if let Some(&handle) = self.map.get(&key) {
            self.order.move_to_most_recent(handle);
            let previous = mem::replace(&mut self.order.entry_mut(handle).value, value);
            return Put::Updated(previous);
        }

        let evicted = if self.order.len() >= self.capacity.get() {
            self.evict()
        } else {
            None
        };

        let handle = self.order.push_most_recent(key.clone(), value);
        self.map.insert(key, handle);
        debug_assert_eq!(self.map.len(), self.order.len());
        debug_assert!(self.order.len() <= self.capacity.get());

        match evicted {
            Some(Entry { key, value }) => Put::Evicted { key, value },
            None => Put::Inserted,
        }
    }

    /// Remove a key from the cache
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.map.remove(key)?;
        Some(self.order.remove(handle).value)
    }

    /// Remove and return the least recently used entry
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        self.evict().map(|entry| (entry.key, entry.value))
    }

    fn evict(&mut self) -> Option<Entry<K, V>> {
        let (_, entry) = self.order.pop_least_recent()?;
        self.map.remove(&entry.key);
        trace!(len = self.order.len(), "evicted least recently used entry");
        Some(entry)
    }
}

impl<K, V> LruCache<K, V> {
    /// Get the current number of entries
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.order.len() == 0
    }

    /// Maximum number of entries, fixed at construction
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Least recently used entry, without touching its recency
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        let entry = self.order.entry(self.order.tail()?);
        Some((&entry.key, &entry.value))
    }

    /// Most recently used entry, without touching its recency
    pub fn peek_mru(&self) -> Option<(&K, &V)> {
        let entry = self.order.entry(self.order.head()?);
        Some((&entry.key, &entry.value))
    }

    /// Iterate from most to least recently used without touching recency
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            order: &self.order,
            front: self.order.head(),
            back: self.order.tail(),
            remaining: self.order.len(),
        }
    }

    /// Keys from most to least recently used
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a LruCache<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over cache entries in recency order, see [`LruCache::iter`]
pub struct Iter<'a, K, V> {
    order: &'a RecencyList<K, V>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let handle = self.front?;
        self.front = self.order.next(handle);
        self.remaining -= 1;

        let entry = self.order.entry(handle);
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let handle = self.back?;
        self.back = self.order.prev(handle);
        self.remaining -= 1;

        let entry = self.order.entry(handle);
        Some((&entry.key, &entry.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

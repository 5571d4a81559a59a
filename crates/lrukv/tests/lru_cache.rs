use std::collections::VecDeque;
use std::num::NonZeroUsize;

use lrukv::{Error, LruCache};

#[test]
fn test_new_rejects_non_positive_capacity() {
    assert!(matches!(
        LruCache::<u32, u32>::new(0),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        LruCache::<u32, u32>::new(-1),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        LruCache::<u32, u32>::new(i64::MIN),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_new_accepts_any_integer_type() {
    assert_eq!(LruCache::<u32, u32>::new(1u8).unwrap().capacity(), 1);
    assert_eq!(LruCache::<u32, u32>::new(7i64).unwrap().capacity(), 7);
    assert_eq!(LruCache::<u32, u32>::new(3usize).unwrap().capacity(), 3);
    assert_eq!(
        LruCache::<u32, u32>::with_capacity(NonZeroUsize::new(5).unwrap()).capacity(),
        5
    );
}

#[test]
fn test_single_slot_cache() {
    let mut cache = LruCache::new(1).unwrap();

    cache.put("a", 1);
    cache.put("b", 2);
    assert_eq!(cache.get(&"a"), None);
    assert_eq!(cache.get(&"b"), Some(&2));

    cache.put("c", 3);
    assert_eq!(cache.get(&"b"), None);
    assert_eq!(cache.get(&"c"), Some(&3));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_capacity_plus_one_evicts_first_inserted() {
    for capacity in 1..=16usize {
        let mut cache = LruCache::new(capacity).unwrap();

        for key in 0..=capacity {
            cache.put(key, key * 10);
        }

        assert_eq!(cache.len(), capacity);
        assert_eq!(cache.get(&0), None);
        for key in 1..=capacity {
            assert_eq!(cache.get(&key), Some(&(key * 10)));
        }
    }
}

#[test]
fn test_get_promotes_recency() {
    let mut cache = LruCache::new(2).unwrap();

    cache.put('A', 1);
    cache.put('B', 2);
    cache.get(&'A');
    cache.put('C', 3);

    assert_eq!(cache.get(&'B'), None);
    assert_eq!(cache.get(&'A'), Some(&1));
    assert_eq!(cache.get(&'C'), Some(&3));
}

#[test]
fn test_update_does_not_grow() {
    let mut cache = LruCache::new(1).unwrap();

    assert_eq!(cache.put('A', 1), None);
    assert_eq!(cache.put('A', 2), Some(1));

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&'A'), Some(&2));
}

#[test]
fn test_miss_changes_nothing() {
    let mut cache = LruCache::new(3).unwrap();

    cache.put(1, "a");
    cache.put(2, "b");
    cache.put(3, "c");
    cache.put(4, "d"); // evicts 1

    let before: Vec<_> = cache.keys().copied().collect();

    assert_eq!(cache.get(&1), None); // evicted
    assert_eq!(cache.get(&42), None); // never inserted
    assert_eq!(cache.remove(&42), None);

    let after: Vec<_> = cache.keys().copied().collect();
    assert_eq!(before, after);
    assert_eq!(cache.len(), 3);
}

#[test]
fn test_observation_is_idempotent() {
    let mut cache = LruCache::new(4).unwrap();
    cache.put(1, 1);
    cache.put(2, 2);

    for _ in 0..10 {
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.capacity(), 4);
        assert!(!cache.is_empty());
    }
}

#[test]
fn test_falsy_values_are_present() {
    let mut cache = LruCache::new(3).unwrap();

    cache.put("zero", 0);
    cache.put("negative", -1);
    assert_eq!(cache.get("zero"), Some(&0));
    assert_eq!(cache.get("negative"), Some(&-1));

    let mut strings = LruCache::new(2).unwrap();
    strings.put(1, String::new());
    assert_eq!(strings.get(&1), Some(&String::new()));

    let mut options: LruCache<u8, Option<u8>> = LruCache::new(2).unwrap();
    options.put(1, None);
    assert_eq!(options.get(&1), Some(&None));
    assert_eq!(options.get(&2), None);
}

#[test]
fn test_end_to_end_scenario() {
    let mut cache = LruCache::new(3).unwrap();

    cache.put(1, "a");
    cache.put(2, "b");
    cache.put(3, "c");
    cache.get(&1);
    cache.put(4, "d");

    assert_eq!(cache.get(&2), None);
    assert_eq!(cache.get(&1), Some(&"a"));
    assert_eq!(cache.get(&3), Some(&"c"));
    assert_eq!(cache.get(&4), Some(&"d"));
}

/// Deterministic xorshift so the operation mix is reproducible.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }
}

/// Naive O(n) model: front is most recently used.
struct Model {
    capacity: usize,
    entries: VecDeque<(u64, u64)>,
}

impl Model {
    fn position(&self, key: u64) -> Option<usize> {
        self.entries.iter().position(|(k, _)| *k == key)
    }

    fn get(&mut self, key: u64) -> Option<u64> {
        let pos = self.position(key)?;
        let entry = self.entries.remove(pos)?;
        self.entries.push_front(entry);
        Some(entry.1)
    }

    fn put(&mut self, key: u64, value: u64) -> Option<u64> {
        let previous = self
            .position(key)
            .and_then(|pos| self.entries.remove(pos))
            .map(|(_, v)| v);
        if previous.is_none() && self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front((key, value));
        previous
    }

    fn remove(&mut self, key: u64) -> Option<u64> {
        let pos = self.position(key)?;
        self.entries.remove(pos).map(|(_, v)| v)
    }
}

#[test]
fn test_matches_naive_model() {
    for capacity in [1usize, 2, 3, 8, 32] {
        let mut rng = XorShift(0x9E37_79B9_7F4A_7C15 ^ capacity as u64);
        let mut cache = LruCache::new(capacity).unwrap();
        let mut model = Model {
            capacity,
            entries: VecDeque::new(),
        };

        for step in 0..5_000u64 {
            let key = rng.next() % (capacity as u64 * 2 + 1);
            match rng.next() % 4 {
                0 | 1 => assert_eq!(cache.put(key, step), model.put(key, step)),
                2 => assert_eq!(cache.get(&key).copied(), model.get(key)),
                _ => assert_eq!(cache.remove(&key), model.remove(key)),
            }

            assert!(cache.len() <= capacity);
            assert_eq!(cache.len(), model.entries.len());
        }

        let actual: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<_> = model.entries.iter().copied().collect();
        assert_eq!(actual, expected);
    }
}

#[test]
fn test_len_never_exceeds_capacity() {
    let mut cache = LruCache::new(5).unwrap();

    for i in 0..1_000u32 {
        cache.put(i % 17, i);
        assert!(cache.len() <= 5);
    }
}

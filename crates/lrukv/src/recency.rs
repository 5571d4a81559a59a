//! Recency order for the LRU cache
//!
//! A doubly-linked list whose nodes live in a single arena (`Vec` of slots).
//! Links are slot indices wrapped in [`Handle`], never references, so the
//! index and the list can both point at an entry without aliasing it.
//! Vacated slots go on a free list and are handed out again before the
//! arena grows.

/// Stable position of an entry in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Handle(usize);

/// Key-value pair owned by the recency list
#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
}

struct Slot<K, V> {
    entry: Option<Entry<K, V>>,
    prev: Option<Handle>,
    next: Option<Handle>,
}

/// Doubly-linked recency list, most recently used at the head
pub(crate) struct RecencyList<K, V> {
    slots: Vec<Slot<K, V>>,
    free: Vec<Handle>,
    head: Option<Handle>,
    tail: Option<Handle>,
    len: usize,
}

impl<K, V> RecencyList<K, V> {
    /// Create an empty list with room for `capacity` entries
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Most recently used entry
    pub(crate) fn head(&self) -> Option<Handle> {
        self.head
    }

    /// Least recently used entry
    pub(crate) fn tail(&self) -> Option<Handle> {
        self.tail
    }

    /// Neighbour one step towards the least recently used end
    pub(crate) fn next(&self, handle: Handle) -> Option<Handle> {
        self.slots[handle.0].next
    }

    /// Neighbour one step towards the most recently used end
    pub(crate) fn prev(&self, handle: Handle) -> Option<Handle> {
        self.slots[handle.0].prev
    }

    pub(crate) fn entry(&self, handle: Handle) -> &Entry<K, V> {
        match &self.slots[handle.0].entry {
            Some(entry) => entry,
            None => unreachable!("handle {:?} refers to a vacant slot", handle),
        }
    }

    pub(crate) fn entry_mut(&mut self, handle: Handle) -> &mut Entry<K, V> {
        match &mut self.slots[handle.0].entry {
            Some(entry) => entry,
            None => unreachable!("handle {:?} refers to a vacant slot", handle),
        }
    }

    /// Insert a new entry at the most recently used end
    pub(crate) fn push_most_recent(&mut self, key: K, value: V) -> Handle {
        let entry = Some(Entry { key, value });

        let handle = match self.free.pop() {
            Some(handle) => {
                self.slots[handle.0].entry = entry;
                handle
            }
            None => {
                let handle = Handle(self.slots.len());
                self.slots.push(Slot {
                    entry,
                    prev: None,
                    next: None,
                });
                handle
            }
        };

        self.link_front(handle);
        self.len += 1;
        handle
    }

    /// Relink an existing entry at the most recently used end
    pub(crate) fn move_to_most_recent(&mut self, handle: Handle) {
        if self.head == Some(handle) {
            return;
        }

        self.unlink(handle);
        self.link_front(handle);
    }

    /// Detach the least recently used entry, if any
    pub(crate) fn pop_least_recent(&mut self) -> Option<(Handle, Entry<K, V>)> {
        let handle = self.tail?;
        Some((handle, self.remove(handle)))
    }

    /// Detach an arbitrary entry and release its slot
    pub(crate) fn remove(&mut self, handle: Handle) -> Entry<K, V> {
        let entry = match self.slots[handle.0].entry.take() {
            Some(entry) => entry,
            None => unreachable!("handle {:?} refers to a vacant slot", handle),
        };

        self.unlink(handle);
        self.free.push(handle);
        self.len -= 1;
        entry
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Number of slots ever allocated in the arena
    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn link_front(&mut self, handle: Handle) {
        let old_head = self.head;

        let slot = &mut self.slots[handle.0];
        slot.prev = None;
        slot.next = old_head;

        match old_head {
            Some(old) => self.slots[old.0].prev = Some(handle),
            None => self.tail = Some(handle),
        }

        self.head = Some(handle);
    }

    fn unlink(&mut self, handle: Handle) {
        let (prev, next) = {
            let slot = &mut self.slots[handle.0];
            (slot.prev.take(), slot.next.take())
        };

        match prev {
            Some(p) => self.slots[p.0].next = next,
            None => self.head = next,
        }

        match next {
            Some(n) => self.slots[n.0].prev = prev,
            None => self.tail = prev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_front_to_back(list: &RecencyList<u32, &str>) -> Vec<u32> {
        let mut keys = Vec::new();
        let mut cursor = list.head();
        while let Some(handle) = cursor {
            keys.push(list.entry(handle).key);
            cursor = list.next(handle);
        }
        keys
    }

    fn keys_back_to_front(list: &RecencyList<u32, &str>) -> Vec<u32> {
        let mut keys = Vec::new();
        let mut cursor = list.tail();
        while let Some(handle) = cursor {
            keys.push(list.entry(handle).key);
            cursor = list.prev(handle);
        }
        keys
    }

    #[test]
    fn test_push_orders_newest_first() {
        let mut list = RecencyList::with_capacity(3);
        list.push_most_recent(1, "a");
        list.push_most_recent(2, "b");
        list.push_most_recent(3, "c");

        assert_eq!(list.len(), 3);
        assert_eq!(keys_front_to_back(&list), vec![3, 2, 1]);
        assert_eq!(keys_back_to_front(&list), vec![1, 2, 3]);
    }

    #[test]
    fn test_move_tail_to_front() {
        let mut list = RecencyList::with_capacity(3);
        let first = list.push_most_recent(1, "a");
        list.push_most_recent(2, "b");
        list.push_most_recent(3, "c");

        list.move_to_most_recent(first);

        assert_eq!(keys_front_to_back(&list), vec![1, 3, 2]);
        assert_eq!(keys_back_to_front(&list), vec![2, 3, 1]);
    }

    #[test]
    fn test_move_head_is_noop() {
        let mut list = RecencyList::with_capacity(2);
        list.push_most_recent(1, "a");
        let second = list.push_most_recent(2, "b");

        list.move_to_most_recent(second);

        assert_eq!(keys_front_to_back(&list), vec![2, 1]);
    }

    #[test]
    fn test_remove_middle() {
        let mut list = RecencyList::with_capacity(3);
        list.push_most_recent(1, "a");
        let middle = list.push_most_recent(2, "b");
        list.push_most_recent(3, "c");

        let entry = list.remove(middle);

        assert_eq!(entry.key, 2);
        assert_eq!(entry.value, "b");
        assert_eq!(list.len(), 2);
        assert_eq!(keys_front_to_back(&list), vec![3, 1]);
        assert_eq!(keys_back_to_front(&list), vec![1, 3]);
    }

    #[test]
    fn test_pop_least_recent() {
        let mut list = RecencyList::with_capacity(2);
        list.push_most_recent(1, "a");
        list.push_most_recent(2, "b");

        let (_, entry) = list.pop_least_recent().unwrap();
        assert_eq!(entry.key, 1);
        let (_, entry) = list.pop_least_recent().unwrap();
        assert_eq!(entry.key, 2);

        assert!(list.pop_least_recent().is_none());
        assert_eq!(list.len(), 0);
        assert!(list.head().is_none());
        assert!(list.tail().is_none());
    }

    #[test]
    fn test_vacated_slots_are_reused() {
        let mut list = RecencyList::with_capacity(2);
        list.push_most_recent(1, "a");
        list.push_most_recent(2, "b");

        for key in 3..100 {
            list.pop_least_recent();
            list.push_most_recent(key, "x");
        }

        assert_eq!(list.slot_count(), 2);
        assert_eq!(keys_front_to_back(&list), vec![99, 98]);
    }

    #[test]
    fn test_clear() {
        let mut list = RecencyList::with_capacity(2);
        list.push_most_recent(1, "a");
        list.push_most_recent(2, "b");
        list.clear();

        assert_eq!(list.len(), 0);
        assert_eq!(list.slot_count(), 0);
        assert!(list.head().is_none());

        list.push_most_recent(3, "c");
        assert_eq!(keys_front_to_back(&list), vec![3]);
    }
}

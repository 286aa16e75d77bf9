//! Binary min-heap with external position tracking
//!
//! Items are ordered by `(frequency, sequence)`. Each item owns a stable
//! slot in a side arena that records the item's current heap position, so
//! an arbitrary item can be located in O(1) and repaired in O(log n).
//! Every swap rewrites both slots' positions; `swap` is the only place the
//! heap array is reordered.

/// Priority entry stored densely in the heap array
#[derive(Debug, Clone, Copy)]
struct HeapItem {
    frequency: u64,
    sequence: u64,
    slot: usize,
}

impl HeapItem {
    fn rank(&self) -> (u64, u64) {
        (self.frequency, self.sequence)
    }
}

/// Arena record: the key and where its item currently sits in the heap
struct Slot<K> {
    key: K,
    position: usize,
}

/// Item removed from the heap
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Popped<K> {
    pub key: K,
    pub frequency: u64,
    pub sequence: u64,
}

pub(crate) struct FrequencyHeap<K> {
    heap: Vec<HeapItem>,
    slots: Vec<Option<Slot<K>>>,
    free_list: Vec<usize>,
}

impl<K> FrequencyHeap<K> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Add an item and return its stable slot
    pub fn push(&mut self, key: K, frequency: u64, sequence: u64) -> usize {
        let position = self.heap.len();
        let slot = match self.free_list.pop() {
            Some(slot) => {
                self.slots[slot] = Some(Slot { key, position });
                slot
            }
            None => {
                self.slots.push(Some(Slot { key, position }));
                self.slots.len() - 1
            }
        };

        self.heap.push(HeapItem {
            frequency,
            sequence,
            slot,
        });
        self.fix(position);
        slot
    }

    /// Key at the root
    pub fn peek(&self) -> Option<&K> {
        let root = self.heap.first()?;
        self.slots[root.slot].as_ref().map(|s| &s.key)
    }

    /// Remove the minimum item
    pub fn pop(&mut self) -> Option<Popped<K>> {
        let root = self.heap.first()?.slot;
        self.remove(root)
    }

    /// Remove the item owning `slot`, wherever it sits in the heap
    pub fn remove(&mut self, slot: usize) -> Option<Popped<K>> {
        let position = self.slots.get(slot)?.as_ref()?.position;
        let last = self.heap.len() - 1;

        self.swap(position, last);
        let item = self.heap.pop()?;
        let record = self.slots[slot].take()?;
        self.free_list.push(slot);

        if position < self.heap.len() {
            self.fix(position);
        }

        Some(Popped {
            key: record.key,
            frequency: item.frequency,
            sequence: item.sequence,
        })
    }

    /// Bump the frequency of `slot` by one, saturating, and restore order
    pub fn increment(&mut self, slot: usize) -> Option<u64> {
        let position = self.slots.get(slot)?.as_ref()?.position;
        let item = &mut self.heap[position];
        item.frequency = item.frequency.saturating_add(1);
        let frequency = item.frequency;
        self.fix(position);
        Some(frequency)
    }

    pub fn frequency(&self, slot: usize) -> Option<u64> {
        let position = self.slots.get(slot)?.as_ref()?.position;
        Some(self.heap[position].frequency)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.slots.clear();
        self.free_list.clear();
    }

    /// Restore heap order around `position` after its rank changed in
    /// either direction.
    pub fn fix(&mut self, position: usize) {
        if position >= self.heap.len() {
            return;
        }
        let settled = self.sift_up(position);
        if settled == position {
            self.sift_down(position);
        }
    }

    fn less(&self, a: usize, b: usize) -> bool {
        self.heap[a].rank() < self.heap[b].rank()
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        for position in [a, b] {
            let slot = self.heap[position].slot;
            if let Some(record) = &mut self.slots[slot] {
                record.position = position;
            }
        }
    }

    fn sift_up(&mut self, mut position: usize) -> usize {
        while position > 0 {
            let parent = (position - 1) / 2;
            if !self.less(position, parent) {
                break;
            }
            self.swap(position, parent);
            position = parent;
        }
        position
    }

    fn sift_down(&mut self, mut position: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * position + 1;
            let right = left + 1;
            let mut smallest = position;

            if left < len && self.less(left, smallest) {
                smallest = left;
            }
            if right < len && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == position {
                return;
            }
            self.swap(position, smallest);
            position = smallest;
        }
    }

    /// Panic unless heap order and every slot's recorded position hold.
    #[cfg(test)]
    pub fn assert_consistent(&self) {
        for (position, item) in self.heap.iter().enumerate() {
            let record = self.slots[item.slot]
                .as_ref()
                .expect("heap item points at an empty slot");
            assert_eq!(record.position, position, "stale position for slot {}", item.slot);
            if position > 0 {
                let parent = (position - 1) / 2;
                assert!(
                    self.heap[parent].rank() <= item.rank(),
                    "heap order broken at {}",
                    position
                );
            }
        }
        let live = self.slots.iter().filter(|s| s.is_some()).count();
        assert_eq!(live, self.heap.len());
    }
}

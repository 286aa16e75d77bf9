//! Cache entry: a value cell plus the policy handle for its key

use crate::policy::SlotId;

/// One cached key/value pair.
///
/// Owned by the cache table. `handle` points at the policy's private
/// record for the same key and is only meaningful while the key is tracked.
#[derive(Debug, Clone)]
pub(crate) struct Entry<K, V> {
    pub key: K,
    pub value: V,
    pub handle: SlotId,
}

impl<K, V> Entry<K, V> {
    pub fn new(key: K, value: V, handle: SlotId) -> Self {
        Self { key, value, handle }
    }

    /// Replace the value, returning the old one
    pub fn replace(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_replace() {
        let mut entry = Entry::new("k", 1, SlotId(0));
        assert_eq!(entry.replace(2), 1);
        assert_eq!(entry.value, 2);
        assert_eq!(entry.key, "k");
        assert_eq!(entry.handle, SlotId(0));
    }
}

use std::mem;

/// A slab of values addressed by reusable keys.
///
/// Keys stay stable for as long as their value is stored. Once a value is
/// removed its key goes back on the free list and the next insertion
/// reuses it.
pub(crate) struct Slab<T> {
    /// Storage; `None` marks a vacant slot.
    entries: Vec<Option<T>>,
    /// Vacant keys, reused last-in first-out.
    free: Vec<usize>,
    /// Number of occupied slots.
    len: usize,
}

impl<T> Slab<T> {
    /// Creates an empty slab with room for `capacity` values.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Returns the key the next [`insert`](Self::insert) will use.
    pub(crate) fn vacant_key(&self) -> usize {
        self.free.last().copied().unwrap_or(self.entries.len())
    }

    /// Stores `value` and returns its key.
    pub(crate) fn insert(&mut self, value: T) -> usize {
        let key = match self.free.pop() {
            Some(key) => {
                self.entries[key] = Some(value);
                key
            }
            None => {
                self.entries.push(Some(value));
                self.entries.len() - 1
            }
        };

        self.len += 1;
        key
    }

    /// Removes and returns the value stored under `key`, if any.
    pub(crate) fn remove(&mut self, key: usize) -> Option<T> {
        let value = self.entries.get_mut(key)?.take()?;

        self.free.push(key);
        self.len -= 1;

        Some(value)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub(crate) fn get_mut(&mut self, key: usize) -> Option<&mut T> {
        self.entries.get_mut(key)?.as_mut()
    }

    /// Removes every value and returns them, leaving the slab empty.
    ///
    /// All previously issued keys become vacant.
    pub(crate) fn drain(&mut self) -> Vec<T> {
        self.free.clear();
        self.len = 0;

        mem::take(&mut self.entries).into_iter().flatten().collect()
    }

    /// Number of stored values.
    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

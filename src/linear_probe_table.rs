//! LinearProbeTable: single-key open-addressing table with linear probing.
//!
//! This is the second level of [`DoubleKeyTable`](crate::DoubleKeyTable) but
//! is usable on its own. Placement is first-fit from the key's home slot,
//! growth follows a [`TableSizes`] schedule, and removal re-seats the rest
//! of the cluster so no entry becomes unreachable.

use crate::error::{Result, TableError};
use crate::hashing::{PolynomialHash, ProbeHash};
use crate::sizes::TableSizes;
use core::borrow::Borrow;
use core::mem;

/// Whether a probe may stop at an empty slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Mode {
    /// Stop only on a matching key; an empty slot or exhaustion is `NotFound`.
    Lookup,
    /// Stop on a matching key or the first empty slot; exhaustion is
    /// `TableFull`.
    Insert,
}

pub(crate) fn empty_slots<T>(capacity: usize) -> Vec<Option<T>> {
    core::iter::repeat_with(|| None).take(capacity).collect()
}

#[derive(Clone, Debug)]
pub struct LinearProbeTable<K, V, H = PolynomialHash> {
    hasher: H,
    sizes: TableSizes,
    size_index: usize,
    slots: Vec<Option<(K, V)>>,
    count: usize,
}

impl<K, V> LinearProbeTable<K, V>
where
    K: Eq,
    PolynomialHash: ProbeHash<K>,
{
    pub fn new() -> Self {
        Self::with_sizes_and_hasher(TableSizes::default(), PolynomialHash)
    }
}

impl<K, V> Default for LinearProbeTable<K, V>
where
    K: Eq,
    PolynomialHash: ProbeHash<K>,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the entries of a [`LinearProbeTable`] in slot order.
pub struct Iter<'a, K, V> {
    it: core::slice::Iter<'a, Option<(K, V)>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.find_map(|s| s.as_ref().map(|(k, v)| (k, v)))
    }
}

impl<K, V, H> LinearProbeTable<K, V, H>
where
    K: Eq,
    H: ProbeHash<K>,
{
    pub fn with_hasher(hasher: H) -> Self {
        Self::with_sizes_and_hasher(TableSizes::default(), hasher)
    }

    pub fn with_sizes_and_hasher(sizes: TableSizes, hasher: H) -> Self {
        let slots = empty_slots(sizes.first());
        Self {
            hasher,
            sizes,
            size_index: 0,
            slots,
            count: 0,
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.count
    }
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of slots at the current point of the schedule.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn home<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        H: ProbeHash<Q>,
    {
        ProbeHash::<Q>::hash(&self.hasher, key, self.capacity()) % self.capacity()
    }

    /// Linear probe from the key's home slot, visiting each slot at most once.
    pub(crate) fn probe<Q>(&self, key: &Q, mode: Mode) -> Result<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: ProbeHash<Q>,
    {
        let capacity = self.capacity();
        let mut pos = self.home(key);
        for _ in 0..capacity {
            match &self.slots[pos] {
                None if mode == Mode::Insert => return Ok(pos),
                None => return Err(TableError::NotFound),
                Some((k, _)) if k.borrow() == key => return Ok(pos),
                Some(_) => pos = (pos + 1) % capacity,
            }
        }
        match mode {
            Mode::Insert => Err(TableError::TableFull),
            Mode::Lookup => Err(TableError::NotFound),
        }
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: ProbeHash<Q>,
    {
        self.probe(key, Mode::Lookup).is_ok()
    }

    pub fn get<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: ProbeHash<Q>,
    {
        let pos = self.probe(key, Mode::Lookup)?;
        self.value_at(pos).ok_or(TableError::NotFound)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: ProbeHash<Q>,
    {
        let pos = self.probe(key, Mode::Lookup)?;
        self.slots[pos]
            .as_mut()
            .map(|(_, v)| v)
            .ok_or(TableError::NotFound)
    }

    pub(crate) fn value_at(&self, pos: usize) -> Option<&V> {
        self.slots.get(pos)?.as_ref().map(|(_, v)| v)
    }

    /// Insert or overwrite. Returns the previous value for an existing key.
    ///
    /// A new key that pushes the table past half full grows it to the next
    /// scheduled capacity; at the end of the schedule the table keeps
    /// filling until a probe finds no free slot, which is `TableFull`.
    pub fn set(&mut self, key: K, value: V) -> Result<Option<V>> {
        let pos = self.probe(&key, Mode::Insert)?;
        Ok(self.set_at(pos, key, value))
    }

    /// Store at a position returned by an insert-mode probe for `key`.
    pub(crate) fn set_at(&mut self, pos: usize, key: K, value: V) -> Option<V> {
        let previous = self.slots[pos].replace((key, value)).map(|(_, v)| v);
        if previous.is_none() {
            self.count += 1;
            if self.count > self.capacity() / 2 {
                self.grow();
            }
        }
        previous
    }

    /// Remove `key`, then re-seat every entry in the cluster that followed it.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: ProbeHash<Q>,
    {
        let pos = self.probe(key, Mode::Lookup)?;
        Ok(self.remove_at(pos))
    }

    /// Remove the entry at a position returned by a lookup-mode probe.
    pub(crate) fn remove_at(&mut self, pos: usize) -> V {
        let (_k, value) = self.slots[pos]
            .take()
            .expect("lookup probe must stop on an occupied slot");
        self.count -= 1;
        self.repair_cluster(pos);
        value
    }

    fn repair_cluster(&mut self, vacated: usize) {
        let capacity = self.capacity();
        let mut pos = (vacated + 1) % capacity;
        while let Some((k, v)) = self.slots[pos].take() {
            let to = self.reseat(k, v);
            if to != pos {
                tracing::trace!(from = pos, to, "re-seated entry after removal");
            }
            pos = (pos + 1) % capacity;
        }
    }

    // Place an entry that is known not to be in the table.
    fn reseat(&mut self, key: K, value: V) -> usize {
        let pos = self
            .probe(&key, Mode::Insert)
            .expect("re-seating an entry cannot exhaust a table that already held it");
        self.slots[pos] = Some((key, value));
        pos
    }

    fn grow(&mut self) {
        let Some(capacity) = self.sizes.get(self.size_index + 1) else {
            return;
        };
        tracing::debug!(
            from = self.capacity(),
            to = capacity,
            entries = self.count,
            "growing linear probe table"
        );
        self.size_index += 1;
        let old = mem::replace(&mut self.slots, empty_slots(capacity));
        for (k, v) in old.into_iter().flatten() {
            self.reseat(k, v);
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.slots.iter(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    #[cfg(test)]
    pub(crate) fn position_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|(k, _)| k.borrow() == key))
    }
}

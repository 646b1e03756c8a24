//! DoubleKeyTable: two-level open-addressing table keyed by `(K1, K2)`.
//!
//! The top level is a slot array probed linearly by `K1`. Each occupied
//! slot stores its first key and a handle into an arena of
//! [`LinearProbeTable`]s that map `K2` to `V`. Slots own their nested table
//! exclusively; the handle indirection lets resize and cluster repair move
//! `(K1, handle)` pairs around without touching the nested tables.

use crate::error::{Result, TableError};
use crate::hashing::{PolynomialHash, ProbeHash};
use crate::linear_probe_table::{empty_slots, LinearProbeTable, Mode};
use crate::sizes::TableSizes;
use core::borrow::Borrow;
use core::mem;
use slotmap::{DefaultKey, SlotMap};

#[derive(Clone, Debug)]
struct Slot<K1> {
    key: K1,
    table: DefaultKey,
}

/// Outcome of probing the top level for a first key.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Probe {
    Occupied(usize),
    /// Only produced in insert mode.
    Vacant(usize),
}

#[derive(Clone, Debug)]
pub struct DoubleKeyTable<K1, K2, V, H1 = PolynomialHash, H2 = PolynomialHash> {
    hasher: H1,
    nested_hasher: H2,
    sizes: TableSizes,
    nested_sizes: TableSizes,
    size_index: usize,
    slots: Vec<Option<Slot<K1>>>,
    tables: SlotMap<DefaultKey, LinearProbeTable<K2, V, H2>>,
    count: usize,
}

impl<K1, K2, V> DoubleKeyTable<K1, K2, V>
where
    K1: Eq,
    K2: Eq,
    PolynomialHash: ProbeHash<K1> + ProbeHash<K2>,
{
    pub fn new() -> Self {
        Self::with_sizes(TableSizes::default(), TableSizes::default())
    }

    /// Explicit capacity schedules for the top level and for every nested
    /// table.
    pub fn with_sizes(sizes: TableSizes, nested_sizes: TableSizes) -> Self {
        Self::with_sizes_and_hashers(sizes, nested_sizes, PolynomialHash, PolynomialHash)
    }
}

impl<K1, K2, V> Default for DoubleKeyTable<K1, K2, V>
where
    K1: Eq,
    K2: Eq,
    PolynomialHash: ProbeHash<K1> + ProbeHash<K2>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K1, K2, V, H1, H2> DoubleKeyTable<K1, K2, V, H1, H2>
where
    K1: Eq,
    K2: Eq,
    H1: ProbeHash<K1>,
    H2: ProbeHash<K2> + Clone,
{
    pub fn with_hashers(hasher: H1, nested_hasher: H2) -> Self {
        Self::with_sizes_and_hashers(
            TableSizes::default(),
            TableSizes::default(),
            hasher,
            nested_hasher,
        )
    }

    pub fn with_sizes_and_hashers(
        sizes: TableSizes,
        nested_sizes: TableSizes,
        hasher: H1,
        nested_hasher: H2,
    ) -> Self {
        let slots = empty_slots(sizes.first());
        Self {
            hasher,
            nested_hasher,
            sizes,
            nested_sizes,
            size_index: 0,
            slots,
            tables: SlotMap::with_key(),
            count: 0,
        }
    }

    /// Number of distinct first keys.
    pub fn len(&self) -> usize {
        self.count
    }
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of top-level slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn nested(&self, top: usize) -> &LinearProbeTable<K2, V, H2> {
        let slot = self.slots[top]
            .as_ref()
            .expect("probe must stop on an occupied slot");
        &self.tables[slot.table]
    }

    fn nested_mut(&mut self, top: usize) -> &mut LinearProbeTable<K2, V, H2> {
        let slot = self.slots[top]
            .as_ref()
            .expect("probe must stop on an occupied slot");
        &mut self.tables[slot.table]
    }

    /// Linear probe over the top level from the first key's home slot.
    fn probe<Q1>(&self, key1: &Q1, mode: Mode) -> Result<Probe>
    where
        K1: Borrow<Q1>,
        Q1: ?Sized + Eq,
        H1: ProbeHash<Q1>,
    {
        let capacity = self.capacity();
        let mut pos = ProbeHash::<Q1>::hash(&self.hasher, key1, capacity) % capacity;
        for _ in 0..capacity {
            match &self.slots[pos] {
                None if mode == Mode::Insert => return Ok(Probe::Vacant(pos)),
                None => return Err(TableError::NotFound),
                Some(slot) if slot.key.borrow() == key1 => return Ok(Probe::Occupied(pos)),
                Some(_) => pos = (pos + 1) % capacity,
            }
        }
        match mode {
            Mode::Insert => Err(TableError::TableFull),
            Mode::Lookup => Err(TableError::NotFound),
        }
    }

    fn locate_top<Q1>(&self, key1: &Q1) -> Result<usize>
    where
        K1: Borrow<Q1>,
        Q1: ?Sized + Eq,
        H1: ProbeHash<Q1>,
    {
        match self.probe(key1, Mode::Lookup)? {
            Probe::Occupied(top) => Ok(top),
            Probe::Vacant(_) => Err(TableError::NotFound),
        }
    }

    /// Top-level and nested positions of a present pair.
    fn locate<Q1, Q2>(&self, key1: &Q1, key2: &Q2) -> Result<(usize, usize)>
    where
        K1: Borrow<Q1>,
        K2: Borrow<Q2>,
        Q1: ?Sized + Eq,
        Q2: ?Sized + Eq,
        H1: ProbeHash<Q1>,
        H2: ProbeHash<Q2>,
    {
        let top = self.locate_top(key1)?;
        let nested = self.nested(top).probe(key2, Mode::Lookup)?;
        Ok((top, nested))
    }

    /// Insert-mode probe for a pair. A vacant top-level slot gets a fresh
    /// nested table before the second key is probed; if that probe fails the
    /// fresh table is discarded again so the failure leaves no trace.
    fn locate_for_insert(&mut self, key1: K1, key2: &K2) -> Result<(usize, usize)> {
        let (top, created) = match self.probe(&key1, Mode::Insert)? {
            Probe::Occupied(top) => (top, false),
            Probe::Vacant(top) => {
                let table = LinearProbeTable::with_sizes_and_hasher(
                    self.nested_sizes.clone(),
                    self.nested_hasher.clone(),
                );
                let handle = self.tables.insert(table);
                self.slots[top] = Some(Slot { key: key1, table: handle });
                tracing::debug!(slot = top, "created nested table");
                (top, true)
            }
        };
        match self.nested(top).probe(key2, Mode::Insert) {
            Ok(nested) => Ok((top, nested)),
            Err(e) => {
                if created {
                    if let Some(slot) = self.slots[top].take() {
                        self.tables.remove(slot.table);
                    }
                }
                Err(e)
            }
        }
    }

    pub fn contains<Q1, Q2>(&self, key1: &Q1, key2: &Q2) -> bool
    where
        K1: Borrow<Q1>,
        K2: Borrow<Q2>,
        Q1: ?Sized + Eq,
        Q2: ?Sized + Eq,
        H1: ProbeHash<Q1>,
        H2: ProbeHash<Q2>,
    {
        self.locate(key1, key2).is_ok()
    }

    /// Whether any pair with this first key is present.
    pub fn contains_key1<Q1>(&self, key1: &Q1) -> bool
    where
        K1: Borrow<Q1>,
        Q1: ?Sized + Eq,
        H1: ProbeHash<Q1>,
    {
        self.locate_top(key1).is_ok()
    }

    pub fn get<Q1, Q2>(&self, key1: &Q1, key2: &Q2) -> Result<&V>
    where
        K1: Borrow<Q1>,
        K2: Borrow<Q2>,
        Q1: ?Sized + Eq,
        Q2: ?Sized + Eq,
        H1: ProbeHash<Q1>,
        H2: ProbeHash<Q2>,
    {
        let (top, nested) = self.locate(key1, key2)?;
        self.nested(top)
            .value_at(nested)
            .ok_or(TableError::NotFound)
    }

    pub fn get_mut<Q1, Q2>(&mut self, key1: &Q1, key2: &Q2) -> Result<&mut V>
    where
        K1: Borrow<Q1>,
        K2: Borrow<Q2>,
        Q1: ?Sized + Eq,
        Q2: ?Sized + Eq,
        H1: ProbeHash<Q1>,
        H2: ProbeHash<Q2>,
    {
        let top = self.locate_top(key1)?;
        self.nested_mut(top).get_mut(key2)
    }

    /// Insert or overwrite the value for `(key1, key2)`, returning the
    /// previous value if the pair was present.
    ///
    /// When a new first key pushes the top level past half full, the table
    /// grows to the next scheduled capacity before returning. `TableFull`
    /// from either level is returned with the table unchanged.
    pub fn set(&mut self, key1: K1, key2: K2, value: V) -> Result<Option<V>> {
        let (top, nested) = self.locate_for_insert(key1, &key2)?;
        let table = self.nested_mut(top);
        let was_empty = table.is_empty();
        let previous = table.set_at(nested, key2, value);
        if was_empty {
            self.count += 1;
            if self.count > self.capacity() / 2 {
                self.grow();
            }
        }
        Ok(previous)
    }

    /// Remove `(key1, key2)` and return its value.
    ///
    /// Removing the last pair under `key1` frees its top-level slot and
    /// re-seats the cluster that followed it.
    pub fn remove<Q1, Q2>(&mut self, key1: &Q1, key2: &Q2) -> Result<V>
    where
        K1: Borrow<Q1>,
        K2: Borrow<Q2>,
        Q1: ?Sized + Eq,
        Q2: ?Sized + Eq,
        H1: ProbeHash<Q1>,
        H2: ProbeHash<Q2>,
    {
        let (top, nested) = self.locate(key1, key2)?;
        let table = self.nested_mut(top);
        let value = table.remove_at(nested);
        if table.is_empty() {
            self.vacate(top);
            self.repair_cluster(top);
        }
        Ok(value)
    }

    fn vacate(&mut self, top: usize) {
        let slot = self.slots[top]
            .take()
            .expect("vacated slot must be occupied");
        self.tables.remove(slot.table);
        self.count -= 1;
        tracing::debug!(slot = top, "dropped empty nested table");
    }

    fn repair_cluster(&mut self, vacated: usize) {
        let capacity = self.capacity();
        let mut pos = (vacated + 1) % capacity;
        while let Some(slot) = self.slots[pos].take() {
            let to = self.reseat(slot);
            if to != pos {
                tracing::trace!(from = pos, to, "re-seated first key after removal");
            }
            pos = (pos + 1) % capacity;
        }
    }

    // Insert-mode probe with no second key: reserve a top-level slot for an
    // entry that is currently not in the array.
    fn reseat(&mut self, slot: Slot<K1>) -> usize {
        match self.probe(&slot.key, Mode::Insert) {
            Ok(Probe::Vacant(pos)) => {
                self.slots[pos] = Some(slot);
                pos
            }
            Ok(Probe::Occupied(pos)) => {
                panic!("first key seated twice (already at slot {pos})")
            }
            Err(e) => panic!("re-seating a first key failed: {e}"),
        }
    }

    fn grow(&mut self) {
        let Some(capacity) = self.sizes.get(self.size_index + 1) else {
            return;
        };
        tracing::debug!(
            from = self.capacity(),
            to = capacity,
            first_keys = self.count,
            "growing double key table"
        );
        self.size_index += 1;
        let old = mem::replace(&mut self.slots, empty_slots(capacity));
        self.count = 0;
        for slot in old.into_iter().flatten() {
            self.reseat(slot);
            self.count += 1;
        }
    }

    /// First keys in slot order.
    pub fn keys(&self) -> impl Iterator<Item = &K1> {
        self.slots.iter().flatten().map(|slot| &slot.key)
    }

    /// Second keys stored under `key1`, in the nested table's slot order.
    pub fn keys_of<Q1>(&self, key1: &Q1) -> Result<impl Iterator<Item = &K2>>
    where
        K1: Borrow<Q1>,
        Q1: ?Sized + Eq,
        H1: ProbeHash<Q1>,
    {
        let top = self.locate_top(key1)?;
        Ok(self.nested(top).keys())
    }

    /// Every value, grouped by first key in slot order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.slots
            .iter()
            .flatten()
            .flat_map(move |slot| self.tables[slot.table].values())
    }

    /// Values stored under `key1` only.
    pub fn values_of<Q1>(&self, key1: &Q1) -> Result<impl Iterator<Item = &V>>
    where
        K1: Borrow<Q1>,
        Q1: ?Sized + Eq,
        H1: ProbeHash<Q1>,
    {
        let top = self.locate_top(key1)?;
        Ok(self.nested(top).values())
    }

    /// Every `(k1, k2, v)` triple, in the same order as [`values`](Self::values).
    pub fn iter(&self) -> impl Iterator<Item = (&K1, &K2, &V)> {
        self.slots.iter().flatten().flat_map(move |slot| {
            self.tables[slot.table]
                .iter()
                .map(move |(k2, v)| (&slot.key, k2, v))
        })
    }

    #[cfg(test)]
    pub(crate) fn slot_of<Q1>(&self, key1: &Q1) -> Option<usize>
    where
        K1: Borrow<Q1>,
        Q1: ?Sized + Eq,
    {
        self.slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|s| s.key.borrow() == key1))
    }

    /// Structural invariants, checked by the property tests after each step.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let occupied = self.slots.iter().flatten().count();
        assert_eq!(occupied, self.count, "count tracks occupied slots");
        assert_eq!(self.tables.len(), self.count, "one nested table per slot");
        if self.sizes.get(self.size_index + 1).is_some() {
            assert!(
                self.count <= self.capacity() / 2,
                "load factor above one half with schedule left"
            );
        }
        for (pos, slot) in self.slots.iter().enumerate() {
            let Some(slot) = slot else { continue };
            assert!(!self.tables[slot.table].is_empty(), "empty nested table at {pos}");
            assert_eq!(
                self.probe(&slot.key, Mode::Lookup),
                Ok(Probe::Occupied(pos)),
                "first key unreachable from its hash"
            );
            let table = &self.tables[slot.table];
            for k2 in table.keys() {
                assert!(table.probe(k2, Mode::Lookup).is_ok(), "second key unreachable");
            }
        }
    }
}

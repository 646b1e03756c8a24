//! GroupIndex: records grouped by a primary attribute.
//!
//! A thin client of [`DoubleKeyTable`] keyed by `(group, id)`. Asking for an
//! absent group yields an empty list rather than an error.

use crate::double_key_table::DoubleKeyTable;
use crate::error::Result;
use crate::hashing::{ModuloHash, PolynomialHash, ProbeHash};
use crate::sizes::TableSizes;

/// A record that belongs to exactly one group and is unique within it.
pub trait Grouped {
    type Group: Eq;
    type Id: Eq;

    fn group(&self) -> Self::Group;
    fn id(&self) -> Self::Id;
}

pub struct GroupIndex<R, H1 = ModuloHash, H2 = PolynomialHash>
where
    R: Grouped,
{
    table: DoubleKeyTable<R::Group, R::Id, R, H1, H2>,
    records: usize,
}

impl<R> GroupIndex<R>
where
    R: Grouped,
    ModuloHash: ProbeHash<R::Group>,
    PolynomialHash: ProbeHash<R::Id>,
{
    /// Integer groups hashed by `group mod capacity`, string-like ids by the
    /// polynomial hash.
    pub fn new() -> Self {
        Self::with_hashers(ModuloHash, PolynomialHash)
    }
}

impl<R> Default for GroupIndex<R>
where
    R: Grouped,
    ModuloHash: ProbeHash<R::Group>,
    PolynomialHash: ProbeHash<R::Id>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, H1, H2> GroupIndex<R, H1, H2>
where
    R: Grouped,
    H1: ProbeHash<R::Group>,
    H2: ProbeHash<R::Id> + Clone,
{
    pub fn with_hashers(hasher: H1, id_hasher: H2) -> Self {
        Self::with_sizes_and_hashers(
            TableSizes::default(),
            TableSizes::default(),
            hasher,
            id_hasher,
        )
    }

    pub fn with_sizes_and_hashers(
        sizes: TableSizes,
        id_sizes: TableSizes,
        hasher: H1,
        id_hasher: H2,
    ) -> Self {
        Self {
            table: DoubleKeyTable::with_sizes_and_hashers(sizes, id_sizes, hasher, id_hasher),
            records: 0,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records
    }
    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Number of non-empty groups.
    pub fn group_count(&self) -> usize {
        self.table.len()
    }

    /// Index a record, replacing (and returning) one with the same group and id.
    pub fn add(&mut self, record: R) -> Result<Option<R>> {
        let previous = self.table.set(record.group(), record.id(), record)?;
        if previous.is_none() {
            self.records += 1;
        }
        Ok(previous)
    }

    pub fn remove(&mut self, group: &R::Group, id: &R::Id) -> Result<R> {
        let record = self.table.remove(group, id)?;
        self.records -= 1;
        Ok(record)
    }

    /// Replace the record at `(group, id)` with `record`, which may live in
    /// a different group. Returns the old record. If the new record cannot
    /// be placed the old one is put back.
    pub fn edit(&mut self, group: &R::Group, id: &R::Id, record: R) -> Result<R> {
        let old = self.remove(group, id)?;
        match self.add(record) {
            Ok(_) => Ok(old),
            Err(e) => {
                self.add(old)?;
                Err(e)
            }
        }
    }

    pub fn get(&self, group: &R::Group, id: &R::Id) -> Result<&R> {
        self.table.get(group, id)
    }

    pub fn contains(&self, group: &R::Group, id: &R::Id) -> bool {
        self.table.contains(group, id)
    }

    /// Records in `group`, or an empty list when the group has none.
    pub fn in_group(&self, group: &R::Group) -> Vec<&R> {
        match self.table.values_of(group) {
            Ok(records) => records.collect(),
            Err(_) => Vec::new(),
        }
    }

    /// One list per non-empty group, groups in table slot order.
    pub fn groups(&self) -> Vec<Vec<&R>> {
        self.table.keys().map(|g| self.in_group(g)).collect()
    }

    /// Group keys in table slot order.
    pub fn group_keys(&self) -> impl Iterator<Item = &R::Group> {
        self.table.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;
    use std::collections::BTreeSet;

    #[derive(Clone, Debug, PartialEq)]
    struct Machine {
        name: &'static str,
        difficulty: u32,
        value: u32,
        risk: f32,
    }

    impl Grouped for Machine {
        type Group = u32;
        type Id = &'static str;

        fn group(&self) -> u32 {
            self.difficulty
        }
        fn id(&self) -> &'static str {
            self.name
        }
    }

    fn m(name: &'static str, difficulty: u32, value: u32, risk: f32) -> Machine {
        Machine {
            name,
            difficulty,
            value,
            risk,
        }
    }

    fn names(records: &[&Machine]) -> BTreeSet<&'static str> {
        records.iter().map(|r| r.name).collect()
    }

    #[test]
    fn groups_records_by_difficulty() {
        let mut idx: GroupIndex<Machine> = GroupIndex::new();
        for r in [
            m("c1", 4, 4, 0.1),
            m("c2", 3, 2, 0.2),
            m("c3", 3, 5, 0.3),
            m("c6", 5, 3, 0.6),
            m("c7", 5, 3, 0.7),
        ] {
            assert_eq!(idx.add(r), Ok(None));
        }
        assert_eq!(names(&idx.in_group(&3)), BTreeSet::from(["c2", "c3"]));
        assert_eq!(names(&idx.in_group(&4)), BTreeSet::from(["c1"]));
        assert!(idx.in_group(&7).is_empty());

        for r in [
            m("c4", 4, 3, 0.4),
            m("c5", 3, 4, 0.5),
            m("c8", 6, 4, 0.8),
            m("c9", 6, 4, 0.9),
        ] {
            idx.add(r).unwrap();
        }
        let groups = idx.groups();
        assert_eq!(groups.len(), 4);
        let as_sets: BTreeSet<BTreeSet<&str>> = groups.iter().map(|g| names(g)).collect();
        assert_eq!(
            as_sets,
            BTreeSet::from([
                BTreeSet::from(["c2", "c3", "c5"]),
                BTreeSet::from(["c1", "c4"]),
                BTreeSet::from(["c6", "c7"]),
                BTreeSet::from(["c8", "c9"]),
            ])
        );

        idx.add(m("c10", 4, 5, 1.0)).unwrap();
        assert_eq!(idx.get(&4, &"c10").map(|r| r.risk), Ok(1.0));
        idx.remove(&6, &"c9").unwrap();
        assert_eq!(idx.groups().len(), 4);
        assert_eq!(names(&idx.in_group(&6)), BTreeSet::from(["c8"]));
        assert_eq!(idx.len(), 9);
    }

    #[test]
    fn removing_last_record_drops_group() {
        let mut idx: GroupIndex<Machine> = GroupIndex::new();
        idx.add(m("solo", 2, 1, 0.5)).unwrap();
        assert_eq!(idx.group_count(), 1);
        assert_eq!(idx.remove(&2, &"solo").map(|r| r.value), Ok(1));
        assert_eq!(idx.group_count(), 0);
        assert!(idx.is_empty());
        assert_eq!(idx.remove(&2, &"solo"), Err(TableError::NotFound));
    }

    #[test]
    fn edit_moves_record_between_groups() {
        let mut idx: GroupIndex<Machine> = GroupIndex::new();
        idx.add(m("c1", 4, 4, 0.1)).unwrap();
        idx.add(m("c2", 4, 2, 0.2)).unwrap();
        let old = idx.edit(&4, &"c1", m("c1", 9, 8, 0.1)).unwrap();
        assert_eq!(old.difficulty, 4);
        assert_eq!(names(&idx.in_group(&4)), BTreeSet::from(["c2"]));
        assert_eq!(idx.get(&9, &"c1").map(|r| r.value), Ok(8));
        assert_eq!(idx.len(), 2);
        assert_eq!(
            idx.edit(&4, &"nope", m("nope", 1, 1, 0.0)),
            Err(TableError::NotFound)
        );
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn re_adding_same_record_replaces() {
        let mut idx: GroupIndex<Machine> = GroupIndex::new();
        idx.add(m("c1", 4, 4, 0.1)).unwrap();
        let prev = idx.add(m("c1", 4, 7, 0.1)).unwrap();
        assert_eq!(prev.map(|r| r.value), Some(4));
        assert_eq!(idx.len(), 1);
        assert!(idx.contains(&4, &"c1"));
        assert_eq!(idx.group_keys().copied().collect::<Vec<_>>(), vec![4]);
    }
}

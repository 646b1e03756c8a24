#![cfg(test)]

// Property tests for DoubleKeyTable kept inside the crate so they can check
// structural invariants (load factor, reachability, no empty nested tables)
// that the public API does not expose.

use crate::double_key_table::DoubleKeyTable;
use crate::error::TableError;
use crate::hashing::{HashFn, PolynomialHash, ProbeHash};
use crate::sizes::TableSizes;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Clone, Debug)]
enum Op {
    Set(usize, usize, i32),
    Remove(usize, usize),
    Get(usize, usize),
    ValuesOf(usize),
    Keys,
}

// Pool-indexed operations so shrinking converges on early keys.
fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<String>, Vec<Op>)> {
    (
        proptest::collection::btree_set("[a-z]{1,4}", 1..=8),
        proptest::collection::btree_set("[A-Z]{1,4}", 1..=8),
    )
        .prop_flat_map(|(firsts, seconds)| {
            let firsts: Vec<String> = firsts.into_iter().collect();
            let seconds: Vec<String> = seconds.into_iter().collect();
            let i1 = 0..firsts.len();
            let i2 = 0..seconds.len();
            let op = prop_oneof![
                4 => (i1.clone(), i2.clone(), any::<i32>()).prop_map(|(a, b, v)| Op::Set(a, b, v)),
                3 => (i1.clone(), i2.clone()).prop_map(|(a, b)| Op::Remove(a, b)),
                2 => (i1.clone(), i2.clone()).prop_map(|(a, b)| Op::Get(a, b)),
                1 => i1.clone().prop_map(Op::ValuesOf),
                1 => Just(Op::Keys),
            ];
            proptest::collection::vec(op, 1..120)
                .prop_map(move |ops| (firsts.clone(), seconds.clone(), ops))
        })
}

fn run<H1, H2>(
    mut sut: DoubleKeyTable<String, String, i32, H1, H2>,
    firsts: &[String],
    seconds: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    H1: ProbeHash<String> + ProbeHash<str>,
    H2: ProbeHash<String> + ProbeHash<str> + Clone,
{
    let mut model: HashMap<(String, String), i32> = HashMap::new();

    for op in ops {
        match op {
            Op::Set(a, b, v) => {
                let key = (firsts[a].clone(), seconds[b].clone());
                match sut.set(key.0.clone(), key.1.clone(), v) {
                    Ok(previous) => {
                        prop_assert_eq!(previous, model.insert(key, v));
                    }
                    Err(TableError::TableFull) => {
                        // Rejected inserts leave no trace.
                        prop_assert!(!model.contains_key(&key));
                        prop_assert!(!sut.contains(key.0.as_str(), key.1.as_str()));
                    }
                    Err(e) => prop_assert!(false, "unexpected error {:?}", e),
                }
            }
            Op::Remove(a, b) => {
                let (k1, k2) = (&firsts[a], &seconds[b]);
                let got = sut.remove(k1.as_str(), k2.as_str());
                match model.remove(&(k1.clone(), k2.clone())) {
                    Some(v) => prop_assert_eq!(got, Ok(v)),
                    None => prop_assert_eq!(got, Err(TableError::NotFound)),
                }
                prop_assert!(!sut.contains(k1.as_str(), k2.as_str()));
            }
            Op::Get(a, b) => {
                let (k1, k2) = (&firsts[a], &seconds[b]);
                let expected = model.get(&(k1.clone(), k2.clone()));
                prop_assert_eq!(sut.get(k1.as_str(), k2.as_str()).ok(), expected);
            }
            Op::ValuesOf(a) => {
                let k1 = &firsts[a];
                let mut expected: Vec<i32> = model
                    .iter()
                    .filter(|((m1, _), _)| m1 == k1)
                    .map(|(_, v)| *v)
                    .collect();
                expected.sort_unstable();
                match sut.values_of(k1.as_str()) {
                    Ok(values) => {
                        let mut got: Vec<i32> = values.copied().collect();
                        got.sort_unstable();
                        prop_assert!(!got.is_empty());
                        prop_assert_eq!(got, expected);
                    }
                    Err(e) => {
                        prop_assert_eq!(e, TableError::NotFound);
                        prop_assert!(expected.is_empty());
                    }
                }
            }
            Op::Keys => {
                let got: BTreeSet<String> = sut.keys().cloned().collect();
                let expected: BTreeSet<String> = model.keys().map(|(k1, _)| k1.clone()).collect();
                prop_assert_eq!(got, expected);
            }
        }

        sut.check_invariants();
        let distinct: BTreeSet<&String> = model.keys().map(|(k1, _)| k1).collect();
        prop_assert_eq!(sut.len(), distinct.len());

        // Every surviving pair is still reachable with its value.
        for ((k1, k2), v) in &model {
            prop_assert_eq!(sut.get(k1.as_str(), k2.as_str()), Ok(v));
        }
    }

    // Full enumeration agrees with the model.
    let got: BTreeMap<(String, String), i32> = sut
        .iter()
        .map(|(k1, k2, v)| ((k1.clone(), k2.clone()), *v))
        .collect();
    let expected: BTreeMap<(String, String), i32> = model.into_iter().collect();
    prop_assert_eq!(got, expected);
    Ok(())
}

fn sizes(v: &[usize]) -> TableSizes {
    TableSizes::try_from(v).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    // Small schedules force growth at both levels and, for the nested
    // level, eventual exhaustion.
    #[test]
    fn prop_model_equivalence_small_schedules((firsts, seconds, ops) in arb_scenario()) {
        let sut = DoubleKeyTable::with_sizes_and_hashers(
            sizes(&[5, 13, 29]),
            sizes(&[3, 7]),
            PolynomialHash,
            PolynomialHash,
        );
        run(sut, &firsts, &seconds, ops)?;
    }

    // Degenerate hashes put every key in one cluster at both levels, so
    // every deletion exercises cluster repair across wraparound.
    #[test]
    fn prop_model_equivalence_with_collisions((firsts, seconds, ops) in arb_scenario()) {
        let clustered = HashFn(|_: &str, cap: usize| cap - 1);
        let sut: DoubleKeyTable<String, String, i32, _, _> = DoubleKeyTable::with_sizes_and_hashers(
            sizes(&[5, 13, 29]),
            sizes(&[3, 7, 17]),
            StrHash(clustered),
            StrHash(clustered),
        );
        run(sut, &firsts, &seconds, ops)?;
    }
}

// Lifts a `str` hash to `String` keys so owned and borrowed probes agree.
#[derive(Clone, Copy)]
struct StrHash<H>(H);

impl<H: ProbeHash<str>> ProbeHash<str> for StrHash<H> {
    fn hash(&self, key: &str, capacity: usize) -> usize {
        self.0.hash(key, capacity)
    }
}

impl<H: ProbeHash<str>> ProbeHash<String> for StrHash<H> {
    fn hash(&self, key: &String, capacity: usize) -> usize {
        self.0.hash(key.as_str(), capacity)
    }
}

//! Capacity-bound hash functions used for slot placement.
//!
//! Unlike `core::hash::BuildHasher`, a [`ProbeHash`] is told the capacity
//! of the table it is hashing for and answers with a slot index directly.
//! The same hasher value is reused after every resize; it is simply called
//! with the new capacity.

/// Maps a key to a home slot of a table with `capacity` slots.
///
/// Tables reduce the result modulo `capacity` before indexing, so an
/// implementation that returns a larger number is still memory safe, but
/// placement is only meaningful if the result is already in range.
pub trait ProbeHash<K: ?Sized> {
    fn hash(&self, key: &K, capacity: usize) -> usize;
}

/// Polynomial rolling hash over the characters of a string key.
///
/// For each character `c`: `value = (ord(c) + a * value) mod capacity`, then
/// `a = a * BASE mod (capacity - 1)`. Capacities of 0 or 1 hash everything
/// to slot 0.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PolynomialHash;

impl PolynomialHash {
    pub const BASE: u128 = 31;
    pub const SEED: u128 = 31417;
}

impl<K> ProbeHash<K> for PolynomialHash
where
    K: ?Sized + AsRef<str>,
{
    fn hash(&self, key: &K, capacity: usize) -> usize {
        if capacity <= 1 {
            return 0;
        }
        // Widened so `a * value` cannot overflow for any usize capacity.
        let cap = capacity as u128;
        let mut value = 0u128;
        let mut a = Self::SEED;
        for c in key.as_ref().chars() {
            value = (u128::from(u32::from(c)) + a * value) % cap;
            a = a * Self::BASE % (cap - 1);
        }
        value as usize
    }
}

/// `key mod capacity` for integer keys; negative keys wrap to the
/// non-negative residue.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ModuloHash;

macro_rules! impl_modulo_hash {
    ($($t:ty),* $(,)?) => {
        $(
            impl ProbeHash<$t> for ModuloHash {
                #[inline]
                fn hash(&self, key: &$t, capacity: usize) -> usize {
                    if capacity == 0 {
                        return 0;
                    }
                    (*key as i128).rem_euclid(capacity as i128) as usize
                }
            }
        )*
    };
}

impl_modulo_hash!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// Adapter turning any `Fn(&K, usize) -> usize` into a [`ProbeHash`].
///
/// Handy in tests to force collisions:
///
/// ```
/// use double_key_hashtable::{DoubleKeyTable, HashFn, TableSizes};
///
/// let first = HashFn(|k: &&str, cap: usize| k.len() % cap);
/// let second = HashFn(|_: &&str, _: usize| 0);
/// let mut t: DoubleKeyTable<&str, &str, i32, _, _> = DoubleKeyTable::with_sizes_and_hashers(
///     TableSizes::new(vec![7]).unwrap(),
///     TableSizes::new(vec![7]).unwrap(),
///     first,
///     second,
/// );
/// t.set("ab", "x", 1).unwrap();
/// t.set("cd", "y", 2).unwrap();
/// assert_eq!(t.get(&"cd", &"y"), Ok(&2));
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct HashFn<F>(pub F);

impl<K, F> ProbeHash<K> for HashFn<F>
where
    K: ?Sized,
    F: Fn(&K, usize) -> usize,
{
    #[inline]
    fn hash(&self, key: &K, capacity: usize) -> usize {
        (self.0)(key, capacity)
    }
}

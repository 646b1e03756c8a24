//! double-key-hashtable: an open-addressing hash table keyed by a pair
//! `(K1, K2)`, built as a table of tables.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: group values by a first key so that "everything under `k1`" is a
//!   single probe, while `(k1, k2)` lookups stay O(1) on average.
//! - Layers:
//!   - LinearProbeTable<K, V, H>: single-key table, linear probing with
//!     wraparound, growth by a capacity schedule, cluster repair on removal.
//!   - DoubleKeyTable<K1, K2, V, H1, H2>: top-level slot array probed by
//!     `K1`; each occupied slot owns a LinearProbeTable keyed by `K2`.
//!   - GroupIndex<R>: records indexed by `(group, id)`; absent groups read
//!     as empty.
//!
//! Constraints
//! - Single-threaded; no interior mutability.
//! - Hashing is capacity-bound: a [`ProbeHash`] maps `(key, capacity)` to a
//!   home slot. The same hasher is reused at every capacity.
//! - Capacities come from a [`TableSizes`] schedule. A table grows to the
//!   next size once it is more than half full; with the schedule exhausted
//!   it keeps filling until a probe wraps around, which is `TableFull`.
//!
//! Invariants
//! - Every stored key is reachable by probing from its home slot without
//!   crossing an empty slot. Removal restores this by re-seating every
//!   entry of the cluster that followed the vacated slot.
//! - A top-level slot is occupied iff its nested table is non-empty; the
//!   last removal under a first key frees the slot.
//! - The top-level count is the number of occupied top-level slots.
//! - Nested tables are stored in a `slotmap` arena. Growth and repair only
//!   move `(K1, handle)` pairs, so a nested table's contents and slot order
//!   are untouched by anything that happens at the top level.
//! - Failed inserts (`TableFull` at either level) leave the table as it was.
//!
//! Notes and non-goals
//! - No shrinking, no concurrent access, no persistence.
//! - Iteration order is slot order and changes across resizes.

mod double_key_table;
mod double_key_table_proptest;
mod error;
mod group_index;
mod hashing;
mod linear_probe_table;
mod sizes;

// Public surface
pub use double_key_table::DoubleKeyTable;
pub use error::{Result, TableError};
pub use group_index::{GroupIndex, Grouped};
pub use hashing::{HashFn, ModuloHash, PolynomialHash, ProbeHash};
pub use linear_probe_table::{Iter, LinearProbeTable};
pub use sizes::{TableSizes, DEFAULT_TABLE_SIZES};

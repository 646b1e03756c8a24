//! Error type shared by both table layers.

use thiserror::Error;

/// Failure modes of [`LinearProbeTable`](crate::LinearProbeTable) and
/// [`DoubleKeyTable`](crate::DoubleKeyTable).
///
/// Every variant is raised before the table is mutated, so a caller that
/// receives one observes the table exactly as it was before the call.
#[derive(Copy, Clone, Debug, Error, Eq, PartialEq, Hash)]
pub enum TableError {
    /// The requested key (or key pair) is not present.
    #[error("key not found")]
    NotFound,
    /// A full linear scan found no free slot and the capacity schedule has
    /// no larger entry left.
    #[error("table is full and the capacity schedule is exhausted")]
    TableFull,
    /// A capacity schedule was empty, contained a zero, or was not strictly
    /// ascending.
    #[error("capacity schedule must be non-empty, non-zero and strictly ascending")]
    InvalidSchedule,
}

pub type Result<T> = core::result::Result<T, TableError>;

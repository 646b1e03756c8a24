//! Capacity schedules.

use crate::error::{Result, TableError};
use std::rc::Rc;

/// Built-in schedule, enough for a little over 750k distinct keys per level
/// at the half-full growth threshold.
pub const DEFAULT_TABLE_SIZES: [usize; 19] = [
    5, 13, 29, 53, 97, 193, 389, 769, 1543, 3079, 6151, 12289, 24593, 49157, 98317, 196613,
    393241, 786433, 1572869,
];

/// A strictly ascending, non-empty list of table capacities.
///
/// Tables start at the first entry and step to the next one each time they
/// grow. Cloning is cheap: every nested table of a
/// [`DoubleKeyTable`](crate::DoubleKeyTable) shares one allocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableSizes {
    sizes: Rc<[usize]>,
}

impl TableSizes {
    pub fn new(sizes: Vec<usize>) -> Result<Self> {
        if sizes.is_empty() || sizes[0] == 0 {
            return Err(TableError::InvalidSchedule);
        }
        if sizes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TableError::InvalidSchedule);
        }
        Ok(Self {
            sizes: sizes.into(),
        })
    }

    /// Capacity at `index`, or `None` past the end of the schedule.
    #[inline]
    pub fn get(&self, index: usize) -> Option<usize> {
        self.sizes.get(index).copied()
    }

    #[inline]
    pub fn first(&self) -> usize {
        self.sizes[0]
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.sizes
    }
}

impl Default for TableSizes {
    fn default() -> Self {
        Self {
            sizes: Rc::from(&DEFAULT_TABLE_SIZES[..]),
        }
    }
}

impl TryFrom<Vec<usize>> for TableSizes {
    type Error = TableError;

    fn try_from(sizes: Vec<usize>) -> Result<Self> {
        Self::new(sizes)
    }
}

impl TryFrom<&[usize]> for TableSizes {
    type Error = TableError;

    fn try_from(sizes: &[usize]) -> Result<Self> {
        Self::new(sizes.to_vec())
    }
}

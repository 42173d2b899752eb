use super::item::ItemId;
use crate::error::PickerError;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Order-independent key for an unordered pair of items.
///
/// Keys compare lexicographically by `(low, high)`; the selector relies on this
/// ordering as its last tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    low: ItemId,
    high: ItemId,
}

impl PairKey {
    pub fn new(a: ItemId, b: ItemId) -> Result<Self, PickerError> {
        if a == b {
            return Err(PickerError::SelfComparison { item: a });
        }
        Ok(Self::ordered(a, b))
    }

    /// Caller guarantees `a != b`.
    pub(crate) fn ordered(a: ItemId, b: ItemId) -> Self {
        debug_assert_ne!(a, b);
        if a < b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn low(&self) -> ItemId {
        self.low
    }

    pub fn high(&self) -> ItemId {
        self.high
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.low == id || self.high == id
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low.0, self.high.0)
    }
}

use core::fmt;
use core::num::NonZeroU32;

use crate::error::{CoreError, CoreResult};

/// Compact arena handle for simulator objects.
///
/// - `u32` keeps block structs small
/// - `NonZero` lets `Option<Id>` stay the same size as `Id`
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Id(NonZeroU32);

impl Id {
    /// Create an Id from a 0-based arena index (stored as index+1).
    ///
    /// # Panics
    ///
    /// Panics if `index == u32::MAX`. Use [`Id::try_from_index`] for
    /// indices that come from collection lengths.
    pub const fn from_index(index: u32) -> Self {
        match NonZeroU32::MIN.checked_add(index) {
            Some(raw) => Self(raw),
            None => panic!("arena index u32::MAX has no Id"),
        }
    }

    /// Create an Id from a `usize` arena index.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IdOverflow`] when the index does not fit.
    pub fn try_from_index(index: usize) -> CoreResult<Self> {
        u32::try_from(index)
            .ok()
            .and_then(|i| NonZeroU32::MIN.checked_add(i))
            .map(Self)
            .ok_or(CoreError::IdOverflow { index })
    }

    /// Recover the 0-based arena index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// Arena index as `usize`, for slice access.
    pub fn slot(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

/// Handle of a trajectory buffer inside a system.
pub type VariableId = Id;

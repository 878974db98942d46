//! Volume identity keys.
//!
//! The geometry subsystem identifies a placed volume by its position
//! in the volume tree, which makes raw handles ambiguous when volumes
//! are replicated (an unreplicated sub-volume of a replicated parent
//! shares its handle across all copies). A `VolumeId` flattens the
//! full placement history into an owned, value-comparable, hashable
//! key.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One level of the placement history: a volume handle and the
/// replica number of this copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VolumeLevel {
    /// Opaque handle of the physical volume at this level.
    pub handle: u64,
    /// Replica number of this copy.
    pub replica: i32,
}

/// Unique identifier for a placed volume, most-local level first, the
/// world volume last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VolumeId {
    levels: Vec<VolumeLevel>,
}

impl VolumeId {
    /// Creates an empty (unset) volume id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a volume id from `(handle, replica)` pairs, most-local
    /// first.
    pub fn from_levels<I>(levels: I) -> Self
    where
        I: IntoIterator<Item = (u64, i32)>,
    {
        Self {
            levels: levels
                .into_iter()
                .map(|(handle, replica)| VolumeLevel { handle, replica })
                .collect(),
        }
    }

    /// Appends a placement level.
    pub fn push_level(&mut self, handle: u64, replica: i32) {
        self.levels.push(VolumeLevel { handle, replica });
    }

    /// True for the unset id, before any level has been added.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of levels in the placement history.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// The placement levels, most-local first.
    pub fn levels(&self) -> &[VolumeLevel] {
        &self.levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_replica_distinguishes_copies() {
        let a = VolumeId::from_levels([(7, 0), (3, 2)]);
        let b = VolumeId::from_levels([(7, 0), (3, 3)]);
        assert_ne!(a, b);

        let a2 = VolumeId::from_levels([(7, 0), (3, 2)]);
        assert_eq!(a, a2);
    }

    #[test]
    fn test_depth_mismatch() {
        let shallow = VolumeId::from_levels([(7, 0)]);
        let deep = VolumeId::from_levels([(7, 0), (1, 0)]);
        assert_ne!(shallow, deep);
    }

    #[test]
    fn test_hashable() {
        let mut set = HashSet::new();
        set.insert(VolumeId::from_levels([(1, 0)]));
        set.insert(VolumeId::from_levels([(1, 0)]));
        set.insert(VolumeId::from_levels([(1, 1)]));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_empty() {
        let mut id = VolumeId::new();
        assert!(id.is_empty());
        id.push_level(5, 0);
        assert!(!id.is_empty());
        assert_eq!(id.depth(), 1);
    }
}

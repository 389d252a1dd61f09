//! Seam flags for chunk edges that border a coarser LOD

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Set of chunk edges whose border vertices must match a coarser neighbour.
///
/// A flagged edge has its in-between vertices replaced by the average of the
/// two vertices the coarser grid has there, so no T-junction cracks open.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LodTransitions(u8);

impl LodTransitions {
    pub const NONE: Self = Self(0);
    /// -x edge
    pub const LEFT: Self = Self(1 << 0);
    /// +x edge
    pub const RIGHT: Self = Self(1 << 1);
    /// -z edge
    pub const BOTTOM: Self = Self(1 << 2);
    /// +z edge
    pub const TOP: Self = Self(1 << 3);
    pub const ALL: Self = Self(0b1111);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// All flags in `other` are set
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn with(self, other: Self, enabled: bool) -> Self {
        if enabled { self | other } else { self }
    }
}

impl BitOr for LodTransitions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for LodTransitions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for LodTransitions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::LEFT, "LEFT"),
            (Self::RIGHT, "RIGHT"),
            (Self::BOTTOM, "BOTTOM"),
            (Self::TOP, "TOP"),
        ];
        let set: Vec<_> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            write!(f, "LodTransitions(NONE)")
        } else {
            write!(f, "LodTransitions({})", set.join(" | "))
        }
    }
}

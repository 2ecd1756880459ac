//! Technique selection flags.

use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Set of enabled reduction techniques.
///
/// The driver currently distinguishes only empty from non-empty: any
/// non-empty set runs the full technique suite. The per-technique bits
/// reserve space for finer control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TechniqueFlags(u64);

impl TechniqueFlags {
    /// No techniques; `apply` only normalizes.
    pub const NONE: Self = Self(0);

    /// Remove exactly-zero linear and quadratic biases.
    pub const REMOVE_ZERO_BIASES: Self = Self(1 << 0);

    /// Remove negligibly small linear biases from linear constraints.
    pub const REMOVE_SMALL_BIASES: Self = Self(1 << 1);

    /// Absorb empty and single-variable constraints into variable bounds.
    pub const REMOVE_SINGLE_VARIABLE_CONSTRAINTS: Self = Self(1 << 2);

    /// Round bounds of integral variables to integers.
    pub const TIGHTEN_BOUNDS: Self = Self(1 << 3);

    /// Tighten bounds from constraint activities.
    pub const DOMAIN_PROPAGATION: Self = Self(1 << 4);

    /// Remove variables whose bounds have collapsed to a point.
    pub const REMOVE_FIXED_VARIABLES: Self = Self(1 << 5);

    /// Every technique.
    pub const ALL: Self = Self(u64::MAX);

    /// Whether no technique is enabled.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every bit of `other` is enabled.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TechniqueFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TechniqueFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for TechniqueFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

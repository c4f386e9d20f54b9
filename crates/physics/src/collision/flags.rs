//! Content flags for filtering which bodies a trace collides with.

use serde::{Deserialize, Serialize};

/// Content flags describe what kind of volume a body is.
///
/// Static walls are always [`ContentFlags::SOLID`]. Dynamic bodies carry one
/// of the body classes so a trace can skip, say, corpses. Projectiles are
/// swept shapes only and never appear as bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ContentFlags(pub u32);

impl ContentFlags {
    /// Nothing.
    pub const EMPTY: Self = Self(0);

    /// Static world geometry.
    pub const SOLID: Self = Self(1 << 0);

    /// A player's body.
    pub const PLAYER_BODY: Self = Self(1 << 1);

    /// An AI-controlled enemy's body.
    pub const MONSTER_BODY: Self = Self(1 << 2);

    /// A dead body; kept for visuals, usually passable.
    pub const CORPSE: Self = Self(1 << 3);

    /// Mask for player and enemy movement.
    pub const MASK_MOVER_SOLID: Self = Self(
        Self::SOLID.0 | Self::PLAYER_BODY.0 | Self::MONSTER_BODY.0,
    );

    /// Mask for projectile flight.
    pub const MASK_PROJECTILE: Self = Self(
        Self::SOLID.0 | Self::PLAYER_BODY.0 | Self::MONSTER_BODY.0,
    );

    /// Check if these flags contain a specific flag.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any of the given flags are set.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for ContentFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for ContentFlags {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

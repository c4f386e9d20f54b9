//! Trace results, swept shapes and query filters.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::body::EntityId;
use super::flags::ContentFlags;

/// What a trace ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HitTarget {
    /// Nothing; the shape completed its displacement.
    #[default]
    None,
    /// A static wall, by registration index.
    Wall(usize),
    /// A dynamic body.
    Body(EntityId),
}

/// Result of sweeping a shape along a displacement.
///
/// `fraction` is the time of impact: the share of the displacement the shape
/// can travel before touching something. It is already backed off by
/// [`contact_skin`](super::contact_skin) so the shape stops just short of the
/// surface instead of exactly on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceResult {
    /// How far along the displacement we got before contact.
    ///
    /// - `1.0` = traveled the full distance (no contact)
    /// - `0.0` = touching something already, cannot advance
    pub fraction: f32,

    /// Unit surface normal pointing from the obstacle toward free space.
    ///
    /// The zero vector when `fraction == 1.0`.
    pub normal: Vec3,

    /// What was hit.
    pub hit: HitTarget,
}

impl Default for TraceResult {
    fn default() -> Self {
        Self::no_hit()
    }
}

impl TraceResult {
    /// A trace that reached its goal.
    pub const fn no_hit() -> Self {
        Self {
            fraction: 1.0,
            normal: Vec3::ZERO,
            hit: HitTarget::None,
        }
    }

    /// A trace that stopped at `fraction` against a surface with `normal`.
    pub fn hit(fraction: f32, normal: Vec3, hit: HitTarget) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0),
            normal,
            hit,
        }
    }

    /// Check if this trace hit something.
    #[inline]
    pub fn hit_something(&self) -> bool {
        self.fraction < 1.0
    }

    /// The entity hit, if the contact was with a dynamic body.
    #[inline]
    pub fn hit_entity(&self) -> Option<EntityId> {
        match self.hit {
            HitTarget::Body(id) => Some(id),
            _ => None,
        }
    }

    /// Where the shape ends up after this trace.
    #[inline]
    pub fn end_position(&self, origin: Vec3, displacement: Vec3) -> Vec3 {
        origin + displacement * self.fraction
    }

    /// Replace `self` with `candidate` only if it is strictly earlier.
    ///
    /// Equal fractions keep the contact found first, which makes primitive
    /// test order the tie-breaker.
    #[inline]
    pub fn keep_earliest(&mut self, candidate: TraceResult) {
        if candidate.fraction < self.fraction {
            *self = candidate;
        }
    }
}

/// Shape swept through the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TraceShape {
    /// A single point. Used for bullets.
    Point,

    /// An upright cylinder whose base center is the trace origin.
    Cylinder {
        /// Radius of the cylinder.
        radius: f32,
        /// Height above the base.
        height: f32,
    },
}

impl TraceShape {
    /// Default player cylinder.
    pub const PLAYER: Self = Self::Cylinder {
        radius: 0.4,
        height: 1.8,
    };

    /// Get the radius of this shape (zero for points).
    pub fn radius(&self) -> f32 {
        match self {
            Self::Point => 0.0,
            Self::Cylinder { radius, .. } => *radius,
        }
    }

    /// Get the height of this shape (zero for points).
    pub fn height(&self) -> f32 {
        match self {
            Self::Point => 0.0,
            Self::Cylinder { height, .. } => *height,
        }
    }
}

impl Default for TraceShape {
    fn default() -> Self {
        Self::PLAYER
    }
}

/// Which dynamic bodies a trace considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceFilter {
    /// Body classes to collide with.
    pub mask: ContentFlags,
    /// Entity to skip, normally the mover itself.
    pub ignore: Option<EntityId>,
}

impl Default for TraceFilter {
    fn default() -> Self {
        Self {
            mask: ContentFlags::MASK_MOVER_SOLID,
            ignore: None,
        }
    }
}

impl TraceFilter {
    /// Filter with `mask` that skips `ignore`.
    pub fn new(mask: ContentFlags, ignore: Option<EntityId>) -> Self {
        Self { mask, ignore }
    }

    /// Check whether a body with `id` and `contents` takes part in the trace.
    #[inline]
    pub fn accepts(&self, id: EntityId, contents: ContentFlags) -> bool {
        self.ignore != Some(id) && self.mask.intersects(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_result_no_hit() {
        let result = TraceResult::no_hit();
        assert!(!result.hit_something());
        assert_eq!(result.fraction, 1.0);
        assert_eq!(result.normal, Vec3::ZERO);
        assert_eq!(result.hit_entity(), None);
    }

    #[test]
    fn test_trace_result_hit() {
        let result = TraceResult::hit(0.5, Vec3::X, HitTarget::Body(7));
        assert!(result.hit_something());
        assert_eq!(result.fraction, 0.5);
        assert_eq!(result.hit_entity(), Some(7));
        assert_eq!(
            result.end_position(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)),
            Vec3::new(2.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_keep_earliest_ties_keep_first() {
        let mut best = TraceResult::hit(0.5, Vec3::X, HitTarget::Wall(0));
        best.keep_earliest(TraceResult::hit(0.5, Vec3::Y, HitTarget::Wall(1)));
        assert_eq!(best.hit, HitTarget::Wall(0));

        best.keep_earliest(TraceResult::hit(0.25, Vec3::Y, HitTarget::Wall(2)));
        assert_eq!(best.hit, HitTarget::Wall(2));
    }

    #[test]
    fn test_filter_ignores_self() {
        let filter = TraceFilter::new(ContentFlags::MASK_MOVER_SOLID, Some(3));
        assert!(!filter.accepts(3, ContentFlags::PLAYER_BODY));
        assert!(filter.accepts(4, ContentFlags::PLAYER_BODY));
        assert!(!filter.accepts(4, ContentFlags::CORPSE));
    }
}

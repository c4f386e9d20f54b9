//! Read-only snapshots of dynamic collidable bodies.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::flags::ContentFlags;

/// Identifier the simulation assigns to each entity.
pub type EntityId = u32;

/// A dynamic body as seen by one collision query.
///
/// The simulation rebuilds these every tick from whichever entities are live;
/// the collision layer only ever reads them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    /// Owning entity.
    pub id: EntityId,
    /// Base-center of the cylinder.
    pub position: Vec3,
    /// Cylinder radius.
    pub radius: f32,
    /// Cylinder height above `position.z`.
    pub height: f32,
    /// Displacement the body makes over the query.
    ///
    /// Body sweeps run in the body's rest frame. Snapshots handed to a slide
    /// move must be stationary, since the move is split into partial traces.
    pub displacement: Vec3,
    /// What kind of body this is.
    pub contents: ContentFlags,
}

impl BodySnapshot {
    /// A stationary body.
    pub fn new(id: EntityId, position: Vec3, radius: f32, height: f32, contents: ContentFlags) -> Self {
        Self {
            id,
            position,
            radius,
            height,
            displacement: Vec3::ZERO,
            contents,
        }
    }

    /// Attach this tick's displacement.
    pub fn moving(mut self, displacement: Vec3) -> Self {
        self.displacement = displacement;
        self
    }

    /// Top of the cylinder.
    #[inline]
    pub fn top(&self) -> f32 {
        self.position.z + self.height
    }
}

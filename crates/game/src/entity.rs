//! Entity capability records.
//!
//! Instead of asking "is this a player? an enemy?" at query time, every
//! entity describes which systems it takes part in. The collision layer only
//! sees entities that carry a [`CollisionCapability`]; damage only lands on
//! entities that carry a [`DamageCapability`].

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracefall_physics::{BodySnapshot, ContentFlags, EntityId};

/// Participation in collision as an upright cylinder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionCapability {
    pub radius: f32,
    pub height: f32,
    pub contents: ContentFlags,
}

/// Health that projectiles can take away.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageCapability {
    /// Current health (0 = dead).
    pub health: i32,

    /// Maximum health.
    pub max_health: i32,
}

impl DamageCapability {
    /// Full health.
    pub fn new(max_health: i32) -> Self {
        Self {
            health: max_health,
            max_health,
        }
    }

    /// Check if there is any health left.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Apply damage.
    ///
    /// Returns the damage actually dealt.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        if !self.is_alive() || amount <= 0 {
            return 0;
        }
        let before = self.health;
        self.health = (self.health - amount).max(0);
        before - self.health
    }
}

/// What an entity takes part in this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    pub id: EntityId,
    pub collision: Option<CollisionCapability>,
    pub damage: Option<DamageCapability>,
}

impl EntityDescriptor {
    /// An entity that takes part in nothing.
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            collision: None,
            damage: None,
        }
    }

    /// Add a collision capability.
    pub fn with_collision(mut self, radius: f32, height: f32, contents: ContentFlags) -> Self {
        self.collision = Some(CollisionCapability {
            radius,
            height,
            contents,
        });
        self
    }

    /// Add a damage capability.
    pub fn with_damage(mut self, damage: DamageCapability) -> Self {
        self.damage = Some(damage);
        self
    }

    /// Check if this entity can be hurt right now.
    #[inline]
    pub fn is_damageable(&self) -> bool {
        self.damage.is_some_and(|d| d.is_alive())
    }

    /// Apply damage through the damage capability.
    ///
    /// Entities that are not damageable take nothing. Returns the damage
    /// actually dealt.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        if !self.is_damageable() {
            return 0;
        }
        self.damage.as_mut().map_or(0, |d| d.take_damage(amount))
    }

    /// The body the collision layer sees, if this entity collides at all.
    pub fn snapshot(&self, position: Vec3, displacement: Vec3) -> Option<BodySnapshot> {
        self.collision.map(|c| {
            BodySnapshot::new(self.id, position, c.radius, c.height, c.contents).moving(displacement)
        })
    }
}

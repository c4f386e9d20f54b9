//! Bullets and rockets.
//!
//! A bullet is a swept point: it is swept against the walls and then against
//! each live target in that target's rest frame, so it can hit something
//! that is itself moving this tick. A rocket is a small cylinder swept with
//! an ordinary trace, whose body sweeps also run in each target's rest frame.
//! Either way the earliest contact ends the flight.
//!
//! Projectiles only sweep: they have no body of their own, so movers
//! and other projectiles pass through them.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracefall_physics::{
    BodySnapshot, CollisionWorld, ContentFlags, EntityId, HitTarget, TraceFilter, TraceResult,
    TraceShape,
};

/// Projectile tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub bullet_speed: f32,
    pub bullet_damage: i32,
    pub bullet_knockback: f32,
    /// Seconds before a bullet that hit nothing disappears.
    pub bullet_lifetime: f32,

    pub rocket_speed: f32,
    pub rocket_damage: i32,
    pub rocket_knockback: f32,
    pub rocket_lifetime: f32,
    pub rocket_radius: f32,
    pub rocket_height: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            bullet_speed: 120.0,
            bullet_damage: 10,
            bullet_knockback: 1.0,
            bullet_lifetime: 1.0,

            rocket_speed: 20.0,
            rocket_damage: 50,
            rocket_knockback: 8.0,
            rocket_lifetime: 5.0,
            rocket_radius: 0.15,
            rocket_height: 0.3,
        }
    }
}

/// Swept shape of a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectileKind {
    Bullet,
    Rocket { radius: f32, height: f32 },
}

impl ProjectileKind {
    pub fn shape(&self) -> TraceShape {
        match *self {
            Self::Bullet => TraceShape::Point,
            Self::Rocket { radius, height } => TraceShape::Cylinder { radius, height },
        }
    }
}

/// Something a projectile ran into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactEvent {
    pub projectile: EntityId,
    pub target: HitTarget,
    /// Where the projectile stopped.
    pub point: Vec3,
    /// Surface normal at the contact, pointing back toward the projectile.
    pub normal: Vec3,
}

/// Result of advancing a projectile one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileStep {
    Flying,
    Impact(ImpactEvent),
    Expired,
}

/// A projectile in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,

    /// Entity that fired it; never hit by its own projectile.
    pub owner: EntityId,

    pub kind: ProjectileKind,
    pub position: Vec3,
    pub velocity: Vec3,
    pub damage: i32,
    pub knockback: f32,

    /// Seconds left before it expires.
    pub lifetime: f32,
}

impl Projectile {
    /// A bullet fired from `origin` along `direction`.
    pub fn bullet(
        id: EntityId,
        owner: EntityId,
        origin: Vec3,
        direction: Vec3,
        config: &ProjectileConfig,
    ) -> Self {
        Self {
            id,
            owner,
            kind: ProjectileKind::Bullet,
            position: origin,
            velocity: direction.normalize_or_zero() * config.bullet_speed,
            damage: config.bullet_damage,
            knockback: config.bullet_knockback,
            lifetime: config.bullet_lifetime,
        }
    }

    /// A rocket fired from `origin` along `direction`.
    ///
    /// `origin` is where the rocket's center starts; the cylinder base sits
    /// half a height below it.
    pub fn rocket(
        id: EntityId,
        owner: EntityId,
        origin: Vec3,
        direction: Vec3,
        config: &ProjectileConfig,
    ) -> Self {
        Self {
            id,
            owner,
            kind: ProjectileKind::Rocket {
                radius: config.rocket_radius,
                height: config.rocket_height,
            },
            position: origin - Vec3::new(0.0, 0.0, config.rocket_height * 0.5),
            velocity: direction.normalize_or_zero() * config.rocket_speed,
            damage: config.rocket_damage,
            knockback: config.rocket_knockback,
            lifetime: config.rocket_lifetime,
        }
    }

    /// Filter for this projectile's own traces.
    pub fn filter(&self) -> TraceFilter {
        TraceFilter::new(ContentFlags::MASK_PROJECTILE, Some(self.owner))
    }

    /// Advance one tick.
    ///
    /// `bodies` carry each target's displacement for this tick.
    pub fn step(
        &mut self,
        world: &CollisionWorld,
        bodies: &[BodySnapshot],
        delta_time: f32,
    ) -> ProjectileStep {
        let displacement = self.velocity * delta_time;
        let filter = self.filter();

        let trace = match self.kind {
            ProjectileKind::Bullet => self.trace_bullet(world, bodies, &filter, displacement),
            ProjectileKind::Rocket { .. } => {
                world.trace(self.position, displacement, self.kind.shape(), bodies, &filter)
            }
        };

        self.position = trace.end_position(self.position, displacement);

        if trace.hit_something() {
            let event = ImpactEvent {
                projectile: self.id,
                target: trace.hit,
                point: self.position,
                normal: trace.normal,
            };
            log::debug!("projectile {} hit {:?} at {:?}", self.id, trace.hit, self.position);
            return ProjectileStep::Impact(event);
        }

        self.lifetime -= delta_time;
        if self.lifetime <= 0.0 {
            return ProjectileStep::Expired;
        }
        ProjectileStep::Flying
    }

    fn trace_bullet(
        &self,
        world: &CollisionWorld,
        bodies: &[BodySnapshot],
        filter: &TraceFilter,
        displacement: Vec3,
    ) -> TraceResult {
        let mut result = world.sweep_point(self.position, displacement);
        for body in bodies.iter().filter(|b| filter.accepts(b.id, b.contents)) {
            result.keep_earliest(world.sweep_point_body(self.position, displacement, body));
        }
        result
    }
}

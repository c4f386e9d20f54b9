//! Ground-based tracking enemies.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracefall_physics::{
    slide_move, CollisionScene, ContentFlags, EntityId, MovementConfig, SlideOutcome, TraceFilter,
    TraceShape,
};

use crate::entity::{DamageCapability, EntityDescriptor};
use crate::player::{accelerate, apply_friction};

/// Tuning for tracking enemies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Walking speed (meters/second).
    pub speed: f32,

    /// Stop this far from the target, measured horizontally (meters).
    pub stop_distance: f32,

    pub radius: f32,
    pub height: f32,
    pub health: i32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            speed: 3.0,
            stop_distance: 1.5,
            radius: 0.5,
            height: 1.9,
            health: 60,
        }
    }
}

/// An AI-controlled enemy that walks toward a target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,
    pub health: DamageCapability,

    /// Where the enemy is heading, if anywhere.
    pub target: Option<Vec3>,
}

impl Enemy {
    pub fn new(id: EntityId, position: Vec3, config: &EnemyConfig) -> Self {
        Self {
            id,
            position,
            velocity: Vec3::ZERO,
            grounded: false,
            health: DamageCapability::new(config.health),
            target: None,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    /// Capabilities this enemy exposes.
    pub fn descriptor(&self, config: &EnemyConfig) -> EntityDescriptor {
        EntityDescriptor::new(self.id)
            .with_collision(config.radius, config.height, ContentFlags::MONSTER_BODY)
            .with_damage(self.health)
    }
}

/// Drives enemies toward their targets through the shared slide move.
#[derive(Debug, Clone)]
pub struct EnemyController {
    pub config: EnemyConfig,
    pub movement: MovementConfig,
}

impl EnemyController {
    pub fn new(config: EnemyConfig, movement: MovementConfig) -> Self {
        Self { config, movement }
    }

    pub fn shape(&self) -> TraceShape {
        TraceShape::Cylinder {
            radius: self.config.radius,
            height: self.config.height,
        }
    }

    /// Horizontal velocity the enemy wants this tick.
    pub fn desired_velocity(&self, enemy: &Enemy) -> Vec3 {
        let Some(target) = enemy.target else {
            return Vec3::ZERO;
        };

        let offset = (target - enemy.position).truncate();
        if offset.length() <= self.config.stop_distance {
            return Vec3::ZERO;
        }
        (offset.normalize() * self.config.speed).extend(0.0)
    }

    /// Update one enemy for one tick.
    ///
    /// Returns what the slide move ran into, or `None` for dead enemies.
    pub fn update(
        &self,
        enemy: &mut Enemy,
        scene: &CollisionScene<'_>,
        delta_time: f32,
    ) -> Option<SlideOutcome> {
        if !enemy.is_alive() {
            return None;
        }

        let (friction, acceleration) = if enemy.grounded {
            (self.movement.ground_friction, self.movement.ground_acceleration)
        } else {
            (self.movement.air_friction, self.movement.air_acceleration)
        };
        apply_friction(&mut enemy.velocity, friction, self.movement.stop_speed, delta_time);

        let desired = self.desired_velocity(enemy);
        let speed = desired.length();
        if speed > 0.0 {
            accelerate(&mut enemy.velocity, desired / speed, speed, acceleration, delta_time);
        }

        enemy.velocity.z -= self.movement.gravity * delta_time;

        let filter = TraceFilter::new(ContentFlags::MASK_MOVER_SOLID, Some(enemy.id));
        let outcome = slide_move(
            scene,
            &filter,
            &mut enemy.position,
            &mut enemy.velocity,
            self.shape(),
            delta_time,
            &self.movement,
        );
        enemy.grounded = outcome.grounded;

        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracefall_physics::{BodySnapshot, CollisionWorld};

    fn floor_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        world.add_static_triangle(
            Vec3::new(-100.0, -100.0, 0.0),
            Vec3::new(100.0, -100.0, 0.0),
            Vec3::new(0.0, 100.0, 0.0),
        );
        world
    }

    #[test]
    fn test_desired_velocity() {
        let controller = EnemyController::new(EnemyConfig::default(), MovementConfig::default());
        let mut enemy = Enemy::new(1, Vec3::ZERO, &controller.config);
        assert_eq!(controller.desired_velocity(&enemy), Vec3::ZERO);

        enemy.target = Some(Vec3::new(0.0, 10.0, 5.0));
        let desired = controller.desired_velocity(&enemy);
        assert!((desired - Vec3::new(0.0, 3.0, 0.0)).length() < 1e-5);

        enemy.target = Some(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(controller.desired_velocity(&enemy), Vec3::ZERO);
    }

    #[test]
    fn test_walks_toward_target() {
        let world = floor_world();
        let scene = CollisionScene::walls_only(&world);
        let controller = EnemyController::new(EnemyConfig::default(), MovementConfig::default());

        let mut enemy = Enemy::new(1, Vec3::new(0.0, 0.0, 0.001), &controller.config);
        enemy.target = Some(Vec3::new(20.0, 0.0, 0.0));

        for _ in 0..120 {
            controller.update(&mut enemy, &scene, 1.0 / 60.0);
        }

        assert!(enemy.grounded);
        assert!(enemy.position.x > 2.0, "x={}", enemy.position.x);
        assert!(enemy.position.z < 0.01);
    }

    #[test]
    fn test_blocked_by_player_body() {
        let world = floor_world();
        let bodies = [BodySnapshot::new(
            9,
            Vec3::new(3.0, 0.0, 0.0),
            0.4,
            1.8,
            ContentFlags::PLAYER_BODY,
        )];
        let scene = CollisionScene::new(&world, &bodies);
        let config = EnemyConfig {
            stop_distance: 0.0,
            ..Default::default()
        };
        let controller = EnemyController::new(config, MovementConfig::default());

        let mut enemy = Enemy::new(1, Vec3::new(0.0, 0.0, 0.001), &controller.config);
        enemy.target = Some(Vec3::new(3.0, 0.0, 0.0));

        for _ in 0..300 {
            controller.update(&mut enemy, &scene, 1.0 / 60.0);
        }

        // Never closer than the summed radii.
        assert!(enemy.position.x <= 3.0 - 0.9 + 1e-3, "x={}", enemy.position.x);
        assert!(enemy.position.x > 2.0);
    }
}

//! Player entity and movement controller.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracefall_physics::{
    slide_move, CollisionScene, ContentFlags, EntityId, MovementConfig, SlideOutcome, TraceFilter,
    TraceShape,
};

use crate::entity::{DamageCapability, EntityDescriptor};
use crate::input::PlayerCommand;

/// A player in the game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Unique player ID.
    pub id: EntityId,

    /// Player name/handle.
    pub name: String,

    /// Base-center of the player's cylinder.
    pub position: Vec3,

    pub velocity: Vec3,

    /// View angles (pitch, yaw) in radians. Yaw 0 faces +X.
    pub view_angles: (f32, f32),

    /// Standing on walkable ground after the last move.
    pub grounded: bool,

    /// Normal of the ground under the player, `Vec3::Z` when airborne.
    pub ground_normal: Vec3,

    pub health: DamageCapability,

    /// Weapon fire cooldown (ticks).
    pub fire_cooldown: u32,

    /// Deaths this session.
    pub deaths: u32,

    /// Ticks left before a dead player respawns.
    pub respawn_timer: u32,
}

impl Player {
    /// Fire rate in ticks (60 Hz = 10 shots/sec at cooldown of 6).
    pub const FIRE_RATE: u32 = 6;

    /// Eye height above the base.
    pub const EYE_HEIGHT: f32 = 1.6;

    /// Ticks a dead player stays down (2 seconds at 60 Hz).
    pub const RESPAWN_DELAY: u32 = 120;

    /// Create a new player at the given spawn position.
    pub fn new(id: EntityId, name: String, spawn_position: Vec3) -> Self {
        Self {
            id,
            name,
            position: spawn_position,
            velocity: Vec3::ZERO,
            view_angles: (0.0, 0.0),
            grounded: false,
            ground_normal: Vec3::Z,
            health: DamageCapability::new(100),
            fire_cooldown: 0,
            deaths: 0,
            respawn_timer: 0,
        }
    }

    /// Capabilities this player exposes.
    pub fn descriptor(&self, config: &MovementConfig) -> EntityDescriptor {
        let descriptor = EntityDescriptor::new(self.id).with_damage(self.health);
        if self.is_alive() {
            descriptor.with_collision(
                config.player_radius,
                config.player_height,
                ContentFlags::PLAYER_BODY,
            )
        } else {
            descriptor.with_collision(
                config.player_radius,
                config.player_height,
                ContentFlags::CORPSE,
            )
        }
    }

    /// Get the player's eye position.
    #[inline]
    pub fn eye_position(&self) -> Vec3 {
        self.position + Vec3::new(0.0, 0.0, Self::EYE_HEIGHT)
    }

    /// Direction the player is looking.
    pub fn look_direction(&self) -> Vec3 {
        let (pitch, yaw) = self.view_angles;
        Vec3::new(
            pitch.cos() * yaw.cos(),
            pitch.cos() * yaw.sin(),
            pitch.sin(),
        )
    }

    /// Horizontal forward direction.
    #[inline]
    pub fn forward_direction(&self) -> Vec3 {
        let yaw = self.view_angles.1;
        Vec3::new(yaw.cos(), yaw.sin(), 0.0)
    }

    /// Horizontal right direction.
    #[inline]
    pub fn right_direction(&self) -> Vec3 {
        let yaw = self.view_angles.1;
        Vec3::new(yaw.sin(), -yaw.cos(), 0.0)
    }

    /// Check if the player is alive.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    /// Check if the player can fire.
    #[inline]
    pub fn can_fire(&self) -> bool {
        self.is_alive() && self.fire_cooldown == 0
    }

    /// Adopt the health left by this tick's hits.
    ///
    /// A hit that kills counts a death and starts the respawn timer.
    pub fn commit_health(&mut self, health: DamageCapability) {
        let was_alive = self.is_alive();
        self.health = health;
        if was_alive && !self.is_alive() {
            self.deaths += 1;
            self.respawn_timer = Self::RESPAWN_DELAY;
            log::debug!("player {} died", self.id);
        }
    }

    /// Check if the player is dead and has waited out the respawn delay.
    #[inline]
    pub fn ready_to_respawn(&self) -> bool {
        !self.is_alive() && self.respawn_timer == 0
    }

    /// Respawn the player at a new position.
    pub fn respawn(&mut self, position: Vec3, facing: f32) {
        self.health = DamageCapability::new(self.health.max_health);
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.view_angles = (0.0, facing);
        self.grounded = false;
        self.ground_normal = Vec3::Z;
        self.fire_cooldown = 0;
        self.respawn_timer = 0;
    }

    /// Update per-tick timers.
    pub fn update_timers(&mut self) {
        self.fire_cooldown = self.fire_cooldown.saturating_sub(1);
        self.respawn_timer = self.respawn_timer.saturating_sub(1);
    }
}

/// Player movement controller.
///
/// Handles:
/// - View angles
/// - Ground and air friction/acceleration
/// - Gravity and jumping
/// - Collision response via [`slide_move`]
///
/// # Example
///
/// ```ignore
/// let controller = PlayerController::new(MovementConfig::default());
///
/// // Each tick:
/// controller.update(&mut player, &command, &scene, delta_time);
/// ```
#[derive(Debug, Clone)]
pub struct PlayerController {
    pub config: MovementConfig,
}

impl PlayerController {
    pub fn new(config: MovementConfig) -> Self {
        Self { config }
    }

    /// Collision shape for players.
    pub fn shape(&self) -> TraceShape {
        TraceShape::Cylinder {
            radius: self.config.player_radius,
            height: self.config.player_height,
        }
    }

    /// Update player movement for one tick.
    ///
    /// Returns what the slide move ran into, or `None` for dead players.
    pub fn update(
        &self,
        player: &mut Player,
        command: &PlayerCommand,
        scene: &CollisionScene<'_>,
        delta_time: f32,
    ) -> Option<SlideOutcome> {
        if !player.is_alive() {
            return None;
        }

        self.update_view_angles(player, command);

        if player.grounded && command.wants_jump() {
            player.velocity.z = self.config.jump_velocity;
            player.grounded = false;
        }

        let (friction, acceleration) = if player.grounded {
            (self.config.ground_friction, self.config.ground_acceleration)
        } else {
            (self.config.air_friction, self.config.air_acceleration)
        };

        apply_friction(&mut player.velocity, friction, self.config.stop_speed, delta_time);

        let (wish_direction, wish_speed) = self.wish_velocity(player, command);
        accelerate(
            &mut player.velocity,
            wish_direction,
            wish_speed,
            acceleration,
            delta_time,
        );

        player.velocity.z -= self.config.gravity * delta_time;

        let filter = TraceFilter::new(ContentFlags::MASK_MOVER_SOLID, Some(player.id));
        let outcome = slide_move(
            scene,
            &filter,
            &mut player.position,
            &mut player.velocity,
            self.shape(),
            delta_time,
            &self.config,
        );

        if outcome.grounded && !player.grounded {
            log::trace!("player {} landed at {:?}", player.id, player.position);
        }
        player.grounded = outcome.grounded;
        player.ground_normal = outcome.ground_normal.unwrap_or(Vec3::Z);

        Some(outcome)
    }

    fn update_view_angles(&self, player: &mut Player, command: &PlayerCommand) {
        const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

        let (pitch, yaw) = player.view_angles;
        let pitch = (pitch + command.view_delta.0).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        // Normalize yaw to -PI..PI
        let mut yaw = yaw + command.view_delta.1;
        while yaw > std::f32::consts::PI {
            yaw -= std::f32::consts::TAU;
        }
        while yaw < -std::f32::consts::PI {
            yaw += std::f32::consts::TAU;
        }

        player.view_angles = (pitch, yaw);
    }

    fn wish_velocity(&self, player: &Player, command: &PlayerCommand) -> (Vec3, f32) {
        let wish = player.forward_direction() * command.forward_move
            + player.right_direction() * command.right_move;

        let speed_squared = wish.length_squared();
        if speed_squared < 0.0001 {
            return (Vec3::ZERO, 0.0);
        }

        let input_magnitude = command.forward_move.abs().max(command.right_move.abs()).min(1.0);
        let wish_speed = self.config.max_speed(command.wants_sprint()) * input_magnitude;

        (wish / speed_squared.sqrt(), wish_speed)
    }
}

/// Slow the horizontal velocity.
///
/// Speeds below `stop_speed` lose as much as if moving at `stop_speed`, so
/// bodies come to rest instead of creeping.
pub(crate) fn apply_friction(velocity: &mut Vec3, friction: f32, stop_speed: f32, delta_time: f32) {
    let horizontal = velocity.truncate();
    let speed = horizontal.length();
    if speed < 1.0e-3 {
        velocity.x = 0.0;
        velocity.y = 0.0;
        return;
    }

    let control = speed.max(stop_speed);
    let new_speed = (speed - control * friction * delta_time).max(0.0);
    let scaled = horizontal * (new_speed / speed);
    velocity.x = scaled.x;
    velocity.y = scaled.y;
}

/// Accelerate toward `wish_speed` along `wish_direction`.
pub(crate) fn accelerate(
    velocity: &mut Vec3,
    wish_direction: Vec3,
    wish_speed: f32,
    acceleration: f32,
    delta_time: f32,
) {
    if wish_direction.length_squared() < 0.0001 {
        return;
    }

    let add_speed = wish_speed - velocity.dot(wish_direction);
    if add_speed <= 0.0 {
        return;
    }

    let accel_speed = (acceleration * delta_time * wish_speed).min(add_speed);
    *velocity += wish_direction * accel_speed;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{CommandButtons, PlayerInput};
    use tracefall_physics::CollisionWorld;

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
    fn test_player_creation() {
        let player = Player::new(1, "Test".to_string(), Vec3::ZERO);
        assert!(player.is_alive());
        assert_eq!(player.health.health, 100);
        assert!(player.can_fire());
    }

    fn killed(player: &mut Player) {
        let mut health = player.health;
        health.take_damage(health.health);
        player.commit_health(health);
    }

    #[test]
    fn test_death_and_respawn() {
        let mut player = Player::new(1, "Test".to_string(), Vec3::ZERO);
        killed(&mut player);
        assert!(!player.is_alive());
        assert_eq!(player.deaths, 1);
        assert_eq!(player.respawn_timer, Player::RESPAWN_DELAY);

        // Committing the same dead health again is not another death.
        player.commit_health(player.health);
        assert_eq!(player.deaths, 1);

        let config = MovementConfig::default();
        let contents = player.descriptor(&config).collision.unwrap().contents;
        assert_eq!(contents, ContentFlags::CORPSE);

        for _ in 0..Player::RESPAWN_DELAY - 1 {
            player.update_timers();
        }
        assert!(!player.ready_to_respawn());
        player.update_timers();
        assert!(player.ready_to_respawn());

        player.respawn(Vec3::new(10.0, 0.0, 1.0), std::f32::consts::PI);
        assert!(player.is_alive());
        assert_eq!(player.position, Vec3::new(10.0, 0.0, 1.0));
        assert_eq!(player.view_angles.1, std::f32::consts::PI);
        assert!(!player.ready_to_respawn());
    }

    #[test]
    fn test_gravity() {
        let world = CollisionWorld::new();
        let scene = CollisionScene::walls_only(&world);
        let controller = PlayerController::new(MovementConfig::default());

        let mut player = Player::new(1, "Test".to_string(), Vec3::new(0.0, 0.0, 10.0));
        controller.update(&mut player, &PlayerCommand::default(), &scene, 0.1);

        assert!(player.velocity.z < 0.0, "Should be falling");
        assert!(player.position.z < 10.0);
        assert!(!player.grounded);
    }

    #[test]
    fn test_lands_and_stays_grounded() {
        let world = floor_world();
        let scene = CollisionScene::walls_only(&world);
        let controller = PlayerController::new(MovementConfig::default());

        let mut player = Player::new(1, "Test".to_string(), Vec3::new(0.0, 0.0, 0.5));
        for _ in 0..60 {
            controller.update(&mut player, &PlayerCommand::default(), &scene, 1.0 / 60.0);
        }

        assert!(player.grounded);
        assert!(player.position.z > 0.0 && player.position.z < 0.01, "z={}", player.position.z);
        assert_eq!(player.ground_normal, Vec3::Z);
    }

    #[test]
    fn test_forward_movement() {
        let world = floor_world();
        let scene = CollisionScene::walls_only(&world);
        let controller = PlayerController::new(MovementConfig::default());

        let mut player = Player::new(1, "Test".to_string(), Vec3::new(0.0, 0.0, 0.001));
        player.grounded = true;

        let mut input = PlayerInput::default();
        input.movement.forward = true;
        let command = input.to_command(1.0);

        for _ in 0..60 {
            controller.update(&mut player, &command, &scene, 1.0 / 60.0);
        }

        assert!(player.position.x > 1.0, "x={}", player.position.x);
        assert!(player.position.y.abs() < 1e-3);
        assert!(player.velocity.x <= controller.config.walk_speed + 1e-3);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let world = floor_world();
        let scene = CollisionScene::walls_only(&world);
        let controller = PlayerController::new(MovementConfig::default());

        let mut command = PlayerCommand::default();
        command.buttons.press(CommandButtons::JUMP);

        let mut airborne = Player::new(1, "Air".to_string(), Vec3::new(0.0, 0.0, 5.0));
        controller.update(&mut airborne, &command, &scene, 1.0 / 60.0);
        assert!(airborne.velocity.z < 0.0);

        let mut standing = Player::new(2, "Ground".to_string(), Vec3::new(0.0, 0.0, 0.001));
        standing.grounded = true;
        controller.update(&mut standing, &command, &scene, 1.0 / 60.0);
        assert!(standing.velocity.z > 0.0);
        assert!(standing.position.z > 0.05);
        assert!(!standing.grounded);
    }

    #[test]
    fn test_friction_stops_player() {
        let mut velocity = Vec3::new(0.5, 0.0, -2.0);
        for _ in 0..30 {
            apply_friction(&mut velocity, 8.0, 1.0, 1.0 / 60.0);
        }
        assert_eq!(velocity.x, 0.0);
        assert_eq!(velocity.z, -2.0);
    }

    #[test]
    fn test_dead_player_does_not_move() {
        let world = CollisionWorld::new();
        let scene = CollisionScene::walls_only(&world);
        let controller = PlayerController::new(MovementConfig::default());

        let mut player = Player::new(1, "Test".to_string(), Vec3::new(0.0, 0.0, 10.0));
        killed(&mut player);
        assert!(controller
            .update(&mut player, &PlayerCommand::default(), &scene, 0.1)
            .is_none());
        assert_eq!(player.position.z, 10.0);
    }
}

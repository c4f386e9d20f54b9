//! Game simulation - the fixed-step loop.
//!
//! One tick steps every entity in order: players, then enemies, then
//! projectiles. Each mover sees the body snapshot as left by the movers
//! before it, so two bodies never claim the same space in one tick.
//!
//! Damage goes through each entity's [`EntityDescriptor`]: impacts land on
//! the descriptor's damage capability, and the resulting health is committed
//! back to the entities at the end of the tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracefall_physics::{BodySnapshot, CollisionScene, EntityId, HitTarget, MovementConfig};

use crate::enemy::{Enemy, EnemyConfig, EnemyController};
use crate::entity::EntityDescriptor;
use crate::input::PlayerInput;
use crate::level::{Level, SpawnType};
use crate::player::{Player, PlayerController};
use crate::projectile::{ImpactEvent, Projectile, ProjectileConfig, ProjectileStep};

/// Game simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation tick rate (ticks per second).
    pub tick_rate: u32,

    /// Movement physics configuration.
    pub movement: MovementConfig,

    pub enemy: EnemyConfig,

    pub projectile: ProjectileConfig,

    /// Mouse sensitivity.
    pub mouse_sensitivity: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            movement: MovementConfig::default(),
            enemy: EnemyConfig::default(),
            projectile: ProjectileConfig::default(),
            mouse_sensitivity: 2.0,
        }
    }
}

impl SimulationConfig {
    /// Get the time step per tick in seconds.
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}

/// The main game simulation.
#[derive(Debug)]
pub struct Simulation {
    /// Current tick number.
    pub frame: u64,

    pub config: SimulationConfig,

    pub level: Level,

    pub players: Vec<Player>,

    pub enemies: Vec<Enemy>,

    pub projectiles: Vec<Projectile>,

    /// Impacts produced by the last tick.
    pub impacts: Vec<ImpactEvent>,

    player_controller: PlayerController,

    enemy_controller: EnemyController,

    /// Next entity ID to assign.
    next_entity_id: EntityId,
}

impl Simulation {
    /// Create a new simulation with the given configuration and level.
    pub fn new(config: SimulationConfig, level: Level) -> Self {
        let player_controller = PlayerController::new(config.movement.clone());
        let enemy_controller = EnemyController::new(config.enemy.clone(), config.movement.clone());

        Self {
            frame: 0,
            config,
            level,
            players: Vec::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            impacts: Vec::new(),
            player_controller,
            enemy_controller,
            next_entity_id: 1,
        }
    }

    /// Create a simulation with default configuration and test arena.
    pub fn test() -> Self {
        Self::new(SimulationConfig::default(), Level::test_arena())
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    /// Add a player at the next player spawn point.
    ///
    /// Returns the player's ID.
    pub fn add_player(&mut self, name: &str) -> EntityId {
        let id = self.allocate_id();
        let (position, facing) = self.player_spawn(self.players.len());

        let mut player = Player::new(id, name.to_string(), position);
        player.view_angles.1 = facing;

        log::debug!("player {} ({}) joined at {:?}", id, name, position);
        self.players.push(player);
        id
    }

    /// Add an enemy at `position`.
    pub fn add_enemy(&mut self, position: Vec3) -> EntityId {
        let id = self.allocate_id();
        self.enemies
            .push(Enemy::new(id, position, &self.enemy_controller.config));
        id
    }

    /// Add an enemy at every enemy spawn point.
    pub fn spawn_enemies(&mut self) -> usize {
        let positions: Vec<Vec3> = self
            .level
            .spawns(SpawnType::Enemy)
            .map(|s| s.position)
            .collect();
        for position in &positions {
            self.add_enemy(*position);
        }
        positions.len()
    }

    /// Spawn position and facing for the player in `slot`.
    fn player_spawn(&self, slot: usize) -> (Vec3, f32) {
        let count = self.level.player_spawn_count().max(1);
        self.level
            .get_player_spawn(slot % count)
            .map_or((Vec3::ZERO, 0.0), |s| (s.position, s.facing))
    }

    /// Get a player by ID.
    pub fn get_player(&self, player_id: EntityId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// Get an enemy by ID.
    pub fn get_enemy(&self, enemy_id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == enemy_id)
    }

    /// Capabilities of every player and enemy, in stepping order.
    pub fn descriptors(&self) -> Vec<EntityDescriptor> {
        let movement = &self.config.movement;
        let enemy = &self.enemy_controller.config;

        self.players
            .iter()
            .map(|p| p.descriptor(movement))
            .chain(self.enemies.iter().map(|e| e.descriptor(enemy)))
            .collect()
    }

    /// Bodies of everything that collides, in stepping order.
    ///
    /// Bodies are stationary here; the tick fills in displacements once
    /// every mover has moved.
    pub fn body_snapshots(&self) -> Vec<BodySnapshot> {
        self.snapshot(&self.descriptors())
    }

    fn snapshot(&self, descriptors: &[EntityDescriptor]) -> Vec<BodySnapshot> {
        let positions = self
            .players
            .iter()
            .map(|p| p.position)
            .chain(self.enemies.iter().map(|e| e.position));

        descriptors
            .iter()
            .zip(positions)
            .filter_map(|(descriptor, position)| descriptor.snapshot(position, Vec3::ZERO))
            .collect()
    }

    /// Advance the simulation by one tick.
    ///
    /// # Arguments
    ///
    /// * `inputs` - Player inputs indexed by player position in the `players` array
    pub fn tick(&mut self, inputs: &[PlayerInput]) {
        let delta_time = self.config.delta_time();
        self.respawn_players();

        let mut descriptors = self.descriptors();
        let mut bodies = self.snapshot(&descriptors);
        let starts: Vec<Vec3> = bodies.iter().map(|b| b.position).collect();
        self.impacts.clear();

        // Players, then enemies, fill `bodies` in order.
        let mut fired = Vec::new();
        for (i, player) in self.players.iter_mut().enumerate() {
            let input = inputs.get(i).cloned().unwrap_or_default();
            let command = input.to_command(self.config.mouse_sensitivity);

            let scene = CollisionScene::new(&self.level.collision, &bodies);
            self.player_controller
                .update(player, &command, &scene, delta_time);
            bodies[i].position = player.position;

            player.update_timers();

            if player.can_fire() && (command.wants_fire() || command.wants_alt_fire()) {
                player.fire_cooldown = Player::FIRE_RATE;
                fired.push((
                    player.id,
                    player.eye_position(),
                    player.look_direction(),
                    command.wants_alt_fire(),
                ));
            }
        }

        let targets: Vec<Vec3> = self
            .players
            .iter()
            .filter(|p| p.is_alive())
            .map(|p| p.position)
            .collect();
        let offset = self.players.len();
        for (i, enemy) in self.enemies.iter_mut().enumerate() {
            enemy.target = nearest(enemy.position, &targets);

            let scene = CollisionScene::new(&self.level.collision, &bodies);
            self.enemy_controller.update(enemy, &scene, delta_time);
            bodies[offset + i].position = enemy.position;
        }

        for (owner, origin, direction, rocket) in fired {
            let id = self.allocate_id();
            let config = &self.config.projectile;
            let projectile = if rocket {
                Projectile::rocket(id, owner, origin, direction, config)
            } else {
                Projectile::bullet(id, owner, origin, direction, config)
            };
            self.projectiles.push(projectile);
        }

        // Projectiles see each mover sweeping from where it started to where
        // it ended up, so a bullet can catch a body crossing its path.
        for (body, start) in bodies.iter_mut().zip(starts) {
            body.displacement = body.position - start;
            body.position = start;
        }

        let mut impulses = vec![Vec3::ZERO; descriptors.len()];
        for (impact, damage, knockback) in self.step_projectiles(&bodies, delta_time) {
            apply_impact(&mut descriptors, &mut impulses, &impact, damage, knockback);
            self.impacts.push(impact);
        }
        self.commit_hits(&descriptors, &impulses);

        self.enemies.retain(|e| e.is_alive());
        self.frame += 1;

        log::trace!(
            "tick {}: {} players, {} enemies, {} projectiles, {} impacts",
            self.frame,
            self.players.len(),
            self.enemies.len(),
            self.projectiles.len(),
            self.impacts.len()
        );
    }

    /// Advance every projectile, dropping the ones that hit or expired.
    ///
    /// Returns each impact with the damage and knockback it carries.
    fn step_projectiles(
        &mut self,
        bodies: &[BodySnapshot],
        delta_time: f32,
    ) -> Vec<(ImpactEvent, i32, f32)> {
        let world = &self.level.collision;
        let mut impacts = Vec::new();

        self.projectiles.retain_mut(|projectile| {
            match projectile.step(world, bodies, delta_time) {
                ProjectileStep::Flying => true,
                ProjectileStep::Impact(event) => {
                    impacts.push((event, projectile.damage, projectile.knockback));
                    false
                }
                ProjectileStep::Expired => false,
            }
        });
        impacts
    }

    /// Write the health and knockback gathered in `descriptors` back to the
    /// entities they were built from.
    fn commit_hits(&mut self, descriptors: &[EntityDescriptor], impulses: &[Vec3]) {
        let (player_hits, enemy_hits) = descriptors.split_at(self.players.len());
        let (player_pushes, enemy_pushes) = impulses.split_at(self.players.len());

        for ((player, descriptor), push) in
            self.players.iter_mut().zip(player_hits).zip(player_pushes)
        {
            if let Some(health) = descriptor.damage {
                player.commit_health(health);
            }
            player.velocity += *push;
        }
        for ((enemy, descriptor), push) in
            self.enemies.iter_mut().zip(enemy_hits).zip(enemy_pushes)
        {
            if let Some(health) = descriptor.damage {
                enemy.health = health;
            }
            enemy.velocity += *push;
        }
    }

    /// Bring back dead players whose respawn delay has run out.
    fn respawn_players(&mut self) {
        for slot in 0..self.players.len() {
            if self.players[slot].ready_to_respawn() {
                let (position, facing) = self.player_spawn(slot);
                let player = &mut self.players[slot];
                player.respawn(position, facing);
                log::debug!("player {} respawned at {:?}", player.id, position);
            }
        }
    }

    /// Get the delta time for this simulation.
    pub fn delta_time(&self) -> f32 {
        self.config.delta_time()
    }
}

/// Apply one impact to the descriptor of whatever it hit.
///
/// Only damageable targets are affected: they lose health and are pushed
/// away from the projectile, along the negated contact normal.
fn apply_impact(
    descriptors: &mut [EntityDescriptor],
    impulses: &mut [Vec3],
    impact: &ImpactEvent,
    damage: i32,
    knockback: f32,
) {
    let HitTarget::Body(target) = impact.target else {
        return;
    };
    let Some(index) = descriptors.iter().position(|d| d.id == target) else {
        return;
    };
    if !descriptors[index].is_damageable() {
        return;
    }

    let dealt = descriptors[index].take_damage(damage);
    impulses[index] -= impact.normal * knockback;
    log::debug!("entity {} took {} damage", target, dealt);
}

fn nearest(from: Vec3, targets: &[Vec3]) -> Option<Vec3> {
    targets
        .iter()
        .copied()
        .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::DamageCapability;
    use crate::level::SpawnPoint;
    use tracefall_physics::ContentFlags;

    /// A flat floor with player spawns at the origin facing +X and 8 units
    /// down range facing back.
    fn firing_range() -> Level {
        let mut level = Level::new("range", "Firing Range");
        level.add_quad(
            Vec3::new(-50.0, -50.0, 0.0),
            Vec3::new(50.0, -50.0, 0.0),
            Vec3::new(50.0, 50.0, 0.0),
            Vec3::new(-50.0, 50.0, 0.0),
        );
        level.spawn_points.push(SpawnPoint {
            position: Vec3::new(0.0, 0.0, 0.001),
            facing: 0.0,
            spawn_type: SpawnType::Player,
        });
        level.spawn_points.push(SpawnPoint {
            position: Vec3::new(8.0, 0.0, 0.001),
            facing: std::f32::consts::PI,
            spawn_type: SpawnType::Player,
        });
        level
    }

    #[test]
    fn test_simulation_creation() {
        let sim = Simulation::test();
        assert_eq!(sim.frame, 0);
        assert!(sim.players.is_empty());
        assert!(sim.body_snapshots().is_empty());
    }

    #[test]
    fn test_add_player() {
        let mut sim = Simulation::test();

        let id = sim.add_player("Player1");
        assert!(id > 0);
        assert_eq!(sim.players.len(), 1);

        let player = sim.get_player(id).unwrap();
        assert_eq!(player.name, "Player1");
        assert!(player.is_alive());
        assert_eq!(sim.body_snapshots().len(), 1);
    }

    #[test]
    fn test_tick_advances_frame() {
        let mut sim = Simulation::test();
        sim.add_player("Test");

        sim.tick(&[PlayerInput::default()]);
        assert_eq!(sim.frame, 1);

        sim.tick(&[]);
        assert_eq!(sim.frame, 2);
    }

    #[test]
    fn test_player_settles_on_floor() {
        let mut sim = Simulation::test();
        let id = sim.add_player("Test");

        for _ in 0..60 {
            sim.tick(&[]);
        }

        let player = sim.get_player(id).unwrap();
        assert!(player.grounded);
        assert!(player.position.z > 0.0 && player.position.z < 0.01, "z={}", player.position.z);
    }

    #[test]
    fn test_movement_input() {
        let mut sim = Simulation::test();
        let id = sim.add_player("Test");

        let start_pos = sim.get_player(id).unwrap().position;

        let mut input = PlayerInput::default();
        input.movement.forward = true;

        for _ in 0..60 {
            sim.tick(&[input.clone()]);
        }

        let end_pos = sim.get_player(id).unwrap().position;
        let distance = (end_pos - start_pos).length();

        assert!(distance > 1.0, "Player should have moved, distance={}", distance);
    }

    #[test]
    fn test_enemies_close_in() {
        let mut sim = Simulation::test();
        let id = sim.add_player("Target");
        assert_eq!(sim.spawn_enemies(), 2);

        let target = sim.get_player(id).unwrap().position;
        let before: Vec<f32> = sim.enemies.iter().map(|e| e.position.distance(target)).collect();

        for _ in 0..120 {
            sim.tick(&[]);
        }

        for (enemy, start) in sim.enemies.iter().zip(before) {
            assert!(enemy.position.distance(target) < start - 1.0);
            assert!(enemy.grounded);
        }
    }

    #[test]
    fn test_bullets_kill_enemy() {
        let mut sim = Simulation::new(SimulationConfig::default(), firing_range());
        let shooter = sim.add_player("Shooter");
        let enemy = sim.add_enemy(Vec3::new(10.0, 0.0, 0.001));

        let mut input = PlayerInput::default();
        input.actions.fire = true;

        let mut hits = 0;
        for _ in 0..120 {
            sim.tick(&[input.clone()]);
            hits += sim
                .impacts
                .iter()
                .filter(|i| i.target == HitTarget::Body(enemy))
                .count();
        }

        assert!(hits >= 6, "hits={hits}");
        assert!(sim.get_enemy(enemy).is_none());
        assert!(sim.get_player(shooter).unwrap().is_alive());
    }

    #[test]
    fn test_rocket_knocks_back_enemy() {
        let mut sim = Simulation::new(SimulationConfig::default(), firing_range());
        sim.add_player("Shooter");
        let enemy = sim.add_enemy(Vec3::new(6.0, 0.0, 0.001));
        sim.enemy_controller.config.speed = 0.0;

        let mut input = PlayerInput::default();
        input.actions.alt_fire = true;
        sim.tick(&[input]);

        let mut hit = false;
        for _ in 0..30 {
            sim.tick(&[]);
            if sim.impacts.iter().any(|i| i.target == HitTarget::Body(enemy)) {
                hit = true;
                break;
            }
        }

        assert!(hit);
        let enemy = sim.get_enemy(enemy).unwrap();
        assert_eq!(enemy.health.health, 60 - 50);
        assert!(enemy.velocity.x > 0.0);
    }

    #[test]
    fn test_impacts_land_on_damage_capability_only() {
        let mut descriptors = vec![
            EntityDescriptor::new(1).with_collision(0.5, 1.9, ContentFlags::MONSTER_BODY),
            EntityDescriptor::new(2).with_damage(DamageCapability::new(20)),
        ];
        let mut impulses = vec![Vec3::ZERO; 2];
        let hit = |target| ImpactEvent {
            projectile: 9,
            target,
            point: Vec3::ZERO,
            normal: Vec3::NEG_X,
        };

        apply_impact(&mut descriptors, &mut impulses, &hit(HitTarget::Wall(0)), 10, 2.0);
        apply_impact(&mut descriptors, &mut impulses, &hit(HitTarget::Body(1)), 10, 2.0);
        assert!(descriptors[0].damage.is_none());
        assert_eq!(impulses[0], Vec3::ZERO);

        apply_impact(&mut descriptors, &mut impulses, &hit(HitTarget::Body(2)), 15, 2.0);
        assert_eq!(descriptors[1].damage.map(|d| d.health), Some(5));
        assert_eq!(impulses[1], Vec3::new(2.0, 0.0, 0.0));

        // The killing hit still pushes; hits on the dead do nothing.
        apply_impact(&mut descriptors, &mut impulses, &hit(HitTarget::Body(2)), 15, 2.0);
        apply_impact(&mut descriptors, &mut impulses, &hit(HitTarget::Body(2)), 15, 2.0);
        assert_eq!(descriptors[1].damage.map(|d| d.health), Some(0));
        assert_eq!(impulses[1], Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn test_rockets_have_no_body() {
        let mut sim = Simulation::new(SimulationConfig::default(), firing_range());
        sim.add_player("Shooter");
        sim.add_enemy(Vec3::new(-20.0, 0.0, 0.001));

        let mut input = PlayerInput::default();
        input.actions.alt_fire = true;
        sim.tick(&[input]);

        assert_eq!(sim.projectiles.len(), 1);
        assert_eq!(sim.body_snapshots().len(), 2);
        assert!(sim.body_snapshots().iter().all(|b| b.displacement == Vec3::ZERO));
    }

    #[test]
    fn test_shot_player_dies_and_respawns() {
        let mut sim = Simulation::new(SimulationConfig::default(), firing_range());
        let shooter = sim.add_player("Shooter");
        let target = sim.add_player("Target");
        let spawn = sim.get_player(target).unwrap().position;

        let mut fire = PlayerInput::default();
        fire.actions.fire = true;
        for _ in 0..300 {
            sim.tick(&[fire.clone(), PlayerInput::default()]);
            if !sim.get_player(target).unwrap().is_alive() {
                break;
            }
        }

        let down = sim.get_player(target).unwrap();
        assert!(!down.is_alive());
        assert_eq!(down.deaths, 1);
        assert_eq!(
            sim.body_snapshots()[1].contents,
            ContentFlags::CORPSE,
            "dead players leave a corpse"
        );

        for _ in 0..Player::RESPAWN_DELAY {
            sim.tick(&[]);
        }
        assert!(!sim.get_player(target).unwrap().is_alive());

        sim.tick(&[]);
        let back = sim.get_player(target).unwrap();
        assert!(back.is_alive());
        assert_eq!(back.health.health, back.health.max_health);
        assert_eq!(back.deaths, 1);
        assert!((back.position - spawn).truncate().length() < 1e-3);
        assert!(sim.get_player(shooter).unwrap().is_alive());
    }

    #[test]
    fn test_determinism() {
        let inputs: Vec<_> = (0..100)
            .map(|i| {
                let mut input = PlayerInput::default();
                input.movement.forward = i % 2 == 0;
                input.movement.right = i % 3 == 0;
                input.actions.jump = i % 10 == 0;
                input.actions.fire = i % 7 == 0;
                input
            })
            .collect();

        let run = || {
            let mut sim = Simulation::test();
            sim.add_player("Test");
            sim.spawn_enemies();
            for input in &inputs {
                sim.tick(&[input.clone()]);
            }
            sim.get_player(1).unwrap().position
        };

        let pos1 = run();
        let pos2 = run();

        assert!(
            (pos1 - pos2).length() < 0.0001,
            "Simulations should be deterministic: {:?} vs {:?}",
            pos1,
            pos2
        );
    }
}

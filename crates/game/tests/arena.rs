//! Whole-simulation behavior through the public API.

use glam::Vec3;
use tracefall_game::{
    Level, PlayerInput, Simulation, SimulationConfig, SpawnPoint, SpawnType,
};

/// A flat floor with two players facing each other ten meters apart.
fn duel_level() -> Level {
    let mut level = Level::new("duel", "Duel");
    level.add_quad(
        Vec3::new(-50.0, -50.0, 0.0),
        Vec3::new(50.0, -50.0, 0.0),
        Vec3::new(50.0, 50.0, 0.0),
        Vec3::new(-50.0, 50.0, 0.0),
    );
    for (x, facing) in [(-5.0, 0.0), (5.0, std::f32::consts::PI)] {
        level.spawn_points.push(SpawnPoint {
            position: Vec3::new(x, 0.0, 0.001),
            facing,
            spawn_type: SpawnType::Player,
        });
    }
    level
}

fn forward() -> PlayerInput {
    let mut input = PlayerInput::default();
    input.movement.forward = true;
    input
}

#[test]
fn test_players_do_not_pass_through_each_other() {
    let mut sim = Simulation::new(SimulationConfig::default(), duel_level());
    let a = sim.add_player("A");
    let b = sim.add_player("B");

    for _ in 0..180 {
        sim.tick(&[forward(), forward()]);

        let pa = sim.get_player(a).unwrap().position;
        let pb = sim.get_player(b).unwrap().position;
        assert!(pa.x < pb.x, "players swapped sides: {pa:?} {pb:?}");
        assert!((pb - pa).truncate().length() >= 0.8 - 1e-3);
    }

    let gap = sim.get_player(b).unwrap().position.x - sim.get_player(a).unwrap().position.x;
    assert!(gap < 0.85, "players should be pressed together, gap={gap}");
}

#[test]
fn test_player_stops_at_pillar() {
    let mut sim = Simulation::test();
    let id = sim.add_player("Runner");

    for _ in 0..600 {
        sim.tick(&[forward()]);
    }

    let player = sim.get_player(id).unwrap();
    // The central pillar's -X face is at x = -2.
    assert!(player.position.x <= -2.4 + 1e-3, "x={}", player.position.x);
    assert!(player.position.x > -2.5, "x={}", player.position.x);
    assert!(player.grounded);
    assert!(player.velocity.x.abs() < 1e-3);
}

#[test]
fn test_partial_config_uses_defaults() {
    let json = r#"{ "tick_rate": 30, "movement": { "gravity": 9.81 } }"#;
    let config: SimulationConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.tick_rate, 30);
    assert_eq!(config.movement.gravity, 9.81);
    assert_eq!(config.movement.max_iterations, 5);
    assert_eq!(config.projectile, SimulationConfig::default().projectile);

    let mut sim = Simulation::new(config, Level::test_arena());
    sim.add_player("Test");
    sim.tick(&[]);
    assert_eq!(sim.frame, 1);
}

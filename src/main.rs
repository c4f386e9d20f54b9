//! Tracefall - headless driver.
//!
//! Builds the test arena, adds two players and the arena's enemies, and runs
//! a scripted input sequence through the fixed-step simulation.
//!
//! ```text
//! tracefall [config.json] [ticks]
//! ```
//!
//! The optional config file is a JSON `SimulationConfig`; missing fields take
//! their defaults. Set `RUST_LOG` to change verbosity.

use std::path::Path;

use anyhow::{Context, Result};
use tracefall_game::{Level, PlayerInput, Simulation, SimulationConfig};

const DEFAULT_TICKS: u64 = 600;

fn main() -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("tracefall=info".parse()?))
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) if path != "-" => load_config(Path::new(&path))?,
        _ => SimulationConfig::default(),
    };
    let ticks = match args.next() {
        Some(ticks) => ticks
            .parse::<u64>()
            .with_context(|| format!("invalid tick count {ticks:?}"))?,
        None => DEFAULT_TICKS,
    };

    tracing::info!(
        "Starting Tracefall: {} ticks at {} Hz",
        ticks,
        config.tick_rate
    );

    let mut sim = Simulation::new(config, Level::test_arena());
    let runner = sim.add_player("Runner");
    let sentry = sim.add_player("Sentry");
    let enemies = sim.spawn_enemies();
    tracing::info!(
        "Level {} has {} walls, {} enemies",
        sim.level.name,
        sim.level.collision.wall_count(),
        enemies
    );

    let mut impacts = 0;
    for tick in 0..ticks {
        let inputs = [scripted_runner(tick), scripted_sentry(tick)];
        sim.tick(&inputs);
        impacts += sim.impacts.len();

        if tick % u64::from(sim.config.tick_rate.max(1)) == 0 {
            if let Some(player) = sim.get_player(runner) {
                tracing::debug!(
                    "tick {}: runner at {:?}, grounded={}",
                    tick,
                    player.position,
                    player.grounded
                );
            }
        }
    }

    for id in [runner, sentry] {
        if let Some(player) = sim.get_player(id) {
            tracing::info!(
                "{}: position={:?} health={} deaths={} grounded={}",
                player.name,
                player.position,
                player.health.health,
                player.deaths,
                player.grounded
            );
        }
    }
    tracing::info!(
        "Finished after {} ticks: {} enemies left, {} projectiles in flight, {} impacts",
        sim.frame,
        sim.enemies.len(),
        sim.projectiles.len(),
        impacts
    );

    Ok(())
}

fn load_config(path: &Path) -> Result<SimulationConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Runs laps: forward with periodic turns and jumps, sprinting half the time.
fn scripted_runner(tick: u64) -> PlayerInput {
    let mut input = PlayerInput::default();
    input.movement.forward = true;
    input.movement.right = (tick / 90) % 2 == 1;
    input.actions.sprint = (tick / 120) % 2 == 0;
    input.actions.jump = tick % 75 == 0;
    if tick % 45 == 0 {
        input.mouse_delta = (120.0, 0.0);
    }
    input
}

/// Stands still, turning slowly and firing.
fn scripted_sentry(tick: u64) -> PlayerInput {
    let mut input = PlayerInput::default();
    input.mouse_delta = (8.0, 0.0);
    input.actions.fire = tick % 20 < 10;
    input.actions.alt_fire = tick % 240 == 0;
    input
}

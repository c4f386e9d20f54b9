//! Tracefall Game Logic
//!
//! The entities and fixed-step loop that drive `tracefall_physics`:
//!
//! - Players and their input
//! - Tracking enemies
//! - Bullets and rockets
//! - Level construction
//!
//! # Architecture
//!
//! Every tick the simulation builds a snapshot of all colliding bodies from
//! each entity's capabilities, then steps the entities one after another.
//! All movers share the same slide move; projectiles use the sweep queries
//! directly.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        Game Simulation                         │
//! │  ┌─────────┐    ┌──────────────┐    ┌──────────────────────┐  │
//! │  │ Input   │───►│ Slide move   │───►│ Players, enemies     │  │
//! │  │ Commands│    │ (physics)    │    │ projectiles, impacts │  │
//! │  └─────────┘    └──────────────┘    └──────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```

pub mod enemy;
pub mod entity;
pub mod input;
pub mod level;
pub mod player;
pub mod projectile;
pub mod simulation;

// Re-export main types
pub use enemy::{Enemy, EnemyConfig, EnemyController};
pub use entity::{CollisionCapability, DamageCapability, EntityDescriptor};
pub use input::{PlayerCommand, PlayerInput};
pub use level::{Level, LevelError, SpawnPoint, SpawnType};
pub use player::{Player, PlayerController};
pub use projectile::{ImpactEvent, Projectile, ProjectileConfig, ProjectileKind, ProjectileStep};
pub use simulation::{Simulation, SimulationConfig};

// Re-export physics types for convenience
pub use tracefall_physics::{
    BodySnapshot, CollisionWorld, ContentFlags, EntityId, HitTarget, MovementConfig, TraceResult,
    TraceShape,
};

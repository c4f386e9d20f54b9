//! Tracefall Physics
//!
//! Continuous collision queries and slide-move resolution for a real-time
//! action game. Every mobile thing in the game (players, tracking enemies,
//! bullets, rockets) is an upright cylinder or a point, and the level is a
//! static triangle soup.
//!
//! # Architecture
//!
//! The crate is split into two layers with a strict dependency order:
//!
//! - **Collision**: sweeps a shape (point or cylinder) along a straight
//!   displacement and reports the earliest fraction of that displacement at
//!   which it touches a wall or a dynamic body, plus the contact normal.
//! - **Movement**: repeatedly queries the collision layer, advances to the
//!   time of impact and clips the velocity against the contact, giving wall
//!   sliding and corner stopping.
//!
//! # Conventions
//!
//! Z is up. A body's position is the center of its cylinder's base, and the
//! body occupies `z..z + height`. Queries never fail: every degenerate branch
//! reports "no contact" (`fraction == 1.0`).

pub mod collision;
pub mod movement;

// Re-export commonly used types
pub use collision::{
    contact_skin, BodySnapshot, CollisionError, CollisionScene, CollisionWorld, ContentFlags,
    EntityId, HitTarget, TraceFilter, TraceResult, TraceShape, Triangle, CONTACT_EPSILON,
};
pub use movement::{clip_velocity, slide_move, MovementConfig, SlideOutcome};

//! Movement resolution on top of the collision queries.
//!
//! Every mobile entity (player, tracking enemies, rockets) runs the same
//! bounded slide loop each tick:
//!
//! - Trace along the remaining displacement
//! - Advance to the time of impact
//! - Clip the velocity against the contact normal so motion continues along it
//! - In a wedge, also clip against the previous normal so the body settles
//!
//! Ground detection is a policy on top: any contact whose normal points up
//! more than [`MovementConfig::terrain_tolerance`] marks the body grounded.

mod config;
mod slide_move;

pub use config::MovementConfig;
pub use slide_move::{clip_velocity, slide_move, SlideOutcome};

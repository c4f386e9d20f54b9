//! Load-time errors for collision geometry registration.
//!
//! Queries never fail; only bulk registration can reject malformed input.

use thiserror::Error;

/// Errors raised while registering static geometry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollisionError {
    #[error("triangle {triangle} references vertex {index} but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },
}

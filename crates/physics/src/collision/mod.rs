//! Swept collision queries against static triangles and dynamic cylinders.
//!
//! # Key Types
//!
//! - [`CollisionWorld`]: the static triangle soup, written once at level load
//! - [`BodySnapshot`]: read-only view of a dynamic body for one query
//! - [`TraceResult`]: fraction of the displacement completed plus the contact normal
//! - [`TraceShape`]: the shape being swept (point or upright cylinder)
//!
//! # Query Algorithm
//!
//! Every wall whose bounding box overlaps the swept shape's bounding box is
//! tested analytically: the triangle interior, its three edges and its three
//! vertices. Dynamic bodies are handled by summing radii so cylinder-vs-cylinder
//! reduces to point-vs-cylinder. The minimum fraction over all primitives wins;
//! on ties the primitive tested first keeps the contact.

mod body;
mod error;
mod flags;
mod geometry;
mod trace;
mod world;

pub use body::{BodySnapshot, EntityId};
pub use error::CollisionError;
pub use flags::ContentFlags;
pub use geometry::{contact_skin, Aabb, Triangle, CONTACT_EPSILON};
pub use trace::{HitTarget, TraceFilter, TraceResult, TraceShape};
pub use world::{CollisionScene, CollisionWorld};

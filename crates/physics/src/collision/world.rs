//! Collision world containing the static wall soup.
//!
//! Walls are registered once at level load and never change afterwards.
//! Dynamic bodies are not stored here; each query receives the current
//! tick's [`BodySnapshot`]s from the caller.

use glam::Vec3;

use super::body::BodySnapshot;
use super::error::CollisionError;
use super::geometry::{earliest, sweep_point_upright_cylinder, Aabb, Contact, Triangle};
use super::trace::{HitTarget, TraceFilter, TraceResult, TraceShape};

/// Squared displacement length below which a query is a no-op.
const MIN_DISPLACEMENT_SQ: f32 = 1.0e-12;

/// The static collision environment.
///
/// # Thread Safety
///
/// The world is read-only after level load, so shared references can be
/// handed to any number of queries.
#[derive(Debug, Default, Clone)]
pub struct CollisionWorld {
    /// Wall triangles in registration order.
    walls: Vec<Triangle>,
}

impl CollisionWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self { walls: Vec::new() }
    }

    /// Register one wall triangle.
    ///
    /// Returns the wall's index, which is what [`HitTarget::Wall`] reports.
    pub fn add_static_triangle(&mut self, v1: Vec3, v2: Vec3, v3: Vec3) -> usize {
        let triangle = Triangle::new(v1, v2, v3);
        if triangle.is_degenerate() {
            log::warn!("degenerate wall triangle {:?} {:?} {:?} will never collide", v1, v2, v3);
        }
        self.walls.push(triangle);
        self.walls.len() - 1
    }

    /// Register an indexed triangle mesh.
    ///
    /// Nothing is added if any index is out of range. Returns the number of
    /// triangles added.
    pub fn add_triangle_mesh(
        &mut self,
        vertices: &[Vec3],
        indices: &[[u32; 3]],
    ) -> Result<usize, CollisionError> {
        for (triangle, corner) in indices.iter().enumerate() {
            if let Some(&index) = corner.iter().find(|&&i| i as usize >= vertices.len()) {
                return Err(CollisionError::IndexOutOfRange {
                    triangle,
                    index,
                    vertex_count: vertices.len(),
                });
            }
        }

        for [a, b, c] in indices {
            self.add_static_triangle(
                vertices[*a as usize],
                vertices[*b as usize],
                vertices[*c as usize],
            );
        }
        log::debug!("added mesh with {} triangles", indices.len());
        Ok(indices.len())
    }

    /// Get the number of registered walls.
    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Sweep a point through the walls.
    ///
    /// Every wall whose bounding box overlaps the segment's bounding box is
    /// intersected with its plane and tested for containment. Returns the
    /// earliest contact.
    pub fn sweep_point(&self, origin: Vec3, displacement: Vec3) -> TraceResult {
        if displacement.length_squared() <= MIN_DISPLACEMENT_SQ {
            return TraceResult::no_hit();
        }

        let bounds = Aabb::swept(origin, displacement, 0.0, 0.0);
        let mut result = TraceResult::no_hit();

        for (index, wall) in self.candidates(&bounds) {
            if let Some(contact) = wall.sweep_point(origin, displacement) {
                result.keep_earliest(wall_hit(contact, index));
            }
        }

        log::trace!("sweep_point {:?} + {:?} -> {}", origin, displacement, result.fraction);
        result
    }

    /// Sweep an upright cylinder through the walls.
    ///
    /// For each candidate wall the interior is tested first, then the three
    /// edges, then the three corners. A later primitive only replaces the
    /// current contact if it is strictly earlier.
    pub fn sweep_cylinder(
        &self,
        origin: Vec3,
        displacement: Vec3,
        radius: f32,
        height: f32,
    ) -> TraceResult {
        if displacement.length_squared() <= MIN_DISPLACEMENT_SQ {
            return TraceResult::no_hit();
        }

        let bounds = Aabb::swept(origin, displacement, radius, height);
        let mut result = TraceResult::no_hit();

        for (index, wall) in self.candidates(&bounds) {
            let face = wall.sweep_cylinder_face(origin, displacement, radius, height);
            let edges = wall.sweep_cylinder_edges(origin, displacement, radius, height);
            let corners = wall.sweep_cylinder_vertices(origin, displacement, radius, height);

            if let Some(contact) = earliest(earliest(face, edges), corners) {
                result.keep_earliest(wall_hit(contact, index));
            }
        }

        log::trace!(
            "sweep_cylinder {:?} + {:?} (r={}, h={}) -> {}",
            origin,
            displacement,
            radius,
            height,
            result.fraction
        );
        result
    }

    /// Sweep an upright cylinder against dynamic bodies.
    ///
    /// Each body is treated as an upright cylinder. Summing the two radii and
    /// widening the body's span by the mover's height reduces the problem to a
    /// point (the mover's base center) against one cylinder. Like
    /// [`sweep_point_body`](Self::sweep_point_body), each test runs in the
    /// body's rest frame, so a body with a displacement is hit where it is
    /// at the time of contact.
    pub fn sweep_cylinder_bodies(
        &self,
        origin: Vec3,
        displacement: Vec3,
        radius: f32,
        height: f32,
        bodies: &[BodySnapshot],
        filter: &TraceFilter,
    ) -> TraceResult {
        if displacement.length_squared() <= MIN_DISPLACEMENT_SQ {
            return TraceResult::no_hit();
        }

        let mut result = TraceResult::no_hit();
        for body in bodies.iter().filter(|b| filter.accepts(b.id, b.contents)) {
            let relative = displacement - body.displacement;
            if relative.length_squared() <= MIN_DISPLACEMENT_SQ {
                continue;
            }
            let contact = sweep_point_upright_cylinder(
                origin,
                relative,
                body.position,
                radius + body.radius,
                body.position.z - height,
                body.top(),
            );
            if let Some(contact) = contact {
                result.keep_earliest(TraceResult::hit(
                    contact.t,
                    contact.normal,
                    HitTarget::Body(body.id),
                ));
            }
        }
        result
    }

    /// Sweep a point against one moving body.
    ///
    /// Solved in the target's rest frame: the target's own displacement is
    /// subtracted from the bullet's, so a moving bullet can hit a moving target.
    pub fn sweep_point_body(
        &self,
        origin: Vec3,
        displacement: Vec3,
        target: &BodySnapshot,
    ) -> TraceResult {
        let relative = displacement - target.displacement;
        if relative.length_squared() <= MIN_DISPLACEMENT_SQ {
            return TraceResult::no_hit();
        }

        sweep_point_upright_cylinder(
            origin,
            relative,
            target.position,
            target.radius,
            target.position.z,
            target.top(),
        )
        .map_or_else(TraceResult::no_hit, |contact| {
            TraceResult::hit(contact.t, contact.normal, HitTarget::Body(target.id))
        })
    }

    /// Sweep any shape through walls and then bodies.
    ///
    /// Walls are tested first so a body contact only wins when it is strictly
    /// earlier.
    pub fn trace(
        &self,
        origin: Vec3,
        displacement: Vec3,
        shape: TraceShape,
        bodies: &[BodySnapshot],
        filter: &TraceFilter,
    ) -> TraceResult {
        let mut result = match shape {
            TraceShape::Point => self.sweep_point(origin, displacement),
            TraceShape::Cylinder { radius, height } => {
                self.sweep_cylinder(origin, displacement, radius, height)
            }
        };

        if !bodies.is_empty() {
            result.keep_earliest(self.sweep_cylinder_bodies(
                origin,
                displacement,
                shape.radius(),
                shape.height(),
                bodies,
                filter,
            ));
        }
        result
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    /// Walls whose bounds overlap `bounds`.
    fn candidates<'a>(&'a self, bounds: &'a Aabb) -> impl Iterator<Item = (usize, &'a Triangle)> + 'a {
        self.walls
            .iter()
            .enumerate()
            .filter(move |(_, wall)| !wall.is_degenerate() && wall.bounds.overlaps(bounds))
    }
}

fn wall_hit(contact: Contact, index: usize) -> TraceResult {
    TraceResult::hit(contact.t, contact.normal, HitTarget::Wall(index))
}

/// A collision world paired with one tick's dynamic bodies.
///
/// This is what movers query: the static soup plus whoever else is alive.
#[derive(Debug, Clone, Copy)]
pub struct CollisionScene<'a> {
    pub world: &'a CollisionWorld,
    pub bodies: &'a [BodySnapshot],
}

impl<'a> CollisionScene<'a> {
    /// Pair a world with a body snapshot.
    pub fn new(world: &'a CollisionWorld, bodies: &'a [BodySnapshot]) -> Self {
        Self { world, bodies }
    }

    /// A scene with walls only.
    pub fn walls_only(world: &'a CollisionWorld) -> Self {
        Self { world, bodies: &[] }
    }

    /// Trace a shape through walls and bodies.
    pub fn trace(
        &self,
        origin: Vec3,
        displacement: Vec3,
        shape: TraceShape,
        filter: &TraceFilter,
    ) -> TraceResult {
        self.world
            .trace(origin, displacement, shape, self.bodies, filter)
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Slide move algorithm for collision response.
//!
//! Advances a body along its velocity, stopping at each contact and clipping
//! the velocity so the remaining motion slides along the surface. A wedge
//! between two surfaces is resolved by also clipping against the previous
//! contact normal.

use glam::Vec3;

use crate::collision::{CollisionScene, TraceFilter, TraceResult, TraceShape};

use super::config::MovementConfig;

/// Normals closer than this (by dot product) count as the same surface.
const SAME_NORMAL_DOT: f32 = 1.0 - 1.0e-4;

/// What a slide move did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlideOutcome {
    /// The last trace consumed the remaining displacement unobstructed.
    pub completed: bool,

    /// Traces performed.
    pub iterations: usize,

    /// Some contact normal was steep enough to stand on.
    pub grounded: bool,

    /// Normal of the last walkable contact.
    pub ground_normal: Option<Vec3>,

    /// The iteration cap ran out and the velocity was zeroed.
    pub blocked: bool,

    /// Every contact hit along the way, in order.
    pub contacts: Vec<TraceResult>,
}

impl SlideOutcome {
    /// Check whether anything was touched during the move.
    #[inline]
    pub fn touched(&self) -> bool {
        !self.contacts.is_empty()
    }
}

/// Clip velocity against a surface normal.
///
/// Removes the component of velocity along the normal so the remaining motion
/// is tangent to the surface.
#[inline]
pub fn clip_velocity(velocity: Vec3, normal: Vec3) -> Vec3 {
    velocity - normal * velocity.dot(normal)
}

/// Extra clip for a body wedged between two surfaces.
///
/// Takes the part of `previous` that is not along `normal` and removes the
/// velocity component along it as well, leaving only motion along the crease.
fn clip_corner(velocity: Vec3, previous: Vec3, normal: Vec3) -> Vec3 {
    let combined = (previous - normal * previous.dot(normal)).normalize_or_zero();
    velocity - combined * velocity.dot(combined)
}

/// Perform a slide move through a collision scene.
///
/// Each iteration:
/// 1. Traces `shape` along `velocity * delta_time * remaining`
/// 2. Advances to the time of impact unless already touching
/// 3. Stops if the trace completed
/// 4. Clips the velocity against the contact normal
/// 5. On a second consecutive stall against a different surface, clips
///    against the previous normal as well
/// 6. Shrinks `remaining` by the share that was consumed
///
/// If `config.max_iterations` traces never complete the move the velocity is
/// zeroed.
///
/// # Arguments
///
/// * `scene` - Walls plus this tick's dynamic bodies
/// * `filter` - Which bodies take part (usually ignores the mover itself)
/// * `position` - Base-center of the mover (will be updated)
/// * `velocity` - Current velocity (will be updated)
/// * `shape` - Mover collision shape
/// * `delta_time` - Time step in seconds
/// * `config` - Movement configuration
pub fn slide_move(
    scene: &CollisionScene<'_>,
    filter: &TraceFilter,
    position: &mut Vec3,
    velocity: &mut Vec3,
    shape: TraceShape,
    delta_time: f32,
    config: &MovementConfig,
) -> SlideOutcome {
    let mut outcome = SlideOutcome::default();
    let mut remaining = 1.0;
    let mut previous_normal: Option<Vec3> = None;
    let mut previous_stalled = false;

    for _ in 0..config.max_iterations {
        outcome.iterations += 1;

        let displacement = *velocity * delta_time * remaining;
        let trace = scene.trace(*position, displacement, shape, filter);
        let t = trace.fraction;

        if t >= config.min_progress {
            *position += displacement * t;
        }

        if !trace.hit_something() {
            outcome.completed = true;
            return outcome;
        }

        let normal = trace.normal;
        outcome.contacts.push(trace);
        if config.is_ground(normal) {
            outcome.grounded = true;
            outcome.ground_normal = Some(normal);
        }

        *velocity = clip_velocity(*velocity, normal);

        let stalled = t < config.min_progress;
        if stalled && previous_stalled {
            if let Some(previous) = previous_normal {
                if previous.dot(normal) < SAME_NORMAL_DOT {
                    *velocity = clip_corner(*velocity, previous, normal);
                }
            }
        }

        previous_normal = Some(normal);
        previous_stalled = stalled;
        remaining *= 1.0 - t;
    }

    log::trace!(
        "slide move exhausted {} iterations at {:?}, zeroing velocity",
        config.max_iterations,
        position
    );
    *velocity = Vec3::ZERO;
    outcome.blocked = true;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{contact_skin, BodySnapshot, CollisionWorld, ContentFlags};

    /// A large triangle in the plane `x = x`, facing -X, with edges far away.
    fn wall_at_x(world: &mut CollisionWorld, x: f32) {
        world.add_static_triangle(
            Vec3::new(x, -100.0, -50.0),
            Vec3::new(x, 100.0, -50.0),
            Vec3::new(x, 0.0, 100.0),
        );
    }

    fn floor_at_z(world: &mut CollisionWorld, z: f32) {
        world.add_static_triangle(
            Vec3::new(-100.0, -100.0, z),
            Vec3::new(100.0, -100.0, z),
            Vec3::new(0.0, 100.0, z),
        );
    }

    #[test]
    fn test_clip_velocity_wall() {
        let velocity = Vec3::new(10.0, 0.0, 5.0);
        let clipped = clip_velocity(velocity, Vec3::NEG_X);

        assert!(clipped.x.abs() < 0.01);
        assert!((clipped.z - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_clip_velocity_is_tangent() {
        let normal = Vec3::new(0.0, 1.0, 1.0).normalize();
        let clipped = clip_velocity(Vec3::new(3.0, -10.0, 2.0), normal);
        assert!(clipped.dot(normal).abs() < 1e-5);
        assert!((clipped.x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_clip_corner_leaves_crease_motion() {
        // Wedge between walls facing -X and -Y, sliding diagonally.
        let velocity = clip_velocity(Vec3::new(4.0, 4.0, 1.0), Vec3::NEG_Y);
        let clipped = clip_corner(velocity, Vec3::NEG_X, Vec3::NEG_Y);
        assert!(clipped.x.abs() < 1e-5);
        assert!(clipped.y.abs() < 1e-5);
        assert!((clipped.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_slide_move_no_collision() {
        let world = CollisionWorld::new();
        let scene = CollisionScene::walls_only(&world);
        let config = MovementConfig::default();

        let mut position = Vec3::ZERO;
        let mut velocity = Vec3::new(5.0, 0.0, 0.0);

        let outcome = slide_move(
            &scene,
            &TraceFilter::default(),
            &mut position,
            &mut velocity,
            TraceShape::PLAYER,
            1.0,
            &config,
        );

        assert!(outcome.completed);
        assert_eq!(outcome.iterations, 1);
        assert!(!outcome.touched());
        assert!((position.x - 5.0).abs() < 0.01);
        assert_eq!(velocity, Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_slide_move_along_wall() {
        let mut world = CollisionWorld::new();
        wall_at_x(&mut world, 5.0);
        let scene = CollisionScene::walls_only(&world);
        let config = MovementConfig::default();

        let mut position = Vec3::ZERO;
        let mut velocity = Vec3::new(10.0, 3.0, 0.0);

        let outcome = slide_move(
            &scene,
            &TraceFilter::default(),
            &mut position,
            &mut velocity,
            TraceShape::PLAYER,
            1.0,
            &config,
        );

        // Stopped a radius plus skin in front of the wall.
        let expected_x = 5.0 - 0.4 - contact_skin(Vec3::new(10.0, 3.0, 0.0).length());
        assert!((position.x - expected_x).abs() < 1e-5, "x={}", position.x);
        // Slid the rest of the way along the wall.
        assert!((position.y - 3.0).abs() < 1e-2, "y={}", position.y);
        assert!(velocity.x.abs() < 1e-4);
        assert!((velocity.y - 3.0).abs() < 1e-4);
        assert!(outcome.completed);
        assert!(!outcome.grounded);
        assert_eq!(outcome.contacts.len(), 1);
    }

    #[test]
    fn test_slide_move_lands_on_floor() {
        let mut world = CollisionWorld::new();
        floor_at_z(&mut world, 0.0);
        let scene = CollisionScene::walls_only(&world);
        let config = MovementConfig::default();

        let mut position = Vec3::new(0.0, 0.0, 1.0);
        let mut velocity = Vec3::new(2.0, 0.0, -4.0);

        let outcome = slide_move(
            &scene,
            &TraceFilter::default(),
            &mut position,
            &mut velocity,
            TraceShape::PLAYER,
            0.5,
            &config,
        );

        assert!(outcome.grounded);
        assert_eq!(outcome.ground_normal, Some(Vec3::Z));
        assert!(position.z > 0.0 && position.z < 0.01, "z={}", position.z);
        assert!(velocity.z.abs() < 1e-4);
        assert!((velocity.x - 2.0).abs() < 1e-4);
        assert!((position.x - 1.0).abs() < 1e-2, "x={}", position.x);
    }

    #[test]
    fn test_slide_move_blocked_by_body() {
        let world = CollisionWorld::new();
        let bodies = [
            BodySnapshot::new(1, Vec3::ZERO, 0.4, 1.8, ContentFlags::PLAYER_BODY),
            BodySnapshot::new(2, Vec3::new(3.0, 0.0, 0.0), 0.4, 1.8, ContentFlags::MONSTER_BODY),
        ];
        let scene = CollisionScene::new(&world, &bodies);
        let filter = TraceFilter::new(ContentFlags::MASK_MOVER_SOLID, Some(1));
        let config = MovementConfig::default();

        let mut position = Vec3::ZERO;
        let mut velocity = Vec3::new(4.0, 0.0, 0.0);

        let outcome = slide_move(
            &scene,
            &filter,
            &mut position,
            &mut velocity,
            TraceShape::PLAYER,
            1.0,
            &config,
        );

        // Stops with the radii summed.
        assert!((position.x - (3.0 - 0.8)).abs() < 1e-2, "x={}", position.x);
        assert_eq!(outcome.contacts[0].hit_entity(), Some(2));
        assert!(velocity.x.abs() < 1e-4);
    }

    #[test]
    fn test_slide_move_exhaustion_zeroes_velocity() {
        let mut world = CollisionWorld::new();
        wall_at_x(&mut world, 5.0);
        let scene = CollisionScene::walls_only(&world);
        let config = MovementConfig {
            max_iterations: 1,
            ..Default::default()
        };

        let mut position = Vec3::ZERO;
        let mut velocity = Vec3::new(10.0, 3.0, 0.0);

        let outcome = slide_move(
            &scene,
            &TraceFilter::default(),
            &mut position,
            &mut velocity,
            TraceShape::PLAYER,
            1.0,
            &config,
        );

        assert!(outcome.blocked);
        assert!(!outcome.completed);
        assert_eq!(velocity, Vec3::ZERO);
    }
}

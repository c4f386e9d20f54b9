//! Analytic swept-contact solvers.
//!
//! Every solver answers the same question for one primitive: given a shape at
//! `origin` moving by `displacement`, what is the earliest fraction of that
//! displacement at which it touches the primitive, and what is the contact
//! normal there. `None` means no contact within `[0, 1]`.
//!
//! Cylinders are upright: a cylinder at `origin` spans `origin.z` to
//! `origin.z + height` with its axis through `origin.xy`.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Buffer kept between a swept shape and the surface it stops against,
/// relative to the length of the shape's displacement.
///
/// Contacts are reported [`contact_skin`] in front of the surface. A shape up
/// to the same distance behind a surface it is still approaching reports an
/// immediate contact instead of tunneling through.
pub const CONTACT_EPSILON: f32 = 1.0e-4;

/// Absolute slack for rounding in stored positions, added to the allowance
/// behind a surface only.
const POSITION_SLACK: f32 = 1.0e-5;

/// Distance the buffer amounts to for a displacement of length `travel`.
#[inline]
pub fn contact_skin(travel: f32) -> f32 {
    CONTACT_EPSILON * travel
}

/// Squared lengths and determinants below this are treated as zero.
const NEAR_ZERO: f32 = 1.0e-12;

/// Minimum cosine between motion and contact normal for a contact to count.
///
/// Motion that only grazes a surface (rounding left over after clipping)
/// must not register as a fresh contact every iteration.
const GRAZE_COSINE: f32 = 1.0e-5;

/// Relative slack for the inside-triangle edge tests.
const INSIDE_TOLERANCE: f32 = 1.0e-5;

/// Slack for segment-parameter checks. Height-range checks use it the other
/// way: a side contact must lie this far inside the span, so geometry level
/// with a cylinder's cap never catches its side.
const RANGE_TOLERANCE: f32 = 1.0e-4;

/// A contact found by one primitive solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Contact {
    /// Skin-adjusted time of impact in `[0, 1)`.
    pub t: f32,
    /// Unit normal from the obstacle toward the swept shape.
    pub normal: Vec3,
}

/// Keep the earlier of two contacts; `current` wins ties.
#[inline]
pub(crate) fn earliest(current: Option<Contact>, candidate: Option<Contact>) -> Option<Contact> {
    match (current, candidate) {
        (Some(c), Some(n)) if n.t < c.t => Some(n),
        (None, n) => n,
        (c, _) => c,
    }
}

/// Solve the time at which a gap closes.
///
/// `gap` is the current distance in front of a surface and `closing` the rate
/// (per unit fraction) at which it shrinks; `travel` is the length of the
/// whole displacement. Returns the skin-adjusted time and the raw time at
/// which the gap reaches zero.
fn close_gap(gap: f32, closing: f32, travel: f32) -> Option<(f32, f32)> {
    if closing <= GRAZE_COSINE * travel || closing <= NEAR_ZERO {
        return None;
    }
    let skin = contact_skin(travel);
    if gap < -(skin + POSITION_SLACK) {
        return None;
    }
    let t = (gap - skin) / closing;
    if t >= 1.0 {
        return None;
    }
    Some((t.max(0.0), (gap / closing).max(0.0)))
}

// ============================================================================
// Bounding boxes
// ============================================================================

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Smallest box containing all `points`.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }
        Self { min, max }
    }

    /// Box swept by an upright cylinder (or point) over a displacement.
    pub fn swept(origin: Vec3, displacement: Vec3, radius: f32, height: f32) -> Self {
        let end = origin + displacement;
        let slack = contact_skin(displacement.length()) + POSITION_SLACK;
        let margin = Vec3::new(radius, radius, 0.0) + Vec3::splat(slack);
        Self {
            min: origin.min(end) - margin,
            max: origin.max(end) + margin + Vec3::new(0.0, 0.0, height),
        }
    }

    /// Check whether two boxes overlap (touching counts).
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

// ============================================================================
// Triangles
// ============================================================================

/// Coordinate plane a triangle is projected onto for inside tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Projection {
    /// Drop x, keep (y, z).
    Yz,
    /// Drop y, keep (z, x).
    Zx,
    /// Drop z, keep (x, y).
    Xy,
}

impl Projection {
    /// Pick the plane that maximizes the triangle's projected area.
    fn for_normal(normal: Vec3) -> Self {
        let a = normal.abs();
        if a.x >= a.y && a.x >= a.z {
            Self::Yz
        } else if a.y >= a.z {
            Self::Zx
        } else {
            Self::Xy
        }
    }

    #[inline]
    fn project(self, p: Vec3) -> Vec2 {
        match self {
            Self::Yz => Vec2::new(p.y, p.z),
            Self::Zx => Vec2::new(p.z, p.x),
            Self::Xy => Vec2::new(p.x, p.y),
        }
    }
}

/// An immutable wall triangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    /// Corners in world space.
    pub vertices: [Vec3; 3],
    /// Unit normal following the winding `v1 -> v2 -> v3`; zero if degenerate.
    pub normal: Vec3,
    /// Bounding box of the corners.
    pub bounds: Aabb,
    projection: Projection,
    /// Twice the signed area in the projection plane.
    projected_area: f32,
}

impl Triangle {
    /// Build a triangle and precompute everything queries need.
    pub fn new(v1: Vec3, v2: Vec3, v3: Vec3) -> Self {
        let normal = (v2 - v1).cross(v3 - v1).normalize_or_zero();
        let projection = Projection::for_normal(normal);
        let (a, b, c) = (
            projection.project(v1),
            projection.project(v2),
            projection.project(v3),
        );
        Self {
            vertices: [v1, v2, v3],
            normal,
            bounds: Aabb::from_points(&[v1, v2, v3]),
            projection,
            projected_area: (b - a).perp_dot(c - a),
        }
    }

    /// Zero-area triangles never produce contacts.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.normal == Vec3::ZERO
    }

    /// Edge `i` as a segment (`v[i]`, `v[i + 1]`).
    #[inline]
    pub fn edge(&self, i: usize) -> (Vec3, Vec3) {
        (self.vertices[i], self.vertices[(i + 1) % 3])
    }

    /// Check whether a point on the triangle's plane lies inside it.
    ///
    /// Projects onto the coordinate plane with the largest projected area and
    /// compares each edge's cross product with the triangle's own orientation.
    pub fn contains(&self, point: Vec3) -> bool {
        self.contains_within(point, INSIDE_TOLERANCE)
    }

    /// Like [`contains`](Self::contains), but the point must clear every edge
    /// by the tolerance. Boundary contacts are left to the edge solvers.
    fn contains_interior(&self, point: Vec3) -> bool {
        self.contains_within(point, -INSIDE_TOLERANCE)
    }

    fn contains_within(&self, point: Vec3, slack: f32) -> bool {
        let q = self.projection.project(point);
        let orientation = self.projected_area.signum();
        let tolerance = slack * self.projected_area.abs();

        (0..3).all(|i| {
            let (start, end) = self.edge(i);
            let s = self.projection.project(start);
            let e = self.projection.project(end);
            (e - s).perp_dot(q - s) * orientation >= -tolerance
        })
    }

    /// Plane normal turned to oppose `displacement`, or `None` if parallel.
    fn facing_normal(&self, displacement: Vec3) -> Option<Vec3> {
        let approach = self.normal.dot(displacement);
        if approach.abs() <= NEAR_ZERO {
            return None;
        }
        Some(if approach > 0.0 { -self.normal } else { self.normal })
    }

    /// Ray-plane solve for a single leading point.
    ///
    /// Returns the skin-adjusted time, the contact point on the plane and the
    /// facing normal.
    fn sweep_plane(&self, leading: Vec3, displacement: Vec3) -> Option<(f32, Vec3, Vec3)> {
        let normal = self.facing_normal(displacement)?;
        let gap = normal.dot(leading - self.vertices[0]);
        let closing = -normal.dot(displacement);
        let (t, raw) = close_gap(gap, closing, displacement.length())?;
        Some((t, leading + displacement * raw, normal))
    }

    /// Point sweep against the triangle interior.
    pub(crate) fn sweep_point(&self, origin: Vec3, displacement: Vec3) -> Option<Contact> {
        let (t, point, normal) = self.sweep_plane(origin, displacement)?;
        self.contains(point).then_some(Contact { t, normal })
    }

    /// Cylinder sweep against the triangle interior.
    ///
    /// The leading point sits `radius` toward the plane along the horizontal
    /// part of its normal; both cap heights are tried and the earlier hit
    /// inside the triangle wins.
    pub(crate) fn sweep_cylinder_face(
        &self,
        origin: Vec3,
        displacement: Vec3,
        radius: f32,
        height: f32,
    ) -> Option<Contact> {
        let facing = self.facing_normal(displacement)?;
        let horizontal = facing.truncate();
        let offset = if horizontal.length_squared() > NEAR_ZERO {
            -horizontal.normalize() * radius
        } else {
            Vec2::ZERO
        };

        let mut best = None;
        for cap in [0.0, height] {
            let leading = origin + offset.extend(cap);
            if let Some((t, point, normal)) = self.sweep_plane(leading, displacement) {
                if self.contains_interior(point) {
                    best = earliest(best, Some(Contact { t, normal }));
                }
            }
        }
        best
    }

    /// Cylinder sweep against the three edges.
    pub(crate) fn sweep_cylinder_edges(
        &self,
        origin: Vec3,
        displacement: Vec3,
        radius: f32,
        height: f32,
    ) -> Option<Contact> {
        (0..3).fold(None, |best, i| {
            let (a, b) = self.edge(i);
            earliest(best, sweep_cylinder_segment(origin, displacement, radius, height, a, b))
        })
    }

    /// Cylinder sweep against the three corners.
    pub(crate) fn sweep_cylinder_vertices(
        &self,
        origin: Vec3,
        displacement: Vec3,
        radius: f32,
        height: f32,
    ) -> Option<Contact> {
        self.vertices.iter().fold(None, |best, v| {
            earliest(
                best,
                sweep_point_upright_cylinder(origin, displacement, *v, radius, v.z - height, v.z),
            )
        })
    }
}

// ============================================================================
// Circle vs point (horizontal plane)
// ============================================================================

/// Earliest time a moving circle reaches a fixed point in 2D.
///
/// `relative` is circle center minus point at `t = 0` and `motion` the
/// center's displacement; `travel` is the length of the full 3D displacement
/// the skin is taken from. Returns the skin-adjusted time and the unit
/// direction from the point to the center at contact.
pub(crate) fn sweep_circle_point(
    relative: Vec2,
    motion: Vec2,
    radius: f32,
    travel: f32,
) -> Option<(f32, Vec2)> {
    let a = motion.length_squared();
    if a <= NEAR_ZERO {
        return None;
    }
    let half_b = relative.dot(motion);
    if half_b >= 0.0 {
        return None;
    }

    let skin = contact_skin(travel);
    let reach = radius + skin;
    let c = relative.length_squared() - reach * reach;
    let speed = a.sqrt();

    if c <= 0.0 {
        // Already within the skin: contact now, unless we are deep inside.
        let distance = relative.length();
        if distance < radius - skin - POSITION_SLACK {
            return None;
        }
        let direction = relative.try_normalize().unwrap_or(-motion / speed);
        if direction.dot(motion) > -GRAZE_COSINE * speed {
            return None;
        }
        return Some((0.0, direction));
    }

    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let t = (-half_b - discriminant.sqrt()) / a;
    if !(0.0..1.0).contains(&t) {
        return None;
    }

    let direction = (relative + motion * t).try_normalize()?;
    if direction.dot(motion) > -GRAZE_COSINE * speed {
        return None;
    }
    Some((t, direction))
}

// ============================================================================
// Point vs upright cylinder
// ============================================================================

/// Point sweep against a fixed upright cylinder.
///
/// The cylinder's axis passes through `axis.xy` and it spans `z_min..z_max`.
/// Caps are tried first, then the side surface. This one solver covers both
/// cylinder-vs-vertex (radius = mover radius, span shifted down by the mover
/// height) and cylinder-vs-body (radii summed).
pub(crate) fn sweep_point_upright_cylinder(
    origin: Vec3,
    displacement: Vec3,
    axis: Vec3,
    radius: f32,
    z_min: f32,
    z_max: f32,
) -> Option<Contact> {
    let travel = displacement.length();
    if travel <= NEAR_ZERO {
        return None;
    }
    let axis = axis.truncate();
    let mut best = None;

    // Caps
    let cap = if displacement.z < 0.0 {
        Some((origin.z - z_max, -displacement.z, Vec3::Z))
    } else if displacement.z > 0.0 {
        Some((z_min - origin.z, displacement.z, Vec3::NEG_Z))
    } else {
        None
    };
    if let Some((gap, closing, normal)) = cap {
        if let Some((t, raw)) = close_gap(gap, closing, travel) {
            let center = (origin + displacement * raw).truncate();
            if center.distance_squared(axis) <= radius * radius {
                best = Some(Contact { t, normal });
            }
        }
    }

    // Side
    if let Some((t, direction)) =
        sweep_circle_point(origin.truncate() - axis, displacement.truncate(), radius, travel)
    {
        let z = origin.z + displacement.z * t;
        if z > z_min + RANGE_TOLERANCE && z < z_max - RANGE_TOLERANCE {
            best = earliest(best, Some(Contact { t, normal: direction.extend(0.0) }));
        }
    }

    best
}

// ============================================================================
// Cylinder vs segment
// ============================================================================

/// Cylinder sweep against a line segment `a..b`.
///
/// Dispatches on the segment's slope: vertical segments reduce to a 2D circle
/// sweep, horizontal and slanted ones first try side-surface contact and fall
/// back to cap contact.
pub(crate) fn sweep_cylinder_segment(
    origin: Vec3,
    displacement: Vec3,
    radius: f32,
    height: f32,
    a: Vec3,
    b: Vec3,
) -> Option<Contact> {
    let edge = b - a;
    let length = edge.length();
    if length <= NEAR_ZERO || displacement.length_squared() <= NEAR_ZERO {
        return None;
    }

    let horizontal = edge.truncate().length();
    if horizontal <= 1.0e-6 * length {
        return sweep_vertical_segment(origin, displacement, radius, height, a, b);
    }

    if let Some(contact) = sweep_segment_side(origin, displacement, radius, height, a, b) {
        return Some(contact);
    }

    if edge.z.abs() <= 1.0e-6 * length {
        sweep_horizontal_segment_caps(origin, displacement, radius, height, a, b)
    } else {
        sweep_slanted_segment_caps(origin, displacement, radius, height, a, b)
    }
}

/// Vertical segment: circle-vs-point in the horizontal plane, then check the
/// contact height overlaps both the cylinder and the segment.
fn sweep_vertical_segment(
    origin: Vec3,
    displacement: Vec3,
    radius: f32,
    height: f32,
    a: Vec3,
    b: Vec3,
) -> Option<Contact> {
    let (t, direction) = sweep_circle_point(
        origin.truncate() - a.truncate(),
        displacement.truncate(),
        radius,
        displacement.length(),
    )?;

    let bottom = origin.z + displacement.z * t;
    let (low, high) = (a.z.min(b.z), a.z.max(b.z));
    let overlaps = bottom < high - RANGE_TOLERANCE && bottom + height > low + RANGE_TOLERANCE;
    overlaps.then_some(Contact {
        t,
        normal: direction.extend(0.0),
    })
}

/// Side surface against a non-vertical segment.
///
/// Solves `center(t) - reach * n = a + u * edge` in the horizontal plane with
/// Cramer's rule, where `n` is the unit perpendicular from the line toward the
/// axis. The hit counts only if `u` lands on the segment and the contact
/// height lies within the cylinder at that time.
fn sweep_segment_side(
    origin: Vec3,
    displacement: Vec3,
    radius: f32,
    height: f32,
    a: Vec3,
    b: Vec3,
) -> Option<Contact> {
    let edge = b - a;
    let edge_h = edge.truncate();
    let motion = displacement.truncate();
    let start = origin.truncate() - a.truncate();

    let perpendicular = edge_h.perp().normalize();
    let signed = perpendicular.dot(start);
    let normal = perpendicular * signed.signum();

    let gap = signed.abs() - radius;
    let closing = -normal.dot(motion);
    let travel = displacement.length();
    close_gap(gap, closing, travel)?;

    let det = motion.perp_dot(edge_h);
    if det.abs() <= NEAR_ZERO {
        return None;
    }
    let rhs = -start + normal * (radius + contact_skin(travel));
    let mut t = rhs.perp_dot(edge_h) / det;
    let mut u = -motion.perp_dot(rhs) / det;

    if t < 0.0 {
        // Inside the skin already: touching now, at the foot of the perpendicular.
        t = 0.0;
        u = start.dot(edge_h) / edge_h.length_squared();
    }
    if t >= 1.0 || u < -RANGE_TOLERANCE || u > 1.0 + RANGE_TOLERANCE {
        return None;
    }

    let contact_z = a.z + edge.z * u;
    let bottom = origin.z + displacement.z * t;
    let within = contact_z > bottom + RANGE_TOLERANCE && contact_z < bottom + height - RANGE_TOLERANCE;
    within.then_some(Contact {
        t,
        normal: normal.extend(0.0),
    })
}

/// Horizontal segment above or below the cylinder: the cap plane reaches the
/// segment's height, and the cap disk must cover part of the segment then.
fn sweep_horizontal_segment_caps(
    origin: Vec3,
    displacement: Vec3,
    radius: f32,
    height: f32,
    a: Vec3,
    b: Vec3,
) -> Option<Contact> {
    let (gap, closing, normal) = if displacement.z < 0.0 {
        (origin.z - a.z, -displacement.z, Vec3::Z)
    } else if displacement.z > 0.0 {
        (a.z - (origin.z + height), displacement.z, Vec3::NEG_Z)
    } else {
        return None;
    };

    let (t, raw) = close_gap(gap, closing, displacement.length())?;
    let center = (origin + displacement * raw).truncate();
    let reach = distance_to_segment_2d(center, a.truncate(), b.truncate());
    (reach <= radius).then_some(Contact { t, normal })
}

/// Slanted segment crossing a cap plane.
///
/// A shear `p.xy -= (p.z - a.z) * slope` maps the segment onto a vertical
/// line without touching z. In sheared space each cap rim is a circle moving
/// against a fixed point; the earlier cap wins and its horizontal normal is
/// mapped back through the shear.
fn sweep_slanted_segment_caps(
    origin: Vec3,
    displacement: Vec3,
    radius: f32,
    height: f32,
    a: Vec3,
    b: Vec3,
) -> Option<Contact> {
    let edge = b - a;
    let slope = edge.truncate() / edge.z;
    let motion = displacement.truncate() - slope * displacement.z;
    let (low, high) = (a.z.min(b.z), a.z.max(b.z));
    let travel = displacement.length();

    let mut best = None;
    for cap in [0.0, height] {
        let cap_z = origin.z + cap;
        let relative = origin.truncate() - slope * (cap_z - a.z) - a.truncate();
        let Some((t, direction)) = sweep_circle_point(relative, motion, radius, travel) else {
            continue;
        };

        let z = cap_z + displacement.z * t;
        if z <= low + RANGE_TOLERANCE || z >= high - RANGE_TOLERANCE {
            continue;
        }

        let normal = direction.extend(-slope.dot(direction)).normalize();
        best = earliest(best, Some(Contact { t, normal }));
    }
    best
}

/// Distance from `p` to segment `a..b` in 2D.
fn distance_to_segment_2d(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    let u = if len2 <= NEAR_ZERO {
        0.0
    } else {
        ((p - a).dot(ab) / len2).clamp(0.0, 1.0)
    };
    p.distance(a + ab * u)
}

//! Level construction and spawn points.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracefall_physics::{CollisionError, CollisionWorld};

/// Errors raised while building a level.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("mesh index count {0} is not a multiple of 3")]
    RaggedIndices(usize),

    #[error(transparent)]
    Collision(#[from] CollisionError),
}

/// A game level containing collision geometry and spawn points.
#[derive(Debug)]
pub struct Level {
    /// Level identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Static collision geometry.
    pub collision: CollisionWorld,

    pub spawn_points: Vec<SpawnPoint>,
}

/// A spawn point for players or enemies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Position in world space.
    pub position: Vec3,

    /// Initial facing direction (yaw in radians).
    pub facing: f32,

    pub spawn_type: SpawnType,
}

/// Types of spawn points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnType {
    Player,
    Enemy,
}

impl Level {
    /// Create an empty level.
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            collision: CollisionWorld::new(),
            spawn_points: Vec::new(),
        }
    }

    /// Add one wall triangle.
    pub fn add_triangle(&mut self, v1: Vec3, v2: Vec3, v3: Vec3) -> usize {
        self.collision.add_static_triangle(v1, v2, v3)
    }

    /// Add a planar quad as two triangles, corners in order around the edge.
    pub fn add_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3) {
        self.collision.add_static_triangle(a, b, c);
        self.collision.add_static_triangle(a, c, d);
    }

    /// Add an axis-aligned box as twelve triangles.
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3) {
        let corner = |sx: f32, sy: f32, sz: f32| {
            center + Vec3::new(sx * half_extents.x, sy * half_extents.y, sz * half_extents.z)
        };
        let [c000, c100, c110, c010] = [
            corner(-1.0, -1.0, -1.0),
            corner(1.0, -1.0, -1.0),
            corner(1.0, 1.0, -1.0),
            corner(-1.0, 1.0, -1.0),
        ];
        let [c001, c101, c111, c011] = [
            corner(-1.0, -1.0, 1.0),
            corner(1.0, -1.0, 1.0),
            corner(1.0, 1.0, 1.0),
            corner(-1.0, 1.0, 1.0),
        ];

        // Bottom and top
        self.add_quad(c000, c010, c110, c100);
        self.add_quad(c001, c101, c111, c011);
        // -Y and +Y
        self.add_quad(c000, c100, c101, c001);
        self.add_quad(c010, c011, c111, c110);
        // -X and +X
        self.add_quad(c000, c001, c011, c010);
        self.add_quad(c100, c110, c111, c101);
    }

    /// Add an indexed mesh, three indices per triangle.
    ///
    /// Returns the number of triangles added. Nothing is added on error.
    pub fn add_mesh(&mut self, vertices: &[Vec3], indices: &[u32]) -> Result<usize, LevelError> {
        if indices.len() % 3 != 0 {
            return Err(LevelError::RaggedIndices(indices.len()));
        }
        let triangles: Vec<[u32; 3]> = indices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Ok(self.collision.add_triangle_mesh(vertices, &triangles)?)
    }

    /// Create a simple test level for development.
    ///
    /// A 100 x 100 floor at z = 0 closed in by walls, with a central pillar
    /// and two cover crates.
    pub fn test_arena() -> Self {
        let mut level = Self::new("test_arena", "Test Arena");

        let arena_size = 50.0;
        let wall_height = 5.0;
        let wall_thickness = 0.5;

        // Floor
        level.add_box(
            Vec3::new(0.0, 0.0, -0.5),
            Vec3::new(arena_size, arena_size, 0.5),
        );

        // Walls
        for (center, half) in [
            (
                Vec3::new(0.0, arena_size, wall_height / 2.0),
                Vec3::new(arena_size, wall_thickness, wall_height / 2.0),
            ),
            (
                Vec3::new(0.0, -arena_size, wall_height / 2.0),
                Vec3::new(arena_size, wall_thickness, wall_height / 2.0),
            ),
            (
                Vec3::new(arena_size, 0.0, wall_height / 2.0),
                Vec3::new(wall_thickness, arena_size, wall_height / 2.0),
            ),
            (
                Vec3::new(-arena_size, 0.0, wall_height / 2.0),
                Vec3::new(wall_thickness, arena_size, wall_height / 2.0),
            ),
        ] {
            level.add_box(center, half);
        }

        // Central pillar
        level.add_box(Vec3::new(0.0, 0.0, 2.0), Vec3::new(2.0, 2.0, 2.0));

        // Some cover crates
        level.add_box(Vec3::new(-15.0, 10.0, 1.0), Vec3::new(1.5, 1.5, 1.0));
        level.add_box(Vec3::new(15.0, -10.0, 1.0), Vec3::new(1.5, 1.5, 1.0));

        // Spawn points, slightly above the floor
        level.spawn_points.push(SpawnPoint {
            position: Vec3::new(-20.0, 0.0, 0.05),
            facing: 0.0,
            spawn_type: SpawnType::Player,
        });
        level.spawn_points.push(SpawnPoint {
            position: Vec3::new(20.0, 0.0, 0.05),
            facing: std::f32::consts::PI,
            spawn_type: SpawnType::Player,
        });
        level.spawn_points.push(SpawnPoint {
            position: Vec3::new(0.0, 30.0, 0.05),
            facing: -std::f32::consts::FRAC_PI_2,
            spawn_type: SpawnType::Enemy,
        });
        level.spawn_points.push(SpawnPoint {
            position: Vec3::new(0.0, -30.0, 0.05),
            facing: std::f32::consts::FRAC_PI_2,
            spawn_type: SpawnType::Enemy,
        });

        log::debug!(
            "built {} with {} walls",
            level.name,
            level.collision.wall_count()
        );
        level
    }

    /// Spawn points of one type.
    pub fn spawns(&self, spawn_type: SpawnType) -> impl Iterator<Item = &SpawnPoint> {
        self.spawn_points
            .iter()
            .filter(move |s| s.spawn_type == spawn_type)
    }

    /// Get a player spawn point.
    pub fn get_player_spawn(&self, index: usize) -> Option<&SpawnPoint> {
        self.spawns(SpawnType::Player).nth(index)
    }

    /// Get the number of player spawn points.
    pub fn player_spawn_count(&self) -> usize {
        self.spawns(SpawnType::Player).count()
    }
}

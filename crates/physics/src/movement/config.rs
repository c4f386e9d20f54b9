//! Movement configuration constants.
//!
//! All movement parameters are grouped here for easy tuning. Values use
//! metric units (meters, seconds) with Z up.

use serde::{Deserialize, Serialize};

/// Configuration for the slide loop and the locomotion layered on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    // ========================================================================
    // Body Dimensions
    // ========================================================================
    /// Player collision radius (meters).
    pub player_radius: f32,

    /// Player cylinder height (meters).
    pub player_height: f32,

    // ========================================================================
    // Movement Speeds
    // ========================================================================
    /// Walking speed (meters/second).
    pub walk_speed: f32,

    /// Sprinting speed (meters/second).
    pub run_speed: f32,

    // ========================================================================
    // Physics
    // ========================================================================
    /// Gravity acceleration (meters/second²), applied along -Z.
    pub gravity: f32,

    /// Upward velocity given by a jump (meters/second).
    pub jump_velocity: f32,

    /// Friction while grounded (1/second).
    pub ground_friction: f32,

    /// Friction while airborne (1/second).
    pub air_friction: f32,

    /// Ground acceleration toward the wish velocity (1/second).
    pub ground_acceleration: f32,

    /// Air acceleration toward the wish velocity (1/second).
    pub air_acceleration: f32,

    /// Below this speed friction acts as if moving at this speed, so
    /// slow bodies come to a full stop (meters/second).
    pub stop_speed: f32,

    // ========================================================================
    // Collision
    // ========================================================================
    /// Maximum slide iterations per tick.
    pub max_iterations: usize,

    /// A trace fraction below this counts as "no progress".
    pub min_progress: f32,

    /// Minimum contact normal Z for a surface to count as ground.
    /// 0.7 ≈ 45 degrees.
    pub terrain_tolerance: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            player_radius: 0.4,
            player_height: 1.8,

            walk_speed: 4.5,
            run_speed: 7.0,

            gravity: 15.0,
            jump_velocity: 5.5,
            ground_friction: 8.0,
            air_friction: 0.5,
            ground_acceleration: 10.0,
            air_acceleration: 1.0,
            stop_speed: 1.0,

            max_iterations: 5,
            min_progress: 0.001,
            terrain_tolerance: 0.7,
        }
    }
}

impl MovementConfig {
    /// Fast arcade movement.
    pub fn arcade() -> Self {
        Self {
            walk_speed: 6.0,
            run_speed: 10.0,
            gravity: 20.0,
            jump_velocity: 6.5,
            air_friction: 0.2,
            ground_acceleration: 15.0,
            air_acceleration: 3.0,
            ..Default::default()
        }
    }

    /// Slower, heavier movement with steeper-slope tolerance.
    pub fn tactical() -> Self {
        Self {
            walk_speed: 3.5,
            run_speed: 5.5,
            gravity: 12.0,
            jump_velocity: 4.5,
            ground_friction: 10.0,
            air_acceleration: 0.5,
            terrain_tolerance: 0.8,
            ..Default::default()
        }
    }

    /// Top speed for the current mode.
    pub fn max_speed(&self, sprinting: bool) -> f32 {
        if sprinting {
            self.run_speed
        } else {
            self.walk_speed
        }
    }

    /// Check whether a contact normal counts as walkable ground.
    #[inline]
    pub fn is_ground(&self, normal: glam::Vec3) -> bool {
        normal.z > self.terrain_tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_default_config() {
        let config = MovementConfig::default();
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.min_progress, 0.001);
        assert!(config.gravity > 0.0);
    }

    #[test]
    fn test_ground_threshold() {
        let config = MovementConfig::default();
        assert!(config.is_ground(Vec3::Z));
        assert!(!config.is_ground(Vec3::X));
        // 60 degree slope is too steep at the default tolerance.
        let steep = Vec3::new(0.866, 0.0, 0.5);
        assert!(!config.is_ground(steep));
    }

    #[test]
    fn test_presets_keep_collision_defaults() {
        for config in [MovementConfig::arcade(), MovementConfig::tactical()] {
            assert_eq!(config.max_iterations, 5);
            assert_eq!(config.min_progress, 0.001);
        }
        assert_eq!(MovementConfig::default().max_speed(true), 7.0);
    }
}

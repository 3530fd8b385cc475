//! Dungeon generation configuration and validation.
//!
//! The engine takes a `DungeonConfig` at construction. All fields have
//! defaults tuned for 14×10 fragments; callers (or the simtest harness via a
//! JSON file) may override any of them.
//!
//! ```
//! use delve_logic::config::{DungeonConfig, validate_config};
//!
//! let mut config = DungeonConfig::default();
//! config.generation_iterations = 4;
//! config.seed = Some(7);
//! assert!(validate_config(&config).is_empty());
//! ```

use crate::constants::{
    FRAGMENT_SIZE, GENERATION_ITERATIONS, MAX_OFF_CAMERA_DISTANCE, MAX_ROOMS_BEFORE_DEAD_ENDS,
    MAX_ROOM_SIDE_LENGTH, SECOND_ROOM_SIZE,
};
use crate::samples::FillingKind;
use crate::types::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of filling templates available per footprint family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillingVariants {
    pub start: u32,
    pub room_1x1: u32,
    pub room_1x2: u32,
    pub room_2x1: u32,
    pub room_2x2: u32,
}

impl Default for FillingVariants {
    fn default() -> Self {
        Self {
            start: 1,
            room_1x1: 3,
            room_1x2: 2,
            room_2x1: 2,
            room_2x2: 3,
        }
    }
}

impl FillingVariants {
    pub fn count(&self, kind: FillingKind) -> u32 {
        match kind {
            FillingKind::Start => self.start,
            FillingKind::Room1x1 => self.room_1x1,
            FillingKind::Room1x2 => self.room_1x2,
            FillingKind::Room2x1 => self.room_2x1,
            FillingKind::Room2x2 => self.room_2x2,
        }
    }
}

/// Tunable generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    /// World size of one fragment. Both components must be positive and even.
    pub fragment_size: Coord,
    /// Largest room side, in fragments.
    pub max_room_side_length: i32,
    /// Footprint of the fixed second room.
    pub second_room_size: Coord,
    /// Growth waves after the two starting rooms.
    pub generation_iterations: u32,
    /// Room count from which every new room is a dead-end.
    pub max_rooms_before_dead_ends: u32,
    pub filling_variants: FillingVariants,
    /// Slack past a fragment edge before the room tracker steps over.
    pub max_off_camera_distance: f32,
    /// Random seed (None = OS entropy).
    pub seed: Option<u64>,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            fragment_size: FRAGMENT_SIZE,
            max_room_side_length: MAX_ROOM_SIDE_LENGTH,
            second_room_size: SECOND_ROOM_SIZE,
            generation_iterations: GENERATION_ITERATIONS,
            max_rooms_before_dead_ends: MAX_ROOMS_BEFORE_DEAD_ENDS,
            filling_variants: FillingVariants::default(),
            max_off_camera_distance: MAX_OFF_CAMERA_DISTANCE,
            seed: None,
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("fragment size {0} must be positive and even on both axes")]
    InvalidFragmentSize(Coord),
    #[error("max room side length {0} is outside 1..=8")]
    InvalidRoomSideLength(i32),
    #[error("second room size {0} must fit within the max room side length")]
    InvalidSecondRoomSize(Coord),
    #[error("generation iterations {0} is outside 1..=32")]
    InvalidIterations(u32),
    #[error("room cap {0} must allow at least the two starting rooms")]
    RoomCapTooSmall(u32),
    #[error("off-camera distance {0} must be finite and non-negative")]
    InvalidOffCameraDistance(f32),
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &DungeonConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    let size = config.fragment_size;
    if size.x <= 0 || size.y <= 0 || size.x % 2 != 0 || size.y % 2 != 0 {
        errors.push(ConfigError::InvalidFragmentSize(size));
    }
    if !(1..=8).contains(&config.max_room_side_length) {
        errors.push(ConfigError::InvalidRoomSideLength(config.max_room_side_length));
    }
    let second = config.second_room_size;
    if second.x < 1
        || second.y < 1
        || second.x > config.max_room_side_length
        || second.y > config.max_room_side_length
    {
        errors.push(ConfigError::InvalidSecondRoomSize(second));
    }
    if !(1..=32).contains(&config.generation_iterations) {
        errors.push(ConfigError::InvalidIterations(config.generation_iterations));
    }
    if config.max_rooms_before_dead_ends < 2 {
        errors.push(ConfigError::RoomCapTooSmall(config.max_rooms_before_dead_ends));
    }
    if !config.max_off_camera_distance.is_finite() || config.max_off_camera_distance < 0.0 {
        errors.push(ConfigError::InvalidOffCameraDistance(
            config.max_off_camera_distance,
        ));
    }

    errors
}

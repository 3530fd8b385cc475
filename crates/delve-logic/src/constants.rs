//! Dungeon constants: fragment geometry, navigation resolution and stamp anchors.
//!
//! These are the defaults the engine is tuned for. Generation parameters that
//! a caller may want to change live in [`crate::config::DungeonConfig`].

use crate::types::Coord;

/// World size of one fragment (width × height in tiles).
pub const FRAGMENT_SIZE: Coord = Coord::new(14, 10);

/// Largest room side, in fragments.
pub const MAX_ROOM_SIDE_LENGTH: i32 = 2;

/// Footprint of the fixed second room, in fragments.
pub const SECOND_ROOM_SIZE: Coord = Coord::new(2, 2);

/// Growth waves after the two fixed starting rooms.
pub const GENERATION_ITERATIONS: u32 = 3;

/// Room count at which every further room becomes a dead-end.
pub const MAX_ROOMS_BEFORE_DEAD_ENDS: u32 = 6;

/// How far past a fragment edge the player may go before the tracker
/// moves to the neighbouring fragment.
pub const MAX_OFF_CAMERA_DISTANCE: f32 = 0.15;

/// Side of one navigation sub-cell, in world units.
pub const NAV_CELL_SIDE: f32 = 0.5;

/// Anchor offsets (relative to a fragment centre, or for the filling to the
/// room's top-left border corner) used by the tile-stamping collaborator.
pub mod stamp_offsets {
    use crate::types::Coord;

    pub const TOP_LEFT_CORNER: Coord = Coord::new(-7, 4);
    pub const TOP_RIGHT_CORNER: Coord = Coord::new(1, 4);
    pub const BOTTOM_LEFT_CORNER: Coord = Coord::new(-7, -2);
    pub const BOTTOM_RIGHT_CORNER: Coord = Coord::new(1, -2);

    pub const TOP_EXIT: Coord = Coord::new(-2, 4);
    pub const BOTTOM_EXIT: Coord = Coord::new(-2, -2);
    pub const LEFT_EXIT: Coord = Coord::new(-7, 1);
    pub const RIGHT_EXIT: Coord = Coord::new(4, 1);

    pub const FLOOR: Coord = Coord::new(-4, 1);
    pub const FILLING: Coord = Coord::new(2, -3);
}

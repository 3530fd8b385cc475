//! Fragment sample classification for the tile-stamping collaborator.
//!
//! Each fragment is drawn from one of sixteen archetypes depending on where
//! it sits inside its room. The position is described by two roles: which
//! outer side (if any) the fragment touches horizontally, and which
//! vertically. Roles are resolved to concrete sides from the room's grow
//! direction, which itself follows from the entrance and a random
//! perpendicular sign. The archetype is then a plain table lookup.
//!
//! ```
//! use delve_logic::samples::{classify, AxisRole, FragmentSample};
//! use delve_logic::direction::Direction;
//!
//! let sample = classify(AxisRole::Side(Direction::Left), AxisRole::Side(Direction::Top));
//! assert_eq!(sample, FragmentSample::CornerTopLeft);
//! ```

use crate::constants::stamp_offsets;
use crate::direction::{Direction, Exits};
use crate::types::Coord;
use serde::{Deserialize, Serialize};

/// Wall archetype of a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FragmentSample {
    CornerTopLeft,
    CornerTopRight,
    CornerBottomLeft,
    CornerBottomRight,
    EdgeTop,
    EdgeBottom,
    EdgeLeft,
    EdgeRight,
    BraceTop,
    BraceBottom,
    BraceLeft,
    BraceRight,
    CorridorHorizontal,
    CorridorVertical,
    AllWalls,
    Empty,
}

/// Where a fragment sits along one axis of its room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisRole {
    /// The room is one fragment wide on this axis: both sides are outer walls.
    Both,
    /// Touches exactly this outer side.
    Side(Direction),
    /// Strictly inside the room on this axis.
    Middle,
}

/// Role of slot `index` on an axis of `len` fragments.
///
/// `grow` is the room's grow sign on that axis; slot 0 lies on the side the
/// room grew away from. `low`/`high` are the sides for negative/positive
/// world coordinates (Left/Right or Bottom/Top).
pub fn axis_role(index: i32, len: i32, grow: i32, low: Direction, high: Direction) -> AxisRole {
    let (near, far) = if grow > 0 { (low, high) } else { (high, low) };
    if len == 1 {
        AxisRole::Both
    } else if index == 0 {
        AxisRole::Side(near)
    } else if index == len - 1 {
        AxisRole::Side(far)
    } else {
        AxisRole::Middle
    }
}

/// Archetype for a fragment with the given horizontal and vertical roles.
pub fn classify(horizontal: AxisRole, vertical: AxisRole) -> FragmentSample {
    use AxisRole::*;
    use Direction::*;
    use FragmentSample::*;

    match (horizontal, vertical) {
        (Both, Both) => AllWalls,

        (Side(Left), Both) => BraceLeft,
        (Side(Right), Both) => BraceRight,
        (Both, Side(Bottom)) => BraceBottom,
        (Both, Side(Top)) => BraceTop,

        (Side(Left), Side(Top)) => CornerTopLeft,
        (Side(Right), Side(Top)) => CornerTopRight,
        (Side(Left), Side(Bottom)) => CornerBottomLeft,
        (Side(Right), Side(Bottom)) => CornerBottomRight,

        (Both, Middle) => CorridorVertical,
        (Middle, Both) => CorridorHorizontal,

        (Side(Left), Middle) => EdgeLeft,
        (Side(Right), Middle) => EdgeRight,
        (Middle, Side(Top)) => EdgeTop,
        (Middle, Side(Bottom)) => EdgeBottom,

        (Middle, Middle) => Empty,

        // Roles never carry a side from the other axis.
        (Side(Top | Bottom), _) | (_, Side(Left | Right)) => Empty,
    }
}

/// Quadrant piece placed at one corner anchor of a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CornerPiece {
    Corner,
    HorizontalFlat,
    VerticalFlat,
    Empty,
}

/// Pieces for the (top-left, top-right, bottom-left, bottom-right) quadrants.
pub fn quadrant_pieces(sample: FragmentSample) -> [CornerPiece; 4] {
    use CornerPiece::*;
    match sample {
        FragmentSample::CornerTopLeft => [Corner, HorizontalFlat, VerticalFlat, Empty],
        FragmentSample::CornerTopRight => [HorizontalFlat, Corner, Empty, VerticalFlat],
        FragmentSample::CornerBottomLeft => [VerticalFlat, Empty, Corner, HorizontalFlat],
        FragmentSample::CornerBottomRight => [Empty, VerticalFlat, HorizontalFlat, Corner],
        FragmentSample::EdgeTop => [HorizontalFlat, HorizontalFlat, Empty, Empty],
        FragmentSample::EdgeBottom => [Empty, Empty, HorizontalFlat, HorizontalFlat],
        FragmentSample::EdgeLeft => [VerticalFlat, Empty, VerticalFlat, Empty],
        FragmentSample::EdgeRight => [Empty, VerticalFlat, Empty, VerticalFlat],
        FragmentSample::BraceTop => [Corner, Corner, VerticalFlat, VerticalFlat],
        FragmentSample::BraceBottom => [VerticalFlat, VerticalFlat, Corner, Corner],
        FragmentSample::BraceLeft => [Corner, HorizontalFlat, Corner, HorizontalFlat],
        FragmentSample::BraceRight => [HorizontalFlat, Corner, HorizontalFlat, Corner],
        FragmentSample::CorridorHorizontal => [HorizontalFlat; 4],
        FragmentSample::CorridorVertical => [VerticalFlat; 4],
        FragmentSample::AllWalls => [Corner; 4],
        FragmentSample::Empty => [Empty; 4],
    }
}

/// Quadrant anchors relative to the fragment centre, in the same order as
/// [`quadrant_pieces`].
pub const QUADRANT_OFFSETS: [Coord; 4] = [
    stamp_offsets::TOP_LEFT_CORNER,
    stamp_offsets::TOP_RIGHT_CORNER,
    stamp_offsets::BOTTOM_LEFT_CORNER,
    stamp_offsets::BOTTOM_RIGHT_CORNER,
];

/// How one side of a fragment is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitState {
    /// Outer side with an open exit.
    Opened,
    /// Outer side with no exit.
    Blocked,
    /// Side facing the room's own interior.
    Empty,
}

/// State of `side`, given the sides that face outward (`possible`) and the
/// fragment's final exits.
pub fn exit_state(side: Direction, possible: Exits, exits: Exits) -> ExitState {
    if !possible.contains(side) {
        ExitState::Empty
    } else if exits.contains(side) {
        ExitState::Opened
    } else {
        ExitState::Blocked
    }
}

/// Anchor of the exit piece on `side`, relative to the fragment centre.
pub fn exit_offset(side: Direction) -> Coord {
    match side {
        Direction::Top => stamp_offsets::TOP_EXIT,
        Direction::Bottom => stamp_offsets::BOTTOM_EXIT,
        Direction::Left => stamp_offsets::LEFT_EXIT,
        Direction::Right => stamp_offsets::RIGHT_EXIT,
    }
}

/// Everything the tile-stamping collaborator needs for one fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentStamp {
    pub position: Coord,
    pub sample: FragmentSample,
    /// Exit states in `Direction::ALL` order.
    pub exits: [ExitState; 4],
}

impl FragmentStamp {
    pub fn new(position: Coord, sample: FragmentSample, possible: Exits, exits: Exits) -> Self {
        Self {
            position,
            sample,
            exits: Direction::ALL.map(|side| exit_state(side, possible, exits)),
        }
    }

    pub fn exit(&self, side: Direction) -> ExitState {
        let slot = Direction::ALL.iter().position(|d| *d == side).unwrap_or(0);
        self.exits[slot]
    }

    /// World anchor of the exit piece on `side`.
    pub fn exit_anchor(&self, side: Direction) -> Coord {
        self.position + exit_offset(side)
    }
}

/// Template family used to fill a room with obstacles and decorations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FillingKind {
    Start,
    Room1x1,
    Room1x2,
    Room2x1,
    Room2x2,
}

impl FillingKind {
    /// Family for a footprint; larger footprints have no templates.
    pub fn for_footprint(width: i32, height: i32) -> Option<FillingKind> {
        match (width, height) {
            (1, 1) => Some(FillingKind::Room1x1),
            (1, 2) => Some(FillingKind::Room1x2),
            (2, 1) => Some(FillingKind::Room2x1),
            (2, 2) => Some(FillingKind::Room2x2),
            _ => None,
        }
    }
}

/// A chosen filling template for a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomFilling {
    pub kind: FillingKind,
    pub variant: u32,
    /// World anchor: the room's top-left border corner plus the filling offset.
    pub anchor: Coord,
}

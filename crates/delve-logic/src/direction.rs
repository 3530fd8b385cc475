//! Fragment sides and exit flags.
//!
//! A fragment connects to its neighbours through up to four exits. `Exits`
//! is the 4-bit set of open sides; `Direction` is a single side. Call sites
//! that need exactly one side take a `Direction`, so multi-flag values only
//! have to be rejected at the conversion boundary.

use crate::types::Coord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};
use thiserror::Error;

/// A single fragment side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Top,
    Bottom,
    Left,
    Right,
}

impl Direction {
    /// All sides, in flag order.
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Bottom,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit step toward this side (y grows upward).
    pub fn offset(self) -> Coord {
        match self {
            Direction::Top => Coord::new(0, 1),
            Direction::Bottom => Coord::new(0, -1),
            Direction::Left => Coord::new(-1, 0),
            Direction::Right => Coord::new(1, 0),
        }
    }

    pub fn flag(self) -> Exits {
        match self {
            Direction::Top => Exits::TOP,
            Direction::Bottom => Exits::BOTTOM,
            Direction::Left => Exits::LEFT,
            Direction::Right => Exits::RIGHT,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Top => "top",
            Direction::Bottom => "bottom",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// Set of open fragment sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Exits(u8);

impl Exits {
    pub const NONE: Exits = Exits(0);
    pub const TOP: Exits = Exits(0b0001);
    pub const BOTTOM: Exits = Exits(0b0010);
    pub const LEFT: Exits = Exits(0b0100);
    pub const RIGHT: Exits = Exits(0b1000);
    pub const ALL: Exits = Exits(0b1111);

    /// Build from raw bits; anything above the low four bits is dropped.
    pub fn from_bits(bits: u8) -> Exits {
        Exits(bits & Self::ALL.0)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, direction: Direction) -> bool {
        self.0 & direction.flag().0 != 0
    }

    pub fn insert(&mut self, direction: Direction) {
        self.0 |= direction.flag().0;
    }

    pub fn remove(&mut self, direction: Direction) {
        self.0 &= !direction.flag().0;
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Contained sides, in flag order.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }

    /// The single side this value names.
    ///
    /// Panics when the value holds zero or several flags: callers only use
    /// this where the generator guarantees a single flag.
    pub fn direction(self) -> Direction {
        match Direction::try_from(self) {
            Ok(direction) => direction,
            Err(err) => panic!("{err}"),
        }
    }
}

impl From<Direction> for Exits {
    fn from(direction: Direction) -> Exits {
        direction.flag()
    }
}

impl FromIterator<Direction> for Exits {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Exits {
        let mut exits = Exits::NONE;
        for d in iter {
            exits.insert(d);
        }
        exits
    }
}

/// Exit value where a single side was required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExitError {
    #[error("exit {0:#06b} cannot contain multiple flags in this context")]
    MultipleFlags(u8),
    #[error("exit value is empty where a single side is required")]
    Empty,
}

impl TryFrom<Exits> for Direction {
    type Error = ExitError;

    fn try_from(exits: Exits) -> Result<Direction, ExitError> {
        match exits {
            Exits::TOP => Ok(Direction::Top),
            Exits::BOTTOM => Ok(Direction::Bottom),
            Exits::LEFT => Ok(Direction::Left),
            Exits::RIGHT => Ok(Direction::Right),
            Exits::NONE => Err(ExitError::Empty),
            other => Err(ExitError::MultipleFlags(other.0)),
        }
    }
}

impl BitOr for Exits {
    type Output = Exits;
    fn bitor(self, rhs: Exits) -> Exits {
        Exits(self.0 | rhs.0)
    }
}

impl BitOr<Direction> for Exits {
    type Output = Exits;
    fn bitor(self, rhs: Direction) -> Exits {
        self | rhs.flag()
    }
}

impl BitOrAssign for Exits {
    fn bitor_assign(&mut self, rhs: Exits) {
        self.0 |= rhs.0;
    }
}

impl BitOrAssign<Direction> for Exits {
    fn bitor_assign(&mut self, rhs: Direction) {
        *self |= rhs.flag();
    }
}

impl BitAnd for Exits {
    type Output = Exits;
    fn bitand(self, rhs: Exits) -> Exits {
        Exits(self.0 & rhs.0)
    }
}

impl Not for Exits {
    type Output = Exits;
    fn not(self) -> Exits {
        Exits(!self.0 & Self::ALL.0)
    }
}

impl fmt::Display for Exits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<String> = self.iter().map(|d| d.to_string()).collect();
        f.write_str(&names.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_involution() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
            assert_eq!(d.offset() + d.opposite().offset(), Coord::ZERO);
        }
    }

    #[test]
    fn flags_match_bit_layout() {
        assert_eq!(Direction::Top.flag().bits(), 1);
        assert_eq!(Direction::Bottom.flag().bits(), 2);
        assert_eq!(Direction::Left.flag().bits(), 4);
        assert_eq!(Direction::Right.flag().bits(), 8);
    }

    #[test]
    fn not_stays_within_four_bits() {
        assert_eq!(!Exits::NONE, Exits::ALL);
        assert_eq!(!Exits::ALL, Exits::NONE);
        assert_eq!(!(Exits::TOP | Exits::LEFT), Exits::BOTTOM | Exits::RIGHT);
    }

    #[test]
    fn iter_in_flag_order() {
        let exits = Exits::RIGHT | Exits::TOP;
        let dirs: Vec<Direction> = exits.iter().collect();
        assert_eq!(dirs, vec![Direction::Top, Direction::Right]);
        assert_eq!(exits.len(), 2);
    }

    #[test]
    fn try_from_single_flag() {
        assert_eq!(Direction::try_from(Exits::LEFT), Ok(Direction::Left));
        assert_eq!(
            Direction::try_from(Exits::LEFT | Exits::TOP),
            Err(ExitError::MultipleFlags(0b0101))
        );
        assert_eq!(Direction::try_from(Exits::NONE), Err(ExitError::Empty));
    }

    #[test]
    #[should_panic(expected = "multiple flags")]
    fn direction_panics_on_multiple_flags() {
        (Exits::TOP | Exits::BOTTOM).direction();
    }

    #[test]
    fn or_assign_accepts_a_direction() {
        let mut exits = Exits::TOP;
        exits |= Direction::Right;
        assert_eq!(exits, Exits::TOP | Exits::RIGHT);
        exits |= Direction::Top;
        assert_eq!(exits.len(), 2);
        assert_eq!(Exits::NONE | Direction::Left, Exits::LEFT);
    }

    #[test]
    fn from_bits_masks_high_bits() {
        assert_eq!(Exits::from_bits(0xff), Exits::ALL);
        let collected: Exits = [Direction::Bottom, Direction::Right].into_iter().collect();
        assert_eq!(collected.bits(), 0b1010);
        assert_eq!(collected.to_string(), "bottom|right");
    }
}

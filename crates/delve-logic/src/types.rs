//! Integer grid coordinates and world-space points.
//!
//! `Coord` is used for everything that lives on whole world units: fragment
//! positions (always multiples of the fragment size), room borders and the
//! tile cells probed for walls. `Point` is a world-space position produced by
//! the pathfinder.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Integer position in world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ZERO: Coord = Coord { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise product, used to scale unit offsets by the fragment size.
    pub fn scale(self, other: Coord) -> Coord {
        Coord::new(self.x * other.x, self.y * other.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Coord {
    type Output = Coord;
    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Coord {
    fn add_assign(&mut self, rhs: Coord) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Coord {
    type Output = Coord;
    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Coord {
    type Output = Coord;
    fn neg(self) -> Coord {
        Coord::new(-self.x, -self.y)
    }
}

impl Mul<i32> for Coord {
    type Output = Coord;
    fn mul(self, rhs: i32) -> Coord {
        Coord::new(self.x * rhs, self.y * rhs)
    }
}

/// World-space point (f32).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_multiplies_each_axis() {
        let step = Coord::new(1, -1).scale(Coord::new(14, 10));
        assert_eq!(step, Coord::new(14, -10));
    }

    #[test]
    fn arithmetic() {
        let mut c = Coord::new(3, 4) + Coord::new(1, 1) - Coord::new(2, 0);
        assert_eq!(c, Coord::new(2, 5));
        c += Coord::new(0, -5);
        assert_eq!(c * 3, Coord::new(6, 0));
        assert_eq!(-c, Coord::new(-2, 0));
    }
}

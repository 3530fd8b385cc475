//! Fragment, room and dungeon-graph data model.
//!
//! A dungeon is an arena of rooms. Each room owns a rectangular block of
//! fragments; each fragment knows its owning room by `RoomId` (a plain index,
//! never an owning pointer). A coordinate index guarantees that at most one
//! fragment occupies any grid position across the whole dungeon.
//!
//! Rooms are immutable once inserted. "Visited" bookkeeping lives in the
//! engine's room tracker, not here.

use crate::direction::{Direction, Exits};
use crate::types::Coord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Index of a room inside its [`DungeonGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(pub u32);

/// One fixed-size grid cell of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomFragment {
    /// Fragment centre in world units (a multiple of the fragment size).
    pub position: Coord,
    pub exits: Exits,
    /// Owning room.
    pub room: RoomId,
}

impl RoomFragment {
    /// Position of the fragment that would sit across `direction`.
    pub fn neighbor_position(&self, direction: Direction, fragment_size: Coord) -> Coord {
        self.position + direction.offset().scale(fragment_size)
    }
}

/// Room bounds in world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Border {
    pub top: i32,
    pub bottom: i32,
    pub right: i32,
    pub left: i32,
}

impl Border {
    /// Inclusive containment of a whole-unit cell.
    pub fn contains(&self, cell: Coord) -> bool {
        cell.x >= self.left && cell.x <= self.right && cell.y >= self.bottom && cell.y <= self.top
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.top - self.bottom
    }
}

/// A rectangular cluster of contiguous fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub fragments: Vec<RoomFragment>,
    /// Width in fragments.
    pub width: i32,
    /// Height in fragments.
    pub height: i32,
    pub borders: Border,
    /// Position of the top-left fragment (UI key).
    pub top_left: Coord,
}

impl Room {
    /// Assemble a room, stamping `id` onto every fragment and deriving the
    /// borders from the bottom-left fragment.
    ///
    /// `fragments` must be non-empty.
    pub fn new(
        id: RoomId,
        mut fragments: Vec<RoomFragment>,
        width: i32,
        height: i32,
        fragment_size: Coord,
    ) -> Self {
        for fragment in &mut fragments {
            fragment.room = id;
        }

        let min_x = fragments.iter().map(|f| f.position.x).min().unwrap_or(0);
        let min_y = fragments.iter().map(|f| f.position.y).min().unwrap_or(0);
        let max_y = fragments.iter().map(|f| f.position.y).max().unwrap_or(0);

        let bottom = min_y - fragment_size.y / 2;
        let left = min_x - fragment_size.x / 2;
        let borders = Border {
            top: bottom + fragment_size.y * height,
            bottom,
            right: left + fragment_size.x * width,
            left,
        };

        Self {
            id,
            fragments,
            width,
            height,
            borders,
            top_left: Coord::new(min_x, max_y),
        }
    }

    pub fn fragment_at(&self, position: Coord) -> Option<&RoomFragment> {
        self.fragments.iter().find(|f| f.position == position)
    }

    pub fn contains_fragment(&self, position: Coord) -> bool {
        self.fragment_at(position).is_some()
    }

    /// Footprint in fragments.
    pub fn footprint(&self) -> (i32, i32) {
        (self.width, self.height)
    }
}

/// Every generated room, plus a coordinate index over their fragments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DungeonGraph {
    fragment_size: Coord,
    rooms: Vec<Room>,
    #[serde(skip)]
    index: HashMap<Coord, (RoomId, usize)>,
}

impl PartialEq for DungeonGraph {
    fn eq(&self, other: &Self) -> bool {
        self.fragment_size == other.fragment_size && self.rooms == other.rooms
    }
}

impl DungeonGraph {
    pub fn new(fragment_size: Coord) -> Self {
        Self {
            fragment_size,
            rooms: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn fragment_size(&self) -> Coord {
        self.fragment_size
    }

    /// Rebuild the coordinate index (needed after deserializing).
    pub fn reindex(&mut self) {
        self.index.clear();
        for room in &self.rooms {
            for (slot, fragment) in room.fragments.iter().enumerate() {
                self.index.insert(fragment.position, (room.id, slot));
            }
        }
    }

    /// Id the next inserted room will receive.
    pub fn next_room_id(&self) -> RoomId {
        RoomId(self.rooms.len() as u32)
    }

    /// Insert a room built from `fragments`.
    ///
    /// Returns `None` (and inserts nothing) if any fragment position is
    /// already claimed, so the no-overlap invariant can never be broken.
    pub fn insert_room(
        &mut self,
        fragments: Vec<RoomFragment>,
        width: i32,
        height: i32,
    ) -> Option<RoomId> {
        if fragments.is_empty() || fragments.iter().any(|f| self.is_occupied(f.position)) {
            return None;
        }

        let id = self.next_room_id();
        let room = Room::new(id, fragments, width, height, self.fragment_size);
        for (slot, fragment) in room.fragments.iter().enumerate() {
            self.index.insert(fragment.position, (id, slot));
        }
        self.rooms.push(room);
        Some(id)
    }

    pub fn clear(&mut self) {
        self.rooms.clear();
        self.index.clear();
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.0 as usize)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn fragment_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn is_occupied(&self, position: Coord) -> bool {
        self.index.contains_key(&position)
    }

    pub fn fragment_at(&self, position: Coord) -> Option<&RoomFragment> {
        let &(room, slot) = self.index.get(&position)?;
        self.rooms.get(room.0 as usize)?.fragments.get(slot)
    }

    pub fn room_at(&self, position: Coord) -> Option<&Room> {
        let &(room, _) = self.index.get(&position)?;
        self.room(room)
    }

    /// The fragment across `direction` from the fragment at `position`.
    pub fn neighbor(&self, position: Coord, direction: Direction) -> Option<&RoomFragment> {
        self.fragment_at(position + direction.offset().scale(self.fragment_size))
    }

    /// All fragments, room by room in insertion order.
    pub fn fragments(&self) -> impl Iterator<Item = &RoomFragment> {
        self.rooms.iter().flat_map(|r| r.fragments.iter())
    }

    /// Rooms directly reachable from `id` through open, mutually agreed exits.
    pub fn connected_rooms(&self, id: RoomId) -> Vec<RoomId> {
        let Some(room) = self.room(id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for fragment in &room.fragments {
            for direction in fragment.exits.iter() {
                if let Some(other) = self.neighbor(fragment.position, direction) {
                    if other.room != id
                        && other.exits.contains(direction.opposite())
                        && !out.contains(&other.room)
                    {
                        out.push(other.room);
                    }
                }
            }
        }
        out
    }
}

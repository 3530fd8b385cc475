//! Dungeon events - notifications for the UI and world collaborators
//!
//! The engine queues events as it generates and tracks the player; callers
//! drain them once per frame.

use delve_logic::direction::Direction;
use delve_logic::dungeon::RoomId;
use delve_logic::types::Coord;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Visited bookkeeping for the minimap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomState {
    NotVisited,
    Visited,
}

/// Something the outside world should react to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DungeonEvent {
    /// A room exists. Keyed by its top-left fragment position.
    RoomAdded {
        room: RoomId,
        top_left: Coord,
        width: i32,
        height: i32,
        state: RoomState,
    },
    RoomStateChanged { top_left: Coord, state: RoomState },
    /// The active room changed.
    RoomChanged {
        room: RoomId,
        entered_fragment: Coord,
        leave_direction: Direction,
    },
    /// Every room has been visited; fired once per dungeon.
    AllRoomsVisited,
}

/// FIFO of pending events.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: VecDeque<DungeonEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: DungeonEvent) {
        self.events.push_back(event);
    }

    /// Take every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<DungeonEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

//! Delve Core - dungeon engine
//!
//! Grows a random dungeon of fixed-size fragments, tracks which room the
//! player stands in, and runs navigation queries on a background worker.
//!
//! # Architecture
//!
//! - **Generation**: breadth-first room growth driven by any `rand::Rng`
//! - **Engine**: owns the dungeon, the active room and visited bookkeeping
//! - **Events**: room added / visited / changed notifications for the UI
//! - **Navigation**: a worker thread owning the per-room grid
//!
//! Pure data and algorithms live in `delve_logic`.
//!
//! # Example
//!
//! ```rust,no_run
//! use delve_core::prelude::*;
//!
//! let config = DungeonConfig { seed: Some(7), ..DungeonConfig::default() };
//! let mut engine = DungeonEngine::new(config).unwrap();
//! engine.generate();
//!
//! loop {
//!     // Feed the player position every frame.
//!     engine.update_player_position(0.0, 0.0);
//!     for event in engine.drain_events() {
//!         println!("{:?}", event);
//!     }
//! }
//! ```

pub mod engine;
pub mod events;
pub mod generation;
pub mod navigation;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::engine::DungeonEngine;
    pub use crate::events::{DungeonEvent, RoomState};
    pub use crate::generation::{DungeonGenerator, DungeonLayout};
    pub use crate::navigation::{NavigationService, Pending};
    pub use delve_logic::config::DungeonConfig;
    pub use delve_logic::direction::{Direction, Exits};
    pub use delve_logic::dungeon::{Room, RoomFragment, RoomId};
    pub use delve_logic::types::{Coord, Point};
}

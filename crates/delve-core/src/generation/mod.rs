//! Generation - procedural creation of dungeons.

mod dungeon;

pub use dungeon::*;

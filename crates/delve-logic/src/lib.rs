//! Pure dungeon logic for Delve.
//!
//! This crate contains everything that does not need randomness, threads or
//! an engine: the fragment/room data model, the sample classification table
//! handed to the tile-stamping collaborator, layout validation, the
//! navigation grid builder and the A* pathfinder. Functions take plain data
//! and return results, so they are unit-testable and shared by the engine
//! crate and the headless harness alike.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Generation parameters and validation |
//! | [`constants`] | Fragment size, navigation resolution, stamp anchors |
//! | [`direction`] | Fragment sides and the 4-bit exit set |
//! | [`dungeon`] | Fragment, room and dungeon-graph arena |
//! | [`navgrid`] | Half-unit navigation grid built per room |
//! | [`pathfinding`] | A* over the navigation grid |
//! | [`samples`] | Fragment archetype table, exit states, fillings |
//! | [`types`] | Integer coordinates and world points |
//! | [`validation`] | Exit symmetry, overlap, shape and connectivity checks |

pub mod config;
pub mod constants;
pub mod direction;
pub mod dungeon;
pub mod navgrid;
pub mod pathfinding;
pub mod samples;
pub mod types;
pub mod validation;

//! Layout validation for generated dungeons.
//!
//! Pure functions that take a `DungeonGraph` and return validation errors.
//! The generator is expected to pass every check; the simtest harness and
//! the property tests run them over many seeds.

use crate::direction::Direction;
use crate::dungeon::{DungeonGraph, RoomId};
use crate::types::Coord;
use std::collections::{HashMap, HashSet, VecDeque};

/// A layout validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

// ── A. Fragment pairs ───────────────────────────────────────────────────

/// Check that adjacent fragments agree on the exit between them.
pub fn check_exit_symmetry(graph: &DungeonGraph) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for fragment in graph.fragments() {
        // Right and Top only, so each pair is reported once.
        for direction in [Direction::Right, Direction::Top] {
            let Some(other) = graph.neighbor(fragment.position, direction) else {
                continue;
            };
            let here = fragment.exits.contains(direction);
            let there = other.exits.contains(direction.opposite());
            if here != there {
                errors.push(ValidationError {
                    category: "exit_symmetry",
                    severity: Severity::Error,
                    message: format!(
                        "Fragments {} and {} disagree on their shared {} exit ({} vs {})",
                        fragment.position, other.position, direction, here, there
                    ),
                });
            }
        }
    }
    errors
}

/// Check that no exit leads to a position without a fragment.
pub fn check_dangling_exits(graph: &DungeonGraph) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for fragment in graph.fragments() {
        for direction in fragment.exits.iter() {
            if graph.neighbor(fragment.position, direction).is_none() {
                errors.push(ValidationError {
                    category: "dangling_exit",
                    severity: Severity::Error,
                    message: format!(
                        "Fragment {} has a {} exit into empty space",
                        fragment.position, direction
                    ),
                });
            }
        }
    }
    errors
}

// ── B. Rooms ────────────────────────────────────────────────────────────

/// Check that no grid position is claimed by two rooms.
///
/// The graph's index already refuses overlapping inserts; this scans the
/// rooms directly so a corrupted graph is still caught.
pub fn check_no_overlap(graph: &DungeonGraph) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut owners: HashMap<Coord, RoomId> = HashMap::new();
    for room in graph.rooms() {
        for fragment in &room.fragments {
            if let Some(previous) = owners.insert(fragment.position, room.id) {
                errors.push(ValidationError {
                    category: "room_overlap",
                    severity: Severity::Error,
                    message: format!(
                        "Rooms #{} and #{} both claim fragment {}",
                        previous.0, room.id.0, fragment.position
                    ),
                });
            }
        }
    }
    errors
}

/// Check that each room is a full width×height block of adjacent fragments
/// whose back-references point at the room.
pub fn check_room_shapes(graph: &DungeonGraph) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let size = graph.fragment_size();
    for room in graph.rooms() {
        let expected = (room.width * room.height) as usize;
        if room.width < 1 || room.height < 1 || room.fragments.len() != expected {
            errors.push(ValidationError {
                category: "room_shape",
                severity: Severity::Error,
                message: format!(
                    "Room #{} has {} fragments for a {}×{} footprint",
                    room.id.0,
                    room.fragments.len(),
                    room.width,
                    room.height
                ),
            });
            continue;
        }

        let left = room.borders.left + size.x / 2;
        let bottom = room.borders.bottom + size.y / 2;
        for x in 0..room.width {
            for y in 0..room.height {
                let position = Coord::new(left + x * size.x, bottom + y * size.y);
                if !room.contains_fragment(position) {
                    errors.push(ValidationError {
                        category: "room_shape",
                        severity: Severity::Error,
                        message: format!("Room #{} is missing fragment {}", room.id.0, position),
                    });
                }
            }
        }

        if let Some(stray) = room.fragments.iter().find(|f| f.room != room.id) {
            errors.push(ValidationError {
                category: "room_shape",
                severity: Severity::Error,
                message: format!(
                    "Fragment {} in room #{} points at room #{}",
                    stray.position, room.id.0, stray.room.0
                ),
            });
        }
    }
    errors
}

// ── C. Connectivity (graph-level) ───────────────────────────────────────

/// Check that every room is reachable from `start` through open exits.
pub fn check_connectivity(graph: &DungeonGraph, start: RoomId) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if graph.is_empty() {
        return errors;
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for next in graph.connected_rooms(current) {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    let unreached: Vec<RoomId> = graph
        .rooms()
        .iter()
        .map(|r| r.id)
        .filter(|id| !visited.contains(id))
        .collect();

    if !unreached.is_empty() {
        errors.push(ValidationError {
            category: "connectivity",
            severity: Severity::Error,
            message: format!(
                "{} of {} rooms unreachable from room #{} (e.g. room #{})",
                unreached.len(),
                graph.room_count(),
                start.0,
                unreached[0].0
            ),
        });
    }
    errors
}

// ── Master validation ───────────────────────────────────────────────────

/// Run all layout validations and return combined results.
pub fn validate_layout(graph: &DungeonGraph, start: RoomId) -> Vec<ValidationError> {
    let mut all = Vec::new();
    all.extend(check_room_shapes(graph));
    all.extend(check_no_overlap(graph));
    all.extend(check_exit_symmetry(graph));
    all.extend(check_dangling_exits(graph));
    all.extend(check_connectivity(graph, start));
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FRAGMENT_SIZE;
    use crate::direction::Exits;
    use crate::dungeon::RoomFragment;

    fn frag(x: i32, y: i32, exits: Exits) -> RoomFragment {
        RoomFragment {
            position: Coord::new(x, y),
            exits,
            room: RoomId(0),
        }
    }

    fn corridor() -> DungeonGraph {
        let mut graph = DungeonGraph::new(FRAGMENT_SIZE);
        graph.insert_room(vec![frag(0, 0, Exits::RIGHT)], 1, 1);
        graph.insert_room(vec![frag(14, 0, Exits::LEFT | Exits::RIGHT)], 1, 1);
        graph.insert_room(vec![frag(28, 0, Exits::LEFT)], 1, 1);
        graph
    }

    #[test]
    fn test_valid_layout_no_errors() {
        let errs = validate_layout(&corridor(), RoomId(0));
        assert!(errs.is_empty(), "Expected no errors, got: {:?}", errs);
    }

    #[test]
    fn test_one_sided_exit() {
        let mut graph = DungeonGraph::new(FRAGMENT_SIZE);
        graph.insert_room(vec![frag(0, 0, Exits::RIGHT)], 1, 1);
        graph.insert_room(vec![frag(14, 0, Exits::NONE)], 1, 1);
        let errs = check_exit_symmetry(&graph);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("right"));
    }

    #[test]
    fn test_dangling_exit() {
        let mut graph = DungeonGraph::new(FRAGMENT_SIZE);
        graph.insert_room(vec![frag(0, 0, Exits::TOP)], 1, 1);
        let errs = check_dangling_exits(&graph);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("empty space"));
    }

    #[test]
    fn test_room_shape_missing_fragment() {
        let mut graph = DungeonGraph::new(FRAGMENT_SIZE);
        // Declared 2x1 but the second fragment is diagonal.
        graph.insert_room(vec![frag(0, 0, Exits::NONE), frag(14, 10, Exits::NONE)], 2, 1);
        let errs = check_room_shapes(&graph);
        assert!(!errs.is_empty());
        assert_eq!(errs[0].category, "room_shape");
    }

    #[test]
    fn test_two_by_two_shape_ok() {
        let mut graph = DungeonGraph::new(FRAGMENT_SIZE);
        graph.insert_room(
            vec![
                frag(0, 0, Exits::NONE),
                frag(14, 0, Exits::NONE),
                frag(0, -10, Exits::NONE),
                frag(14, -10, Exits::NONE),
            ],
            2,
            2,
        );
        assert!(check_room_shapes(&graph).is_empty());
    }

    #[test]
    fn test_unreachable_room() {
        let mut graph = corridor();
        graph.insert_room(vec![frag(0, 50, Exits::NONE)], 1, 1);
        let errs = check_connectivity(&graph, RoomId(0));
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("unreachable"));
        assert_eq!(errs[0].severity, Severity::Error);
    }

    #[test]
    fn test_closed_door_breaks_connectivity() {
        let mut graph = DungeonGraph::new(FRAGMENT_SIZE);
        graph.insert_room(vec![frag(0, 0, Exits::NONE)], 1, 1);
        graph.insert_room(vec![frag(14, 0, Exits::NONE)], 1, 1);
        assert_eq!(check_connectivity(&graph, RoomId(0)).len(), 1);
        assert!(check_exit_symmetry(&graph).is_empty());
    }
}

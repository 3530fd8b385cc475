//! A* pathfinding over the navigation grid.
//!
//! The search clones the grid's node arena and mutates only the clone, so
//! the canonical grid stays pristine even if a search is abandoned. The open
//! set is a `BinaryHeap` with lazy deletion; the closed set is a `Vec<bool>`
//! indexed like the arena.
//!
//! Cost and heuristic are the same "diagonal distance", an octile variant
//! tuned to the half-unit cell side:
//!
//! `s·(|dx|+|dy|) + (√(2s) − 2s)·min(|dx|,|dy|)`
//!
//! The next node to expand is the open node with the lowest g + h; ties go to
//! the lower h, then to the earlier discovery.
//!
//! Failure is not an error: callers get an empty path and a logged warning.

use crate::constants::NAV_CELL_SIDE;
use crate::navgrid::{NavGrid, NodePos, NEIGHBOR_STEPS};
use crate::types::{Coord, Point};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// The result of a successful search.
#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
    /// Node positions from start to goal (inclusive).
    pub nodes: Vec<NodePos>,
    /// Total traversal cost.
    pub cost: f32,
}

impl PathResult {
    /// World points an agent should walk through, start first.
    pub fn world_points(&self) -> Vec<Point> {
        self.nodes.iter().map(|n| n.to_world()).collect()
    }
}

/// Octile-style distance between two nodes, in world units.
pub fn diagonal_distance(a: NodePos, b: NodePos) -> f32 {
    let pa = a.logical();
    let pb = b.logical();
    let dx = (pa.x - pb.x).abs();
    let dy = (pa.y - pb.y).abs();
    let s = NAV_CELL_SIDE;
    s * (dx + dy) + ((s + s).sqrt() - 2.0 * s) * dx.min(dy)
}

/// Entry in the open set (min-heap via reversed ordering).
struct OpenEntry {
    index: usize,
    f_score: f32,
    h_score: f32,
    seq: u64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: smallest f (then h, then seq) is "greatest".
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.h_score.total_cmp(&self.h_score))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Find a path between two node positions.
///
/// Returns `None` if either endpoint is missing from the grid or unwalkable,
/// or if the goal is unreachable.
pub fn search(grid: &NavGrid, start: NodePos, goal: NodePos) -> Option<PathResult> {
    let (Some(start_idx), Some(goal_idx)) = (grid.index_of(start), grid.index_of(goal)) else {
        log::warn!("Invalid nodes: start {:?} or goal {:?} not in grid", start, goal);
        return None;
    };

    let mut nodes = grid.nodes().to_vec();
    if !nodes[start_idx].walkable || !nodes[goal_idx].walkable {
        log::warn!("Path endpoint is unwalkable: {:?} -> {:?}", start, goal);
        return None;
    }

    let mut closed = vec![false; nodes.len()];
    let mut open = BinaryHeap::new();
    let mut seq = 0u64;

    let h_start = diagonal_distance(start, goal);
    nodes[start_idx].start_distance = 0.0;
    nodes[start_idx].target_distance = h_start;
    nodes[start_idx].parent = None;
    open.push(OpenEntry {
        index: start_idx,
        f_score: h_start,
        h_score: h_start,
        seq,
    });

    while let Some(current) = open.pop() {
        let ci = current.index;
        if closed[ci] {
            continue;
        }
        closed[ci] = true;

        if ci == goal_idx {
            return reconstruct_path(&nodes, start_idx, goal_idx);
        }

        let position = nodes[ci].position;
        let current_g = nodes[ci].start_distance;

        for (dx, dy) in NEIGHBOR_STEPS {
            let neighbor_pos = position.step(dx, dy);
            let Some(ni) = grid.index_of(neighbor_pos) else {
                continue;
            };
            if !nodes[ni].walkable || closed[ni] {
                continue;
            }

            let g = current_g + diagonal_distance(position, neighbor_pos);
            let h = diagonal_distance(neighbor_pos, goal);
            if g + h < nodes[ni].efficiency() {
                let node = &mut nodes[ni];
                node.start_distance = g;
                node.target_distance = h;
                node.parent = Some(ci);

                seq += 1;
                open.push(OpenEntry {
                    index: ni,
                    f_score: g + h,
                    h_score: h,
                    seq,
                });
            }
        }
    }

    log::warn!("No path from {:?} to {:?}", start, goal);
    None
}

/// Walk parent links back from the goal.
///
/// A parent chain can never be longer than the arena, so exceeding that
/// means a cycle; reconstruction is abandoned instead of looping.
fn reconstruct_path(
    nodes: &[crate::navgrid::NavNode],
    start_idx: usize,
    goal_idx: usize,
) -> Option<PathResult> {
    let cap = nodes.len();
    let mut path = vec![nodes[goal_idx].position];
    let mut parent = nodes[goal_idx].parent;
    let mut steps = 0;

    while let Some(pi) = parent {
        if steps >= cap {
            log::warn!("Prevented infinite loop while building path ({} steps)", steps);
            return None;
        }
        steps += 1;
        path.push(nodes[pi].position);
        parent = nodes[pi].parent;
    }

    debug_assert_eq!(path.last(), Some(&nodes[start_idx].position));
    path.reverse();
    Some(PathResult {
        nodes: path,
        cost: nodes[goal_idx].start_distance,
    })
}

/// Find a path between two whole cells and return world points.
///
/// Empty when there is no path, when either cell is not in the grid, or when
/// either cell is unwalkable.
pub fn find_path(grid: &NavGrid, start: Coord, goal: Coord) -> Vec<Point> {
    search(grid, NodePos::from_cell(start), NodePos::from_cell(goal))
        .map(|result| result.world_points())
        .unwrap_or_default()
}

/// Sum of step costs along a node sequence.
pub fn path_cost(nodes: &[NodePos]) -> f32 {
    nodes
        .windows(2)
        .map(|w| diagonal_distance(w[0], w[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::Border;
    use crate::navgrid::{NavNode, WallSet};

    fn grid(left: i32, bottom: i32, right: i32, top: i32, wall_cells: &[(i32, i32)]) -> NavGrid {
        NavGrid::from_walls(&WallSet {
            borders: Border {
                top,
                bottom,
                right,
                left,
            },
            cells: wall_cells.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
        })
    }

    fn cell(x: i32, y: i32) -> NodePos {
        NodePos::from_cell(Coord::new(x, y))
    }

    #[test]
    fn distance_formula() {
        // s = 0.5: √1 − 1 = 0, so the diagonal term vanishes.
        assert_eq!(diagonal_distance(cell(0, 0), cell(2, 1)), 1.5);
        assert_eq!(diagonal_distance(NodePos::new(0, 0), NodePos::new(1, 1)), 0.5);
        assert_eq!(diagonal_distance(NodePos::new(0, 0), NodePos::new(0, 1)), 0.25);
        assert_eq!(diagonal_distance(cell(3, 3), cell(3, 3)), 0.0);
    }

    #[test]
    fn start_equals_goal() {
        let g = grid(0, 0, 4, 4, &[]);
        let path = find_path(&g, Coord::new(2, 2), Coord::new(2, 2));
        assert_eq!(path, vec![Point::new(2.5, 2.5)]);
    }

    #[test]
    fn open_grid_path_is_optimal() {
        let g = grid(0, 0, 9, 7, &[]);
        for (a, b) in [((0, 0), (9, 7)), ((1, 6), (8, 2)), ((4, 0), (4, 7)), ((0, 3), (9, 3))] {
            let start = cell(a.0, a.1);
            let goal = cell(b.0, b.1);
            let result = search(&g, start, goal).expect("open grid must have a path");
            let expected = diagonal_distance(start, goal);
            assert!((result.cost - expected).abs() < 1e-4, "{a:?}->{b:?}: {} vs {expected}", result.cost);
            assert!((path_cost(&result.nodes) - result.cost).abs() < 1e-4);
            assert_eq!(result.nodes.first(), Some(&start));
            assert_eq!(result.nodes.last(), Some(&goal));
        }
    }

    #[test]
    fn path_steps_are_adjacent_and_walkable() {
        let g = grid(0, 0, 6, 6, &[(3, 1), (3, 2), (3, 3), (3, 4), (3, 5), (3, 6)]);
        let result = search(&g, cell(1, 4), cell(5, 4)).unwrap();
        for w in result.nodes.windows(2) {
            assert!((w[0].x - w[1].x).abs() <= 1 && (w[0].y - w[1].y).abs() <= 1);
            assert!(g.is_walkable(w[1]));
        }
        // Must detour below the wall column.
        assert!(result.nodes.iter().any(|n| n.y <= 1));
    }

    #[test]
    fn unwalkable_goal_returns_empty() {
        let g = grid(0, 0, 4, 4, &[(3, 3)]);
        assert!(find_path(&g, Coord::new(0, 0), Coord::new(3, 3)).is_empty());
        assert!(find_path(&g, Coord::new(3, 3), Coord::new(0, 0)).is_empty());
    }

    #[test]
    fn goal_outside_grid_returns_empty() {
        let g = grid(0, 0, 4, 4, &[]);
        assert!(find_path(&g, Coord::new(0, 0), Coord::new(40, 0)).is_empty());
        assert!(find_path(&NavGrid::new(), Coord::new(0, 0), Coord::new(0, 0)).is_empty());
    }

    #[test]
    fn walled_off_goal_returns_empty() {
        // Ring of walls around (4, 4).
        let ring = [
            (3, 3),
            (4, 3),
            (5, 3),
            (3, 4),
            (5, 4),
            (3, 5),
            (4, 5),
            (5, 5),
        ];
        let g = grid(0, 0, 8, 8, &ring);
        assert!(g.is_walkable(cell(4, 4)));
        assert!(find_path(&g, Coord::new(0, 0), Coord::new(4, 4)).is_empty());
    }

    #[test]
    fn search_leaves_grid_pristine() {
        let g = grid(0, 0, 5, 5, &[(2, 2)]);
        let before = g.nodes().to_vec();
        let _ = search(&g, cell(0, 0), cell(5, 5));
        assert_eq!(g.nodes(), before.as_slice());
        assert!(g.nodes().iter().all(|n| n.parent.is_none()));
    }

    #[test]
    fn reconstruction_stops_on_parent_cycle() {
        let mut a = NavNode::new(cell(0, 0), true);
        let mut b = NavNode::new(cell(1, 0), true);
        a.parent = Some(1);
        b.parent = Some(0);
        let nodes = [a, b];
        assert!(reconstruct_path(&nodes, 0, 1).is_none());
    }

    #[test]
    fn reconstruction_follows_parents_to_start() {
        let a = NavNode::new(cell(0, 0), true);
        let mut b = NavNode::new(cell(1, 0), true);
        b.parent = Some(0);
        b.start_distance = 1.0;
        let result = reconstruct_path(&[a, b], 0, 1).unwrap();
        assert_eq!(result.nodes, vec![cell(0, 0), cell(1, 0)]);
        assert_eq!(result.cost, 1.0);
    }

    fn entry(f_score: f32, h_score: f32, seq: u64) -> OpenEntry {
        OpenEntry {
            index: seq as usize,
            f_score,
            h_score,
            seq,
        }
    }

    #[test]
    fn open_set_pops_lowest_f_first() {
        let mut open = BinaryHeap::new();
        open.push(entry(3.0, 0.0, 0));
        open.push(entry(1.0, 1.0, 1));
        open.push(entry(2.0, 0.5, 2));
        let order: Vec<usize> = std::iter::from_fn(|| open.pop().map(|e| e.index)).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn open_set_prefers_lower_h_on_equal_f() {
        let mut open = BinaryHeap::new();
        open.push(entry(2.0, 1.5, 0));
        open.push(entry(2.0, 0.5, 1));
        let first = open.pop().unwrap();
        assert_eq!(first.h_score, 0.5);
        assert_eq!(first.index, 1);
    }

    #[test]
    fn open_set_prefers_earlier_entry_on_full_tie() {
        let mut open = BinaryHeap::new();
        open.push(entry(2.0, 1.0, 7));
        open.push(entry(2.0, 1.0, 3));
        open.push(entry(2.0, 1.0, 5));
        let order: Vec<u64> = std::iter::from_fn(|| open.pop().map(|e| e.seq)).collect();
        assert_eq!(order, vec![3, 5, 7]);
    }

    #[test]
    fn world_points_are_centred() {
        let g = grid(0, 0, 3, 0, &[]);
        let path = find_path(&g, Coord::new(0, 0), Coord::new(1, 0));
        assert_eq!(path.first(), Some(&Point::new(0.5, 0.5)));
        assert_eq!(path.last(), Some(&Point::new(1.5, 0.5)));
        assert_eq!(path.len(), 3);
    }
}

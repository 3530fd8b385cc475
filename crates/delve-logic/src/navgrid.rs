//! Navigation grid for the active room.
//!
//! The grid is a flat arena of half-unit nodes built for one room at a time.
//! Every whole cell inside the room borders contributes a node, plus up to
//! eight half-offset neighbours. A neighbour is skipped when reaching it
//! would cross or touch an unwalkable cell, so diagonal movement can never
//! cut a wall corner. Synthesized nodes inherit the walkability of the cell
//! that produced them; when two cells produce the same node, the first one
//! (in x-ascending, y-descending scan order) wins.
//!
//! Rebuilding replaces the whole arena. A coordinate → index map gives O(1)
//! lookup for the pathfinder.
//!
//! See also: `pathfinding.rs` for A* over this grid.

use crate::constants::NAV_CELL_SIDE;
use crate::dungeon::{Border, Room, RoomId};
use crate::types::{Coord, Point};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Node position in half-unit steps (world = value × 0.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodePos {
    pub x: i32,
    pub y: i32,
}

impl NodePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Node sitting on a whole world cell.
    pub fn from_cell(cell: Coord) -> Self {
        Self::new(cell.x * 2, cell.y * 2)
    }

    pub fn step(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Logical position in world units (may be on a half unit).
    pub fn logical(self) -> Point {
        Point::new(self.x as f32 * NAV_CELL_SIDE, self.y as f32 * NAV_CELL_SIDE)
    }

    /// World point an agent should walk to: the logical position centred
    /// inside its tile.
    pub fn to_world(self) -> Point {
        let p = self.logical();
        Point::new(p.x + 0.5, p.y + 0.5)
    }
}

/// Eight movement directions in half-unit steps: N, S, W, E, NE, NW, SE, SW.
pub const NEIGHBOR_STEPS: [(i32, i32); 8] = [
    (0, 1),
    (0, -1),
    (-1, 0),
    (1, 0),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
];

/// One grid node with A* scoring state.
///
/// The grid keeps canonical copies with infinite scores; a search works on
/// its own clone of the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavNode {
    pub position: NodePos,
    pub walkable: bool,
    /// g-score: best known cost from the search start.
    pub start_distance: f32,
    /// h-score: heuristic cost to the goal.
    pub target_distance: f32,
    /// Arena index of the predecessor on the best known path.
    pub parent: Option<usize>,
}

impl NavNode {
    pub fn new(position: NodePos, walkable: bool) -> Self {
        Self {
            position,
            walkable,
            start_distance: f32::INFINITY,
            target_distance: f32::INFINITY,
            parent: None,
        }
    }

    /// f-score (g + h).
    pub fn efficiency(&self) -> f32 {
        self.start_distance + self.target_distance
    }
}

/// Answers "is this whole cell unwalkable" for the grid builder.
pub trait UnwalkableProbe {
    fn is_unwalkable(&self, cell: Coord) -> bool;
}

impl<F> UnwalkableProbe for F
where
    F: Fn(Coord) -> bool,
{
    fn is_unwalkable(&self, cell: Coord) -> bool {
        self(cell)
    }
}

/// Probe backed by tile layers: an optional walkable surface plus any number
/// of blocking layers.
///
/// A cell is unwalkable when a blocking layer holds a tile there, or when a
/// surface layer is present and has no tile there.
#[derive(Debug, Clone, Default)]
pub struct ObstacleMap {
    pub surface: Option<HashSet<Coord>>,
    pub blocking: Vec<HashSet<Coord>>,
}

impl ObstacleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_surface(mut self, cells: impl IntoIterator<Item = Coord>) -> Self {
        self.surface = Some(cells.into_iter().collect());
        self
    }

    pub fn with_blocking_layer(mut self, cells: impl IntoIterator<Item = Coord>) -> Self {
        self.blocking.push(cells.into_iter().collect());
        self
    }
}

impl UnwalkableProbe for ObstacleMap {
    fn is_unwalkable(&self, cell: Coord) -> bool {
        if self.blocking.iter().any(|layer| layer.contains(&cell)) {
            return true;
        }
        match &self.surface {
            Some(surface) => !surface.contains(&cell),
            None => false,
        }
    }
}

/// Unwalkable cells of one room, sampled from a probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WallSet {
    pub borders: Border,
    pub cells: HashSet<Coord>,
}

impl WallSet {
    /// Query `probe` for every whole cell inside `borders` (inclusive).
    pub fn sample(borders: Border, probe: &(impl UnwalkableProbe + ?Sized)) -> Self {
        let mut cells = HashSet::new();
        for x in borders.left..=borders.right {
            for y in (borders.bottom..=borders.top).rev() {
                let cell = Coord::new(x, y);
                if probe.is_unwalkable(cell) {
                    cells.insert(cell);
                }
            }
        }
        Self { borders, cells }
    }

    /// Cells outside the sampled borders count as walkable.
    pub fn contains(&self, cell: Coord) -> bool {
        self.cells.contains(&cell)
    }
}

/// The working navigation grid.
#[derive(Debug, Clone, Default)]
pub struct NavGrid {
    room: Option<RoomId>,
    borders: Border,
    nodes: Vec<NavNode>,
    index: HashMap<NodePos, usize>,
}

impl NavGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the grid for `room`, querying `probe` for walls.
    pub fn build(room: &Room, probe: &(impl UnwalkableProbe + ?Sized)) -> Self {
        let walls = WallSet::sample(room.borders, probe);
        Self::from_walls(&walls).with_room(room.id)
    }

    /// Tag the grid with the room it was built for.
    pub fn with_room(mut self, room: RoomId) -> Self {
        self.room = Some(room);
        self
    }

    /// Build the grid from an already sampled wall set.
    pub fn from_walls(walls: &WallSet) -> Self {
        let borders = walls.borders;
        let mut grid = Self {
            room: None,
            borders,
            nodes: Vec::new(),
            index: HashMap::new(),
        };

        for x in borders.left..=borders.right {
            for y in (borders.bottom..=borders.top).rev() {
                let cell = Coord::new(x, y);
                let on_wall = walls.contains(cell);
                let centre = NodePos::from_cell(cell);
                grid.insert(NavNode::new(centre, !on_wall));

                for (dx, dy) in NEIGHBOR_STEPS {
                    if !on_wall
                        && (walls.contains(Coord::new(x, y + dy))
                            || walls.contains(Coord::new(x + dx, y))
                            || walls.contains(Coord::new(x + dx, y + dy)))
                    {
                        continue;
                    }
                    grid.insert(NavNode::new(centre.step(dx, dy), !on_wall));
                }
            }
        }

        log::debug!(
            "Built nav grid: {} nodes, {} wall cells",
            grid.nodes.len(),
            walls.cells.len()
        );
        grid
    }

    fn insert(&mut self, node: NavNode) {
        if self.index.contains_key(&node.position) {
            return;
        }
        self.index.insert(node.position, self.nodes.len());
        self.nodes.push(node);
    }

    /// Room the grid currently describes.
    pub fn room(&self) -> Option<RoomId> {
        self.room
    }

    pub fn borders(&self) -> Border {
        self.borders
    }

    pub fn nodes(&self) -> &[NavNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, position: NodePos) -> Option<usize> {
        self.index.get(&position).copied()
    }

    pub fn node(&self, position: NodePos) -> Option<&NavNode> {
        self.index_of(position).map(|i| &self.nodes[i])
    }

    pub fn is_walkable(&self, position: NodePos) -> bool {
        self.node(position).is_some_and(|n| n.walkable)
    }

    pub fn walkable_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.walkable).count()
    }
}

//! Dungeon generation - grows a connected room graph breadth-first
//!
//! A 1×1 start room sits at the origin with one random entrance. A fixed-size
//! second room is attached through that entrance, and both seed a FIFO
//! frontier. Each wave expands every room queued at the start of the wave:
//! for every open exit whose far side is still empty, a new room grows away
//! from the exit. Rooms grown on the final wave, or once the room cap is
//! reached, are 1×1 dead-ends that only open exits their neighbours already
//! demand.

use delve_logic::config::{validate_config, ConfigError, DungeonConfig};
use delve_logic::constants::stamp_offsets;
use delve_logic::direction::{Direction, Exits};
use delve_logic::dungeon::{DungeonGraph, Room, RoomFragment, RoomId};
use delve_logic::samples::{axis_role, classify, FillingKind, FragmentStamp, RoomFilling};
use delve_logic::types::Coord;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// How a growing room picks its footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Footprint {
    Fixed(Coord),
    /// Each side drawn from 1..=max.
    Random,
    Single,
}

/// Bookkeeping for one generated room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    /// 0 for the two starting rooms, `n` for rooms grown on wave `n`.
    pub wave: u32,
    /// Grown without speculative exits.
    pub dead_end: bool,
    pub filling: Option<RoomFilling>,
}

/// A generated dungeon plus everything its collaborators need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DungeonLayout {
    pub graph: DungeonGraph,
    /// One stamp per fragment, in creation order.
    pub stamps: Vec<FragmentStamp>,
    /// Indexed by room id.
    pub records: Vec<RoomRecord>,
    /// Entrance drawn for the start room.
    pub entrance: Option<Direction>,
}

impl DungeonLayout {
    /// The room holding the origin fragment.
    pub fn start_room(&self) -> Option<&Room> {
        self.graph.room_at(Coord::ZERO)
    }

    pub fn record(&self, room: RoomId) -> Option<&RoomRecord> {
        self.records.get(room.0 as usize)
    }

    pub fn filling(&self, room: RoomId) -> Option<RoomFilling> {
        self.record(room).and_then(|r| r.filling)
    }

    pub fn stamp_at(&self, position: Coord) -> Option<&FragmentStamp> {
        self.stamps.iter().find(|s| s.position == position)
    }

    pub fn dead_end_count(&self) -> usize {
        self.records.iter().filter(|r| r.dead_end).count()
    }
}

/// Room-graph generator for one configuration.
#[derive(Debug, Clone)]
pub struct DungeonGenerator {
    config: DungeonConfig,
}

impl DungeonGenerator {
    /// Create a generator, rejecting invalid configurations.
    ///
    /// Every problem is logged; the first one is returned.
    pub fn new(config: DungeonConfig) -> Result<Self, ConfigError> {
        let errors = validate_config(&config);
        for error in &errors {
            log::warn!("Invalid dungeon config: {}", error);
        }
        match errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(Self { config }),
        }
    }

    pub fn config(&self) -> &DungeonConfig {
        &self.config
    }

    /// Generate a dungeon with a random start entrance.
    pub fn generate(&self, rng: &mut impl Rng) -> DungeonLayout {
        let entrance = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        self.generate_from(entrance, rng)
    }

    /// Generate a dungeon whose start room opens towards `entrance`.
    pub fn generate_from(&self, entrance: Direction, rng: &mut impl Rng) -> DungeonLayout {
        let config = &self.config;
        let mut builder = LayoutBuilder::new(config);
        builder.layout.entrance = Some(entrance);

        let mut frontier = VecDeque::new();
        let start = builder.grow_room(
            Coord::ZERO,
            entrance,
            Footprint::Fixed(Coord::new(1, 1)),
            false,
            Some(FillingKind::Start),
            0,
            rng,
        );
        frontier.extend(start);

        // The start room carries exactly its entrance.
        let opening = builder
            .layout
            .graph
            .fragment_at(Coord::ZERO)
            .map_or(entrance, |f| f.exits.direction());
        let second_origin = opening.offset().scale(config.fragment_size);
        let second = builder.grow_room(
            second_origin,
            opening.opposite(),
            Footprint::Fixed(config.second_room_size),
            true,
            None,
            0,
            rng,
        );
        frontier.extend(second);

        let cap = config.max_rooms_before_dead_ends as usize;
        for wave in 1..=config.generation_iterations {
            let final_wave = wave == config.generation_iterations;
            let queued = frontier.len();

            for _ in 0..queued {
                let Some(room_id) = frontier.pop_front() else {
                    break;
                };
                let Some(room) = builder.layout.graph.room(room_id) else {
                    continue;
                };
                let candidates: Vec<(Coord, Direction)> = room
                    .fragments
                    .iter()
                    .flat_map(|f| {
                        f.exits
                            .iter()
                            .map(move |d| (f.neighbor_position(d, config.fragment_size), d))
                    })
                    .collect();

                for (target, direction) in candidates {
                    if builder.layout.graph.is_occupied(target) {
                        continue;
                    }
                    let dead_end = final_wave || builder.layout.graph.room_count() >= cap;
                    let footprint = if dead_end {
                        Footprint::Single
                    } else {
                        Footprint::Random
                    };
                    let grown = builder.grow_room(
                        target,
                        direction.opposite(),
                        footprint,
                        !dead_end,
                        None,
                        wave,
                        rng,
                    );
                    frontier.extend(grown);
                }
            }
        }

        let layout = builder.layout;
        log::info!(
            "Generated dungeon: {} rooms, {} fragments, {} dead-ends (entrance {})",
            layout.graph.room_count(),
            layout.graph.fragment_count(),
            layout.dead_end_count(),
            entrance
        );
        layout
    }
}

/// Mutable state threaded through one generation run.
struct LayoutBuilder<'a> {
    config: &'a DungeonConfig,
    layout: DungeonLayout,
}

impl<'a> LayoutBuilder<'a> {
    fn new(config: &'a DungeonConfig) -> Self {
        Self {
            config,
            layout: DungeonLayout {
                graph: DungeonGraph::new(config.fragment_size),
                ..DungeonLayout::default()
            },
        }
    }

    /// Grow a room whose origin fragment sits at `origin` and opens towards
    /// `entrance`. Returns `None` if the origin is already taken.
    #[allow(clippy::too_many_arguments)]
    fn grow_room(
        &mut self,
        origin: Coord,
        entrance: Direction,
        footprint: Footprint,
        randomize_exits: bool,
        filling: Option<FillingKind>,
        wave: u32,
        rng: &mut impl Rng,
    ) -> Option<RoomId> {
        let graph = &self.layout.graph;
        if graph.is_occupied(origin) {
            log::debug!("Dropped room at {}: origin occupied", origin);
            return None;
        }

        let size = self.config.fragment_size;
        let mut grow = -entrance.offset();
        let sign = if rng.gen_range(0..2) == 0 { -1 } else { 1 };
        if grow.x == 0 {
            grow.x = sign;
        } else {
            grow.y = sign;
        }

        let max = self.config.max_room_side_length;
        let (mut width, mut height) = match footprint {
            Footprint::Fixed(s) => (s.x, s.y),
            Footprint::Random => (rng.gen_range(1..=max), rng.gen_range(1..=max)),
            Footprint::Single => (1, 1),
        };

        let place = |x: i32, y: i32| origin + Coord::new(x * size.x * grow.x, y * size.y * grow.y);

        let collides = (0..width)
            .flat_map(|x| (0..height).map(move |y| (x, y)))
            .any(|(x, y)| (x, y) != (0, 0) && graph.is_occupied(place(x, y)));
        if collides {
            log::debug!(
                "Room at {} shrunk from {}x{} to 1x1: footprint collides",
                origin,
                width,
                height
            );
            width = 1;
            height = 1;
        }

        let room_id = graph.next_room_id();
        let mut fragments = Vec::with_capacity((width * height) as usize);
        let mut stamps = Vec::with_capacity(fragments.capacity());

        for x in 0..width {
            for y in 0..height {
                let position = place(x, y);
                let possible = possible_exits(x, y, width, height, grow);

                let mut guaranteed = Exits::NONE;
                let mut banned = Exits::NONE;
                for direction in Direction::ALL {
                    let across = position + direction.offset().scale(size);
                    if let Some(neighbor) = graph.fragment_at(across) {
                        if neighbor.exits.contains(direction.opposite()) {
                            guaranteed.insert(direction);
                        } else {
                            banned.insert(direction);
                        }
                    }
                }

                let mut exits = if randomize_exits {
                    let random = Exits::from_bits(rng.gen_range(1..16));
                    (random | guaranteed) & possible & !banned
                } else {
                    possible & guaranteed & !banned
                };
                if x == 0 && y == 0 {
                    exits |= entrance;
                }

                let sample = classify(
                    axis_role(x, width, grow.x, Direction::Left, Direction::Right),
                    axis_role(y, height, grow.y, Direction::Bottom, Direction::Top),
                );
                stamps.push(FragmentStamp::new(position, sample, possible, exits));
                fragments.push(RoomFragment {
                    position,
                    exits,
                    room: room_id,
                });
            }
        }

        let Some(id) = self.layout.graph.insert_room(fragments, width, height) else {
            log::debug!("Dropped room at {}: insertion rejected", origin);
            return None;
        };
        self.layout.stamps.extend(stamps);

        let filling = self.pick_filling(id, filling, rng);
        self.layout.records.push(RoomRecord {
            wave,
            dead_end: footprint == Footprint::Single,
            filling,
        });
        Some(id)
    }

    fn pick_filling(
        &self,
        room: RoomId,
        kind: Option<FillingKind>,
        rng: &mut impl Rng,
    ) -> Option<RoomFilling> {
        let room = self.layout.graph.room(room)?;
        let kind = kind.or_else(|| FillingKind::for_footprint(room.width, room.height))?;
        let count = self.config.filling_variants.count(kind);
        if count == 0 {
            return None;
        }
        Some(RoomFilling {
            kind,
            variant: rng.gen_range(0..count),
            anchor: Coord::new(room.borders.left, room.borders.top) + stamp_offsets::FILLING,
        })
    }
}

/// Sides of slot `(x, y)` that lie on its room's outer boundary.
fn possible_exits(x: i32, y: i32, width: i32, height: i32, grow: Coord) -> Exits {
    let (near_x, far_x) = if grow.x == 1 {
        (Direction::Left, Direction::Right)
    } else {
        (Direction::Right, Direction::Left)
    };
    let (near_y, far_y) = if grow.y == 1 {
        (Direction::Bottom, Direction::Top)
    } else {
        (Direction::Top, Direction::Bottom)
    };

    let mut possible = Exits::NONE;
    if x == 0 {
        possible.insert(near_x);
    }
    if y == 0 {
        possible.insert(near_y);
    }
    if x == width - 1 {
        possible.insert(far_x);
    }
    if y == height - 1 {
        possible.insert(far_y);
    }
    possible
}

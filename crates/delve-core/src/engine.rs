//! Dungeon engine - main entry point for generating and exploring a dungeon

use crate::events::{DungeonEvent, EventQueue, RoomState};
use crate::generation::{DungeonGenerator, DungeonLayout};
use crate::navigation::{NavigationError, NavigationService, Pending};
use delve_logic::config::{ConfigError, DungeonConfig};
use delve_logic::direction::Direction;
use delve_logic::dungeon::{Room, RoomId};
use delve_logic::navgrid::UnwalkableProbe;
use delve_logic::types::{Coord, Point};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

/// Navigation service plus the wall probe used for every rebuild.
struct NavigationLink {
    service: NavigationService,
    probe: Box<dyn UnwalkableProbe>,
    rebuild: Option<Pending<usize>>,
}

/// Owns the current dungeon, the active room and the visited bookkeeping.
pub struct DungeonEngine {
    generator: DungeonGenerator,
    rng: StdRng,
    layout: Option<DungeonLayout>,
    current_room: Option<RoomId>,
    /// Fragment the player is standing in.
    current_fragment: Coord,
    visited: HashSet<RoomId>,
    all_visited: bool,
    events: EventQueue,
    navigation: Option<NavigationLink>,
}

impl DungeonEngine {
    /// Create an engine with no dungeon yet.
    pub fn new(config: DungeonConfig) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            generator: DungeonGenerator::new(config)?,
            rng,
            layout: None,
            current_room: None,
            current_fragment: Coord::ZERO,
            visited: HashSet::new(),
            all_visited: false,
            events: EventQueue::new(),
            navigation: None,
        })
    }

    /// Attach a navigation service; the grid is rebuilt whenever the active
    /// room changes.
    pub fn with_navigation(
        mut self,
        service: NavigationService,
        probe: impl UnwalkableProbe + 'static,
    ) -> Self {
        self.navigation = Some(NavigationLink {
            service,
            probe: Box::new(probe),
            rebuild: None,
        });
        self.request_rebuild();
        self
    }

    pub fn config(&self) -> &DungeonConfig {
        self.generator.config()
    }

    /// Throw away the current dungeon and generate a new one.
    pub fn generate(&mut self) {
        self.layout = None;
        self.current_room = None;
        self.visited.clear();
        self.all_visited = false;
        self.events.clear();

        let layout = self.generator.generate(&mut self.rng);
        for room in layout.graph.rooms() {
            self.events.push(DungeonEvent::RoomAdded {
                room: room.id,
                top_left: room.top_left,
                width: room.width,
                height: room.height,
                state: RoomState::NotVisited,
            });
        }

        let start = layout
            .start_room()
            .map(|room| (room.id, room.fragments[0].position));
        self.layout = Some(layout);

        match start {
            Some((room, fragment)) => self.enter_room(room, fragment, Direction::Left),
            None => log::error!("Generated dungeon has no start room"),
        }
    }

    /// Track the player. Returns the new room if the active room changed.
    pub fn update_player_position(&mut self, x: f32, y: f32) -> Option<RoomId> {
        let layout = self.layout.as_ref()?;
        let size = self.generator.config().fragment_size;
        let slack = self.generator.config().max_off_camera_distance;
        let half_w = size.x as f32 / 2.0 + slack;
        let half_h = size.y as f32 / 2.0 + slack;
        let here = self.current_fragment;

        let mut leave = None;
        if x > here.x as f32 + half_w {
            leave = Some(Direction::Right);
        }
        if x < here.x as f32 - half_w {
            leave = Some(Direction::Left);
        }
        if y > here.y as f32 + half_h {
            leave = Some(Direction::Top);
        }
        if y < here.y as f32 - half_h {
            leave = Some(Direction::Bottom);
        }
        let direction = leave?;

        let next = here + direction.offset().scale(size);
        let Some(fragment) = layout.graph.fragment_at(next) else {
            log::warn!(
                "Player left fragment {} towards {} but there is no fragment at {}",
                here,
                direction,
                next
            );
            return None;
        };
        let room = fragment.room;
        self.current_fragment = next;

        if Some(room) == self.current_room {
            return None;
        }
        self.enter_room(room, next, direction);
        Some(room)
    }

    fn enter_room(&mut self, room: RoomId, fragment: Coord, leave_direction: Direction) {
        self.current_room = Some(room);
        self.current_fragment = fragment;
        log::info!("Entered room {:?} at {} (leaving {})", room, fragment, leave_direction);

        self.events.push(DungeonEvent::RoomChanged {
            room,
            entered_fragment: fragment,
            leave_direction,
        });

        if self.visited.insert(room) {
            if let Some(top_left) = self.room(room).map(|r| r.top_left) {
                self.events.push(DungeonEvent::RoomStateChanged {
                    top_left,
                    state: RoomState::Visited,
                });
            }
            if !self.all_visited && self.visited.len() == self.rooms().len() {
                self.all_visited = true;
                log::info!("All {} rooms visited", self.visited.len());
                self.events.push(DungeonEvent::AllRoomsVisited);
            }
        }

        self.request_rebuild();
    }

    fn request_rebuild(&mut self) {
        let (Some(link), Some(layout), Some(id)) =
            (&mut self.navigation, &self.layout, self.current_room)
        else {
            return;
        };
        if let Some(room) = layout.graph.room(id) {
            link.rebuild = Some(link.service.set_working_room(room, link.probe.as_ref()));
        }
    }

    /// Block until the last grid rebuild completes. Returns its node count.
    pub fn wait_for_navigation(&mut self) -> Result<Option<usize>, NavigationError> {
        match self.navigation.as_mut().and_then(|link| link.rebuild.take()) {
            Some(pending) => pending.wait().map(Some),
            None => Ok(None),
        }
    }

    /// Queue a path request against the active room's grid.
    pub fn find_path(&self, start: Coord, goal: Coord) -> Option<Pending<Vec<Point>>> {
        self.navigation
            .as_ref()
            .map(|link| link.service.find_path(start, goal))
    }

    pub fn navigation(&self) -> Option<&NavigationService> {
        self.navigation.as_ref().map(|link| &link.service)
    }

    /// Take every event queued since the last call.
    pub fn drain_events(&mut self) -> Vec<DungeonEvent> {
        self.events.drain()
    }

    pub fn layout(&self) -> Option<&DungeonLayout> {
        self.layout.as_ref()
    }

    pub fn rooms(&self) -> &[Room] {
        self.layout
            .as_ref()
            .map(|l| l.graph.rooms())
            .unwrap_or(&[])
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.layout.as_ref().and_then(|l| l.graph.room(id))
    }

    pub fn current_room(&self) -> Option<&Room> {
        self.current_room.and_then(|id| self.room(id))
    }

    pub fn current_fragment(&self) -> Coord {
        self.current_fragment
    }

    pub fn is_visited(&self, room: RoomId) -> bool {
        self.visited.contains(&room)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn all_rooms_visited(&self) -> bool {
        self.all_visited
    }
}

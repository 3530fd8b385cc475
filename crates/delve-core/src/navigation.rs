//! Background navigation - a worker thread that owns the working grid
//!
//! The worker is a single-threaded actor: the [`NavGrid`] never leaves its
//! thread, and requests arrive over one channel and run strictly in order.
//! A path request sent after a rebuild therefore always sees the rebuilt
//! grid, without any locking.
//!
//! Wall probes are sampled on the caller's thread, so probes need not be
//! `Send`. Every request hands back a [`Pending`] that can be waited on or
//! polled from a game loop. Dropping a `Pending` discards the result.

use delve_logic::dungeon::{Room, RoomId};
use delve_logic::navgrid::{NavGrid, UnwalkableProbe, WallSet};
use delve_logic::pathfinding::find_path;
use delve_logic::types::{Coord, Point};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("navigation worker has shut down")]
    WorkerGone,
}

enum Request {
    Rebuild {
        room: RoomId,
        walls: WallSet,
        reply: Sender<usize>,
    },
    FindPath {
        start: Coord,
        goal: Coord,
        reply: Sender<Vec<Point>>,
    },
    Shutdown,
}

/// Result of a request still being processed by the worker.
#[derive(Debug)]
pub struct Pending<T> {
    receiver: Receiver<T>,
}

impl<T> Pending<T> {
    /// Block until the worker answers.
    pub fn wait(self) -> Result<T, NavigationError> {
        self.receiver.recv().map_err(|_| NavigationError::WorkerGone)
    }

    /// Non-blocking check: `Ok(None)` while the request is still queued.
    pub fn poll(&mut self) -> Result<Option<T>, NavigationError> {
        match self.receiver.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(NavigationError::WorkerGone),
        }
    }
}

/// Owner of the navigation worker thread.
pub struct NavigationService {
    sender: Sender<Request>,
    worker: Option<JoinHandle<()>>,
}

impl NavigationService {
    /// Start the worker with an empty grid.
    pub fn spawn() -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("delve-navigation".into())
            .spawn(move || run_worker(receiver))?;
        Ok(Self {
            sender,
            worker: Some(worker),
        })
    }

    /// Replace the working grid with one built for `room`.
    ///
    /// Resolves to the node count of the new grid.
    pub fn set_working_room(
        &self,
        room: &Room,
        probe: &(impl UnwalkableProbe + ?Sized),
    ) -> Pending<usize> {
        let walls = WallSet::sample(room.borders, probe);
        let (reply, receiver) = mpsc::channel();
        self.send(Request::Rebuild {
            room: room.id,
            walls,
            reply,
        });
        Pending { receiver }
    }

    /// Path between two whole cells of the working grid.
    ///
    /// Resolves to an empty path when there is none.
    pub fn find_path(&self, start: Coord, goal: Coord) -> Pending<Vec<Point>> {
        let (reply, receiver) = mpsc::channel();
        self.send(Request::FindPath { start, goal, reply });
        Pending { receiver }
    }

    /// Synchronous [`find_path`](Self::find_path).
    pub fn find_path_blocking(&self, start: Coord, goal: Coord) -> Vec<Point> {
        match self.find_path(start, goal).wait() {
            Ok(path) => path,
            Err(err) => {
                log::warn!("Path request {} -> {} failed: {}", start, goal, err);
                Vec::new()
            }
        }
    }

    // A failed send drops the request and its reply sender, so the matching
    // `Pending` reports `WorkerGone`.
    fn send(&self, request: Request) {
        if self.sender.send(request).is_err() {
            log::warn!("Navigation worker is gone; request dropped");
        }
    }
}

impl Drop for NavigationService {
    fn drop(&mut self) {
        let _ = self.sender.send(Request::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Navigation worker panicked");
            }
        }
    }
}

fn run_worker(receiver: Receiver<Request>) {
    let mut grid = NavGrid::new();
    while let Ok(request) = receiver.recv() {
        match request {
            Request::Rebuild { room, walls, reply } => {
                grid = NavGrid::from_walls(&walls).with_room(room);
                log::debug!("Navigation grid rebuilt for room {:?}: {} nodes", room, grid.len());
                let _ = reply.send(grid.len());
            }
            Request::FindPath { start, goal, reply } => {
                let _ = reply.send(find_path(&grid, start, goal));
            }
            Request::Shutdown => break,
        }
    }
    log::debug!("Navigation worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_logic::constants::FRAGMENT_SIZE;
    use delve_logic::direction::Exits;
    use delve_logic::dungeon::RoomFragment;

    fn room() -> Room {
        let fragment = RoomFragment {
            position: Coord::ZERO,
            exits: Exits::NONE,
            room: RoomId(0),
        };
        Room::new(RoomId(4), vec![fragment], 1, 1, FRAGMENT_SIZE)
    }

    #[test]
    fn test_path_before_any_room_is_empty() {
        let service = NavigationService::spawn().unwrap();
        assert!(service.find_path_blocking(Coord::ZERO, Coord::new(1, 0)).is_empty());
    }

    #[test]
    fn test_rebuild_then_path() {
        let service = NavigationService::spawn().unwrap();
        let rebuilt = service.set_working_room(&room(), &|_: Coord| false);
        let path = service.find_path(Coord::new(-3, 0), Coord::new(3, 0));

        // 15×11 cells on a half-unit lattice.
        assert_eq!(rebuilt.wait().unwrap(), 31 * 23);
        let path = path.wait().unwrap();
        assert_eq!(path.first(), Some(&Point::new(-2.5, 0.5)));
        assert_eq!(path.last(), Some(&Point::new(3.5, 0.5)));
    }

    #[test]
    fn test_poll_eventually_resolves() {
        let service = NavigationService::spawn().unwrap();
        let mut pending = service.set_working_room(&room(), &|_: Coord| false);
        let nodes = loop {
            if let Some(n) = pending.poll().unwrap() {
                break n;
            }
            thread::yield_now();
        };
        assert!(nodes > 0);
    }
}

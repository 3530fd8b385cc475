//! Integration tests for the full dungeon generation pipeline.
//!
//! Exercises: DungeonConfig → DungeonGenerator → DungeonGraph → validate_layout
//!
//! Every property is swept over many seeds with `StdRng`.

use delve_core::generation::{DungeonGenerator, DungeonLayout};
use delve_logic::config::DungeonConfig;
use delve_logic::direction::{Direction, Exits};
use delve_logic::dungeon::RoomId;
use delve_logic::samples::FillingKind;
use delve_logic::types::Coord;
use delve_logic::validation::validate_layout;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

// ── Helpers ────────────────────────────────────────────────────────────

const SEEDS: u64 = 200;

fn generate(config: &DungeonConfig, seed: u64) -> DungeonLayout {
    let generator = DungeonGenerator::new(config.clone()).unwrap();
    generator.generate(&mut StdRng::seed_from_u64(seed))
}

fn configs() -> Vec<DungeonConfig> {
    vec![
        DungeonConfig::default(),
        DungeonConfig {
            max_room_side_length: 3,
            second_room_size: Coord::new(3, 2),
            generation_iterations: 5,
            max_rooms_before_dead_ends: 20,
            ..DungeonConfig::default()
        },
        DungeonConfig {
            generation_iterations: 1,
            ..DungeonConfig::default()
        },
        DungeonConfig {
            max_room_side_length: 3,
            generation_iterations: 6,
            max_rooms_before_dead_ends: 4,
            ..DungeonConfig::default()
        },
    ]
}

/// Upper bound on rooms for a config. Only the first `cap` rooms can branch;
/// each spawns at most one room per outer side except the one it was entered
/// through, and a w×h room has 2·(w+h) outer sides.
fn room_bound(config: &DungeonConfig) -> usize {
    let cap = config.max_rooms_before_dead_ends as usize;
    let perimeter = 4 * config.max_room_side_length as usize;
    2 + cap.saturating_sub(1) * (perimeter - 1)
}

/// Exit flags across all fragments of a room.
fn open_exits(layout: &DungeonLayout, id: RoomId) -> usize {
    layout
        .graph
        .room(id)
        .map(|room| room.fragments.iter().map(|f| f.exits.len()).sum())
        .unwrap_or(0)
}

// ── Concrete scenario ──────────────────────────────────────────────────

#[test]
fn right_entrance_places_second_room_at_one_step() {
    let generator = DungeonGenerator::new(DungeonConfig::default()).unwrap();
    let layout = generator.generate_from(Direction::Right, &mut StdRng::seed_from_u64(1));

    let start = layout.graph.fragment_at(Coord::ZERO).unwrap();
    let second = layout.graph.fragment_at(Coord::new(14, 0)).unwrap();
    assert_eq!(start.room, RoomId(0));
    assert_eq!(second.room, RoomId(1));
    assert_eq!(start.exits, Exits::RIGHT);
    assert!(second.exits.contains(Direction::Left));

    let room = layout.graph.room(RoomId(1)).unwrap();
    assert_eq!(room.fragments[0].position, Coord::new(14, 0));
}

#[test]
fn every_entrance_opens_both_sides() {
    let generator = DungeonGenerator::new(DungeonConfig::default()).unwrap();
    for entrance in Direction::ALL {
        let layout = generator.generate_from(entrance, &mut StdRng::seed_from_u64(9));
        let across = entrance.offset().scale(Coord::new(14, 10));
        let second = layout.graph.fragment_at(across).unwrap();
        assert!(second.exits.contains(entrance.opposite()), "{entrance}");
        assert_eq!(layout.graph.room_at(across).unwrap().footprint(), (2, 2));
    }
}

// ── Layout invariants ──────────────────────────────────────────────────

#[test]
fn generated_layouts_pass_validation() {
    for config in configs() {
        for seed in 0..SEEDS {
            let layout = generate(&config, seed);
            let start = layout.start_room().unwrap().id;
            let errors = validate_layout(&layout.graph, start);
            assert!(errors.is_empty(), "seed {seed}: {errors:?}");
        }
    }
}

#[test]
fn exits_are_symmetric() {
    let config = DungeonConfig::default();
    for seed in 0..SEEDS {
        let layout = generate(&config, seed);
        for fragment in layout.graph.fragments() {
            for direction in Direction::ALL {
                let neighbor = layout.graph.neighbor(fragment.position, direction);
                let here = fragment.exits.contains(direction);
                match neighbor {
                    Some(n) => assert_eq!(here, n.exits.contains(direction.opposite())),
                    // Nothing generated across: the exit must not exist either.
                    None => assert!(!here, "seed {seed}: dangling exit at {}", fragment.position),
                }
            }
        }
    }
}

#[test]
fn rooms_never_overlap() {
    let config = DungeonConfig::default();
    for seed in 0..SEEDS {
        let layout = generate(&config, seed);
        let mut seen = HashSet::new();
        for room in layout.graph.rooms() {
            for fragment in &room.fragments {
                assert!(seen.insert(fragment.position), "seed {seed}: {}", fragment.position);
                assert_eq!(fragment.room, room.id);
            }
        }
    }
}

#[test]
fn growth_is_bounded() {
    for config in configs() {
        let bound = room_bound(&config);
        for seed in 0..SEEDS {
            let layout = generate(&config, seed);
            assert!(layout.graph.room_count() >= 2);
            assert!(
                layout.graph.room_count() <= bound,
                "seed {seed}: {} rooms over bound {bound}",
                layout.graph.room_count()
            );
            let max = config.max_room_side_length;
            for room in layout.graph.rooms() {
                assert!(room.width >= 1 && room.width <= max);
                assert!(room.height >= 1 && room.height <= max);
                assert_eq!(room.fragments.len(), (room.width * room.height) as usize);
            }
        }
    }
}

#[test]
fn rooms_past_the_cap_are_single_dead_ends() {
    for config in configs() {
        let cap = config.max_rooms_before_dead_ends as usize;
        for seed in 0..SEEDS {
            let layout = generate(&config, seed);
            let count = layout.graph.room_count();

            // Only rooms below the cap branch, and never back through the
            // side they were entered from.
            let branching: usize = (1..cap.min(count))
                .map(|i| open_exits(&layout, RoomId(i as u32)) - 1)
                .sum();
            assert!(
                count <= 2 + branching,
                "seed {seed}: {count} rooms from {branching} branching exits"
            );

            for room in layout.graph.rooms().iter().skip(cap) {
                let record = layout.record(room.id).unwrap();
                assert!(record.dead_end, "seed {seed}: room {:?} past the cap", room.id);
                assert_eq!((room.width, room.height), (1, 1));
            }
        }
    }
}

#[test]
fn final_wave_rooms_are_closed_dead_ends() {
    for config in configs() {
        for seed in 0..SEEDS {
            let layout = generate(&config, seed);
            for room in layout.graph.rooms() {
                let record = layout.record(room.id).unwrap();
                if record.wave != config.generation_iterations {
                    continue;
                }
                assert!(record.dead_end);
                assert_eq!(room.footprint(), (1, 1));
                // Only exits a neighbour already asked for.
                let fragment = &room.fragments[0];
                for direction in fragment.exits.iter() {
                    let neighbor = layout.graph.neighbor(fragment.position, direction).unwrap();
                    assert_ne!(neighbor.room, room.id);
                }
            }
        }
    }
}

#[test]
fn fillings_follow_footprint() {
    let config = DungeonConfig::default();
    for seed in 0..50 {
        let layout = generate(&config, seed);
        for room in layout.graph.rooms() {
            let filling = layout.filling(room.id).unwrap();
            let expected = if room.id == RoomId(0) {
                FillingKind::Start
            } else {
                FillingKind::for_footprint(room.width, room.height).unwrap()
            };
            assert_eq!(filling.kind, expected);
            assert!(filling.variant < config.filling_variants.count(expected));
            assert_eq!(
                filling.anchor,
                Coord::new(room.borders.left + 2, room.borders.top - 3)
            );
        }
    }
}

// ── Determinism ────────────────────────────────────────────────────────

#[test]
fn same_seed_same_dungeon() {
    let config = DungeonConfig::default();
    for seed in [0, 1, 42, 9001] {
        let a = generate(&config, seed);
        let b = generate(&config, seed);
        assert_eq!(a.graph, b.graph);
        assert_eq!(a.stamps, b.stamps);
        assert_eq!(a.records, b.records);
    }
}

#[test]
fn seeds_produce_variety() {
    let config = DungeonConfig::default();
    let shapes: HashSet<Vec<(Coord, u8)>> = (0..30)
        .map(|seed| {
            generate(&config, seed)
                .graph
                .fragments()
                .map(|f| (f.position, f.exits.bits()))
                .collect()
        })
        .collect();
    assert!(shapes.len() > 1);
}

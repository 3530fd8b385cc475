//! Delve Headless Dungeon Harness
//!
//! Generates many seeded dungeons and checks layout and navigation
//! properties. Runs entirely in-process, with no rendering.
//!
//! Usage:
//!   cargo run -p delve-simtest
//!   cargo run -p delve-simtest -- --verbose --seeds 500
//!   cargo run -p delve-simtest -- --config data/dungeon_config.json --json

use delve_core::engine::DungeonEngine;
use delve_core::events::DungeonEvent;
use delve_core::generation::{DungeonGenerator, DungeonLayout};
use delve_core::navigation::NavigationService;
use delve_logic::config::{validate_config, DungeonConfig};
use delve_logic::direction::{Direction, Exits};
use delve_logic::dungeon::{Border, RoomId};
use delve_logic::navgrid::{NavGrid, NodePos, ObstacleMap, WallSet};
use delve_logic::pathfinding::{diagonal_distance, find_path, search};
use delve_logic::samples::{ExitState, FragmentSample};
use delve_logic::types::{Coord, Point};
use delve_logic::validation::{
    check_connectivity, check_dangling_exits, check_exit_symmetry, check_no_overlap,
    validate_layout,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

// ── Default configuration (same JSON shipped in data/) ──────────────────
const CONFIG_JSON: &str = include_str!("../../../data/dungeon_config.json");

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

#[derive(Debug, Serialize)]
struct Summary<'a> {
    seeds: u64,
    passed: usize,
    failed: usize,
    results: &'a [TestResult],
}

struct Options {
    verbose: bool,
    json: bool,
    seeds: u64,
    config_path: Option<String>,
}

fn parse_args() -> Options {
    let mut options = Options {
        verbose: false,
        json: false,
        seeds: 100,
        config_path: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => options.verbose = true,
            "--json" => options.json = true,
            "--seeds" => match args.next().and_then(|v| v.parse().ok()) {
                Some(n) => options.seeds = n,
                None => eprintln!("--seeds expects a number; keeping {}", options.seeds),
            },
            "--config" => options.config_path = args.next(),
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
    }
    options
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let options = parse_args();
    let verbose = options.verbose;
    println!("=== Delve Dungeon Harness ===\n");

    let mut results = Vec::new();

    // 1. Configuration
    let config = match load_config(&options, &mut results) {
        Some(config) => config,
        None => {
            report(&results, &options);
            std::process::exit(1);
        }
    };

    // 2. Generation sweep
    results.extend(validate_generation(&config, options.seeds, verbose));

    // 3. Concrete scenario + determinism
    results.extend(validate_scenario(&config));

    // 4. Stamping plan
    results.extend(validate_stamps(&config, options.seeds.min(50)));

    // 5. Pathfinding on synthetic grids
    results.extend(validate_pathfinding());

    // 6. Background navigation service
    results.extend(validate_navigation_service());

    // 7. Room tracker walk
    results.extend(validate_room_tracker(&config, options.seeds.min(20), verbose));

    if report(&results, &options) > 0 {
        std::process::exit(1);
    }
}

/// Print the summary; returns the failure count.
fn report(results: &[TestResult], options: &Options) -> usize {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || options.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        results.len(),
        failed
    );

    if options.json {
        let summary = Summary {
            seeds: options.seeds,
            passed,
            failed,
            results,
        };
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize summary: {}", e),
        }
    }
    failed
}

fn check(results: &mut Vec<TestResult>, name: &str, passed: bool, detail: String) {
    results.push(TestResult {
        name: name.into(),
        passed,
        detail,
    });
}

fn generate(config: &DungeonConfig, seed: u64) -> Option<DungeonLayout> {
    let generator = DungeonGenerator::new(config.clone()).ok()?;
    Some(generator.generate(&mut StdRng::seed_from_u64(seed)))
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn load_config(options: &Options, results: &mut Vec<TestResult>) -> Option<DungeonConfig> {
    println!("--- Configuration ---");

    match serde_json::from_str::<DungeonConfig>(CONFIG_JSON) {
        Ok(shipped) => check(
            results,
            "config_shipped_matches_default",
            shipped == DungeonConfig::default(),
            "data/dungeon_config.json equals the built-in defaults".into(),
        ),
        Err(e) => check(
            results,
            "config_shipped_parse",
            false,
            format!("JSON parse error: {}", e),
        ),
    }

    let broken = DungeonConfig {
        fragment_size: Coord::new(13, 0),
        generation_iterations: 0,
        ..DungeonConfig::default()
    };
    let errors = validate_config(&broken);
    check(
        results,
        "config_rejects_broken",
        errors.len() == 2,
        format!("{} errors for odd fragment size and zero iterations", errors.len()),
    );

    let config = match &options.config_path {
        Some(path) => {
            let parsed = std::fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|text| {
                    serde_json::from_str::<DungeonConfig>(&text).map_err(|e| e.to_string())
                });
            match parsed {
                Ok(config) => {
                    log::info!("Loaded dungeon config from {}", path);
                    config
                }
                Err(e) => {
                    check(results, "config_load", false, format!("{}: {}", path, e));
                    return None;
                }
            }
        }
        None => DungeonConfig::default(),
    };

    let errors = validate_config(&config);
    check(
        results,
        "config_valid",
        errors.is_empty(),
        if errors.is_empty() {
            format!(
                "fragment {}, side ≤ {}, {} waves, cap {}",
                config.fragment_size,
                config.max_room_side_length,
                config.generation_iterations,
                config.max_rooms_before_dead_ends
            )
        } else {
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    );
    errors.is_empty().then_some(config)
}

// ── 2. Generation sweep ─────────────────────────────────────────────────

fn validate_generation(config: &DungeonConfig, seeds: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Generation ({} seeds) ---", seeds);
    let mut results = Vec::new();

    let mut asymmetric = 0;
    let mut overlapping = 0;
    let mut dangling = 0;
    let mut disconnected = 0;
    let mut malformed = 0;
    let mut open_final_wave = 0;
    let mut oversized = 0;
    let mut room_counts = Vec::new();
    let mut dead_ends = 0;

    let branching = 4 * config.max_room_side_length as usize;
    let bound = (0..config.generation_iterations).fold((2usize, 2usize), |(frontier, total), _| {
        (frontier * branching, total + frontier * branching)
    });

    for seed in 0..seeds {
        let Some(layout) = generate(config, seed) else {
            continue;
        };
        let graph = &layout.graph;
        let start = layout.start_room().map(|r| r.id).unwrap_or(RoomId(0));

        asymmetric += check_exit_symmetry(graph).len();
        overlapping += check_no_overlap(graph).len();
        dangling += check_dangling_exits(graph).len();
        disconnected += check_connectivity(graph, start).len();
        malformed += validate_layout(graph, start)
            .iter()
            .filter(|e| e.category == "room_shape")
            .count();

        for room in graph.rooms() {
            let Some(record) = layout.record(room.id) else {
                continue;
            };
            if record.dead_end {
                dead_ends += 1;
            }
            if record.wave == config.generation_iterations
                && (room.footprint() != (1, 1) || !record.dead_end)
            {
                open_final_wave += 1;
            }
        }
        if graph.room_count() > bound.1 {
            oversized += 1;
        }
        room_counts.push(graph.room_count());

        if verbose {
            println!(
                "  seed {:>4}: {:>3} rooms, {:>3} fragments",
                seed,
                graph.room_count(),
                graph.fragment_count()
            );
        }
    }

    check(
        &mut results,
        "gen_exit_symmetry",
        asymmetric == 0,
        format!("{} asymmetric fragment pairs", asymmetric),
    );
    check(
        &mut results,
        "gen_no_overlap",
        overlapping == 0,
        format!("{} overlapping fragments", overlapping),
    );
    check(
        &mut results,
        "gen_no_dangling_exits",
        dangling == 0,
        format!("{} exits into empty space", dangling),
    );
    check(
        &mut results,
        "gen_connected",
        disconnected == 0,
        format!("{} dungeons with unreachable rooms", disconnected),
    );
    check(
        &mut results,
        "gen_room_shapes",
        malformed == 0,
        format!("{} malformed rooms", malformed),
    );
    check(
        &mut results,
        "gen_final_wave_dead_ends",
        open_final_wave == 0,
        format!("{} final-wave rooms not closed 1×1", open_final_wave),
    );

    let min = room_counts.iter().min().copied().unwrap_or(0);
    let max = room_counts.iter().max().copied().unwrap_or(0);
    let avg = room_counts.iter().sum::<usize>() as f32 / room_counts.len().max(1) as f32;
    check(
        &mut results,
        "gen_bounded_growth",
        oversized == 0 && min >= 2,
        format!(
            "rooms min {} / avg {:.1} / max {} (bound {}), {} dead-ends",
            min, avg, max, bound.1, dead_ends
        ),
    );

    results
}

// ── 3. Scenario + determinism ───────────────────────────────────────────

fn validate_scenario(config: &DungeonConfig) -> Vec<TestResult> {
    println!("--- Scenario ---");
    let mut results = Vec::new();

    let Ok(generator) = DungeonGenerator::new(config.clone()) else {
        check(&mut results, "scenario_generator", false, "config rejected".into());
        return results;
    };

    let layout = generator.generate_from(Direction::Right, &mut StdRng::seed_from_u64(0));
    let second_at = Coord::new(config.fragment_size.x, 0);
    let start = layout.graph.fragment_at(Coord::ZERO);
    let second = layout.graph.fragment_at(second_at);
    let passed = matches!(
        (start, second),
        (Some(a), Some(b)) if a.exits == Exits::RIGHT
            && b.exits.contains(Direction::Left)
            && b.room == RoomId(1)
    );
    check(
        &mut results,
        "scenario_right_entrance",
        passed,
        format!("second room anchored at {} with a shared Left/Right exit", second_at),
    );

    let same = (0..10u64).all(|seed| generate(config, seed) == generate(config, seed));
    check(
        &mut results,
        "gen_deterministic",
        same,
        "identical seeds give identical graphs".into(),
    );

    results
}

// ── 4. Stamping plan ────────────────────────────────────────────────────

fn validate_stamps(config: &DungeonConfig, seeds: u64) -> Vec<TestResult> {
    println!("--- Stamping plan ---");
    let mut results = Vec::new();

    let mut missing = 0;
    let mut mismatched = 0;
    let mut single_not_walled = 0;
    let mut stray_anchors = 0;
    let mut no_filling = 0;

    for seed in 0..seeds {
        let Some(layout) = generate(config, seed) else {
            continue;
        };
        let size = config.fragment_size;
        if layout.stamps.len() != layout.graph.fragment_count() {
            missing += 1;
        }
        for room in layout.graph.rooms() {
            if layout.filling(room.id).is_none() {
                no_filling += 1;
            }
            for fragment in &room.fragments {
                let Some(stamp) = layout.stamp_at(fragment.position) else {
                    missing += 1;
                    continue;
                };
                for side in Direction::ALL {
                    let open = stamp.exit(side) == ExitState::Opened;
                    if open != fragment.exits.contains(side) {
                        mismatched += 1;
                    }
                    if open && !anchor_inside(stamp.exit_anchor(side), fragment.position, size) {
                        stray_anchors += 1;
                    }
                }
                if room.footprint() == (1, 1) && stamp.sample != FragmentSample::AllWalls {
                    single_not_walled += 1;
                }
            }
        }
    }

    check(
        &mut results,
        "stamps_cover_fragments",
        missing == 0,
        format!("{} missing stamps", missing),
    );
    check(
        &mut results,
        "stamps_match_exits",
        mismatched == 0,
        format!("{} exit states disagree with fragment exits", mismatched),
    );
    check(
        &mut results,
        "stamps_single_rooms_walled",
        single_not_walled == 0,
        format!("{} 1×1 fragments not classified all-walls", single_not_walled),
    );
    check(
        &mut results,
        "stamps_exit_anchors_inside",
        stray_anchors == 0,
        format!("{} open exit anchors outside their fragment", stray_anchors),
    );
    check(
        &mut results,
        "fillings_chosen",
        no_filling == 0,
        format!("{} rooms without a filling", no_filling),
    );

    results
}

/// Whether `anchor` lies within the fragment centred on `centre`.
fn anchor_inside(anchor: Coord, centre: Coord, size: Coord) -> bool {
    let delta = anchor - centre;
    delta.x.abs() * 2 <= size.x && delta.y.abs() * 2 <= size.y
}

// ── 5. Pathfinding ──────────────────────────────────────────────────────

fn grid(right: i32, top: i32, walls: &[(i32, i32)]) -> NavGrid {
    NavGrid::from_walls(&WallSet {
        borders: Border {
            top,
            bottom: 0,
            right,
            left: 0,
        },
        cells: walls.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
    })
}

fn validate_pathfinding() -> Vec<TestResult> {
    println!("--- Pathfinding ---");
    let mut results = Vec::new();

    let open = grid(12, 8, &[]);
    let pairs = [((0, 0), (12, 8)), ((3, 7), (10, 1)), ((6, 0), (6, 8))];
    let optimal = pairs.iter().all(|&(a, b)| {
        let start = NodePos::from_cell(Coord::new(a.0, a.1));
        let goal = NodePos::from_cell(Coord::new(b.0, b.1));
        search(&open, start, goal)
            .is_some_and(|r| (r.cost - diagonal_distance(start, goal)).abs() < 1e-4)
    });
    check(
        &mut results,
        "pathfind_open_grid_optimal",
        optimal,
        "cost equals heuristic on an open grid".into(),
    );

    let same = find_path(&open, Coord::new(4, 4), Coord::new(4, 4));
    check(
        &mut results,
        "pathfind_start_is_goal",
        same == vec![Point::new(4.5, 4.5)],
        format!("{} points", same.len()),
    );

    let walled = grid(8, 8, &[(5, 5)]);
    check(
        &mut results,
        "pathfind_unwalkable_goal",
        find_path(&walled, Coord::new(0, 0), Coord::new(5, 5)).is_empty(),
        "unwalkable goal → empty path".into(),
    );

    let column: Vec<(i32, i32)> = (0..8).map(|y| (4, y)).collect();
    let detour = grid(8, 8, &column);
    let path = find_path(&detour, Coord::new(1, 1), Coord::new(7, 1));
    let blocked: Vec<Point> = column
        .iter()
        .map(|&(x, y)| NodePos::from_cell(Coord::new(x, y)).to_world())
        .collect();
    let clean = !path.is_empty() && path.iter().all(|p| !blocked.contains(p));
    check(
        &mut results,
        "pathfind_detour",
        clean,
        format!("{} points around a wall column", path.len()),
    );

    let boxed = grid(
        8,
        8,
        &[(3, 3), (4, 3), (5, 3), (3, 4), (5, 4), (3, 5), (4, 5), (5, 5)],
    );
    check(
        &mut results,
        "pathfind_enclosed_goal",
        find_path(&boxed, Coord::new(0, 0), Coord::new(4, 4)).is_empty(),
        "walled-in goal → empty path".into(),
    );

    results
}

// ── 6. Navigation service ───────────────────────────────────────────────

fn validate_navigation_service() -> Vec<TestResult> {
    println!("--- Navigation service ---");
    let mut results = Vec::new();

    let service = match NavigationService::spawn() {
        Ok(service) => service,
        Err(e) => {
            check(&mut results, "nav_spawn", false, e.to_string());
            return results;
        }
    };

    let Some(layout) = generate(&DungeonConfig::default(), 1) else {
        check(&mut results, "nav_layout", false, "default config rejected".into());
        return results;
    };

    // Rebuild for every room, then path within it; FIFO means each path
    // request sees the grid rebuilt just before it.
    let mut ok = 0;
    let rooms = layout.graph.rooms();
    for room in rooms {
        let b = room.borders;
        let ring: Vec<Coord> = (b.left..=b.right)
            .flat_map(|x| [Coord::new(x, b.bottom), Coord::new(x, b.top)])
            .chain((b.bottom..=b.top).flat_map(|y| [Coord::new(b.left, y), Coord::new(b.right, y)]))
            .collect();
        let probe = ObstacleMap::new().with_blocking_layer(ring);
        let rebuilt = service.set_working_room(room, &probe);
        let from = room.fragments[0].position;
        let to = room.fragments[room.fragments.len() - 1].position + Coord::new(2, 2);
        let path = service.find_path(from, to);

        let expected_nodes = (2 * (b.width() + 1) + 1) * (2 * (b.height() + 1) + 1);
        let nodes_ok = rebuilt.wait().is_ok_and(|n| n == expected_nodes as usize);
        let path_ok = path.wait().is_ok_and(|p| !p.is_empty());
        if nodes_ok && path_ok {
            ok += 1;
        }
    }
    check(
        &mut results,
        "nav_rebuild_then_path",
        ok == rooms.len(),
        format!("{}/{} rooms rebuilt and pathed in order", ok, rooms.len()),
    );

    // A room the grid no longer describes yields nothing.
    let stale = service.find_path_blocking(Coord::new(10_000, 0), Coord::new(10_001, 0));
    check(
        &mut results,
        "nav_outside_grid",
        stale.is_empty(),
        "cells outside the working room → empty path".into(),
    );

    results
}

// ── 7. Room tracker ─────────────────────────────────────────────────────

/// Fragment-by-fragment route between two occupied positions.
fn route(occupied: &HashSet<Coord>, size: Coord, from: Coord, to: Coord) -> Vec<Coord> {
    let mut came_from = HashMap::from([(from, from)]);
    let mut queue = VecDeque::from([from]);
    while let Some(current) = queue.pop_front() {
        if current == to {
            break;
        }
        for direction in Direction::ALL {
            let next = current + direction.offset().scale(size);
            if occupied.contains(&next) && !came_from.contains_key(&next) {
                came_from.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    let mut steps = Vec::new();
    let mut current = to;
    while current != from {
        steps.push(current);
        match came_from.get(&current) {
            Some(prev) => current = *prev,
            None => return Vec::new(),
        }
    }
    steps.reverse();
    steps
}

/// A room change whose entered fragment is not part of the announced room.
fn misplaced_room_change(engine: &DungeonEngine, event: &DungeonEvent) -> bool {
    match event {
        DungeonEvent::RoomChanged {
            entered_fragment,
            room,
            ..
        } => !engine
            .room(*room)
            .is_some_and(|r| r.contains_fragment(*entered_fragment)),
        _ => false,
    }
}

fn validate_room_tracker(config: &DungeonConfig, seeds: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Room tracker ---");
    let mut results = Vec::new();

    let mut completed = 0;
    let mut portal_errors = 0;
    let mut bad_changes = 0;

    for seed in 0..seeds {
        let Ok(mut engine) = DungeonEngine::new(DungeonConfig {
            seed: Some(seed),
            ..config.clone()
        }) else {
            continue;
        };
        engine.generate();
        let mut events = engine.drain_events();

        let size = engine.config().fragment_size;
        let occupied: HashSet<Coord> = engine
            .rooms()
            .iter()
            .flat_map(|r| r.fragments.iter().map(|f| f.position))
            .collect();
        let targets: Vec<Coord> = engine.rooms().iter().map(|r| r.top_left).collect();

        for target in targets {
            for step in route(&occupied, size, engine.current_fragment(), target) {
                engine.update_player_position(step.x as f32, step.y as f32);
            }
            events.extend(engine.drain_events());
        }

        if engine.all_rooms_visited() {
            completed += 1;
        }
        let portals = events
            .iter()
            .filter(|e| matches!(e, DungeonEvent::AllRoomsVisited))
            .count();
        if portals != 1 {
            portal_errors += 1;
        }
        // Every room change after the initial one must cross into a
        // neighbouring fragment.
        bad_changes += events
            .iter()
            .skip_while(|e| !matches!(e, DungeonEvent::RoomChanged { .. }))
            .skip(1)
            .filter(|e| misplaced_room_change(&engine, e))
            .count();

        if verbose {
            println!(
                "  seed {:>4}: visited {}/{} rooms",
                seed,
                engine.visited_count(),
                engine.rooms().len()
            );
        }
    }

    check(
        &mut results,
        "tracker_visits_all_rooms",
        completed == seeds,
        format!("{}/{} dungeons fully explored", completed, seeds),
    );
    check(
        &mut results,
        "tracker_portal_once",
        portal_errors == 0,
        format!("{} dungeons with a wrong portal count", portal_errors),
    );
    check(
        &mut results,
        "tracker_room_changes",
        bad_changes == 0,
        format!("{} room changes into a foreign fragment", bad_changes),
    );

    results
}

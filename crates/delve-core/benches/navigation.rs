use criterion::{black_box, criterion_group, criterion_main, Criterion};
use delve_core::generation::DungeonGenerator;
use delve_logic::config::DungeonConfig;
use delve_logic::constants::FRAGMENT_SIZE;
use delve_logic::direction::Exits;
use delve_logic::dungeon::{Room, RoomFragment, RoomId};
use delve_logic::navgrid::{NavGrid, ObstacleMap};
use delve_logic::pathfinding::find_path;
use delve_logic::types::Coord;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn big_room() -> Room {
    let fragments = [(0, 0), (14, 0), (0, 10), (14, 10)]
        .into_iter()
        .map(|(x, y)| RoomFragment {
            position: Coord::new(x, y),
            exits: Exits::NONE,
            room: RoomId(0),
        })
        .collect();
    Room::new(RoomId(0), fragments, 2, 2, FRAGMENT_SIZE)
}

/// Scattered pillars so the search has to weave.
fn obstacles(room: &Room) -> ObstacleMap {
    let b = room.borders;
    let pillars = (b.left..=b.right)
        .step_by(4)
        .flat_map(|x| (b.bottom..=b.top).step_by(3).map(move |y| Coord::new(x + 2, y + 1)));
    ObstacleMap::new().with_blocking_layer(pillars)
}

fn bench_navigation(c: &mut Criterion) {
    let room = big_room();
    let map = obstacles(&room);

    c.bench_function("build_grid_2x2", |b| {
        b.iter(|| NavGrid::build(black_box(&room), &map))
    });

    let grid = NavGrid::build(&room, &map);
    c.bench_function("find_path_2x2_corner_to_corner", |b| {
        b.iter(|| find_path(&grid, black_box(Coord::new(-6, -4)), black_box(Coord::new(20, 14))))
    });
}

fn bench_generation(c: &mut Criterion) {
    let generator = match DungeonGenerator::new(DungeonConfig::default()) {
        Ok(generator) => generator,
        Err(err) => panic!("default config rejected: {err}"),
    };
    c.bench_function("generate_default_dungeon", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| generator.generate(&mut rng))
    });
}

criterion_group!(benches, bench_navigation, bench_generation);
criterion_main!(benches);

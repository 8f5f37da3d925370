use std::{
    collections::{hash_map::DefaultHasher, BTreeMap},
    hash::{Hash, Hasher},
};

use catacomb_core::{Category, CellCoord, OccluderSet, TileKind, VISION_DISTANCE};
use catacomb_system_generation::{Canvas, GenerationConfig, Generator};
use catacomb_system_pathfinding::AreaGraph;
use catacomb_world::World;
use glam::Vec2;

struct Session {
    generator: Generator,
    world: World,
    graph: AreaGraph,
    lighting: OccluderSet,
}

impl Session {
    fn new(seed: u64) -> Self {
        Self {
            generator: Generator::new(GenerationConfig::default(), seed),
            world: World::new(),
            graph: AreaGraph::new(),
            lighting: OccluderSet::new(),
        }
    }

    fn explore(&mut self, player: Vec2) -> Vec<Vec2> {
        let mut canvas = Canvas {
            world: &mut self.world,
            graph: &mut self.graph,
            lighting: &mut self.lighting,
        };
        self.generator
            .generate_current_area_if_needed(player, &mut canvas)
    }

    fn tiles(&self) -> BTreeMap<CellCoord, TileKind> {
        let mut tiles = BTreeMap::new();
        for id in self.world.bucket(Category::WORLD) {
            let tile = self
                .world
                .entity(*id)
                .and_then(|entity| entity.role.as_tile())
                .expect("world bucket holds tiles");
            let previous = tiles.insert(tile.cell(), tile.kind());
            assert!(previous.is_none(), "cell {:?} materialized twice", tile.cell());
        }
        tiles
    }

    fn fingerprint(&self, spawns: &[Vec2]) -> u64 {
        let mut hasher = DefaultHasher::new();
        for (cell, kind) in self.tiles() {
            cell.hash(&mut hasher);
            kind.hash(&mut hasher);
        }
        for spawn in spawns {
            spawn.x.to_bits().hash(&mut hasher);
            spawn.y.to_bits().hash(&mut hasher);
        }
        self.generator.generated_chunks().hash(&mut hasher);
        self.graph.len().hash(&mut hasher);
        self.graph.portal_count().hash(&mut hasher);
        hasher.finish()
    }
}

fn walk(seed: u64) -> (Session, Vec<Vec2>) {
    let mut session = Session::new(seed);
    let mut spawns = session.explore(Vec2::new(16.0, 16.0));
    spawns.extend(session.explore(Vec2::new(900.0, 40.0)));
    spawns.extend(session.explore(Vec2::new(900.0, -700.0)));
    (session, spawns)
}

#[test]
fn generation_is_deterministic_for_a_seed() {
    let (first, first_spawns) = walk(1234);
    let (second, second_spawns) = walk(1234);
    assert_eq!(first_spawns, second_spawns);
    assert_eq!(
        first.fingerprint(&first_spawns),
        second.fingerprint(&second_spawns),
        "replay diverged between runs"
    );

    let (other, other_spawns) = walk(4321);
    assert_ne!(
        first.fingerprint(&first_spawns),
        other.fingerprint(&other_spawns)
    );
}

#[test]
fn chunks_are_generated_only_once() {
    let mut session = Session::new(77);
    let player = Vec2::new(100.0, 100.0);
    let _ = session.explore(player);
    let chunks = session.generator.generated_chunks().len();
    let tiles = session.world.len();
    assert!(chunks > 1);

    assert!(session.explore(player).is_empty());
    assert_eq!(session.generator.generated_chunks().len(), chunks);
    assert_eq!(session.world.len(), tiles);
}

#[test]
fn chunks_within_range_are_generated() {
    let mut session = Session::new(5);
    let player = Vec2::new(256.0, 256.0);
    let _ = session.explore(player);
    let range = session.generator.config().generate_area_range;
    for column in -3..=3 {
        for row in -3..=3 {
            let chunk = CellCoord::new(column, row);
            let bounds = session.generator.chunk_rect(chunk).to_world();
            let distance = player.clamp(bounds.min(), bounds.max()).distance(player);
            assert_eq!(
                session.generator.generated_chunks().contains(&chunk),
                distance <= range,
                "chunk {chunk:?} at {distance}"
            );
        }
    }
}

#[test]
fn world_tiles_mirror_the_generator_and_lighting() {
    let (session, _) = walk(99);
    let tiles = session.tiles();
    let chunk_cells: usize = session.generator.generated_chunks().len() * 16 * 16;
    assert_eq!(tiles.len(), chunk_cells);

    for (cell, kind) in &tiles {
        assert_eq!(session.generator.tile_kind(*cell), Some(*kind));
        assert_eq!(
            session.lighting.contains(cell.center()),
            *kind == TileKind::Wall,
            "occluder mismatch at {cell:?}"
        );
    }
    assert_eq!(
        session.lighting.len(),
        tiles.values().filter(|kind| **kind == TileKind::Wall).count()
    );
}

#[test]
fn areas_never_overlap_and_hold_no_walls() {
    let (session, _) = walk(2024);
    let areas: Vec<_> = session.graph.areas().map(|(_, area)| area.rect()).collect();
    assert!(!areas.is_empty());

    for (index, a) in areas.iter().enumerate() {
        for b in &areas[index + 1..] {
            let overlap = a.horizontal().overlap_length(&b.horizontal())
                * a.vertical().overlap_length(&b.vertical());
            assert_eq!(overlap, 0.0, "{a:?} overlaps {b:?}");
        }
    }

    let tiles = session.tiles();
    for (cell, kind) in tiles {
        let covered = areas.iter().any(|rect| {
            rect.min().cmplt(cell.center()).all() && rect.max().cmpgt(cell.center()).all()
        });
        assert_eq!(covered, kind == TileKind::Floor, "cell {cell:?}");
    }
}

#[test]
fn spawns_land_on_floor_outside_vision() {
    let mut session = Session::new(31);
    let player = Vec2::new(16.0, 16.0);
    let spawns = session.explore(player);
    for spawn in &spawns {
        assert!(spawn.distance(player) > VISION_DISTANCE);
        assert_eq!(
            session.generator.tile_kind(CellCoord::containing(*spawn)),
            Some(TileKind::Floor)
        );
    }
}

#[test]
fn spanning_tree_stops_at_the_room_budget() {
    let mut generator = Generator::new(GenerationConfig::default(), 17);
    let tree = generator.create_minimal_spanning_tree(CellCoord::new(3, 3), 40.0);
    assert_eq!(tree.first(), Some(&CellCoord::new(3, 3)));
    assert!(tree.len() >= 20, "weights never exceed two");
}

#[test]
fn player_spawn_is_reachable_floor() {
    let (session, _) = walk(8);
    let spawn = session.generator.get_player_spawn();
    assert_eq!(
        session.generator.tile_kind(CellCoord::containing(spawn)),
        Some(TileKind::Floor)
    );
    assert!(session.graph.area_at(spawn).is_some());
}

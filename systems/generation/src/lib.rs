#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Incremental procedural level generation.
//!
//! Chunks around the player are carved on demand: a noise-weighted spanning
//! tree shapes a room, a bounded search links it to floor generated earlier,
//! the chunk's cells become tiles in the [`World`] and its walkable space is
//! decomposed into areas of the [`AreaGraph`].

mod config;
mod noise;
mod rooms;
mod shadow;

use std::collections::{BTreeSet, HashSet};

use catacomb_core::{CellCoord, CellRect, MinFrontier, OccluderSink, TileKind, VISION_DISTANCE};
use catacomb_system_pathfinding::AreaGraph;
use catacomb_world::{Entity, World};
use glam::Vec2;
use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use tracing::{debug, warn};

pub use config::GenerationConfig;
pub use noise::NoiseField;

use rooms::{minimal_spanning_tree, CorridorSearch};
use shadow::ShadowMap;

/// Everything a generation pass writes into.
pub struct Canvas<'a> {
    /// Receives tile entities.
    pub world: &'a mut World,
    /// Receives walkable areas and their portals.
    pub graph: &'a mut AreaGraph,
    /// Receives wall occluders.
    pub lighting: &'a mut dyn OccluderSink,
}

/// Procedural generator driven by the player's position.
#[derive(Debug)]
pub struct Generator {
    config: GenerationConfig,
    chunk_size: u32,
    tile_noise: NoiseField,
    character_noise: NoiseField,
    shadow: ShadowMap,
    generated_chunks: BTreeSet<CellCoord>,
    generated_regions: Vec<CellRect>,
    corridors: Vec<Vec<CellCoord>>,
    regions_invalidated: bool,
}

impl Generator {
    /// Creates a generator whose noise fields derive from `seed`.
    #[must_use]
    pub fn new(config: GenerationConfig, seed: u64) -> Self {
        Self::from_rng(config, &mut ChaCha8Rng::seed_from_u64(seed))
    }

    /// Creates a generator seeded from system entropy.
    #[must_use]
    pub fn from_entropy(config: GenerationConfig) -> Self {
        Self::from_rng(config, &mut rand::thread_rng())
    }

    /// Creates a generator drawing both permutation tables from `rng`, tiles first.
    pub fn from_rng<R: Rng + ?Sized>(config: GenerationConfig, rng: &mut R) -> Self {
        let chunk_size = config.chunk_size();
        if chunk_size != config.generate_area_size {
            warn!(
                requested = config.generate_area_size,
                used = chunk_size,
                "chunk size rounded up to a power of two"
            );
        }
        let tile_noise = NoiseField::from_rng(rng);
        let character_noise = NoiseField::from_rng(rng);
        Self {
            config,
            chunk_size,
            tile_noise,
            character_noise,
            shadow: ShadowMap::default(),
            generated_chunks: BTreeSet::new(),
            generated_regions: Vec::new(),
            corridors: Vec::new(),
            regions_invalidated: false,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Tile kind recorded for `cell`, `None` when the cell was never touched.
    #[must_use]
    pub fn tile_kind(&self, cell: CellCoord) -> Option<TileKind> {
        self.shadow.known(cell)
    }

    /// Chunk coordinates generated so far, in coordinate order.
    #[must_use]
    pub fn generated_chunks(&self) -> &BTreeSet<CellCoord> {
        &self.generated_chunks
    }

    /// Every carved corridor, each listed from its destination back to its room.
    #[must_use]
    pub fn corridors(&self) -> &[Vec<CellCoord>] {
        &self.corridors
    }

    /// Cell rectangle covered by the chunk at `chunk`.
    #[must_use]
    pub fn chunk_rect(&self, chunk: CellCoord) -> CellRect {
        let size = self.chunk_size as i32;
        CellRect::new(
            CellCoord::new(chunk.column() * size, chunk.row() * size),
            self.chunk_size,
            self.chunk_size,
        )
    }

    /// Chunk containing the world position `position`.
    #[must_use]
    pub fn chunk_at(&self, position: Vec2) -> CellCoord {
        let cell = CellCoord::containing(position);
        let size = self.chunk_size as i32;
        CellCoord::new(cell.column().div_euclid(size), cell.row().div_euclid(size))
    }

    fn chunk_distance(&self, chunk: CellCoord, position: Vec2) -> f32 {
        let bounds = self.chunk_rect(chunk).to_world();
        position
            .clamp(bounds.min(), bounds.max())
            .distance(position)
    }

    /// Generates every missing chunk within range of the player and returns the
    /// enemy spawn positions they produced, out of the player's sight.
    ///
    /// Spawns keep the order chunks were generated in. Candidates that share a
    /// closest floor cell are all returned.
    pub fn generate_current_area_if_needed(
        &mut self,
        player: Vec2,
        canvas: &mut Canvas<'_>,
    ) -> Vec<Vec2> {
        let range = self.config.generate_area_range;
        let origin = self.chunk_at(player);
        let mut closed = HashSet::new();
        let mut frontier = MinFrontier::new();
        let _ = closed.insert(origin);
        frontier.push(origin, self.chunk_distance(origin, player));

        let mut spawns = Vec::new();
        while let Some((chunk, distance)) = frontier.pop() {
            if distance > range {
                break;
            }
            if self.generated_chunks.insert(chunk) {
                let rect = self.chunk_rect(chunk);
                self.generate_tiles(rect, canvas);
                for spawn in self.get_enemy_spawns(rect) {
                    if spawn.distance(player) > VISION_DISTANCE {
                        spawns.push(spawn);
                    }
                }
                debug!(
                    column = chunk.column(),
                    row = chunk.row(),
                    "generated chunk"
                );
            }
            for neighbor in chunk.neighbors() {
                if closed.insert(neighbor) {
                    frontier.push(neighbor, self.chunk_distance(neighbor, player));
                }
            }
        }
        spawns
    }

    /// Carves a room and its corridors around the lowest-noise cell of `rect`,
    /// materializes the rectangle's tiles and refreshes the area graph.
    ///
    /// # Panics
    ///
    /// Panics in debug builds when `rect` is empty or not a power of two.
    pub fn generate_tiles(&mut self, rect: CellRect, canvas: &mut Canvas<'_>) {
        debug_assert!(
            rect.cell_count() > 0 && rect.is_power_of_two(),
            "generation rectangles must have power-of-two sides"
        );
        let Some(seed) = self.lowest_noise_cell(rect) else {
            return;
        };

        let room = self.create_minimal_spanning_tree(seed, self.config.room_size_value);
        if let Some(bounds) = bounding_box(&room) {
            for cell in bounds.cells() {
                self.carve(cell, canvas);
            }
        }
        let _ = self.connect_rooms(seed, canvas);

        for cell in rect.cells() {
            if self.shadow.entity(cell).is_some() {
                continue;
            }
            let kind = self.shadow.kind(cell);
            let id = canvas.world.insert(Entity::tile(cell, kind));
            self.shadow.materialize(cell, id);
            if kind.is_solid() {
                canvas.lighting.add_occluder(cell.center());
            }
        }
        self.generated_regions.push(rect);

        if std::mem::take(&mut self.regions_invalidated) {
            canvas.graph.clear();
            for region in &self.generated_regions {
                self.generate_areas(*region, canvas.graph);
            }
            debug!(
                regions = self.generated_regions.len(),
                areas = canvas.graph.len(),
                "rebuilt area graph after carving into generated regions"
            );
        } else {
            self.generate_areas(rect, canvas.graph);
        }
        canvas.graph.generate_portals();
    }

    fn lowest_noise_cell(&mut self, rect: CellRect) -> Option<CellCoord> {
        let mut best: Option<(CellCoord, f32)> = None;
        for cell in rect.cells() {
            let value = self.tile_noise.get_noise(cell);
            if best.map_or(true, |(_, lowest)| value < lowest) {
                best = Some((cell, value));
            }
        }
        best.map(|(cell, _)| cell)
    }

    /// Cells of a noise-weighted spanning tree grown from `start` until the
    /// accumulated `noise + 1` weight reaches `limit`. `start` is listed first.
    pub fn create_minimal_spanning_tree(&mut self, start: CellCoord, limit: f32) -> Vec<CellCoord> {
        minimal_spanning_tree(&mut self.tile_noise, start, limit)
    }

    /// Carves corridors from `start` to floor reachable through walls within the
    /// connection budget. Returns the number of corridors carved.
    pub fn connect_rooms(&mut self, start: CellCoord, canvas: &mut Canvas<'_>) -> usize {
        let budget = self.config.room_connection_value;
        let search = CorridorSearch::run(&mut self.tile_noise, &self.shadow, start, budget);

        let mut spent = 0.0;
        let mut carved = 0;
        for &destination in &search.destinations {
            if spent >= budget {
                break;
            }
            spent += search.cost(destination);
            let path = search.path_to(destination);
            for &cell in &path {
                self.carve(cell, canvas);
            }
            self.corridors.push(path);
            carved += 1;
        }
        carved
    }

    fn carve(&mut self, cell: CellCoord, canvas: &mut Canvas<'_>) {
        let Some(previous) = self.shadow.set_floor(cell) else {
            return;
        };
        let Some(wall) = previous.entity else {
            return;
        };
        let _ = canvas.world.remove(wall);
        let floor = canvas.world.insert(Entity::tile(cell, TileKind::Floor));
        self.shadow.materialize(cell, floor);
        canvas.lighting.remove_occluder(cell.center());
        self.regions_invalidated = true;
    }

    /// Registers the walkable parts of `rect` as areas by quadtree decomposition.
    ///
    /// # Panics
    ///
    /// Panics in debug builds when `rect` is empty or not a power of two.
    pub fn generate_areas(&self, rect: CellRect, graph: &mut AreaGraph) {
        debug_assert!(
            rect.cell_count() > 0 && rect.is_power_of_two(),
            "area decomposition needs power-of-two sides"
        );
        let walls = rect
            .cells()
            .filter(|cell| self.shadow.kind(*cell).is_solid())
            .count() as u64;
        if walls == 0 {
            let _ = graph.insert_area(rect.to_world());
        } else if walls < rect.cell_count() {
            if let Some(quadrants) = rect.quadrants() {
                for quadrant in quadrants {
                    self.generate_areas(quadrant, graph);
                }
            }
        }
    }

    /// Enemy spawn positions inside `rect`, each snapped to the closest floor cell.
    pub fn get_enemy_spawns(&mut self, rect: CellRect) -> Vec<Vec2> {
        let threshold = self.config.enemy_threshold();
        let candidates: Vec<CellCoord> = rect
            .cells()
            .filter(|cell| self.character_noise.get_noise(*cell) <= threshold)
            .collect();
        candidates
            .into_iter()
            .map(|cell| self.find_closest_floor(cell).center())
            .collect()
    }

    /// Nearest floor cell to `start` by Euclidean distance.
    ///
    /// # Panics
    ///
    /// Panics when no floor has been carved yet.
    #[must_use]
    pub fn find_closest_floor(&self, start: CellCoord) -> CellCoord {
        assert!(
            self.shadow.has_floor(),
            "find_closest_floor called before any floor was generated"
        );
        let mut closed = HashSet::new();
        let mut frontier = MinFrontier::new();
        let _ = closed.insert(start);
        frontier.push(start, 0.0);
        while let Some((cell, _)) = frontier.pop() {
            if self.shadow.kind(cell) == TileKind::Floor {
                return cell;
            }
            for neighbor in cell.neighbors() {
                if closed.insert(neighbor) {
                    frontier.push(neighbor, neighbor.distance(start));
                }
            }
        }
        unreachable!("the frontier over an unbounded grid never empties")
    }

    /// World position of the floor cell closest to the origin.
    ///
    /// # Panics
    ///
    /// Panics when no floor has been carved yet.
    #[must_use]
    pub fn get_player_spawn(&self) -> Vec2 {
        self.find_closest_floor(CellCoord::ORIGIN).center()
    }
}

fn bounding_box(cells: &[CellCoord]) -> Option<CellRect> {
    let first = cells.first()?;
    let (mut min_column, mut max_column) = (first.column(), first.column());
    let (mut min_row, mut max_row) = (first.row(), first.row());
    for cell in cells {
        min_column = min_column.min(cell.column());
        max_column = max_column.max(cell.column());
        min_row = min_row.min(cell.row());
        max_row = max_row.max(cell.row());
    }
    Some(CellRect::new(
        CellCoord::new(min_column, min_row),
        (max_column - min_column + 1) as u32,
        (max_row - min_row + 1) as u32,
    ))
}

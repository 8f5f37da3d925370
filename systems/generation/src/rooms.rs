//! Noise-weighted searches that shape rooms and find corridors between them.

use std::collections::{BTreeSet, HashMap, HashSet};

use catacomb_core::{CellCoord, MinFrontier, TileKind};

use crate::{noise::NoiseField, shadow::ShadowMap};

/// Cost of entering `cell`: noise shifted into `[0, 2]`.
pub(crate) fn weight(noise: &mut NoiseField, cell: CellCoord) -> f32 {
    noise.get_noise(cell) + 1.0
}

/// Grows a tree from `start` by repeatedly taking the cheapest frontier cell,
/// stopping once the accumulated weight reaches `limit`. `start` comes first.
///
/// Each cell enters the frontier at most once.
pub(crate) fn minimal_spanning_tree(
    noise: &mut NoiseField,
    start: CellCoord,
    limit: f32,
) -> Vec<CellCoord> {
    let mut selected = Vec::new();
    let mut queued = HashSet::new();
    let mut frontier = MinFrontier::new();
    let _ = queued.insert(start);
    frontier.push(start, weight(noise, start));

    let mut total = 0.0;
    while total < limit {
        let Some((cell, cost)) = frontier.pop() else {
            break;
        };
        selected.push(cell);
        total += cost;
        for neighbor in cell.neighbors() {
            if queued.insert(neighbor) {
                frontier.push(neighbor, weight(noise, neighbor));
            }
        }
    }
    selected
}

/// Corridor candidates found from a room seed.
#[derive(Debug, Default)]
pub(crate) struct CorridorSearch {
    /// Floor cells reached directly from a wall cell, in coordinate order.
    pub(crate) destinations: BTreeSet<CellCoord>,
    cost: HashMap<CellCoord, f32>,
    came_from: HashMap<CellCoord, CellCoord>,
}

impl CorridorSearch {
    /// Best-first search outward from `start` while the accumulated weight stays under `budget`.
    pub(crate) fn run(
        noise: &mut NoiseField,
        shadow: &ShadowMap,
        start: CellCoord,
        budget: f32,
    ) -> Self {
        let mut search = Self::default();
        let mut closed = HashSet::new();
        let mut frontier = MinFrontier::new();
        let _ = search.cost.insert(start, 0.0);
        frontier.push(start, 0.0);

        while let Some((cell, cost)) = frontier.pop() {
            if !closed.insert(cell) {
                continue;
            }
            if let Some(&previous) = search.came_from.get(&cell) {
                if shadow.kind(cell) == TileKind::Floor && shadow.kind(previous) == TileKind::Wall
                {
                    let _ = search.destinations.insert(cell);
                    continue;
                }
            }
            for neighbor in cell.neighbors() {
                if closed.contains(&neighbor) {
                    continue;
                }
                let next = cost + weight(noise, neighbor);
                let known = search.cost.get(&neighbor).copied().unwrap_or(f32::INFINITY);
                if next < budget && next < known {
                    let _ = search.cost.insert(neighbor, next);
                    let _ = search.came_from.insert(neighbor, cell);
                    frontier.push(neighbor, next);
                }
            }
        }
        search
    }

    /// Accumulated weight of reaching `cell`.
    pub(crate) fn cost(&self, cell: CellCoord) -> f32 {
        self.cost.get(&cell).copied().unwrap_or(f32::INFINITY)
    }

    /// Cells from `destination` back to the search start, both included.
    pub(crate) fn path_to(&self, destination: CellCoord) -> Vec<CellCoord> {
        let mut path = vec![destination];
        let mut current = destination;
        while let Some(&previous) = self.came_from.get(&current) {
            path.push(previous);
            current = previous;
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_starts_at_seed_and_respects_budget() {
        let mut noise = NoiseField::with_seed(5);
        let start = CellCoord::new(4, 4);
        let tree = minimal_spanning_tree(&mut noise, start, 25.0);

        assert_eq!(tree.first(), Some(&start));
        let weights: Vec<f32> = tree.iter().map(|cell| weight(&mut noise, *cell)).collect();
        let total: f32 = weights.iter().sum();
        let before_last = total - weights.last().copied().unwrap_or_default();
        assert!(total >= 25.0);
        assert!(before_last < 25.0);
    }

    #[test]
    fn tree_never_selects_a_cell_twice() {
        let mut noise = NoiseField::with_seed(9);
        let tree = minimal_spanning_tree(&mut noise, CellCoord::ORIGIN, 80.0);
        let unique: HashSet<_> = tree.iter().collect();
        assert_eq!(unique.len(), tree.len());
    }

    #[test]
    fn tree_cells_are_connected() {
        let mut noise = NoiseField::with_seed(13);
        let tree = minimal_spanning_tree(&mut noise, CellCoord::new(-3, 8), 30.0);
        for (index, cell) in tree.iter().enumerate().skip(1) {
            let attached = tree[..index]
                .iter()
                .any(|earlier| cell.neighbors().contains(earlier));
            assert!(attached, "{cell:?} is detached from the tree");
        }
    }

    #[test]
    fn search_finds_floor_behind_walls() {
        let mut noise = NoiseField::with_seed(21);
        let mut shadow = ShadowMap::default();
        let start = CellCoord::ORIGIN;
        let _ = shadow.set_floor(start);
        let target = CellCoord::new(5, 0);
        let _ = shadow.set_floor(target);

        let search = CorridorSearch::run(&mut noise, &shadow, start, 60.0);

        assert!(search.destinations.contains(&target));
        let path = search.path_to(target);
        assert_eq!(path.first(), Some(&target));
        assert_eq!(path.last(), Some(&start));
        assert!(search.cost(target) < 60.0);
    }

    #[test]
    fn search_without_other_floor_finds_nothing() {
        let mut noise = NoiseField::with_seed(21);
        let mut shadow = ShadowMap::default();
        let _ = shadow.set_floor(CellCoord::ORIGIN);
        let search = CorridorSearch::run(&mut noise, &shadow, CellCoord::ORIGIN, 10.0);
        assert!(search.destinations.is_empty());
    }
}

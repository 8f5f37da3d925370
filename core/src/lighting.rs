//! Lighting collaborator interface.

use std::collections::BTreeSet;

use glam::Vec2;

use crate::CellCoord;

/// Receives static occluders produced while the level is carved.
///
/// Calls are keyed by the world position of the occluding tile. The sink never
/// feeds information back into the simulation.
pub trait OccluderSink {
    /// Registers a static occluder centred at `position`.
    fn add_occluder(&mut self, position: Vec2);

    /// Removes the occluder previously registered at `position`, if any.
    fn remove_occluder(&mut self, position: Vec2);
}

/// Sink that discards every occluder.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLighting;

impl OccluderSink for NoLighting {
    fn add_occluder(&mut self, _position: Vec2) {}

    fn remove_occluder(&mut self, _position: Vec2) {}
}

/// Sink that records occluders by the cell containing them.
#[derive(Clone, Debug, Default)]
pub struct OccluderSet {
    cells: BTreeSet<CellCoord>,
}

impl OccluderSet {
    /// Creates an empty occluder set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether an occluder covers the cell containing `position`.
    #[must_use]
    pub fn contains(&self, position: Vec2) -> bool {
        self.cells.contains(&CellCoord::containing(position))
    }

    /// Number of registered occluders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no occluders are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterates over the occluded cells in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }
}

impl OccluderSink for OccluderSet {
    fn add_occluder(&mut self, position: Vec2) {
        let _ = self.cells.insert(CellCoord::containing(position));
    }

    fn remove_occluder(&mut self, position: Vec2) {
        let _ = self.cells.remove(&CellCoord::containing(position));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occluder_set_tracks_cells() {
        let mut set = OccluderSet::new();
        let wall = CellCoord::new(2, -1).center();
        set.add_occluder(wall);
        set.add_occluder(wall);
        assert_eq!(set.len(), 1);
        assert!(set.contains(wall));
        set.remove_occluder(wall);
        assert!(set.is_empty());
    }
}

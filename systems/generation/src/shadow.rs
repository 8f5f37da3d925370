//! Generator-side record of every cell's tile kind and its materialized entity.

use std::collections::HashMap;

use catacomb_core::{CellCoord, EntityId, TileKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ShadowTile {
    pub(crate) kind: TileKind,
    pub(crate) entity: Option<EntityId>,
}

/// Unknown cells read as walls.
#[derive(Clone, Debug, Default)]
pub(crate) struct ShadowMap {
    tiles: HashMap<CellCoord, ShadowTile>,
    floors: usize,
}

impl ShadowMap {
    pub(crate) fn kind(&self, cell: CellCoord) -> TileKind {
        self.tiles
            .get(&cell)
            .map_or(TileKind::Wall, |tile| tile.kind)
    }

    pub(crate) fn known(&self, cell: CellCoord) -> Option<TileKind> {
        self.tiles.get(&cell).map(|tile| tile.kind)
    }

    pub(crate) fn entity(&self, cell: CellCoord) -> Option<EntityId> {
        self.tiles.get(&cell).and_then(|tile| tile.entity)
    }

    pub(crate) fn has_floor(&self) -> bool {
        self.floors > 0
    }

    /// Marks `cell` as floor, returning the previous tile when it changed.
    pub(crate) fn set_floor(&mut self, cell: CellCoord) -> Option<ShadowTile> {
        let tile = self.tiles.entry(cell).or_insert(ShadowTile {
            kind: TileKind::Wall,
            entity: None,
        });
        if tile.kind == TileKind::Floor {
            return None;
        }
        let previous = *tile;
        tile.kind = TileKind::Floor;
        self.floors += 1;
        Some(previous)
    }

    /// Records the entity standing for `cell`, fixing the kind of unknown cells as walls.
    pub(crate) fn materialize(&mut self, cell: CellCoord, entity: EntityId) {
        let tile = self.tiles.entry(cell).or_insert(ShadowTile {
            kind: TileKind::Wall,
            entity: None,
        });
        tile.entity = Some(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floors_are_never_downgraded() {
        let mut shadow = ShadowMap::default();
        let cell = CellCoord::new(2, 3);
        assert_eq!(shadow.kind(cell), TileKind::Wall);
        assert_eq!(shadow.known(cell), None);

        assert!(shadow.set_floor(cell).is_some());
        assert!(shadow.set_floor(cell).is_none());
        assert_eq!(shadow.kind(cell), TileKind::Floor);
        assert!(shadow.has_floor());
    }

    #[test]
    fn materializing_keeps_the_kind() {
        let mut shadow = ShadowMap::default();
        let cell = CellCoord::new(0, 0);
        let _ = shadow.set_floor(cell);
        shadow.materialize(cell, EntityId::new(4));
        assert_eq!(shadow.kind(cell), TileKind::Floor);
        assert_eq!(shadow.entity(cell), Some(EntityId::new(4)));
    }
}

//! Tile-grid and world-space geometry.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Interval;

/// Side length of a single square tile expressed in world pixels.
pub const TILE_SIZE: f32 = 32.0;

/// Location of a single tile cell. The dungeon is unbounded, so both axes are signed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// The cell at the origin of the tile grid.
    pub const ORIGIN: CellCoord = CellCoord::new(0, 0);

    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index of the cell. Rows grow downwards in world space.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Returns the cell offset by the provided column and row deltas.
    #[must_use]
    pub const fn offset(&self, columns: i32, rows: i32) -> Self {
        Self::new(self.column + columns, self.row + rows)
    }

    /// The four axis-aligned neighbours in north, east, south, west order.
    #[must_use]
    pub const fn neighbors(&self) -> [CellCoord; 4] {
        [
            self.offset(0, -1),
            self.offset(1, 0),
            self.offset(0, 1),
            self.offset(-1, 0),
        ]
    }

    /// Euclidean distance between the two cells measured in cells.
    #[must_use]
    pub fn distance(&self, other: CellCoord) -> f32 {
        let dx = (self.column - other.column) as f32;
        let dy = (self.row - other.row) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// World-space position of the cell centre.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.column as f32 + 0.5) * TILE_SIZE,
            (self.row as f32 + 0.5) * TILE_SIZE,
        )
    }

    /// Cell containing the provided world-space position.
    #[must_use]
    pub fn containing(position: Vec2) -> Self {
        Self::new(
            (position.x / TILE_SIZE).floor() as i32,
            (position.y / TILE_SIZE).floor() as i32,
        )
    }
}

/// Axis-aligned rectangle of whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    width: u32,
    height: u32,
}

impl CellRect {
    /// Creates a rectangle anchored at its upper-left cell.
    #[must_use]
    pub const fn new(origin: CellCoord, width: u32, height: u32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Upper-left cell of the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells covered by the rectangle.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Reports whether both dimensions are positive powers of two.
    #[must_use]
    pub const fn is_power_of_two(&self) -> bool {
        self.width.is_power_of_two() && self.height.is_power_of_two()
    }

    /// Reports whether the rectangle covers `cell`.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let column = i64::from(cell.column()) - i64::from(self.origin.column());
        let row = i64::from(cell.row()) - i64::from(self.origin.row());
        column >= 0 && row >= 0 && column < i64::from(self.width) && row < i64::from(self.height)
    }

    /// Iterates over every covered cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height).flat_map(move |row| (0..width).map(move |column| origin.offset(column, row)))
    }

    /// Splits the rectangle into four equal quadrants.
    ///
    /// Returns `None` when either dimension is odd or smaller than two.
    #[must_use]
    pub fn quadrants(&self) -> Option<[CellRect; 4]> {
        if self.width < 2 || self.height < 2 || self.width % 2 != 0 || self.height % 2 != 0 {
            return None;
        }
        let half_width = self.width / 2;
        let half_height = self.height / 2;
        let columns = half_width as i32;
        let rows = half_height as i32;
        Some([
            CellRect::new(self.origin, half_width, half_height),
            CellRect::new(self.origin.offset(columns, 0), half_width, half_height),
            CellRect::new(self.origin.offset(0, rows), half_width, half_height),
            CellRect::new(self.origin.offset(columns, rows), half_width, half_height),
        ])
    }

    /// World-space rectangle covered by the cells.
    #[must_use]
    pub fn to_world(&self) -> WorldRect {
        let min = Vec2::new(
            self.origin.column() as f32 * TILE_SIZE,
            self.origin.row() as f32 * TILE_SIZE,
        );
        let size = Vec2::new(self.width as f32, self.height as f32) * TILE_SIZE;
        WorldRect::from_min_max(min, min + size)
    }
}

/// Axis-aligned rectangle in world pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldRect {
    min: Vec2,
    max: Vec2,
}

impl WorldRect {
    /// Creates a rectangle from two opposite corners.
    #[must_use]
    pub fn from_min_max(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Upper-left corner.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Lower-right corner.
    #[must_use]
    pub const fn max(&self) -> Vec2 {
        self.max
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Width and height.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Reports whether `point` lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        self.horizontal().contains(point.x) && self.vertical().contains(point.y)
    }

    /// Extent along the x axis.
    #[must_use]
    pub fn horizontal(&self) -> Interval {
        Interval::new(self.min.x, self.max.x)
    }

    /// Extent along the y axis.
    #[must_use]
    pub fn vertical(&self) -> Interval {
        Interval::new(self.min.y, self.max.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containing_cell_handles_negative_positions() {
        assert_eq!(
            CellCoord::containing(Vec2::new(-1.0, 31.0)),
            CellCoord::new(-1, 0)
        );
        assert_eq!(
            CellCoord::containing(CellCoord::new(-3, 7).center()),
            CellCoord::new(-3, 7)
        );
    }

    #[test]
    fn cells_iterate_in_row_major_order() {
        let rect = CellRect::new(CellCoord::new(-1, 2), 2, 2);
        let cells: Vec<_> = rect.cells().collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(-1, 2),
                CellCoord::new(0, 2),
                CellCoord::new(-1, 3),
                CellCoord::new(0, 3),
            ]
        );
    }

    #[test]
    fn quadrants_partition_the_rectangle() {
        let rect = CellRect::new(CellCoord::new(0, 0), 8, 4);
        let quadrants = rect.quadrants().expect("even rectangle splits");
        let covered: u64 = quadrants.iter().map(CellRect::cell_count).sum();
        assert_eq!(covered, rect.cell_count());
        for cell in rect.cells() {
            let owners = quadrants.iter().filter(|q| q.contains(cell)).count();
            assert_eq!(owners, 1, "cell {cell:?} must belong to exactly one quadrant");
        }
        assert!(CellRect::new(CellCoord::ORIGIN, 1, 4).quadrants().is_none());
    }

    #[test]
    fn world_rect_matches_tile_size() {
        let rect = CellRect::new(CellCoord::new(1, -1), 2, 1).to_world();
        assert_eq!(rect.min(), Vec2::new(TILE_SIZE, -TILE_SIZE));
        assert_eq!(rect.max(), Vec2::new(3.0 * TILE_SIZE, 0.0));
        assert!(rect.contains(rect.center()));
    }
}

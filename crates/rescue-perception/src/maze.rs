//! Maze model.
//!
//! Each cell carries an 8-bit wall record in the arena's compass frame:
//!
//! | Bits | Meaning |
//! |---|---|
//! | `0x80 0x40 0x20 0x10` | physical wall on the North, East, South, West edge |
//! | `0x08 0x04 0x02 0x01` | virtual wall on the North, East, South, West edge |
//!
//! Physical walls come from a [`MazeLayout`] loaded at construction and never
//! change. Virtual walls start empty and are added by
//! [`MazeMap::mark_virtual_wall`] when the virtual-wall sensor fires. Walls are
//! shared edges, so every wall is recorded on both adjacent cells.
//!
//! # Example
//!
//! ```rust
//! use rescue_perception::maze::{MazeLayout, MazeMap};
//! use rescue_perception::orientation::OrientationFrame;
//! use rescue_types::{Compass, Coordinate, Side};
//!
//! let layout = MazeLayout::open().with_wall(Coordinate::at(1, 2), Compass::East);
//! let map = MazeMap::new(&layout);
//! let frame = OrientationFrame::new();
//!
//! assert!(map.wall_present(Coordinate::at(1, 2), Side::Right, &frame));
//! assert!(map.wall_present(Coordinate::at(2, 2), Side::Left, &frame));
//! assert!(!map.wall_present(Coordinate::at(1, 2), Side::Front, &frame));
//! ```

use rescue_types::{Compass, Coordinate, GRID_CELLS, RescueError, Side};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::orientation::OrientationFrame;

// ────────────────────────────────────────────────────────────────────────────
// Wall sets
// ────────────────────────────────────────────────────────────────────────────

/// A 4-bit set of compass edges, North in the most significant bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WallSet(u8);

impl WallSet {
    pub const EMPTY: WallSet = WallSet(0);

    /// Build a set from the low nibble of `bits`.
    pub const fn from_bits(bits: u8) -> Self {
        WallSet(bits & 0x0F)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    const fn mask(side: Compass) -> u8 {
        0b1000 >> side.index()
    }

    pub fn contains(self, side: Compass) -> bool {
        self.0 & Self::mask(side) != 0
    }

    pub fn insert(&mut self, side: Compass) {
        self.0 |= Self::mask(side);
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// View this set from the robot's current heading.
    ///
    /// The nibble is rotated left by the frame's rotation so that the bit
    /// that used to describe the compass side now under the robot's front
    /// ends up in the Front position.
    pub fn relative_to(self, frame: &OrientationFrame) -> RelativeWalls {
        let r = u32::from(frame.rotation());
        let v = u32::from(self.0);
        RelativeWalls((((v << r) | (v >> (4 - r))) & 0x0F) as u8)
    }
}

/// A [`WallSet`] re-expressed in robot-relative terms, Front in the most
/// significant bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeWalls(u8);

impl RelativeWalls {
    pub fn has(self, side: Side) -> bool {
        self.0 & (0b1000 >> side.index()) != 0
    }
}

/// The walls recorded for a single cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellWalls {
    /// Pre-loaded maze geometry.
    pub physical: WallSet,
    /// Walls discovered by the virtual-wall sensor.
    pub virtual_walls: WallSet,
}

impl CellWalls {
    /// Decode an 8-bit wall record.
    pub const fn from_record(record: u8) -> Self {
        Self {
            physical: WallSet::from_bits(record >> 4),
            virtual_walls: WallSet::from_bits(record),
        }
    }

    /// Encode as an 8-bit wall record.
    pub const fn record(self) -> u8 {
        (self.physical.bits() << 4) | self.virtual_walls.bits()
    }

    /// `true` if any wall, physical or virtual, sits on the `side` edge.
    pub fn blocked(self, side: Compass) -> bool {
        self.physical.contains(side) || self.virtual_walls.contains(side)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

/// One wall edge, named by a cell and the compass side of that cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallSpec {
    pub cell: Coordinate,
    pub side: Compass,
}

/// The physical geometry of the arena: one wall record per cell, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MazeLayout {
    records: [u8; GRID_CELLS],
}

/// The competition arena: an enclosed 5×4 grid with no interior walls.
#[rustfmt::skip]
pub const ARENA_LAYOUT: MazeLayout = MazeLayout {
    records: [
        //  x=0   x=1   x=2   x=3   x=4
        0x90, 0x80, 0x80, 0x80, 0xC0, // y=0
        0x10, 0x00, 0x00, 0x00, 0x40, // y=1
        0x10, 0x00, 0x00, 0x00, 0x40, // y=2
        0x30, 0x20, 0x20, 0x20, 0x60, // y=3
    ],
};

impl MazeLayout {
    /// A grid with no walls recorded at all, not even on the perimeter.
    pub const fn open() -> Self {
        Self { records: [0; GRID_CELLS] }
    }

    /// Build a layout from raw row-major records.
    ///
    /// # Errors
    ///
    /// Returns [`RescueError::InvalidLayout`] when a wall is recorded on one
    /// side of a shared edge but not on the other.
    pub fn from_records(records: [u8; GRID_CELLS]) -> Result<Self, RescueError> {
        let layout = Self { records };
        layout.validate()?;
        Ok(layout)
    }

    /// Build a layout by adding each wall in `walls` to [`MazeLayout::open`].
    pub fn from_walls<'a>(walls: impl IntoIterator<Item = &'a WallSpec>) -> Self {
        walls
            .into_iter()
            .fold(Self::open(), |layout, w| layout.with_wall(w.cell, w.side))
    }

    /// Add a physical wall on `side` of `cell` and on the matching edge of
    /// the neighbouring cell.
    pub fn with_wall(mut self, cell: Coordinate, side: Compass) -> Self {
        self.records[cell.index()] |= 0x80 >> side.index();
        if let Some(n) = cell.step(side) {
            self.records[n.index()] |= 0x80 >> side.opposite().index();
        }
        self
    }

    pub fn records(&self) -> &[u8; GRID_CELLS] {
        &self.records
    }

    /// Every physical wall edge, once per cell that records it.
    pub fn walls(&self) -> impl Iterator<Item = WallSpec> + '_ {
        Coordinate::all().flat_map(move |cell| {
            let physical = CellWalls::from_record(self.records[cell.index()]).physical;
            Compass::ALL
                .into_iter()
                .filter(move |side| physical.contains(*side))
                .map(move |side| WallSpec { cell, side })
        })
    }

    /// Check that every shared edge is recorded identically on both cells.
    pub fn validate(&self) -> Result<(), RescueError> {
        for cell in Coordinate::all() {
            let here = CellWalls::from_record(self.records[cell.index()]);
            for side in Compass::ALL {
                let Some(n) = cell.step(side) else { continue };
                let there = CellWalls::from_record(self.records[n.index()]);
                let back = side.opposite();
                if here.physical.contains(side) != there.physical.contains(back)
                    || here.virtual_walls.contains(side) != there.virtual_walls.contains(back)
                {
                    return Err(RescueError::InvalidLayout(format!(
                        "edge {side:?} of {cell} does not match edge {back:?} of {n}"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for MazeLayout {
    fn default() -> Self {
        ARENA_LAYOUT
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MazeMap
// ────────────────────────────────────────────────────────────────────────────

/// The live wall map used for planning and motion selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeMap {
    cells: [CellWalls; GRID_CELLS],
}

impl MazeMap {
    /// Load the physical walls of `layout`; no virtual walls are known yet.
    pub fn new(layout: &MazeLayout) -> Self {
        let mut cells = [CellWalls::default(); GRID_CELLS];
        for (cell, record) in cells.iter_mut().zip(layout.records()) {
            *cell = CellWalls {
                physical: CellWalls::from_record(*record).physical,
                virtual_walls: WallSet::EMPTY,
            };
        }
        Self { cells }
    }

    pub fn cell(&self, cell: Coordinate) -> CellWalls {
        self.cells[cell.index()]
    }

    /// Robot-relative wall query.
    ///
    /// `cell` may be `None` for a position beyond the grid edge; such cells
    /// always report a wall so callers treat the unknown as blocked.
    pub fn wall_present(
        &self,
        cell: impl Into<Option<Coordinate>>,
        side: Side,
        frame: &OrientationFrame,
    ) -> bool {
        let Some(cell) = cell.into() else {
            return true;
        };
        let walls = self.cell(cell);
        walls.physical.relative_to(frame).has(side) || walls.virtual_walls.relative_to(frame).has(side)
    }

    /// Robot-relative query restricted to physical walls, the only ones the
    /// range sensor can see. Cells beyond the grid edge report a wall.
    pub fn physical_wall_present(
        &self,
        cell: impl Into<Option<Coordinate>>,
        side: Side,
        frame: &OrientationFrame,
    ) -> bool {
        cell.into()
            .is_none_or(|c| self.cell(c).physical.relative_to(frame).has(side))
    }

    /// Compass-frame wall query on the record of `cell` alone.
    pub fn wall_at(&self, cell: Coordinate, side: Compass) -> bool {
        self.cell(cell).blocked(side)
    }

    /// The neighbour of `cell` towards `side` when the shared edge is open
    /// from both cells, `None` otherwise or at the grid edge.
    pub fn passable(&self, cell: Coordinate, side: Compass) -> Option<Coordinate> {
        if self.wall_at(cell, side) {
            return None;
        }
        cell.step(side).filter(|n| !self.wall_at(*n, side.opposite()))
    }

    /// Record a virtual wall on the robot-relative `side` of `cell`, and on
    /// the matching edge of the neighbouring cell when it lies in the grid.
    ///
    /// Returns the compass side that was marked on `cell`.
    pub fn mark_virtual_wall(&mut self, cell: Coordinate, side: Side, frame: &OrientationFrame) -> Compass {
        let compass = frame.resolve(side);
        self.cells[cell.index()].virtual_walls.insert(compass);
        if let Some(n) = cell.step(compass) {
            self.cells[n.index()].virtual_walls.insert(compass.opposite());
        }
        debug!(%cell, side = ?compass, "virtual wall marked");
        compass
    }

    /// Number of virtual wall edges discovered so far, counting each shared
    /// edge once per cell that records it.
    pub fn virtual_wall_count(&self) -> usize {
        self.cells
            .iter()
            .map(|c| c.virtual_walls.bits().count_ones() as usize)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rescue_types::TurnDirection;

    fn turned(cw: u8) -> OrientationFrame {
        let mut frame = OrientationFrame::new();
        if cw > 0 {
            frame.apply_turns(cw, TurnDirection::Cw);
        }
        frame
    }

    #[test]
    fn record_roundtrip_keeps_both_nibbles() {
        let walls = CellWalls::from_record(0b1010_0101);
        assert!(walls.physical.contains(Compass::North));
        assert!(walls.physical.contains(Compass::South));
        assert!(walls.virtual_walls.contains(Compass::East));
        assert!(walls.virtual_walls.contains(Compass::West));
        assert_eq!(walls.record(), 0b1010_0101);
    }

    #[test]
    fn relative_view_rotates_with_frame() {
        // Physical wall on the East edge only.
        let set = WallSet::from_bits(0b0100);
        assert!(set.relative_to(&turned(0)).has(Side::Right));
        assert!(set.relative_to(&turned(1)).has(Side::Front));
        assert!(set.relative_to(&turned(2)).has(Side::Left));
        assert!(set.relative_to(&turned(3)).has(Side::Back));
    }

    #[test]
    fn arena_layout_is_consistent_and_enclosed() {
        ARENA_LAYOUT.validate().unwrap();
        let map = MazeMap::new(&ARENA_LAYOUT);
        assert!(map.wall_at(Coordinate::at(0, 0), Compass::North));
        assert!(map.wall_at(Coordinate::at(0, 0), Compass::West));
        assert!(map.wall_at(Coordinate::at(4, 3), Compass::East));
        assert!(map.wall_at(Coordinate::at(2, 3), Compass::South));
        assert!(!map.wall_at(Coordinate::at(2, 2), Compass::South));
    }

    #[test]
    fn from_records_rejects_one_sided_edge() {
        let mut records = [0u8; GRID_CELLS];
        records[Coordinate::at(1, 1).index()] = 0x40; // East wall, neighbour silent
        let err = MazeLayout::from_records(records).unwrap_err();
        assert!(matches!(err, RescueError::InvalidLayout(_)));
    }

    #[test]
    fn with_wall_records_both_sides() {
        let layout = MazeLayout::open().with_wall(Coordinate::at(2, 1), Compass::South);
        layout.validate().unwrap();
        let map = MazeMap::new(&layout);
        assert!(map.wall_at(Coordinate::at(2, 1), Compass::South));
        assert!(map.wall_at(Coordinate::at(2, 2), Compass::North));
    }

    #[test]
    fn out_of_range_cell_reports_wall() {
        let map = MazeMap::new(&MazeLayout::open());
        let frame = OrientationFrame::new();
        for side in [Side::Front, Side::Right, Side::Back, Side::Left] {
            assert!(map.wall_present(None, side, &frame));
        }
        assert!(!map.wall_present(Coordinate::at(0, 0), Side::Front, &frame));
    }

    #[test]
    fn mark_virtual_wall_sets_shared_edge() {
        let mut map = MazeMap::new(&MazeLayout::open());
        let frame = turned(1); // facing East
        let marked = map.mark_virtual_wall(Coordinate::at(1, 3), Side::Front, &frame);
        assert_eq!(marked, Compass::East);
        assert!(map.cell(Coordinate::at(1, 3)).virtual_walls.contains(Compass::East));
        assert!(map.cell(Coordinate::at(2, 3)).virtual_walls.contains(Compass::West));

        // From the neighbour, facing the same way, the wall is behind.
        assert!(map.wall_present(Coordinate::at(2, 3), Side::Back, &frame));
        assert!(map.passable(Coordinate::at(1, 3), Compass::East).is_none());
        assert_eq!(map.virtual_wall_count(), 2);
    }

    #[test]
    fn mark_virtual_wall_at_grid_edge_updates_origin_only() {
        let mut map = MazeMap::new(&MazeLayout::open());
        let frame = OrientationFrame::new();
        map.mark_virtual_wall(Coordinate::at(3, 0), Side::Front, &frame);
        assert!(map.cell(Coordinate::at(3, 0)).virtual_walls.contains(Compass::North));
        assert_eq!(map.virtual_wall_count(), 1);
    }

    #[test]
    fn virtual_walls_are_not_loaded_from_layout() {
        let mut records = [0u8; GRID_CELLS];
        records[Coordinate::at(0, 0).index()] = 0x04;
        records[Coordinate::at(1, 0).index()] = 0x01;
        let layout = MazeLayout::from_records(records).unwrap();
        let map = MazeMap::new(&layout);
        assert_eq!(map.virtual_wall_count(), 0);
    }

    #[test]
    fn physical_query_ignores_virtual_walls() {
        let mut map = MazeMap::new(&MazeLayout::open().with_wall(Coordinate::at(2, 2), Compass::West));
        let frame = OrientationFrame::new();
        map.mark_virtual_wall(Coordinate::at(2, 2), Side::Right, &frame);
        assert!(map.wall_present(Coordinate::at(2, 2), Side::Right, &frame));
        assert!(!map.physical_wall_present(Coordinate::at(2, 2), Side::Right, &frame));
        assert!(map.physical_wall_present(Coordinate::at(2, 2), Side::Left, &frame));
        assert!(map.physical_wall_present(None, Side::Front, &frame));
    }

    #[test]
    fn walls_lists_each_recorded_side() {
        let layout = MazeLayout::open().with_wall(Coordinate::at(0, 0), Compass::East);
        let walls: Vec<WallSpec> = layout.walls().collect();
        assert_eq!(
            walls,
            vec![
                WallSpec { cell: Coordinate::at(0, 0), side: Compass::East },
                WallSpec { cell: Coordinate::at(1, 0), side: Compass::West },
            ]
        );
        assert_eq!(ARENA_LAYOUT.walls().count(), 18);
        assert_eq!(MazeLayout::from_walls(&walls), layout);
    }
}

//! Flood Planner.
//!
//! Computes a [`DistanceField`] towards a target cell by wavefront
//! relaxation over the [`MazeMap`]. The field is rebuilt from scratch on
//! every [`FloodPlanner::plan`] call and never carried across plans.
//!
//! # Algorithm
//!
//! 1. Every cell starts unreached except the target, which holds `0`.
//! 2. Each round scans the grid row-major and updates cells in place, so a
//!    value set earlier in the scan is seen by later cells. An unreached
//!    cell with at least one reached neighbour behind an open edge takes
//!    `1 + max` of those neighbours' values. The result is not always the
//!    shortest hop count, but every reached cell keeps a neighbour exactly
//!    one lower.
//! 3. Rounds stop as soon as the robot's cell is reached, or after
//!    [`ITERATION_CAP`] rounds when no path exists.
//!
//! Walls are checked in the arena's compass frame, not the robot's.
//!
//! # Example
//!
//! ```rust
//! use rescue_perception::flood::FloodPlanner;
//! use rescue_perception::maze::{MazeLayout, MazeMap};
//! use rescue_types::Coordinate;
//!
//! let map = MazeMap::new(&MazeLayout::open());
//! let mut planner = FloodPlanner::new();
//! let field = planner.plan(&map, Coordinate::at(0, 0), Coordinate::at(2, 1));
//!
//! assert!(field.converged());
//! assert_eq!(field.get(Coordinate::at(2, 1)), Some(3));
//! ```

use rescue_types::{Compass, Coordinate, GRID_CELLS};
use tracing::debug;

use crate::maze::MazeMap;

/// Upper bound on relaxation rounds: `cells² + 1`.
pub const ITERATION_CAP: usize = GRID_CELLS * GRID_CELLS + 1;

// ────────────────────────────────────────────────────────────────────────────
// DistanceField
// ────────────────────────────────────────────────────────────────────────────

/// Hop counts towards one target cell; `None` marks a cell not yet reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceField {
    values: [Option<u16>; GRID_CELLS],
    target: Coordinate,
    converged: bool,
    rounds: usize,
}

impl DistanceField {
    /// A fresh field: target at `0`, everything else unreached.
    pub fn seeded(target: Coordinate) -> Self {
        let mut values = [None; GRID_CELLS];
        values[target.index()] = Some(0);
        Self {
            values,
            target,
            converged: false,
            rounds: 0,
        }
    }

    pub fn target(&self) -> Coordinate {
        self.target
    }

    /// `true` when the robot's cell was reached before the iteration cap.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Relaxation rounds performed by the plan that built this field.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn get(&self, cell: Coordinate) -> Option<u16> {
        self.values[cell.index()]
    }

    /// Overwrite one cell's value. Used to hand-build fields.
    pub fn set(&mut self, cell: Coordinate, value: Option<u16>) {
        self.values[cell.index()] = value;
    }

    /// `true` when a path from `cell` to the target is known.
    ///
    /// The target itself is always reachable; any other cell additionally
    /// requires the plan to have converged.
    pub fn is_reachable(&self, cell: Coordinate) -> bool {
        cell == self.target || (self.converged && self.get(cell).is_some())
    }

    /// The value `cell` would take if relaxed now: one plus the largest
    /// value among its reached neighbours behind open edges, or `None` when
    /// no such neighbour exists.
    pub fn relax(&self, map: &MazeMap, cell: Coordinate) -> Option<u16> {
        Compass::ALL
            .iter()
            .filter_map(|side| map.passable(cell, *side))
            .filter_map(|n| self.get(n))
            .max()
            .map(|v| v.saturating_add(1))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FloodPlanner
// ────────────────────────────────────────────────────────────────────────────

/// Wavefront planner holding the field produced by its most recent plan.
#[derive(Debug, Clone, Default)]
pub struct FloodPlanner {
    field: Option<DistanceField>,
}

impl FloodPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the field towards `target`, stopping once `robot` is reached.
    pub fn plan(&mut self, map: &MazeMap, target: Coordinate, robot: Coordinate) -> &DistanceField {
        let mut field = DistanceField::seeded(target);
        field.converged = field.get(robot).is_some();

        while !field.converged && field.rounds < ITERATION_CAP {
            for cell in Coordinate::all() {
                if field.get(cell).is_none()
                    && let Some(value) = field.relax(map, cell)
                {
                    field.set(cell, Some(value));
                }
            }
            field.rounds += 1;
            field.converged = field.get(robot).is_some();
        }

        debug!(
            %target,
            %robot,
            rounds = field.rounds,
            converged = field.converged,
            "flood plan complete"
        );
        self.field.insert(field)
    }

    /// The field from the last [`plan`][Self::plan] call, if any.
    pub fn field(&self) -> Option<&DistanceField> {
        self.field.as_ref()
    }

    /// Reachability against the last plan; `false` before any plan.
    pub fn is_reachable(&self, cell: Coordinate) -> bool {
        self.field.as_ref().is_some_and(|f| f.is_reachable(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::MazeLayout;

    fn open_map() -> MazeMap {
        MazeMap::new(&MazeLayout::open())
    }

    #[test]
    fn open_grid_from_corner_fills_in_one_scan() {
        let map = open_map();
        let mut planner = FloodPlanner::new();
        let field = planner.plan(&map, Coordinate::at(0, 0), Coordinate::at(4, 3));

        assert!(field.converged());
        assert_eq!(field.rounds(), 1);
        for cell in Coordinate::all() {
            let expected = u16::from(cell.x()) + u16::from(cell.y());
            assert_eq!(field.get(cell), Some(expected), "cell {cell}");
        }
    }

    #[test]
    fn values_set_earlier_in_a_scan_feed_later_cells() {
        let map = open_map();
        let mut planner = FloodPlanner::new();
        let field = planner.plan(&map, Coordinate::at(2, 0), Coordinate::at(4, 3));

        assert_eq!(field.rounds(), 1);
        assert_eq!(field.get(Coordinate::at(1, 0)), Some(1));
        assert_eq!(field.get(Coordinate::at(3, 0)), Some(1));
        // (1,1) = 2 is already set when (2,1) is scanned.
        assert_eq!(field.get(Coordinate::at(2, 1)), Some(3));
        assert_eq!(field.get(Coordinate::at(4, 3)), Some(7));
        // Column 0 is scanned before its neighbours in column 1 are set.
        assert_eq!(field.get(Coordinate::at(0, 1)), None);
    }

    #[test]
    fn plan_stops_once_robot_cell_is_reached() {
        let map = open_map();
        let mut planner = FloodPlanner::new();
        let field = planner.plan(&map, Coordinate::at(4, 3), Coordinate::at(3, 3));
        assert_eq!(field.rounds(), 1);
        assert_eq!(field.get(Coordinate::at(4, 2)), Some(1));
        assert_eq!(field.get(Coordinate::at(3, 3)), Some(1));
        assert_eq!(field.get(Coordinate::at(0, 0)), None);
        assert!(field.is_reachable(Coordinate::at(3, 3)));
    }

    #[test]
    fn robot_on_target_needs_no_rounds() {
        let map = open_map();
        let mut planner = FloodPlanner::new();
        let field = planner.plan(&map, Coordinate::at(2, 2), Coordinate::at(2, 2));
        assert!(field.converged());
        assert_eq!(field.rounds(), 0);
    }

    #[test]
    fn enclosed_target_exhausts_cap() {
        let target = Coordinate::at(2, 1);
        let layout = Compass::ALL
            .iter()
            .fold(MazeLayout::open(), |l, side| l.with_wall(target, *side));
        let map = MazeMap::new(&layout);
        let mut planner = FloodPlanner::new();
        let field = planner.plan(&map, target, Coordinate::at(0, 3)).clone();

        assert!(!field.converged());
        assert_eq!(field.rounds(), ITERATION_CAP);
        assert_eq!(ITERATION_CAP, 401);
        assert_eq!(field.get(target), Some(0));
        assert!(field.is_reachable(target));
        for cell in Coordinate::all().filter(|c| *c != target) {
            assert!(!field.is_reachable(cell), "cell {cell}");
            assert!(!planner.is_reachable(cell));
        }
    }

    #[test]
    fn relaxation_takes_max_of_reached_neighbours() {
        // Corridor A-B-C along the top row.
        let (a, b, c) = (Coordinate::at(0, 0), Coordinate::at(1, 0), Coordinate::at(2, 0));
        let map = open_map();
        let mut field = DistanceField::seeded(Coordinate::at(4, 3));
        field.set(a, Some(5));
        field.set(c, Some(2));
        assert_eq!(field.relax(&map, b), Some(6));
    }

    #[test]
    fn relaxation_ignores_neighbours_behind_walls() {
        let (a, b, c) = (Coordinate::at(0, 0), Coordinate::at(1, 0), Coordinate::at(2, 0));
        let map = MazeMap::new(&MazeLayout::open().with_wall(a, Compass::East));
        let mut field = DistanceField::seeded(Coordinate::at(4, 3));
        field.set(a, Some(5));
        field.set(c, Some(2));
        assert_eq!(field.relax(&map, b), Some(3));
    }

    #[test]
    fn virtual_wall_reroutes_plan() {
        let mut map = open_map();
        let frame = {
            let mut f = crate::orientation::OrientationFrame::new();
            f.apply_turns(1, rescue_types::TurnDirection::Cw);
            f
        };
        map.mark_virtual_wall(Coordinate::at(1, 3), rescue_types::Side::Front, &frame);
        let mut planner = FloodPlanner::new();
        let field = planner.plan(&map, Coordinate::at(2, 3), Coordinate::at(1, 3));
        assert!(field.converged());
        assert_eq!(field.get(Coordinate::at(1, 3)), Some(3));
    }

    #[test]
    fn planner_without_plan_reports_unreachable() {
        let planner = FloodPlanner::new();
        assert!(planner.field().is_none());
        assert!(!planner.is_reachable(Coordinate::at(0, 0)));
    }
}

//! `rescue-perception` – the robot's model of the arena.
//!
//! Turns the pre-loaded maze geometry and the walls discovered at runtime
//! into the representation the navigator reasons over.
//!
//! # Modules
//!
//! - [`orientation`] – [`OrientationFrame`][orientation::OrientationFrame]:
//!   accumulated heading as a quarter-turn count, translating robot-relative
//!   sides into compass directions.
//! - [`maze`] – [`MazeLayout`][maze::MazeLayout] and
//!   [`MazeMap`][maze::MazeMap]: per-cell physical and virtual wall records
//!   with robot-relative wall queries.
//! - [`flood`] – [`FloodPlanner`][flood::FloodPlanner]: wavefront relaxation
//!   producing a [`DistanceField`][flood::DistanceField] towards a target cell.

pub mod flood;
pub mod maze;
pub mod orientation;

pub use flood::{DistanceField, FloodPlanner, ITERATION_CAP};
pub use maze::{ARENA_LAYOUT, CellWalls, MazeLayout, MazeMap, RelativeWalls, WallSet, WallSpec};
pub use orientation::OrientationFrame;

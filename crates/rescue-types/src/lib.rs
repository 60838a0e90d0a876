use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of columns in the arena grid.
pub const GRID_WIDTH: u8 = 5;
/// Number of rows in the arena grid.
pub const GRID_HEIGHT: u8 = 4;
/// Total number of cells in the arena grid.
pub const GRID_CELLS: usize = GRID_WIDTH as usize * GRID_HEIGHT as usize;

// ────────────────────────────────────────────────────────────────────────────
// Coordinates and directions
// ────────────────────────────────────────────────────────────────────────────

/// Address of one cell in the fixed 5×4 arena grid.
///
/// A `Coordinate` is always inside the grid; construct it with
/// [`Coordinate::new`] (fallible) or [`Coordinate::at`] (for constants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(u8, u8)", into = "(u8, u8)")]
pub struct Coordinate {
    x: u8,
    y: u8,
}

impl Coordinate {
    /// Create a coordinate, rejecting cells outside the grid.
    pub const fn new(x: u8, y: u8) -> Result<Self, RescueError> {
        if x < GRID_WIDTH && y < GRID_HEIGHT {
            Ok(Self { x, y })
        } else {
            Err(RescueError::OutOfGrid { x, y })
        }
    }

    /// Create a coordinate from values known to be in range.
    ///
    /// # Panics
    ///
    /// Panics when `(x, y)` lies outside the grid. In a `const` context this
    /// is a compile-time error.
    pub const fn at(x: u8, y: u8) -> Self {
        assert!(x < GRID_WIDTH && y < GRID_HEIGHT, "coordinate outside the arena grid");
        Self { x, y }
    }

    pub const fn x(self) -> u8 {
        self.x
    }

    pub const fn y(self) -> u8 {
        self.y
    }

    /// Row-major index into a [`GRID_CELLS`]-sized array.
    pub const fn index(self) -> usize {
        self.y as usize * GRID_WIDTH as usize + self.x as usize
    }

    /// The adjacent cell one step towards `heading`, or `None` at the edge of
    /// the grid.
    pub fn step(self, heading: Compass) -> Option<Self> {
        let (dx, dy) = heading.delta();
        let x = i16::from(self.x) + i16::from(dx);
        let y = i16::from(self.y) + i16::from(dy);
        if (0..i16::from(GRID_WIDTH)).contains(&x) && (0..i16::from(GRID_HEIGHT)).contains(&y) {
            Some(Self { x: x as u8, y: y as u8 })
        } else {
            None
        }
    }

    /// Iterate every cell of the grid in row-major order.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..GRID_HEIGHT).flat_map(|y| (0..GRID_WIDTH).map(move |x| Coordinate { x, y }))
    }
}

impl TryFrom<(u8, u8)> for Coordinate {
    type Error = RescueError;

    fn try_from((x, y): (u8, u8)) -> Result<Self, Self::Error> {
        Coordinate::new(x, y)
    }
}

impl From<Coordinate> for (u8, u8) {
    fn from(c: Coordinate) -> Self {
        (c.x, c.y)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// A fixed direction in the arena's own frame.
///
/// North points towards row 0, East towards the last column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compass {
    North,
    East,
    South,
    West,
}

impl Compass {
    /// All four directions in clockwise order starting at North.
    pub const ALL: [Compass; 4] = [Compass::North, Compass::East, Compass::South, Compass::West];

    /// Clockwise index: North = 0 … West = 3.
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Compass::index`]; the argument is reduced modulo 4.
    pub const fn from_index(index: u8) -> Self {
        Self::ALL[(index % 4) as usize]
    }

    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    /// Grid offset `(dx, dy)` of one step in this direction.
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Compass::North => (0, -1),
            Compass::East => (1, 0),
            Compass::South => (0, 1),
            Compass::West => (-1, 0),
        }
    }
}

/// A direction relative to the robot's current heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Front,
    Right,
    Back,
    Left,
}

impl Side {
    /// Clockwise index: Front = 0 … Left = 3.
    pub const fn index(self) -> u8 {
        self as u8
    }
}

/// Sense of an in-place rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnDirection {
    /// Clockwise, seen from above.
    Cw,
    /// Counter-clockwise, seen from above.
    Ccw,
}

// ────────────────────────────────────────────────────────────────────────────
// Sensors and peripherals
// ────────────────────────────────────────────────────────────────────────────

/// The interrupt kinds that abort a motion primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorTrigger {
    /// The bumper made contact with something.
    Bump,
    /// A virtual-wall beam was detected ahead.
    VirtualWall,
}

/// Raw result of one sensor poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorState {
    pub bump: bool,
    pub virtual_wall: bool,
}

impl SensorState {
    /// The trigger this poll represents. A virtual wall takes precedence over
    /// a simultaneous bump.
    pub fn trigger(self) -> Option<SensorTrigger> {
        if self.virtual_wall {
            Some(SensorTrigger::VirtualWall)
        } else if self.bump {
            Some(SensorTrigger::Bump)
        } else {
            None
        }
    }
}

/// The four text regions of the 2×16 character display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayRegion {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Songs stored in the robot's non-volatile song slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Melody {
    Startup,
    VictimFound,
    SecondVictim,
    Complete,
}

impl Melody {
    /// Song slot on the robot (0..=3).
    pub const fn slot(self) -> u8 {
        self as u8
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Crate-wide error type. Only hardware faults are fatal to a mission; every
/// navigation setback is reported as data by the runtime instead.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RescueError {
    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Invalid maze layout: {0}")]
    InvalidLayout(String),

    #[error("Cell ({x},{y}) lies outside the 5x4 arena grid")]
    OutOfGrid { x: u8, y: u8 },

    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_rejects_cells_outside_grid() {
        assert!(Coordinate::new(4, 3).is_ok());
        assert_eq!(Coordinate::new(5, 0), Err(RescueError::OutOfGrid { x: 5, y: 0 }));
        assert_eq!(Coordinate::new(0, 4), Err(RescueError::OutOfGrid { x: 0, y: 4 }));
    }

    #[test]
    fn step_follows_compass_deltas() {
        let c = Coordinate::at(1, 3);
        assert_eq!(c.step(Compass::North), Some(Coordinate::at(1, 2)));
        assert_eq!(c.step(Compass::East), Some(Coordinate::at(2, 3)));
        assert_eq!(c.step(Compass::West), Some(Coordinate::at(0, 3)));
        assert_eq!(c.step(Compass::South), None);
        assert_eq!(Coordinate::at(0, 0).step(Compass::West), None);
    }

    #[test]
    fn all_covers_grid_in_row_major_order() {
        let cells: Vec<Coordinate> = Coordinate::all().collect();
        assert_eq!(cells.len(), GRID_CELLS);
        for (i, c) in cells.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn compass_opposites() {
        assert_eq!(Compass::North.opposite(), Compass::South);
        assert_eq!(Compass::East.opposite(), Compass::West);
        assert_eq!(Compass::from_index(7), Compass::West);
    }

    #[test]
    fn virtual_wall_takes_precedence_over_bump() {
        let both = SensorState { bump: true, virtual_wall: true };
        assert_eq!(both.trigger(), Some(SensorTrigger::VirtualWall));
        let bump = SensorState { bump: true, virtual_wall: false };
        assert_eq!(bump.trigger(), Some(SensorTrigger::Bump));
        assert_eq!(SensorState::default().trigger(), None);
    }

    #[test]
    fn coordinate_deserializes_as_pair_and_validates() {
        let c: Coordinate = serde_json::from_str("[2,3]").unwrap();
        assert_eq!(c, Coordinate::at(2, 3));
        assert!(serde_json::from_str::<Coordinate>("[9,0]").is_err());
        assert_eq!(serde_json::to_string(&c).unwrap(), "[2,3]");
    }

    #[test]
    fn rescue_error_display() {
        let err = RescueError::HardwareFault {
            component: "drive_base".to_string(),
            details: "serial timeout".to_string(),
        };
        assert!(err.to_string().contains("Hardware Fault"));
        assert!(RescueError::OutOfGrid { x: 7, y: 1 }.to_string().contains("5x4"));
    }
}

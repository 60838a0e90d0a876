//! In-process simulated robot for CI testing without the arena.
//!
//! [`SimWorld`] describes the arena: its cell size, the physical walls, the
//! hidden virtual-wall beams and the victim markers. [`SimRobot`] places a
//! robot in that world and implements every collaborator trait from this
//! crate, so the full mission runtime can run headless.
//!
//! Time only advances when odometry is read: each
//! [`MotionService::distance_since_last_call`] or
//! [`MotionService::angle_since_last_call`] call simulates one 20 ms tick.
//! Positions are tracked in micrometres, so wheel speeds that are multiples
//! of 50 mm/s move the robot a whole number of millimetres per tick.
//!
//! The model is deliberately coarse. Straight driving moves the robot along
//! its nearest compass heading with no lateral drift, spinning in place
//! changes only the heading, and the chassis is squared to the grid when a
//! spin ends.
//!
//! # Example
//!
//! ```rust
//! use rescue_hal::motion::MotionService;
//! use rescue_hal::sim::{SimRobot, SimWorld};
//! use rescue_types::{Compass, Coordinate};
//!
//! let world = SimWorld::new(1000).with_victim(Coordinate::at(1, 2));
//! let mut robot = SimRobot::new(world, Coordinate::at(1, 3));
//!
//! let travel = robot.straight(200, 1000, true).expect("sim drive must succeed");
//! assert_eq!(travel.distance_mm, 1000);
//! assert_eq!(robot.cell(), Coordinate::at(1, 2));
//! assert_eq!(robot.heading(), Compass::North);
//! ```

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use rescue_types::{
    Compass, Coordinate, DisplayRegion, GRID_HEIGHT, GRID_WIDTH, Melody, RescueError,
    SensorState, Side,
};
use tracing::trace;

use crate::motion::MotionService;
use crate::sensors::{RangeSensor, VictimSensor};
use crate::signal::{AudioSignal, Display};

/// Simulated time per odometry read.
pub const TICK_MS: i64 = 20;
/// Distance between the two drive wheels.
pub const WHEEL_BASE_MM: f64 = 235.0;
/// Distance from the robot's centre to its bumper.
pub const BODY_RADIUS_MM: i64 = 165;
/// A beam is reported once its edge is this close to the robot's centre.
pub const BEAM_RANGE_MM: i64 = 300;
/// Longest distance the range sensor reports.
pub const RANGE_LIMIT_MM: u16 = 1500;
/// Number of `is_busy` polls a song keeps playing for.
pub const SONG_POLLS: u32 = 3;
/// Default tick budget: a little over a simulated day.
pub const DEFAULT_TICK_BUDGET: u64 = 5_000_000;

type Edge = (Coordinate, Compass);

fn insert_edge(set: &mut HashSet<Edge>, cell: Coordinate, side: Compass) {
    set.insert((cell, side));
    if let Some(neighbour) = cell.step(side) {
        set.insert((neighbour, side.opposite()));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimWorld
// ────────────────────────────────────────────────────────────────────────────

/// The simulated arena. The grid boundary is always solid.
#[derive(Debug, Clone)]
pub struct SimWorld {
    cell_length_mm: u32,
    walls: HashSet<Edge>,
    beams: HashSet<Edge>,
    victims: HashSet<Coordinate>,
}

impl SimWorld {
    pub fn new(cell_length_mm: u32) -> Self {
        Self {
            cell_length_mm: cell_length_mm.max(1),
            walls: HashSet::new(),
            beams: HashSet::new(),
            victims: HashSet::new(),
        }
    }

    /// Add a solid wall on `side` of `cell` (and the matching side of its
    /// neighbour).
    pub fn with_wall(mut self, cell: Coordinate, side: Compass) -> Self {
        insert_edge(&mut self.walls, cell, side);
        self
    }

    /// Add a virtual-wall beam across `side` of `cell`. Beams are invisible
    /// to the range sensor and do not stop the robot.
    pub fn with_beam(mut self, cell: Coordinate, side: Compass) -> Self {
        insert_edge(&mut self.beams, cell, side);
        self
    }

    pub fn with_victim(mut self, cell: Coordinate) -> Self {
        self.victims.insert(cell);
        self
    }

    pub fn cell_length_mm(&self) -> u32 {
        self.cell_length_mm
    }

    pub fn has_wall(&self, cell: Coordinate, side: Compass) -> bool {
        self.walls.contains(&(cell, side))
    }

    pub fn has_beam(&self, cell: Coordinate, side: Compass) -> bool {
        self.beams.contains(&(cell, side))
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new(1000)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimRobot
// ────────────────────────────────────────────────────────────────────────────

/// A simulated robot placed in a [`SimWorld`].
#[derive(Debug)]
pub struct SimRobot {
    world: SimWorld,
    x_um: i64,
    y_um: i64,
    /// Counter-clockwise from North.
    heading_deg: f64,
    wheels: (i16, i16),
    odometer_um: i64,
    gyro_deg: f64,
    aim: Side,
    ticks: u64,
    tick_budget: u64,
    played: Vec<Melody>,
    song_polls: u32,
    display: HashMap<DisplayRegion, String>,
}

impl SimRobot {
    /// Place a robot at the centre of `start`, facing North.
    pub fn new(world: SimWorld, start: Coordinate) -> Self {
        let half = i64::from(world.cell_length_mm) * 500;
        let cell = i64::from(world.cell_length_mm) * 1000;
        Self {
            x_um: i64::from(start.x()) * cell + half,
            y_um: i64::from(start.y()) * cell + half,
            world,
            heading_deg: 0.0,
            wheels: (0, 0),
            odometer_um: 0,
            gyro_deg: 0.0,
            aim: Side::Front,
            ticks: 0,
            tick_budget: DEFAULT_TICK_BUDGET,
            played: Vec::new(),
            song_polls: 0,
            display: HashMap::new(),
        }
    }

    /// Fail every odometry read once `ticks` ticks have been simulated.
    pub fn with_tick_budget(mut self, ticks: u64) -> Self {
        self.tick_budget = ticks;
        self
    }

    pub fn world(&self) -> &SimWorld {
        &self.world
    }

    /// The cell containing the robot's centre.
    pub fn cell(&self) -> Coordinate {
        let cell = self.cell_um();
        let x = (self.x_um / cell).clamp(0, i64::from(GRID_WIDTH) - 1) as u8;
        let y = (self.y_um / cell).clamp(0, i64::from(GRID_HEIGHT) - 1) as u8;
        Coordinate::at(x, y)
    }

    /// The compass direction closest to the robot's heading.
    pub fn heading(&self) -> Compass {
        let quarters = (-self.heading_deg / 90.0).round() as i64;
        Compass::from_index(quarters.rem_euclid(4) as u8)
    }

    /// Centre position in mm, origin at the North-West corner.
    pub fn position_mm(&self) -> (i64, i64) {
        (self.x_um / 1000, self.y_um / 1000)
    }

    /// Move the robot without touching odometry.
    pub fn displace(&mut self, direction: Compass, mm: i64) {
        let (dx, dy) = direction.delta();
        self.x_um += i64::from(dx) * mm * 1000;
        self.y_um += i64::from(dy) * mm * 1000;
    }

    pub fn wheels(&self) -> (i16, i16) {
        self.wheels
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn aimed(&self) -> Side {
        self.aim
    }

    /// Every melody played so far, in order.
    pub fn played(&self) -> &[Melody] {
        &self.played
    }

    pub fn display_text(&self, region: DisplayRegion) -> Option<&str> {
        self.display.get(&region).map(String::as_str)
    }

    fn cell_um(&self) -> i64 {
        i64::from(self.world.cell_length_mm) * 1000
    }

    fn spinning(wheels: (i16, i16)) -> bool {
        i32::from(wheels.0) * i32::from(wheels.1) < 0
    }

    /// Distance from the centre to the first solid edge in `direction`, and
    /// to the first beam before it.
    fn scan(&self, direction: Compass) -> (i64, Option<i64>) {
        let length = self.cell_um();
        let mut cell = self.cell();
        let (cx, cy) = (i64::from(cell.x()), i64::from(cell.y()));
        let mut distance = match direction {
            Compass::North => self.y_um - cy * length,
            Compass::South => (cy + 1) * length - self.y_um,
            Compass::East => (cx + 1) * length - self.x_um,
            Compass::West => self.x_um - cx * length,
        };
        let mut beam = None;
        loop {
            if beam.is_none() && self.world.has_beam(cell, direction) {
                beam = Some(distance);
            }
            if self.world.has_wall(cell, direction) {
                return (distance, beam);
            }
            match cell.step(direction) {
                Some(next) => {
                    cell = next;
                    distance += length;
                }
                None => return (distance, beam),
            }
        }
    }

    fn tick(&mut self) -> Result<(), RescueError> {
        if self.ticks >= self.tick_budget {
            return Err(RescueError::HardwareFault {
                component: "sim_robot".to_string(),
                details: format!("tick budget of {} exhausted", self.tick_budget),
            });
        }
        self.ticks += 1;

        let (left, right) = (i64::from(self.wheels.0), i64::from(self.wheels.1));
        if Self::spinning(self.wheels) {
            let rate = (right - left) as f64 / WHEEL_BASE_MM * 180.0 / PI;
            let delta = rate * TICK_MS as f64 / 1000.0;
            self.heading_deg += delta;
            self.gyro_deg += delta;
        } else if left + right != 0 {
            // Mean wheel speed in mm/s times the tick in ms gives µm.
            let travel_um = (left + right) * TICK_MS / 2;
            let forward = travel_um > 0;
            let heading = self.heading();
            let direction = if forward { heading } else { heading.opposite() };
            let room = (self.scan(direction).0 - BODY_RADIUS_MM * 1000).max(0);
            let step = travel_um.abs().min(room);
            let (dx, dy) = direction.delta();
            self.x_um += i64::from(dx) * step;
            self.y_um += i64::from(dy) * step;
            self.odometer_um += if forward { step } else { -step };
        }
        Ok(())
    }
}

impl MotionService for SimRobot {
    fn direct_drive(&mut self, left: i16, right: i16) -> Result<(), RescueError> {
        if Self::spinning(self.wheels) && (left, right) != self.wheels {
            self.heading_deg = (self.heading_deg / 90.0).round() * 90.0;
        }
        trace!(left, right, "sim drive");
        self.wheels = (left, right);
        Ok(())
    }

    fn distance_since_last_call(&mut self) -> Result<i16, RescueError> {
        self.tick()?;
        let whole_mm = self.odometer_um / 1000;
        self.odometer_um -= whole_mm * 1000;
        Ok(whole_mm.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16)
    }

    fn angle_since_last_call(&mut self) -> Result<i16, RescueError> {
        self.tick()?;
        let whole_deg = self.gyro_deg.trunc();
        self.gyro_deg -= whole_deg;
        Ok(whole_deg as i16)
    }

    fn poll_sensors(&mut self) -> Result<SensorState, RescueError> {
        let (clearance, beam) = self.scan(self.heading());
        Ok(SensorState {
            bump: clearance <= BODY_RADIUS_MM * 1000,
            virtual_wall: beam.is_some_and(|d| d <= BEAM_RANGE_MM * 1000),
        })
    }
}

impl RangeSensor for SimRobot {
    fn aim(&mut self, side: Side) -> Result<(), RescueError> {
        self.aim = side;
        Ok(())
    }

    fn measure(&mut self) -> Result<u16, RescueError> {
        let direction = Compass::from_index(self.heading().index() + self.aim.index());
        let mm = self.scan(direction).0 / 1000;
        Ok(mm.min(i64::from(RANGE_LIMIT_MM)) as u16)
    }
}

impl VictimSensor for SimRobot {
    fn check(&mut self) -> Result<bool, RescueError> {
        Ok(self.world.victims.contains(&self.cell()))
    }
}

impl AudioSignal for SimRobot {
    fn play(&mut self, melody: Melody) -> Result<(), RescueError> {
        self.played.push(melody);
        self.song_polls = SONG_POLLS;
        Ok(())
    }

    fn is_busy(&mut self) -> Result<bool, RescueError> {
        if self.song_polls == 0 {
            return Ok(false);
        }
        self.song_polls -= 1;
        Ok(true)
    }
}

impl Display for SimRobot {
    fn show(&mut self, text: &str, region: DisplayRegion) -> Result<(), RescueError> {
        self.display.insert(region, text.to_string());
        Ok(())
    }
}

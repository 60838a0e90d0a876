//! [`MissionController`] – the rescue mission state machine.
//!
//! The mission runs as one synchronous loop over three states:
//!
//! 1. **Exploring** – visit the waypoints in order, wrapping at the end of
//!    the list. Before every navigator call the victim sensor is checked in
//!    the current cell. A waypoint that cannot be reached is abandoned and
//!    the next one is planned.
//! 2. **Homing** – entered the moment the required number of distinct
//!    victims has been found. The robot plans once to the home cell and
//!    navigates there without further victim checks.
//! 3. **Done** – the robot is home; the completion song has played.
//!
//! Each [`MissionController::step`] performs at most one navigator or
//! recovery cycle, so callers can bound a run. [`MissionController::run`]
//! steps until the mission is done.
//!
//! # Example
//!
//! ```rust
//! use rescue_hal::sim::SimRobot;
//! use rescue_perception::MazeLayout;
//! use rescue_runtime::mission::{MissionConfig, MissionController, MissionPlan, RunOutcome};
//! use rescue_runtime::sim::world_from_layout;
//! use rescue_types::Coordinate;
//!
//! let config = MissionConfig {
//!     plan: MissionPlan {
//!         home: Coordinate::at(1, 3),
//!         waypoints: vec![Coordinate::at(1, 2)],
//!         victim_count: 1,
//!     },
//!     layout: MazeLayout::open(),
//!     ..MissionConfig::default()
//! };
//! let world = world_from_layout(&config.layout, config.profile.cell_length_mm)
//!     .with_victim(Coordinate::at(1, 2));
//! let robot = SimRobot::new(world, config.plan.home);
//!
//! let mut mission = MissionController::new(robot, config).expect("valid config");
//! assert_eq!(mission.run().expect("sim never faults"), RunOutcome::Completed);
//! assert_eq!(mission.cell(), Coordinate::at(1, 3));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use rescue_hal::RobotIo;
use rescue_perception::{MazeLayout, MazeMap, OrientationFrame};
use rescue_types::{Coordinate, DisplayRegion, Melody, RescueError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::navigator::{NavState, Navigator, StepOutcome};
use crate::profile::MotionProfile;
use crate::recovery::{Recovery, RecoveryHandler};
use crate::report::{AbandonReason, MissionEventKind, MissionReport};
use crate::stall_guard::StallGuard;

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Where the mission starts and ends, and what it visits in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionPlan {
    /// Start cell, and the cell the robot returns to. The robot starts here
    /// facing North.
    pub home: Coordinate,
    /// Cells visited in order while exploring, cycled until every victim is
    /// found.
    pub waypoints: Vec<Coordinate>,
    /// Distinct victims to find before homing (1 or 2).
    pub victim_count: u8,
}

impl Default for MissionPlan {
    fn default() -> Self {
        Self {
            home: Coordinate::at(1, 3),
            waypoints: vec![
                Coordinate::at(2, 3),
                Coordinate::at(3, 3),
                Coordinate::at(3, 1),
                Coordinate::at(0, 0),
            ],
            victim_count: 2,
        }
    }
}

impl MissionPlan {
    /// # Errors
    ///
    /// Returns [`RescueError::Config`] for an empty waypoint list, a waypoint
    /// repeated back to back (the list wraps, so last and first count as
    /// neighbours), or a victim count outside `1..=2`.
    pub fn validate(&self) -> Result<(), RescueError> {
        if self.waypoints.is_empty() {
            return Err(RescueError::Config("mission needs at least one waypoint".to_string()));
        }
        let len = self.waypoints.len();
        if len > 1 {
            for i in 0..len {
                let (here, next) = (self.waypoints[i], self.waypoints[(i + 1) % len]);
                if here == next {
                    return Err(RescueError::Config(format!(
                        "waypoint {here} is listed twice in a row"
                    )));
                }
            }
        }
        if !(1..=2).contains(&self.victim_count) {
            return Err(RescueError::Config(format!(
                "victim_count must be 1 or 2, got {}",
                self.victim_count
            )));
        }
        Ok(())
    }
}

/// Configuration bundle for [`MissionController`].
#[derive(Debug, Clone, Default)]
pub struct MissionConfig {
    pub plan: MissionPlan,
    pub profile: MotionProfile,
    /// Physical walls known before the mission starts.
    pub layout: MazeLayout,
}

// ────────────────────────────────────────────────────────────────────────────
// State
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionState {
    Exploring,
    Homing,
    Done,
}

impl MissionState {
    /// Four-character label for the display.
    pub fn label(self) -> &'static str {
        match self {
            MissionState::Exploring => "EXPL",
            MissionState::Homing => "HOME",
            MissionState::Done => "DONE",
        }
    }
}

/// Where the victims were found. Each slot is set at most once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictimRecord {
    first: Option<Coordinate>,
    second: Option<Coordinate>,
}

impl VictimRecord {
    /// Record a sighting at `cell`. Returns the slot (1 or 2) that was newly
    /// filled, or `None` when the sighting adds nothing.
    pub fn record(&mut self, cell: Coordinate) -> Option<u8> {
        match (self.first, self.second) {
            (None, _) => {
                self.first = Some(cell);
                Some(1)
            }
            (Some(first), None) if first != cell => {
                self.second = Some(cell);
                Some(2)
            }
            _ => None,
        }
    }

    pub fn first(&self) -> Option<Coordinate> {
        self.first
    }

    pub fn second(&self) -> Option<Coordinate> {
        self.second
    }

    pub fn count(&self) -> u8 {
        u8::from(self.first.is_some()) + u8::from(self.second.is_some())
    }
}

/// How [`MissionController::run_until`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    /// The abort flag was raised; the wheels were stopped.
    Aborted,
}

// ────────────────────────────────────────────────────────────────────────────
// MissionController
// ────────────────────────────────────────────────────────────────────────────

pub struct MissionController<R> {
    robot: R,
    plan: MissionPlan,
    navigator: Navigator,
    recovery: RecoveryHandler,
    nav: NavState,
    state: MissionState,
    /// Index of the active waypoint while exploring.
    waypoint: usize,
    /// The active target has changed since the last plan.
    needs_plan: bool,
    started: bool,
    victims: VictimRecord,
    stall: StallGuard,
    report: MissionReport,
}

impl<R: RobotIo> MissionController<R> {
    /// Build a controller for a robot standing at the plan's home cell,
    /// facing North.
    ///
    /// # Errors
    ///
    /// Returns [`RescueError::Config`] or [`RescueError::InvalidLayout`] when
    /// any part of `config` is unusable.
    pub fn new(robot: R, config: MissionConfig) -> Result<Self, RescueError> {
        config.plan.validate()?;
        config.profile.validate()?;
        config.layout.validate()?;

        Ok(Self {
            robot,
            navigator: Navigator::new(&config.profile),
            recovery: RecoveryHandler::new(config.profile.reverse_speed),
            nav: NavState::new(&config.layout, config.plan.home),
            state: MissionState::Exploring,
            waypoint: 0,
            needs_plan: true,
            started: false,
            victims: VictimRecord::default(),
            stall: StallGuard::new(config.plan.waypoints.len()),
            report: MissionReport::new(),
            plan: config.plan,
        })
    }

    pub fn state(&self) -> MissionState {
        self.state
    }

    /// The cell the robot believes it occupies.
    pub fn cell(&self) -> Coordinate {
        self.nav.cell
    }

    pub fn frame(&self) -> &OrientationFrame {
        &self.nav.frame
    }

    pub fn map(&self) -> &MazeMap {
        &self.nav.map
    }

    pub fn victims(&self) -> &VictimRecord {
        &self.victims
    }

    pub fn report(&self) -> &MissionReport {
        &self.report
    }

    pub fn robot(&self) -> &R {
        &self.robot
    }

    /// The cell currently being navigated to.
    pub fn target(&self) -> Coordinate {
        match self.state {
            MissionState::Exploring => self.plan.waypoints[self.waypoint],
            MissionState::Homing | MissionState::Done => self.plan.home,
        }
    }

    /// Advance the mission by at most one navigator or recovery cycle.
    ///
    /// # Errors
    ///
    /// Only hardware faults are returned; every navigation setback is
    /// handled inside the mission.
    pub fn step(&mut self) -> Result<MissionState, RescueError> {
        if self.state == MissionState::Done {
            return Ok(self.state);
        }
        if !self.started {
            self.start()?;
        }

        if self.state == MissionState::Exploring {
            let waypoint = self.target();
            if self.nav.cell == waypoint {
                info!(%waypoint, index = self.waypoint, "waypoint reached");
                self.report.record(MissionEventKind::WaypointReached { waypoint });
                self.stall.record_progress();
                self.advance_waypoint();
            }
            self.check_victim()?;
            // A one-entry list wraps back onto the cell just reached.
            if self.state == MissionState::Exploring && self.nav.cell == self.target() {
                return Ok(self.state);
            }
        }

        if self.state == MissionState::Homing && self.nav.cell == self.plan.home {
            self.finish()?;
            return Ok(self.state);
        }

        let target = self.target();
        if self.needs_plan {
            self.needs_plan = false;
            if !self.nav.plan(target) {
                self.abandon(AbandonReason::NoPath);
                return Ok(self.state);
            }
        }

        match self.navigator.step(&mut self.robot, &mut self.nav)? {
            StepOutcome::Arrived(cell) => {
                debug!(%cell, %target, "arrived");
                self.show_cell()?;
            }
            StepOutcome::Stuck => self.abandon(AbandonReason::Stuck),
            StepOutcome::Interrupted { trigger, move_back_mm } => {
                let cell = self.nav.cell;
                info!(%cell, ?trigger, move_back_mm, "move interrupted");
                self.report.record(MissionEventKind::Interrupted { cell, trigger, move_back_mm });
                let recovery =
                    self.recovery
                        .recover(&mut self.robot, &mut self.nav, trigger, move_back_mm, target)?;
                match recovery {
                    Recovery::Resume => {}
                    Recovery::Replanned { marked } => {
                        self.report.record(MissionEventKind::VirtualWallMarked { cell, side: marked });
                    }
                    Recovery::Abandon { marked } => {
                        self.report.record(MissionEventKind::VirtualWallMarked { cell, side: marked });
                        self.abandon(AbandonReason::NoPath);
                    }
                }
            }
        }
        Ok(self.state)
    }

    /// Step until the mission is done.
    pub fn run(&mut self) -> Result<RunOutcome, RescueError> {
        self.run_until(&AtomicBool::new(false))
    }

    /// Step until the mission is done or `abort` is raised. The flag is
    /// checked between steps; a raised flag stops the wheels.
    pub fn run_until(&mut self, abort: &AtomicBool) -> Result<RunOutcome, RescueError> {
        loop {
            let cell = self.nav.cell;
            if abort.load(Ordering::SeqCst) {
                warn!(%cell, state = ?self.state, "mission aborted by operator");
                self.report.record(MissionEventKind::Aborted { cell });
                self.robot.stop()?;
                self.robot.show("STOP", DisplayRegion::TopLeft)?;
                return Ok(RunOutcome::Aborted);
            }
            match self.step() {
                Ok(MissionState::Done) => return Ok(RunOutcome::Completed),
                Ok(_) => {}
                Err(e) => {
                    error!(%cell, error = %e, "mission halted");
                    self.report.record(MissionEventKind::Aborted { cell });
                    return Err(e);
                }
            }
        }
    }

    // ── transitions ──────────────────────────────────────────────────────────

    fn start(&mut self) -> Result<(), RescueError> {
        self.started = true;
        let home = self.plan.home;
        info!(%home, waypoints = self.plan.waypoints.len(), "mission started");
        self.report.record(MissionEventKind::Started { home });
        self.robot.play_blocking(Melody::Startup)?;
        self.show_mode()?;
        self.show_cell()?;
        self.show_victims()
    }

    fn check_victim(&mut self) -> Result<(), RescueError> {
        if !self.robot.check()? {
            return Ok(());
        }
        let cell = self.nav.cell;
        let Some(slot) = self.victims.record(cell) else {
            return Ok(());
        };
        info!(%cell, slot, "victim found");
        self.report.record(MissionEventKind::VictimFound { slot, cell });
        let melody = if slot == 1 { Melody::VictimFound } else { Melody::SecondVictim };
        self.robot.play_blocking(melody)?;
        self.show_victims()?;

        if self.victims.count() >= self.plan.victim_count {
            self.state = MissionState::Homing;
            self.needs_plan = true;
            info!(%cell, home = %self.plan.home, "all victims found, homing");
            self.report.record(MissionEventKind::HomingStarted { cell });
            self.show_mode()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RescueError> {
        let cell = self.nav.cell;
        self.state = MissionState::Done;
        self.robot.stop()?;
        info!(%cell, victims = self.victims.count(), "mission complete");
        self.report.record(MissionEventKind::Completed { cell });
        self.show_mode()?;
        self.robot.play_blocking(Melody::Complete)
    }

    fn advance_waypoint(&mut self) {
        self.waypoint = (self.waypoint + 1) % self.plan.waypoints.len();
        self.needs_plan = true;
    }

    /// Give up on the active target. While exploring the next waypoint takes
    /// over; while homing the home cell is planned again.
    fn abandon(&mut self, reason: AbandonReason) {
        let target = self.target();
        warn!(%target, ?reason, state = ?self.state, "target abandoned");
        if self.state == MissionState::Exploring {
            self.report
                .record(MissionEventKind::WaypointAbandoned { waypoint: target, reason });
            self.advance_waypoint();
        }
        self.needs_plan = true;
        self.stall.record_abandon();
    }

    // ── display ──────────────────────────────────────────────────────────────

    fn show_mode(&mut self) -> Result<(), RescueError> {
        self.robot.show(self.state.label(), DisplayRegion::TopLeft)
    }

    fn show_cell(&mut self) -> Result<(), RescueError> {
        let cell = self.nav.cell;
        self.robot
            .show(&format!("{},{}", cell.x(), cell.y()), DisplayRegion::TopRight)
    }

    fn show_victims(&mut self) -> Result<(), RescueError> {
        let text = format!("V:{}", self.victims.count());
        self.robot.show(&text, DisplayRegion::BottomLeft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world_from_layout;
    use rescue_hal::sim::{SimRobot, SimWorld};
    use rescue_perception::ARENA_LAYOUT;
    use rescue_types::{Compass, SensorTrigger};

    const TICK_BUDGET: u64 = 200_000;

    fn controller(
        layout: MazeLayout,
        plan: MissionPlan,
        world: impl FnOnce(SimWorld) -> SimWorld,
    ) -> MissionController<SimRobot> {
        let world = world(world_from_layout(&layout, 1000));
        let robot = SimRobot::new(world, plan.home).with_tick_budget(TICK_BUDGET);
        let config = MissionConfig { plan, layout, ..MissionConfig::default() };
        MissionController::new(robot, config).unwrap()
    }

    fn count(report: &MissionReport, pred: impl Fn(&MissionEventKind) -> bool) -> usize {
        report.kinds().filter(|k| pred(k)).count()
    }

    #[test]
    fn victim_record_ignores_repeat_sightings() {
        let mut record = VictimRecord::default();
        assert_eq!(record.record(Coordinate::at(3, 3)), Some(1));
        assert_eq!(record.record(Coordinate::at(3, 3)), None);
        assert_eq!(record.second(), None);
        assert_eq!(record.record(Coordinate::at(0, 0)), Some(2));
        assert_eq!(record.record(Coordinate::at(1, 1)), None);
        assert_eq!(record.first(), Some(Coordinate::at(3, 3)));
        assert_eq!(record.second(), Some(Coordinate::at(0, 0)));
        assert_eq!(record.count(), 2);
    }

    #[test]
    fn plan_validation() {
        MissionPlan::default().validate().unwrap();
        let empty = MissionPlan { waypoints: Vec::new(), ..MissionPlan::default() };
        assert!(empty.validate().is_err());
        let greedy = MissionPlan { victim_count: 3, ..MissionPlan::default() };
        assert!(greedy.validate().is_err());
        let doubled = MissionPlan {
            waypoints: vec![Coordinate::at(2, 3), Coordinate::at(2, 3), Coordinate::at(0, 0)],
            ..MissionPlan::default()
        };
        assert!(doubled.validate().is_err());
        let wraps = MissionPlan {
            waypoints: vec![Coordinate::at(2, 3), Coordinate::at(0, 0), Coordinate::at(2, 3)],
            ..MissionPlan::default()
        };
        assert!(wraps.validate().is_err());
        let single = MissionPlan { waypoints: vec![Coordinate::at(1, 3)], ..MissionPlan::default() };
        single.validate().unwrap();
    }

    #[test]
    fn waypoint_on_current_cell_is_reached_without_moving() {
        let plan = MissionPlan {
            waypoints: vec![Coordinate::at(1, 3)],
            victim_count: 1,
            ..MissionPlan::default()
        };
        let mut mission = controller(MazeLayout::open(), plan, |w| w);
        for _ in 0..3 {
            assert_eq!(mission.step().unwrap(), MissionState::Exploring);
        }
        assert_eq!(mission.report().reached(), vec![Coordinate::at(1, 3); 3]);
        assert_eq!(
            count(mission.report(), |k| matches!(k, MissionEventKind::WaypointAbandoned { .. })),
            0
        );
        assert_eq!(mission.robot().cell(), Coordinate::at(1, 3));
        assert_eq!(mission.robot().ticks(), 0);
    }

    #[test]
    fn victim_at_home_waypoint_finishes_in_place() {
        let plan = MissionPlan {
            waypoints: vec![Coordinate::at(1, 3)],
            victim_count: 1,
            ..MissionPlan::default()
        };
        let mut mission = controller(MazeLayout::open(), plan, |w| w.with_victim(Coordinate::at(1, 3)));
        assert_eq!(mission.run().unwrap(), RunOutcome::Completed);
        assert_eq!(mission.report().reached(), vec![Coordinate::at(1, 3)]);
        assert_eq!(mission.victims().first(), Some(Coordinate::at(1, 3)));
    }

    #[test]
    fn open_maze_mission_visits_waypoints_and_returns_home() {
        let mut mission = controller(MazeLayout::open(), MissionPlan::default(), |w| {
            w.with_victim(Coordinate::at(3, 3)).with_victim(Coordinate::at(0, 0))
        });

        assert_eq!(mission.run().unwrap(), RunOutcome::Completed);
        assert_eq!(mission.state(), MissionState::Done);
        assert_eq!(mission.cell(), Coordinate::at(1, 3));
        assert_eq!(mission.robot().cell(), Coordinate::at(1, 3));

        let report = mission.report();
        assert_eq!(
            report.reached(),
            vec![
                Coordinate::at(2, 3),
                Coordinate::at(3, 3),
                Coordinate::at(3, 1),
                Coordinate::at(0, 0),
            ]
        );
        assert_eq!(count(report, |k| matches!(k, MissionEventKind::HomingStarted { .. })), 1);
        assert_eq!(mission.victims().first(), Some(Coordinate::at(3, 3)));
        assert_eq!(mission.victims().second(), Some(Coordinate::at(0, 0)));
        assert_eq!(
            mission.robot().played(),
            &[Melody::Startup, Melody::VictimFound, Melody::SecondVictim, Melody::Complete]
        );
        assert_eq!(mission.robot().display_text(DisplayRegion::TopLeft), Some("DONE"));
        assert_eq!(mission.robot().display_text(DisplayRegion::BottomLeft), Some("V:2"));
        assert!(matches!(
            report.events.last().map(|e| &e.kind),
            Some(MissionEventKind::Completed { .. })
        ));
    }

    #[test]
    fn walled_arena_mission_completes() {
        let mut mission = controller(ARENA_LAYOUT, MissionPlan::default(), |w| {
            w.with_victim(Coordinate::at(3, 3)).with_victim(Coordinate::at(0, 0))
        });
        assert_eq!(mission.run().unwrap(), RunOutcome::Completed);
        assert_eq!(mission.robot().cell(), Coordinate::at(1, 3));
        assert_eq!(mission.report().reached().len(), 4);
        assert_eq!(mission.victims().count(), 2);
    }

    #[test]
    fn hidden_virtual_wall_reroutes_around_it() {
        let plan = MissionPlan {
            waypoints: vec![Coordinate::at(2, 3), Coordinate::at(0, 0)],
            ..MissionPlan::default()
        };
        let mut mission = controller(MazeLayout::open(), plan, |w| {
            w.with_beam(Coordinate::at(1, 3), Compass::East)
        });

        let mut visited = vec![mission.cell()];
        for _ in 0..10 {
            if mission.cell() == Coordinate::at(2, 3) {
                break;
            }
            mission.step().unwrap();
            if visited.last() != Some(&mission.cell()) {
                visited.push(mission.cell());
            }
        }

        assert_eq!(
            visited,
            vec![
                Coordinate::at(1, 3),
                Coordinate::at(1, 2),
                Coordinate::at(2, 2),
                Coordinate::at(2, 3),
            ]
        );
        mission.step().unwrap();
        assert_eq!(mission.report().reached(), vec![Coordinate::at(2, 3)]);
        let map = mission.map();
        assert!(map.cell(Coordinate::at(1, 3)).virtual_walls.contains(Compass::East));
        assert!(map.cell(Coordinate::at(2, 3)).virtual_walls.contains(Compass::West));
        assert!(mission.report().kinds().any(|k| matches!(
            k,
            MissionEventKind::Interrupted { trigger: SensorTrigger::VirtualWall, move_back_mm: 200, .. }
        )));
        assert!(mission.report().kinds().any(|k| matches!(
            k,
            MissionEventKind::VirtualWallMarked { side: Compass::East, .. }
        )));
    }

    #[test]
    fn repeat_sighting_does_not_fill_second_slot() {
        let plan = MissionPlan {
            waypoints: vec![Coordinate::at(2, 3), Coordinate::at(1, 3)],
            ..MissionPlan::default()
        };
        let mut mission = controller(MazeLayout::open(), plan, |w| w.with_victim(Coordinate::at(2, 3)));
        for _ in 0..12 {
            mission.step().unwrap();
        }
        assert!(mission.report().reached().iter().filter(|c| **c == Coordinate::at(2, 3)).count() >= 2);
        assert_eq!(mission.victims().count(), 1);
        assert_eq!(mission.state(), MissionState::Exploring);
        let songs = mission.robot().played();
        assert_eq!(songs.iter().filter(|m| **m == Melody::VictimFound).count(), 1);
        assert!(!songs.contains(&Melody::SecondVictim));
    }

    #[test]
    fn unreachable_waypoint_is_abandoned_and_next_planned() {
        let layout = MazeLayout::open()
            .with_wall(Coordinate::at(4, 0), Compass::West)
            .with_wall(Coordinate::at(4, 0), Compass::South);
        let plan = MissionPlan {
            waypoints: vec![Coordinate::at(4, 0), Coordinate::at(2, 3)],
            ..MissionPlan::default()
        };
        let mut mission = controller(layout, plan, |w| w);

        assert_eq!(mission.step().unwrap(), MissionState::Exploring);
        assert_eq!(mission.target(), Coordinate::at(2, 3));
        assert!(mission.report().kinds().any(|k| matches!(
            k,
            MissionEventKind::WaypointAbandoned { reason: AbandonReason::NoPath, .. }
        )));
        // Arrive, then record the waypoint.
        for _ in 0..2 {
            mission.step().unwrap();
        }
        assert_eq!(mission.report().reached(), vec![Coordinate::at(2, 3)]);
    }

    #[test]
    fn raised_abort_flag_stops_before_moving() {
        let mut mission = controller(MazeLayout::open(), MissionPlan::default(), |w| w);
        let abort = AtomicBool::new(true);
        assert_eq!(mission.run_until(&abort).unwrap(), RunOutcome::Aborted);
        assert_eq!(mission.robot().wheels(), (0, 0));
        assert_eq!(mission.robot().display_text(DisplayRegion::TopLeft), Some("STOP"));
        assert!(matches!(
            mission.report().events.last().map(|e| &e.kind),
            Some(MissionEventKind::Aborted { .. })
        ));
    }

    #[test]
    fn hardware_fault_halts_run() {
        let config = MissionConfig { layout: MazeLayout::open(), ..MissionConfig::default() };
        let robot = SimRobot::new(SimWorld::default(), config.plan.home).with_tick_budget(50);
        let mut mission = MissionController::new(robot, config).unwrap();

        let err = mission.run().unwrap_err();
        assert!(matches!(err, RescueError::HardwareFault { .. }));
        assert!(matches!(
            mission.report().events.last().map(|e| &e.kind),
            Some(MissionEventKind::Aborted { .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = MissionConfig {
            profile: MotionProfile { cruise_speed: 900, ..MotionProfile::default() },
            ..MissionConfig::default()
        };
        let robot = SimRobot::new(SimWorld::default(), Coordinate::at(1, 3));
        assert!(matches!(
            MissionController::new(robot, config),
            Err(RescueError::Config(_))
        ));
    }
}

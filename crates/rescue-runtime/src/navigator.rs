//! [`Navigator`] – one-cell steps down the distance field.
//!
//! Each step picks the neighbouring cell with the strictly smallest field
//! value, trying robot-relative sides in the fixed order front, left, right,
//! back. Ties keep the earlier side. When the chosen side is not the front
//! the robot turns first, then the [`MovementExecutor`] drives the cell.
//!
//! Turns always go through [`turn_and_update`], which updates the
//! [`OrientationFrame`] as soon as the physical turn returns, interrupted or
//! not.

use rescue_hal::{MotionService, RangeSensor};
use rescue_perception::{DistanceField, FloodPlanner, MazeLayout, MazeMap, OrientationFrame};
use rescue_types::{Coordinate, RescueError, SensorTrigger, Side, TurnDirection};
use tracing::debug;

use crate::movement::MovementExecutor;
use crate::profile::MotionProfile;

/// Order in which candidate sides are evaluated.
pub const SIDE_PRIORITY: [Side; 4] = [Side::Front, Side::Left, Side::Right, Side::Back];

/// Turn the robot to face `side` and record the turn in `frame`.
///
/// `Front` is a no-op. Left and right are quarter turns, back is a half turn
/// clockwise. The frame is updated whenever the drive base accepted the turn,
/// including when a sensor interrupt cut it short.
pub fn turn_and_update<R>(
    robot: &mut R,
    frame: &mut OrientationFrame,
    side: Side,
    speed: i16,
) -> Result<Option<SensorTrigger>, RescueError>
where
    R: MotionService + ?Sized,
{
    let (quarters, direction) = match side {
        Side::Front => return Ok(None),
        Side::Right => (1, TurnDirection::Cw),
        Side::Left => (1, TurnDirection::Ccw),
        Side::Back => (2, TurnDirection::Cw),
    };
    let trigger = robot.rotate(speed, u16::from(quarters) * 90, direction)?;
    frame.apply_turns(quarters, direction);
    debug!(?side, rotation = frame.rotation(), ?trigger, "turned");
    Ok(trigger)
}

// ────────────────────────────────────────────────────────────────────────────
// Navigation state
// ────────────────────────────────────────────────────────────────────────────

/// Everything the robot knows about where it is.
#[derive(Debug, Clone)]
pub struct NavState {
    pub map: MazeMap,
    pub frame: OrientationFrame,
    pub planner: FloodPlanner,
    /// The cell the robot believes it occupies.
    pub cell: Coordinate,
}

impl NavState {
    /// Fresh state at `start`, facing North, with no plan yet.
    pub fn new(layout: &MazeLayout, start: Coordinate) -> Self {
        Self {
            map: MazeMap::new(layout),
            frame: OrientationFrame::new(),
            planner: FloodPlanner::new(),
            cell: start,
        }
    }

    /// Re-plan towards `target` from the current cell. Returns whether the
    /// current cell can reach it.
    pub fn plan(&mut self, target: Coordinate) -> bool {
        self.planner.plan(&self.map, target, self.cell);
        self.planner.is_reachable(self.cell)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Navigator
// ────────────────────────────────────────────────────────────────────────────

/// Result of one [`Navigator::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The robot entered the given cell.
    Arrived(Coordinate),
    /// No neighbour is closer to the target than the current cell.
    Stuck,
    /// A sensor fired during the turn or the move.
    Interrupted {
        trigger: SensorTrigger,
        /// Net forward displacement covered before the interrupt, in mm.
        move_back_mm: i32,
    },
}

#[derive(Debug, Clone)]
pub struct Navigator {
    executor: MovementExecutor,
    turn_speed: i16,
}

impl Navigator {
    pub fn new(profile: &MotionProfile) -> Self {
        Self {
            executor: MovementExecutor::new(profile.clone()),
            turn_speed: profile.turn_speed,
        }
    }

    /// The side to leave `cell` through and the cell behind it, or `None`
    /// when no open neighbour has a strictly smaller value in `field`.
    pub fn choose(
        map: &MazeMap,
        frame: &OrientationFrame,
        field: &DistanceField,
        cell: Coordinate,
    ) -> Option<(Side, Coordinate)> {
        let mut best = field.get(cell);
        let mut choice = None;
        for side in SIDE_PRIORITY {
            if map.wall_present(cell, side, frame) {
                continue;
            }
            let Some(next) = cell.step(frame.resolve(side)) else {
                continue;
            };
            let Some(value) = field.get(next) else {
                continue;
            };
            if best.is_none_or(|b| value < b) {
                best = Some(value);
                choice = Some((side, next));
            }
        }
        choice
    }

    /// Advance one cell along the last plan.
    ///
    /// On [`StepOutcome::Arrived`] `state.cell` has moved; on every other
    /// outcome it is unchanged.
    pub fn step<R>(&self, robot: &mut R, state: &mut NavState) -> Result<StepOutcome, RescueError>
    where
        R: MotionService + RangeSensor + ?Sized,
    {
        let choice = state
            .planner
            .field()
            .and_then(|field| Self::choose(&state.map, &state.frame, field, state.cell));
        let Some((side, next)) = choice else {
            debug!(cell = %state.cell, "no downhill neighbour");
            return Ok(StepOutcome::Stuck);
        };

        if let Some(trigger) = turn_and_update(robot, &mut state.frame, side, self.turn_speed)? {
            return Ok(StepOutcome::Interrupted { trigger, move_back_mm: 0 });
        }

        let plan = MovementExecutor::classify(&state.map, &state.frame, state.cell);
        let movement = self.executor.execute(robot, plan)?;
        match movement.trigger {
            Some(trigger) => Ok(StepOutcome::Interrupted {
                trigger,
                move_back_mm: movement.displacement_mm,
            }),
            None => {
                debug!(from = %state.cell, to = %next, ?plan, "cell entered");
                state.cell = next;
                Ok(StepOutcome::Arrived(next))
            }
        }
    }
}

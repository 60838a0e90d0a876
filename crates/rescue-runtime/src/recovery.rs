//! [`RecoveryHandler`] – reacting to bump and virtual-wall interrupts.
//!
//! Both interrupt kinds first back the robot out by the displacement the
//! interrupted move covered, so it sits where the move started. A bump needs
//! nothing more. A virtual wall is recorded on the front edge of the current
//! cell and the active target is re-planned; if the robot's cell can no
//! longer reach it, the target is abandoned.

use rescue_hal::MotionService;
use rescue_types::{Compass, Coordinate, RescueError, SensorTrigger, Side};
use tracing::{debug, info};

use crate::navigator::NavState;

/// What the mission should do after a recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Navigate on with the existing plan.
    Resume,
    /// A virtual wall was marked and the new plan still reaches the target.
    Replanned { marked: Compass },
    /// A virtual wall was marked and the target is now unreachable.
    Abandon { marked: Compass },
}

#[derive(Debug, Clone)]
pub struct RecoveryHandler {
    reverse_speed: i16,
}

impl RecoveryHandler {
    pub fn new(reverse_speed: i16) -> Self {
        Self { reverse_speed }
    }

    /// Undo `move_back_mm` of net forward displacement with sensors off.
    pub fn back_out<R>(&self, robot: &mut R, move_back_mm: i32) -> Result<(), RescueError>
    where
        R: MotionService + ?Sized,
    {
        if move_back_mm == 0 {
            return Ok(());
        }
        let speed = self.reverse_speed.unsigned_abs() as i16;
        let speed = if move_back_mm > 0 { -speed } else { speed };
        robot.straight(speed, move_back_mm.unsigned_abs(), false)?;
        Ok(())
    }

    /// Recover from `trigger` while heading for `target`.
    pub fn recover<R>(
        &self,
        robot: &mut R,
        state: &mut NavState,
        trigger: SensorTrigger,
        move_back_mm: i32,
        target: Coordinate,
    ) -> Result<Recovery, RescueError>
    where
        R: MotionService + ?Sized,
    {
        self.back_out(robot, move_back_mm)?;

        match trigger {
            SensorTrigger::Bump => {
                debug!(cell = %state.cell, move_back_mm, "bump recovered");
                Ok(Recovery::Resume)
            }
            SensorTrigger::VirtualWall => {
                let marked = state.map.mark_virtual_wall(state.cell, Side::Front, &state.frame);
                let reachable = state.plan(target);
                info!(cell = %state.cell, side = ?marked, %target, reachable, "virtual wall recorded, re-planned");
                if reachable {
                    Ok(Recovery::Replanned { marked })
                } else {
                    Ok(Recovery::Abandon { marked })
                }
            }
        }
    }
}

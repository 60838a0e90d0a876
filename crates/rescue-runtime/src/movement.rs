//! [`MovementExecutor`] – drives the robot forward exactly one cell.
//!
//! The drive strategy depends on which walls the range sensor can use,
//! judged from the physical walls around the current cell and the cell
//! ahead:
//!
//! | Strategy | Chosen when |
//! |---|---|
//! | full side-follow | the same side has a wall in both cells |
//! | half side-follow | that side has a wall only in the cell ahead |
//! | front-wall approach | no usable side wall, but the cell ahead ends in a wall |
//! | blind | none of the above |
//!
//! Independently, a wall behind the robot triggers a back-wall approach
//! first, which squares the robot against that wall before the forward legs.
//!
//! Every leg polls bump and virtual-wall sensors on each control tick. The
//! first interrupt ends the whole movement; the executor never resumes on
//! its own and reports the net forward displacement so recovery can back out.

use rescue_hal::steering::FollowSide;
use rescue_hal::{MotionService, RangeSensor};
use rescue_perception::{MazeMap, OrientationFrame};
use rescue_types::{Coordinate, RescueError, SensorTrigger, Side};
use tracing::debug;

use crate::profile::MotionProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Follow `side` for the whole cell. With `front_stop` the last stretch
    /// is a creep up to the wall ahead.
    FullSideFollow { side: FollowSide, front_stop: bool },
    /// Drive half a cell open-loop, then follow `side` for the rest.
    HalfSideFollow { side: FollowSide, front_stop: bool },
    /// Creep until the range sensor reads the front stand-off.
    FrontWallApproach,
    /// Drive one cell length on odometry alone.
    Blind,
}

/// How the next one-cell move will be driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePlan {
    pub back_approach: bool,
    pub strategy: Strategy,
}

/// Outcome of a movement or of one of its legs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Movement {
    /// Net forward displacement, in mm. Negative after backing up.
    pub displacement_mm: i32,
    pub trigger: Option<SensorTrigger>,
}

impl Movement {
    /// Fold `leg` into this movement. Returns `true` when the leg was
    /// interrupted and the movement must end.
    fn absorb(&mut self, leg: Movement) -> bool {
        self.displacement_mm += leg.displacement_mm;
        self.trigger = leg.trigger;
        leg.trigger.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct MovementExecutor {
    profile: MotionProfile,
}

impl MovementExecutor {
    pub fn new(profile: MotionProfile) -> Self {
        Self { profile }
    }

    /// Pick the strategy for moving from `current` into the cell in front.
    pub fn classify(map: &MazeMap, frame: &OrientationFrame, current: Coordinate) -> MovePlan {
        let ahead = current.step(frame.heading());
        let here_wall = |side| map.physical_wall_present(current, side, frame);
        let ahead_wall = |side| map.physical_wall_present(ahead, side, frame);
        let front_stop = ahead_wall(Side::Front);

        let sides = [FollowSide::Left, FollowSide::Right];
        let full = sides
            .into_iter()
            .find(|s| here_wall(s.side()) && ahead_wall(s.side()));
        let half = sides
            .into_iter()
            .find(|s| !here_wall(s.side()) && ahead_wall(s.side()));

        let strategy = match (full, half) {
            (Some(side), _) => Strategy::FullSideFollow { side, front_stop },
            (None, Some(side)) => Strategy::HalfSideFollow { side, front_stop },
            (None, None) if front_stop => Strategy::FrontWallApproach,
            (None, None) => Strategy::Blind,
        };
        MovePlan {
            back_approach: here_wall(Side::Back),
            strategy,
        }
    }

    /// Drive one cell according to `plan`.
    pub fn execute<R>(&self, robot: &mut R, plan: MovePlan) -> Result<Movement, RescueError>
    where
        R: MotionService + RangeSensor + ?Sized,
    {
        let p = &self.profile;
        let cell = u32::from(p.cell_length_mm);
        let margin = u32::from(p.approach_margin_mm);
        let mut movement = Movement::default();

        if plan.back_approach
            && movement.absorb(self.approach(robot, Side::Back, p.rear_standoff_mm)?)
        {
            return Ok(movement);
        }

        match plan.strategy {
            Strategy::FullSideFollow { side, front_stop } => {
                let leg = if front_stop { cell - margin } else { cell };
                if movement.absorb(self.follow(robot, side, leg)?) {
                    return Ok(movement);
                }
                if front_stop {
                    movement.absorb(self.approach(robot, Side::Front, p.front_standoff_mm)?);
                }
            }
            Strategy::HalfSideFollow { side, front_stop } => {
                let first = cell / 2;
                if movement.absorb(self.straight(robot, first)?) {
                    return Ok(movement);
                }
                let rest = cell - first;
                let leg = if front_stop { rest - margin } else { rest };
                if movement.absorb(self.follow(robot, side, leg)?) {
                    return Ok(movement);
                }
                if front_stop {
                    movement.absorb(self.approach(robot, Side::Front, p.front_standoff_mm)?);
                }
            }
            Strategy::FrontWallApproach => {
                movement.absorb(self.approach(robot, Side::Front, p.front_standoff_mm)?);
            }
            Strategy::Blind => {
                movement.absorb(self.straight(robot, cell)?);
            }
        }

        debug!(?plan, displacement_mm = movement.displacement_mm, trigger = ?movement.trigger, "move finished");
        Ok(movement)
    }

    fn straight<R>(&self, robot: &mut R, distance_mm: u32) -> Result<Movement, RescueError>
    where
        R: MotionService + ?Sized,
    {
        let travel = robot.straight(self.profile.cruise_speed, distance_mm, true)?;
        Ok(Movement {
            displacement_mm: i32::try_from(travel.distance_mm).unwrap_or(i32::MAX),
            trigger: travel.trigger,
        })
    }

    /// Wall-follow along `side` for `distance_mm`.
    fn follow<R>(&self, robot: &mut R, side: FollowSide, distance_mm: u32) -> Result<Movement, RescueError>
    where
        R: MotionService + RangeSensor + ?Sized,
    {
        let follower = self.profile.wall_follower(side);
        let target = i32::try_from(distance_mm).unwrap_or(i32::MAX);
        let mut leg = Movement::default();

        robot.aim(side.side())?;
        robot.distance_since_last_call()?;
        while leg.displacement_mm < target {
            let (left, right) = follower.update(robot.measure()?);
            robot.direct_drive(left, right)?;
            leg.displacement_mm += i32::from(robot.distance_since_last_call()?);
            leg.trigger = robot.poll_sensors()?.trigger();
            if leg.trigger.is_some() {
                break;
            }
        }
        robot.stop()?;
        Ok(leg)
    }

    /// Creep forwards or backwards until the range reading towards `side`
    /// (front or back) reaches `standoff_mm`.
    fn approach<R>(&self, robot: &mut R, side: Side, standoff_mm: u16) -> Result<Movement, RescueError>
    where
        R: MotionService + RangeSensor + ?Sized,
    {
        let mut leg = Movement::default();
        robot.aim(side)?;
        let reading = robot.measure()?;
        if reading.abs_diff(standoff_mm) <= self.profile.dead_band_mm {
            return Ok(leg);
        }

        // Closing on the wall shrinks the reading.
        let closing = reading > standoff_mm;
        let forward = closing == (side == Side::Front);
        let speed = if forward { self.profile.creep_speed } else { -self.profile.creep_speed };

        robot.distance_since_last_call()?;
        robot.direct_drive(speed, speed)?;
        loop {
            leg.displacement_mm += i32::from(robot.distance_since_last_call()?);
            leg.trigger = robot.poll_sensors()?.trigger();
            if leg.trigger.is_some() {
                break;
            }
            let reading = robot.measure()?;
            if (closing && reading <= standoff_mm) || (!closing && reading >= standoff_mm) {
                break;
            }
        }
        robot.stop()?;
        Ok(leg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rescue_hal::sim::{SimRobot, SimWorld};
    use rescue_perception::{ARENA_LAYOUT, MazeLayout};
    use rescue_types::{Compass, TurnDirection};

    fn robot_in(layout: &MazeLayout, start: Coordinate) -> SimRobot {
        SimRobot::new(crate::sim::world_from_layout(layout, 1000), start)
    }

    fn facing(compass: Compass) -> OrientationFrame {
        let mut frame = OrientationFrame::new();
        frame.apply_turns(compass.index(), TurnDirection::Cw);
        frame
    }

    #[test]
    fn open_maze_is_blind() {
        let map = MazeMap::new(&MazeLayout::open());
        let plan = MovementExecutor::classify(&map, &facing(Compass::North), Coordinate::at(2, 2));
        assert_eq!(plan, MovePlan { back_approach: false, strategy: Strategy::Blind });
    }

    #[test]
    fn corridor_wall_on_both_cells_is_full_follow() {
        let map = MazeMap::new(&ARENA_LAYOUT);
        // Along the bottom row facing East: the South wall is on the right.
        let plan = MovementExecutor::classify(&map, &facing(Compass::East), Coordinate::at(1, 3));
        assert_eq!(
            plan.strategy,
            Strategy::FullSideFollow { side: FollowSide::Right, front_stop: false }
        );
        assert!(!plan.back_approach);
    }

    #[test]
    fn wall_only_ahead_is_half_follow() {
        let layout = MazeLayout::open().with_wall(Coordinate::at(2, 1), Compass::West);
        let map = MazeMap::new(&layout);
        let plan = MovementExecutor::classify(&map, &facing(Compass::North), Coordinate::at(2, 2));
        assert_eq!(
            plan.strategy,
            Strategy::HalfSideFollow { side: FollowSide::Left, front_stop: false }
        );
    }

    #[test]
    fn wall_ahead_without_sides_is_front_approach() {
        let map = MazeMap::new(&ARENA_LAYOUT);
        let plan = MovementExecutor::classify(&map, &facing(Compass::North), Coordinate::at(2, 1));
        assert_eq!(plan.strategy, Strategy::FrontWallApproach);
    }

    #[test]
    fn wall_behind_adds_back_approach() {
        let map = MazeMap::new(&ARENA_LAYOUT);
        let plan = MovementExecutor::classify(&map, &facing(Compass::North), Coordinate::at(3, 3));
        assert!(plan.back_approach);
        assert_eq!(plan.strategy, Strategy::Blind);
    }

    #[test]
    fn virtual_walls_do_not_steer_strategy() {
        let mut map = MazeMap::new(&MazeLayout::open());
        let frame = facing(Compass::North);
        map.mark_virtual_wall(Coordinate::at(2, 1), Side::Left, &frame);
        let plan = MovementExecutor::classify(&map, &frame, Coordinate::at(2, 2));
        assert_eq!(plan.strategy, Strategy::Blind);
    }

    #[test]
    fn full_follow_with_front_stop_ends_at_cell_centre() {
        let layout = ARENA_LAYOUT;
        let map = MazeMap::new(&layout);
        let mut robot = robot_in(&layout, Coordinate::at(1, 0));
        robot.rotate(100, 90, TurnDirection::Ccw).unwrap();
        let frame = facing(Compass::West);

        let plan = MovementExecutor::classify(&map, &frame, Coordinate::at(1, 0));
        assert_eq!(
            plan.strategy,
            Strategy::FullSideFollow { side: FollowSide::Right, front_stop: true }
        );
        let movement = MovementExecutor::new(MotionProfile::default())
            .execute(&mut robot, plan)
            .unwrap();
        assert_eq!(movement, Movement { displacement_mm: 1000, trigger: None });
        assert_eq!(robot.position_mm(), (500, 500));
    }

    #[test]
    fn front_approach_creeps_to_standoff() {
        let map = MazeMap::new(&ARENA_LAYOUT);
        let mut robot = robot_in(&ARENA_LAYOUT, Coordinate::at(2, 1));
        let plan = MovementExecutor::classify(&map, &facing(Compass::North), Coordinate::at(2, 1));
        let movement = MovementExecutor::new(MotionProfile::default())
            .execute(&mut robot, plan)
            .unwrap();
        assert_eq!(movement.displacement_mm, 1000);
        assert_eq!(robot.cell(), Coordinate::at(2, 0));
        assert_eq!(robot.position_mm(), (2500, 500));
    }

    #[test]
    fn half_follow_covers_one_cell() {
        let layout = MazeLayout::open().with_wall(Coordinate::at(2, 1), Compass::West);
        let map = MazeMap::new(&layout);
        let mut robot = robot_in(&layout, Coordinate::at(2, 2));
        let plan = MovementExecutor::classify(&map, &facing(Compass::North), Coordinate::at(2, 2));
        let movement = MovementExecutor::new(MotionProfile::default())
            .execute(&mut robot, plan)
            .unwrap();
        // The follower steers on the first tick of the second leg, where the
        // wall is not yet beside the robot, so the total overshoots slightly.
        assert_eq!(movement.trigger, None);
        assert!((1000..1010).contains(&movement.displacement_mm));
        assert_eq!(robot.cell(), Coordinate::at(2, 1));
    }

    #[test]
    fn back_approach_squares_up_before_moving() {
        let map = MazeMap::new(&ARENA_LAYOUT);
        let mut robot = robot_in(&ARENA_LAYOUT, Coordinate::at(3, 3));
        // Start 100 mm too far from the South wall.
        robot.displace(Compass::North, 100);
        let plan = MovementExecutor::classify(&map, &facing(Compass::North), Coordinate::at(3, 3));
        let movement = MovementExecutor::new(MotionProfile::default())
            .execute(&mut robot, plan)
            .unwrap();
        // 100 mm back to the stand-off, then a full cell forward.
        assert_eq!(movement.displacement_mm, 900);
        assert_eq!(robot.position_mm(), (3500, 2500));
    }

    #[test]
    fn bump_ends_movement_with_displacement() {
        // A wall the map does not know about, on the edge ahead.
        let world = SimWorld::default().with_wall(Coordinate::at(2, 1), Compass::South);
        let mut robot = SimRobot::new(world, Coordinate::at(2, 2));
        let map = MazeMap::new(&MazeLayout::open());
        let plan = MovementExecutor::classify(&map, &facing(Compass::North), Coordinate::at(2, 2));
        let movement = MovementExecutor::new(MotionProfile::default())
            .execute(&mut robot, plan)
            .unwrap();
        assert_eq!(movement.trigger, Some(SensorTrigger::Bump));
        assert_eq!(movement.displacement_mm, 335);
    }
}

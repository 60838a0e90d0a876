//! Motion tuning shared by the navigator, the movement executor and recovery.

use rescue_hal::MAX_WHEEL_SPEED;
use rescue_hal::steering::{FollowSide, WallFollower};
use rescue_types::RescueError;
use serde::{Deserialize, Serialize};

/// Speeds in mm/s, distances in mm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionProfile {
    /// Edge length of one arena cell.
    pub cell_length_mm: u16,
    /// Straight-line speed for open-loop and wall-following legs.
    pub cruise_speed: i16,
    /// Reduced speed for wall approaches.
    pub creep_speed: i16,
    /// Speed used when backing out after an interrupt.
    pub reverse_speed: i16,
    /// Wheel speed for in-place turns.
    pub turn_speed: i16,
    /// Side-wall distance the wall follower holds.
    pub wall_standoff_mm: u16,
    pub dead_band_mm: u16,
    pub steering_gain: f32,
    pub max_correction: i16,
    /// Range reading at which a front-wall approach stops.
    pub front_standoff_mm: u16,
    /// Range reading at which a back-wall approach stops.
    pub rear_standoff_mm: u16,
    /// How far short of a front wall a followed leg hands over to the creep.
    pub approach_margin_mm: u16,
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self {
            cell_length_mm: 1000,
            cruise_speed: 200,
            creep_speed: 100,
            reverse_speed: 100,
            turn_speed: 100,
            wall_standoff_mm: 500,
            dead_band_mm: 20,
            steering_gain: 0.5,
            max_correction: 80,
            front_standoff_mm: 500,
            rear_standoff_mm: 500,
            approach_margin_mm: 150,
        }
    }
}

impl MotionProfile {
    /// Check every value is usable by the drive base.
    ///
    /// # Errors
    ///
    /// Returns [`RescueError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), RescueError> {
        let speeds = [
            ("cruise_speed", self.cruise_speed),
            ("creep_speed", self.creep_speed),
            ("reverse_speed", self.reverse_speed),
            ("turn_speed", self.turn_speed),
        ];
        for (name, speed) in speeds {
            if !(1..=MAX_WHEEL_SPEED).contains(&speed) {
                return Err(RescueError::Config(format!(
                    "{name} must be within 1..={MAX_WHEEL_SPEED} mm/s, got {speed}"
                )));
            }
        }
        if self.cell_length_mm == 0 {
            return Err(RescueError::Config("cell_length_mm must be positive".to_string()));
        }
        if self.approach_margin_mm >= self.cell_length_mm / 2 {
            return Err(RescueError::Config(format!(
                "approach_margin_mm ({}) must be less than half a cell",
                self.approach_margin_mm
            )));
        }
        if !self.steering_gain.is_finite() || self.steering_gain < 0.0 {
            return Err(RescueError::Config(format!(
                "steering_gain must be a non-negative number, got {}",
                self.steering_gain
            )));
        }
        if !(0..self.cruise_speed).contains(&self.max_correction) {
            return Err(RescueError::Config(format!(
                "max_correction must be within 0..{} mm/s, got {}",
                self.cruise_speed, self.max_correction
            )));
        }
        Ok(())
    }

    /// A wall follower for `side` tuned from this profile.
    pub fn wall_follower(&self, side: FollowSide) -> WallFollower {
        WallFollower::new(side, self.cruise_speed, self.wall_standoff_mm)
            .with_dead_band(self.dead_band_mm)
            .with_gain(self.steering_gain, self.max_correction)
    }
}

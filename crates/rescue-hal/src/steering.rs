//! Proportional wall-following controller.
//!
//! While driving along a corridor the robot keeps a fixed stand-off from one
//! side wall. [`WallFollower::update`] takes the latest range reading from
//! that side and returns the wheel speeds for the next control step: inside
//! the dead-band both wheels run at cruise speed, outside it one wheel is
//! slowed in proportion to the error, up to a fixed cap.
//!
//! # Example
//!
//! ```rust
//! use rescue_hal::steering::{FollowSide, WallFollower};
//!
//! let follower = WallFollower::new(FollowSide::Left, 200, 500);
//!
//! // On the stand-off: drive straight.
//! assert_eq!(follower.update(500), (200, 200));
//!
//! // Too close to the left wall: slow the right wheel to turn away.
//! let (left, right) = follower.update(400);
//! assert_eq!(left, 200);
//! assert!(right < 200);
//! ```

use rescue_types::Side;

/// The robot side the followed wall is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowSide {
    Left,
    Right,
}

impl FollowSide {
    pub fn side(self) -> Side {
        match self {
            FollowSide::Left => Side::Left,
            FollowSide::Right => Side::Right,
        }
    }
}

/// Wheel-speed controller that holds a stand-off from one side wall.
///
/// Defaults: 20 mm dead-band, gain 0.5, correction capped at 80 mm/s. Tune
/// with [`WallFollower::with_dead_band`] and [`WallFollower::with_gain`].
#[derive(Debug, Clone)]
pub struct WallFollower {
    side: FollowSide,
    cruise: i16,
    standoff_mm: u16,
    dead_band_mm: u16,
    gain: f32,
    max_correction: i16,
}

impl WallFollower {
    pub fn new(side: FollowSide, cruise: i16, standoff_mm: u16) -> Self {
        Self {
            side,
            cruise,
            standoff_mm,
            dead_band_mm: 20,
            gain: 0.5,
            max_correction: 80,
        }
    }

    pub fn with_dead_band(mut self, dead_band_mm: u16) -> Self {
        self.dead_band_mm = dead_band_mm;
        self
    }

    /// Set the proportional gain and the largest correction it may produce.
    pub fn with_gain(mut self, gain: f32, max_correction: i16) -> Self {
        self.gain = gain;
        self.max_correction = max_correction.max(0);
        self
    }

    pub fn side(&self) -> FollowSide {
        self.side
    }

    /// Speed reduction applied to one wheel for a reading of `range_mm`.
    ///
    /// Positive when the wall is too far, negative when it is too close,
    /// zero inside the dead-band.
    pub fn correction(&self, range_mm: u16) -> i16 {
        let error = i32::from(range_mm) - i32::from(self.standoff_mm);
        if error.unsigned_abs() <= u32::from(self.dead_band_mm) {
            return 0;
        }
        let magnitude = (self.gain * error.unsigned_abs() as f32).round() as i32;
        let magnitude = magnitude.min(i32::from(self.max_correction)) as i16;
        if error > 0 { magnitude } else { -magnitude }
    }

    /// Wheel speeds `(left, right)` for the next control step.
    pub fn update(&self, range_mm: u16) -> (i16, i16) {
        let correction = self.correction(range_mm);
        let slowed = self.cruise - correction.abs();
        match (self.side, correction.signum()) {
            (_, 0) => (self.cruise, self.cruise),
            // Too far: steer towards the wall by slowing the near wheel.
            (FollowSide::Left, 1) => (slowed, self.cruise),
            (FollowSide::Right, 1) => (self.cruise, slowed),
            // Too close: steer away by slowing the far wheel.
            (FollowSide::Left, _) => (self.cruise, slowed),
            (FollowSide::Right, _) => (slowed, self.cruise),
        }
    }
}

//! Range and victim sensor traits.
//!
//! The range finder is a single IR sensor on a stepper motor. It has to be
//! aimed at a side before it can measure, and the caller owns the aiming
//! order.

use rescue_types::{RescueError, Side};

/// A steerable infrared range finder.
pub trait RangeSensor {
    /// Rotate the sensor so it points at `side` of the robot.
    ///
    /// # Errors
    ///
    /// Returns [`RescueError::HardwareFault`] if the stepper does not respond.
    fn aim(&mut self, side: Side) -> Result<(), RescueError>;

    /// Distance to the nearest surface in the aimed direction, in mm.
    fn measure(&mut self) -> Result<u16, RescueError>;

    /// Aim at `side` and take one reading.
    fn measure_towards(&mut self, side: Side) -> Result<u16, RescueError> {
        self.aim(side)?;
        self.measure()
    }
}

/// Detects a victim marker in the cell the robot currently occupies.
pub trait VictimSensor {
    fn check(&mut self) -> Result<bool, RescueError>;
}

//! `MotionService` trait for the differential drive base.
//!
//! Drivers implement four primitives: direct wheel commands, odometry reads
//! that reset on every call, and a combined bump/virtual-wall sensor poll.
//! The busy-poll movement primitives [`MotionService::straight`] and
//! [`MotionService::rotate`] are provided on top of them, so every driver
//! stops on the same interrupt rules.

use rescue_types::{RescueError, SensorTrigger, SensorState, TurnDirection};

/// Largest wheel speed magnitude the drive base accepts, in mm/s.
pub const MAX_WHEEL_SPEED: i16 = 500;

/// Result of one [`MotionService::straight`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Travel {
    /// Distance actually covered in the commanded direction, in mm.
    pub distance_mm: u32,
    /// The interrupt that cut the move short, if any.
    pub trigger: Option<SensorTrigger>,
}

impl Travel {
    pub fn interrupted(&self) -> bool {
        self.trigger.is_some()
    }
}

/// A differential drive base with odometry and interrupt sensors.
pub trait MotionService {
    /// Command left and right wheel speeds in mm/s until the next command.
    ///
    /// # Errors
    ///
    /// Returns [`RescueError::HardwareFault`] if the command cannot be sent.
    fn direct_drive(&mut self, left: i16, right: i16) -> Result<(), RescueError>;

    /// Signed distance travelled since the previous call, in mm. Forward is
    /// positive.
    fn distance_since_last_call(&mut self) -> Result<i16, RescueError>;

    /// Signed rotation since the previous call, in degrees.
    /// Counter-clockwise is positive.
    fn angle_since_last_call(&mut self) -> Result<i16, RescueError>;

    /// Read the bumper and the virtual-wall receiver.
    fn poll_sensors(&mut self) -> Result<SensorState, RescueError>;

    /// Stop both wheels.
    fn stop(&mut self) -> Result<(), RescueError> {
        self.direct_drive(0, 0)
    }

    /// Drive straight at `speed` (negative reverses) until `distance_mm` has
    /// been covered or, when `sensor_enabled`, an interrupt fires.
    ///
    /// Odometry is reset before the move and the wheels are stopped after
    /// it in every case.
    fn straight(
        &mut self,
        speed: i16,
        distance_mm: u32,
        sensor_enabled: bool,
    ) -> Result<Travel, RescueError> {
        let speed = speed.clamp(-MAX_WHEEL_SPEED, MAX_WHEEL_SPEED);
        if distance_mm == 0 || speed == 0 {
            return Ok(Travel { distance_mm: 0, trigger: None });
        }

        self.distance_since_last_call()?;
        self.direct_drive(speed, speed)?;

        let target = i64::from(distance_mm);
        let mut travelled: i64 = 0;
        let mut trigger = None;
        while travelled < target {
            let delta = i64::from(self.distance_since_last_call()?);
            travelled += if speed > 0 { delta } else { -delta };
            if sensor_enabled {
                trigger = self.poll_sensors()?.trigger();
                if trigger.is_some() {
                    break;
                }
            }
        }
        self.stop()?;

        Ok(Travel {
            distance_mm: u32::try_from(travelled.max(0)).unwrap_or(u32::MAX),
            trigger,
        })
    }

    /// Spin in place by `angle_deg` in `direction`, stopping early on any
    /// interrupt. Returns the interrupt, if one fired.
    fn rotate(
        &mut self,
        speed: i16,
        angle_deg: u16,
        direction: TurnDirection,
    ) -> Result<Option<SensorTrigger>, RescueError> {
        let speed = speed.unsigned_abs().min(MAX_WHEEL_SPEED as u16) as i16;
        if angle_deg == 0 || speed == 0 {
            return Ok(None);
        }

        self.angle_since_last_call()?;
        match direction {
            TurnDirection::Ccw => self.direct_drive(-speed, speed)?,
            TurnDirection::Cw => self.direct_drive(speed, -speed)?,
        }

        let target = i32::from(angle_deg);
        let mut turned: i32 = 0;
        let mut trigger = None;
        while turned < target {
            let delta = i32::from(self.angle_since_last_call()?);
            turned += match direction {
                TurnDirection::Ccw => delta,
                TurnDirection::Cw => -delta,
            };
            trigger = self.poll_sensors()?.trigger();
            if trigger.is_some() {
                break;
            }
        }
        self.stop()?;

        Ok(trigger)
    }
}

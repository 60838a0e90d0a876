//! `rescue-hal` – Hardware Abstraction Layer.
//!
//! The navigation core never talks to a serial port, ADC or stepper driver
//! directly. It only sees the collaborator traits defined here, so the same
//! runtime drives the real robot and the in-process simulator.
//!
//! # Modules
//!
//! - [`motion`] – [`MotionService`][motion::MotionService]: wheel commands,
//!   odometry and bump/virtual-wall polling, plus the busy-poll `straight`
//!   and `rotate` primitives built on top of them.
//! - [`sensors`] – [`RangeSensor`][sensors::RangeSensor] (stepper-aimed IR
//!   range finder) and [`VictimSensor`][sensors::VictimSensor].
//! - [`signal`] – [`AudioSignal`][signal::AudioSignal] and
//!   [`Display`][signal::Display] output peripherals.
//! - [`steering`] – [`WallFollower`][steering::WallFollower]: proportional
//!   wall-following wheel-speed controller with a dead-band.
//! - [`sim`] – [`SimRobot`][sim::SimRobot]: a simulated robot in a simulated
//!   arena implementing every collaborator trait, for headless tests.

pub mod motion;
pub mod sensors;
pub mod signal;
pub mod sim;
pub mod steering;

pub use motion::{MAX_WHEEL_SPEED, MotionService, Travel};
pub use sensors::{RangeSensor, VictimSensor};
pub use signal::{AudioSignal, Display};
pub use steering::{FollowSide, WallFollower};

/// Everything the mission runtime needs from the robot, as one bound.
pub trait RobotIo: MotionService + RangeSensor + VictimSensor + AudioSignal + Display {}

impl<T> RobotIo for T where T: MotionService + RangeSensor + VictimSensor + AudioSignal + Display {}

//! `rescue-runtime` – navigation and mission control.
//!
//! Everything that decides where the robot goes lives here. The crate is
//! generic over the driver traits in `rescue-hal`, so the same controller
//! runs on hardware or against [`rescue_hal::sim::SimRobot`].
//!
//! # Modules
//!
//! - [`profile`] – [`MotionProfile`][profile::MotionProfile]: speeds,
//!   distances and steering gains shared by every motion routine.
//! - [`movement`] – [`MovementExecutor`][movement::MovementExecutor]:
//!   classifies the walls around the current cell and drives exactly one cell
//!   forward with wall following, front-wall approaches and blind legs.
//! - [`navigator`] – [`Navigator`][navigator::Navigator]: chooses the next
//!   cell from the flood-fill distance field and turns towards it, keeping
//!   the [`OrientationFrame`][rescue_perception::OrientationFrame] in step
//!   with every physical turn.
//! - [`recovery`] – [`RecoveryHandler`][recovery::RecoveryHandler]: backs out
//!   of bump and virtual-wall interrupts and marks virtual walls on the map.
//! - [`mission`] – [`MissionController`][mission::MissionController]: the
//!   exploring, homing and done state machine with victim tracking.
//! - [`report`] – [`MissionReport`][report::MissionReport]: timestamped
//!   mission events, serialisable to JSON.
//! - [`stall_guard`] – [`StallGuard`][stall_guard::StallGuard]: warns when
//!   every waypoint has been abandoned in a row.
//! - [`sim`] – builds simulated worlds from maze layouts.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: installs
//!   the `tracing` subscriber with optional OTLP export.

pub mod mission;
pub mod movement;
pub mod navigator;
pub mod profile;
pub mod recovery;
pub mod report;
pub mod sim;
pub mod stall_guard;
pub mod telemetry;

pub use mission::{MissionConfig, MissionController, MissionPlan, MissionState, RunOutcome, VictimRecord};
pub use movement::{MovePlan, Movement, MovementExecutor, Strategy};
pub use navigator::{NavState, Navigator, StepOutcome};
pub use profile::MotionProfile;
pub use recovery::{Recovery, RecoveryHandler};
pub use report::{AbandonReason, MissionEvent, MissionEventKind, MissionReport};
pub use stall_guard::StallGuard;
pub use telemetry::{TracerProviderGuard, init_tracing};

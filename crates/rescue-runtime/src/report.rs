//! [`MissionReport`] – timestamped record of what a mission did.
//!
//! The report is observational only: the controller appends to it and never
//! reads it back. The CLI prints it as JSON.

use chrono::{DateTime, Utc};
use rescue_types::{Compass, Coordinate, SensorTrigger};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a target was given up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbandonReason {
    /// The flood plan did not reach the robot's cell.
    NoPath,
    /// The navigator found no neighbour closer to the target.
    Stuck,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MissionEventKind {
    Started { home: Coordinate },
    WaypointReached { waypoint: Coordinate },
    WaypointAbandoned { waypoint: Coordinate, reason: AbandonReason },
    VictimFound { slot: u8, cell: Coordinate },
    Interrupted { cell: Coordinate, trigger: SensorTrigger, move_back_mm: i32 },
    VirtualWallMarked { cell: Coordinate, side: Compass },
    HomingStarted { cell: Coordinate },
    Completed { cell: Coordinate },
    Aborted { cell: Coordinate },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionEvent {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: MissionEventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionReport {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub events: Vec<MissionEvent>,
}

impl MissionReport {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            events: Vec::new(),
        }
    }

    pub fn record(&mut self, kind: MissionEventKind) {
        self.events.push(MissionEvent { at: Utc::now(), kind });
    }

    /// Event kinds in the order they were recorded.
    pub fn kinds(&self) -> impl Iterator<Item = &MissionEventKind> {
        self.events.iter().map(|e| &e.kind)
    }

    /// Waypoints reached, in order.
    pub fn reached(&self) -> Vec<Coordinate> {
        self.kinds()
            .filter_map(|k| match k {
                MissionEventKind::WaypointReached { waypoint } => Some(*waypoint),
                _ => None,
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for MissionReport {
    fn default() -> Self {
        Self::new()
    }
}

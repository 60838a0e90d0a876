//! Orientation Frame.
//!
//! The robot never measures its absolute heading. Instead it counts the
//! quarter turns it has made since the mission started and uses that count
//! to translate robot-relative sides (front, right, back, left) into the
//! arena's fixed compass directions.
//!
//! Every physical turn must be paired with exactly one
//! [`OrientationFrame::apply_turns`] call, otherwise the frame no longer
//! matches the true heading.
//!
//! # Example
//!
//! ```rust
//! use rescue_perception::orientation::OrientationFrame;
//! use rescue_types::{Compass, Side, TurnDirection};
//!
//! let mut frame = OrientationFrame::new();
//! assert_eq!(frame.resolve(Side::Front), Compass::North);
//!
//! frame.apply_turns(1, TurnDirection::Cw);
//! assert_eq!(frame.resolve(Side::Front), Compass::East);
//! assert_eq!(frame.resolve(Side::Left), Compass::North);
//! ```

use rescue_types::{Compass, Side, TurnDirection};

/// Accumulated heading of the robot relative to the arena.
///
/// `rotation` counts clockwise quarter turns and is always in `0..4`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrientationFrame {
    rotation: u8,
}

impl OrientationFrame {
    /// A frame facing North, the heading every mission starts with.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clockwise quarter turns accumulated so far, normalised into `0..4`.
    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    /// Record that the robot physically turned `count` quarter turns in
    /// `direction`.
    pub fn apply_turns(&mut self, count: u8, direction: TurnDirection) {
        let count = i16::from(count % 4);
        let delta = match direction {
            TurnDirection::Cw => count,
            TurnDirection::Ccw => -count,
        };
        self.rotation = (i16::from(self.rotation) + delta).rem_euclid(4) as u8;
    }

    /// Map a robot-relative side to the compass side it currently faces.
    pub fn resolve(&self, side: Side) -> Compass {
        Compass::from_index(side.index() + self.rotation)
    }

    /// The compass direction the robot is facing.
    pub fn heading(&self) -> Compass {
        self.resolve(Side::Front)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_frame_is_identity() {
        let frame = OrientationFrame::new();
        assert_eq!(frame.rotation(), 0);
        assert_eq!(frame.resolve(Side::Front), Compass::North);
        assert_eq!(frame.resolve(Side::Right), Compass::East);
        assert_eq!(frame.resolve(Side::Back), Compass::South);
        assert_eq!(frame.resolve(Side::Left), Compass::West);
    }

    #[test]
    fn cw_then_ccw_restores_rotation() {
        let mut frame = OrientationFrame::new();
        frame.apply_turns(2, TurnDirection::Cw);
        let before = frame.rotation();
        frame.apply_turns(1, TurnDirection::Cw);
        frame.apply_turns(1, TurnDirection::Ccw);
        assert_eq!(frame.rotation(), before);
    }

    #[test]
    fn negative_rotation_wraps_into_range() {
        let mut frame = OrientationFrame::new();
        frame.apply_turns(1, TurnDirection::Ccw);
        assert_eq!(frame.rotation(), 3);
        assert_eq!(frame.heading(), Compass::West);
        frame.apply_turns(2, TurnDirection::Ccw);
        assert_eq!(frame.rotation(), 1);
        assert_eq!(frame.heading(), Compass::East);
    }

    #[test]
    fn rotation_stays_in_range_for_any_sequence() {
        let mut frame = OrientationFrame::new();
        let turns = [
            (1, TurnDirection::Cw),
            (2, TurnDirection::Ccw),
            (2, TurnDirection::Ccw),
            (1, TurnDirection::Ccw),
            (2, TurnDirection::Cw),
            (1, TurnDirection::Cw),
            (1, TurnDirection::Cw),
        ];
        let mut expected: i32 = 0;
        for (count, dir) in turns {
            frame.apply_turns(count, dir);
            expected += match dir {
                TurnDirection::Cw => i32::from(count),
                TurnDirection::Ccw => -i32::from(count),
            };
            assert!(frame.rotation() < 4);
            assert_eq!(i32::from(frame.rotation()), expected.rem_euclid(4));
        }
    }

    #[test]
    fn half_turn_swaps_front_and_back() {
        let mut frame = OrientationFrame::new();
        frame.apply_turns(2, TurnDirection::Cw);
        assert_eq!(frame.resolve(Side::Front), Compass::South);
        assert_eq!(frame.resolve(Side::Back), Compass::North);
        assert_eq!(frame.resolve(Side::Left), Compass::East);
    }
}

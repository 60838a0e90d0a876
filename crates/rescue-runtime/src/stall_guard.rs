//! [`StallGuard`] – detects a mission that keeps abandoning its targets.
//!
//! Every abandoned waypoint extends a streak and every reached waypoint ends
//! it. Once the streak covers a whole pass of the waypoint list the guard
//! logs a single warning. It never stops the mission: an abandoned list is
//! simply cycled again.
//!
//! # Example
//!
//! ```rust
//! use rescue_runtime::stall_guard::StallGuard;
//!
//! let mut guard = StallGuard::new(2);
//!
//! assert!(!guard.record_abandon());
//! assert!(guard.record_abandon()); // second abandon in a row → stalled
//!
//! guard.record_progress();
//! assert!(!guard.is_stalled());
//! ```

use tracing::warn;

/// Counts consecutive abandoned targets.
#[derive(Debug, Clone)]
pub struct StallGuard {
    /// Streak length that counts as stalled.
    threshold: usize,
    streak: usize,
    warned: bool,
}

impl StallGuard {
    /// `threshold` is clamped to at least 1.
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold: threshold.max(1),
            streak: 0,
            warned: false,
        }
    }

    /// Record an abandoned target. Returns `true` when the streak has
    /// reached the threshold.
    pub fn record_abandon(&mut self) -> bool {
        self.streak += 1;
        if self.is_stalled() && !self.warned {
            warn!(streak = self.streak, "every waypoint abandoned in a row; still cycling");
            self.warned = true;
        }
        self.is_stalled()
    }

    /// Record a reached target, ending any streak.
    pub fn record_progress(&mut self) {
        self.streak = 0;
        self.warned = false;
    }

    pub fn is_stalled(&self) -> bool {
        self.streak >= self.threshold
    }

    pub fn streak(&self) -> usize {
        self.streak
    }
}

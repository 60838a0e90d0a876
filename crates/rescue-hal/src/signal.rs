//! Output peripherals: the song player and the character display.

use rescue_types::{DisplayRegion, Melody, RescueError};

/// Plays the songs stored in the robot's song slots.
pub trait AudioSignal {
    /// Start playing `melody`. Returns immediately.
    fn play(&mut self, melody: Melody) -> Result<(), RescueError>;

    /// `true` while a song is still playing.
    fn is_busy(&mut self) -> Result<bool, RescueError>;

    /// Play `melody` and busy-wait until it has finished.
    fn play_blocking(&mut self, melody: Melody) -> Result<(), RescueError> {
        self.play(melody)?;
        while self.is_busy()? {}
        Ok(())
    }
}

/// A small text display split into four regions.
pub trait Display {
    /// Replace the text of `region`.
    fn show(&mut self, text: &str, region: DisplayRegion) -> Result<(), RescueError>;
}

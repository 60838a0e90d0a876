//! Simulated arenas built from a [`MazeLayout`].

use rescue_hal::sim::SimWorld;
use rescue_perception::MazeLayout;

/// A simulated world whose solid walls are exactly the physical walls of
/// `layout`. Beams and victims are added by the caller.
pub fn world_from_layout(layout: &MazeLayout, cell_length_mm: u16) -> SimWorld {
    layout
        .walls()
        .fold(SimWorld::new(u32::from(cell_length_mm)), |world, wall| {
            world.with_wall(wall.cell, wall.side)
        })
}

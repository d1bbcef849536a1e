//! Synthetic arenas: a dark line on a white floor.

use nalgebra::Point2;
use simcore::{ArenaExtent, ColorGrid, Rgb};

/// A closed ring centered in the arena and passing through `through`.
pub fn ring_track(extent: ArenaExtent, through: Point2<f64>, thickness: f64) -> ColorGrid {
    let mut grid = ColorGrid::new(extent.width, extent.height, Rgb::WHITE);
    let center = Point2::new(extent.width as f64 / 2.0, extent.height as f64 / 2.0);
    let radius = nalgebra::distance(&center, &through);
    grid.draw_ring(center, radius, thickness, Rgb::BLACK);
    grid
}

/// A horizontal band across the whole arena, centered on row `y`.
pub fn straight_track(extent: ArenaExtent, y: f64, thickness: f64) -> ColorGrid {
    let mut grid = ColorGrid::new(extent.width, extent.height, Rgb::WHITE);
    grid.draw_segment(
        Point2::new(0.0, y),
        Point2::new(extent.width as f64, y),
        thickness,
        Rgb::BLACK,
    );
    grid
}

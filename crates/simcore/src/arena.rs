//! Arena surfaces and bounds.
//!
//! The arena is a grid of colored pixels. Sensors sample it through
//! [`MapProvider`] so tests and the headless binary can substitute a
//! synthetic [`ColorGrid`] for a loaded image.

use nalgebra::Point2;

use crate::{Rgb, SimError};

/// Arena extents in pixel-equivalent units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaExtent {
    pub width: u32,
    pub height: u32,
}

impl ArenaExtent {
    pub fn new(width: u32, height: u32) -> Self {
        ArenaExtent { width, height }
    }

    /// True when `point` lies outside `[0, width] x [0, height]`.
    pub fn is_out_of_bounds(&self, point: Point2<f64>) -> bool {
        point.x < 0.0
            || point.x > self.width as f64
            || point.y < 0.0
            || point.y > self.height as f64
    }

    /// True when any of `points` is out of bounds.
    pub fn any_out_of_bounds<I>(&self, points: I) -> bool
    where
        I: IntoIterator<Item = Point2<f64>>,
    {
        points.into_iter().any(|p| self.is_out_of_bounds(p))
    }
}

/// Point-sampling access to an arena surface.
pub trait MapProvider {
    fn extent(&self) -> ArenaExtent;

    /// Color of the pixel at column `x`, row `y`.
    ///
    /// Coordinates outside the grid are a bounds violation, never clamped.
    fn sample_color(&self, x: i64, y: i64) -> Result<Rgb, SimError>;

    /// Samples the pixel containing `point`, truncating each coordinate toward zero.
    fn sample_point(&self, point: Point2<f64>) -> Result<Rgb, SimError> {
        self.sample_color(point.x.trunc() as i64, point.y.trunc() as i64)
    }
}

/// In-memory RGB pixel grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorGrid {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl ColorGrid {
    /// Creates a grid filled with a single color.
    pub fn new(width: u32, height: u32, fill: Rgb) -> Self {
        ColorGrid {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    /// Builds a grid from row-major pixels.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self, SimError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(SimError::invalid(
                "pixels",
                format!("expected {expected} pixels for {width}x{height}, got {}", pixels.len()),
            ));
        }
        Ok(ColorGrid { width, height, pixels })
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn set(&mut self, x: i64, y: i64, color: Rgb) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Paints the half-open pixel rectangle `[x0, x1) x [y0, y1)`, clipped to the grid.
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb) {
        for y in y0.max(0)..y1.min(self.height as i64) {
            for x in x0.max(0)..x1.min(self.width as i64) {
                self.set(x, y, color);
            }
        }
    }

    /// Paints every pixel whose center lies within `thickness / 2` of segment `a`-`b`.
    pub fn draw_segment(&mut self, a: Point2<f64>, b: Point2<f64>, thickness: f64, color: Rgb) {
        let half = thickness / 2.0;
        let ab = b - a;
        let len_sq = ab.norm_squared();
        self.paint_where(
            a.x.min(b.x) - half,
            a.y.min(b.y) - half,
            a.x.max(b.x) + half,
            a.y.max(b.y) + half,
            color,
            |p| {
                let t = if len_sq > 0.0 {
                    ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let closest = a + ab * t;
                (p - closest).norm() <= half
            },
        );
    }

    /// Paints a circular band of the given radius and thickness around `center`.
    pub fn draw_ring(&mut self, center: Point2<f64>, radius: f64, thickness: f64, color: Rgb) {
        let half = thickness / 2.0;
        let reach = radius + half;
        self.paint_where(
            center.x - reach,
            center.y - reach,
            center.x + reach,
            center.y + reach,
            color,
            |p| ((p - center).norm() - radius).abs() <= half,
        );
    }

    fn paint_where<F>(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64, color: Rgb, inside: F)
    where
        F: Fn(Point2<f64>) -> bool,
    {
        let x_start = (min_x.floor() as i64).max(0);
        let y_start = (min_y.floor() as i64).max(0);
        let x_end = (max_x.ceil() as i64).min(self.width as i64 - 1);
        let y_end = (max_y.ceil() as i64).min(self.height as i64 - 1);
        for y in y_start..=y_end {
            for x in x_start..=x_end {
                let center = Point2::new(x as f64 + 0.5, y as f64 + 0.5);
                if inside(center) {
                    self.set(x, y, color);
                }
            }
        }
    }
}

impl MapProvider for ColorGrid {
    fn extent(&self) -> ArenaExtent {
        ArenaExtent::new(self.width, self.height)
    }

    fn sample_color(&self, x: i64, y: i64) -> Result<Rgb, SimError> {
        self.index(x, y)
            .map(|i| self.pixels[i])
            .ok_or(SimError::OutOfArena {
                x,
                y,
                width: self.width,
                height: self.height,
            })
    }
}

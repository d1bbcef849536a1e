//! Plane geometry and color helpers.
//!
//! Arena coordinates follow the screen convention: x grows to the right and
//! y grows downward. Robot-frame offsets use the math convention (x forward,
//! y to the left), so projecting an offset into the arena subtracts its
//! rotated y component.

use nalgebra::{Matrix2, Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Channel-wise mid-gray used to binarize sampled colors.
pub const MID_GRAY: [f64; 3] = [255.0 / 2.0, 255.0 / 2.0, 255.0 / 2.0];

/// Robot pose in arena coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    /// Heading in radians, counter-clockwise as seen on screen.
    pub heading: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Pose { x, y, heading }
    }

    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

impl From<[f64; 3]> for Pose {
    fn from(v: [f64; 3]) -> Self {
        Pose::new(v[0], v[1], v[2])
    }
}

/// 8-bit RGB color. Any alpha channel is dropped on conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub fn channels(&self) -> [f64; 3] {
        [self.r as f64, self.g as f64, self.b as f64]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Rgb::new(c[0], c[1], c[2])
    }
}

impl From<[u8; 4]> for Rgb {
    fn from(c: [u8; 4]) -> Self {
        Rgb::new(c[0], c[1], c[2])
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

/// Rotates `v` counter-clockwise by `angle` radians.
pub fn rotate_vector(v: Vector2<f64>, angle: f64) -> Vector2<f64> {
    let (sin, cos) = angle.sin_cos();
    let rotation = Matrix2::new(cos, -sin, sin, cos);
    rotation * v
}

/// True iff the unweighted channel mean of `a` is strictly below that of `b`.
pub fn is_darker(a: [f64; 3], b: [f64; 3]) -> bool {
    let gray = |c: [f64; 3]| c.iter().sum::<f64>() / c.len() as f64;
    gray(a) < gray(b)
}

/// Projects a robot-frame offset into arena coordinates for the given pose.
pub fn project_offset(pose: &Pose, offset: Vector2<f64>) -> Point2<f64> {
    let rotated = rotate_vector(offset, pose.heading);
    Point2::new(pose.x + rotated.x, pose.y - rotated.y)
}

/// Inverse of [`project_offset`]: recovers the robot-frame offset of an arena point.
pub fn offset_from_absolute(pose: &Pose, point: Point2<f64>) -> Vector2<f64> {
    let screen_delta = Vector2::new(point.x - pose.x, pose.y - point.y);
    rotate_vector(screen_delta, -pose.heading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate_vector(Vector2::new(1.0, 0.0), FRAC_PI_2);
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotate_preserves_length() {
        let v = Vector2::new(3.0, -4.0);
        let r = rotate_vector(v, 1.234);
        assert_abs_diff_eq!(r.norm(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_is_darker_against_mid_gray() {
        assert!(is_darker(Rgb::BLACK.channels(), MID_GRAY));
        assert!(!is_darker(Rgb::WHITE.channels(), MID_GRAY));
        // 127 average is below 127.5
        assert!(is_darker(Rgb::new(127, 127, 127).channels(), MID_GRAY));
        assert!(!is_darker(Rgb::new(128, 128, 128).channels(), MID_GRAY));
    }

    #[test]
    fn test_is_darker_is_strict() {
        let c = Rgb::new(10, 20, 30).channels();
        assert!(!is_darker(c, c));
    }

    #[test]
    fn test_is_darker_uses_unweighted_mean() {
        // Pure blue and pure green have the same mean despite very different luminance
        let blue = Rgb::new(0, 0, 255).channels();
        let green = Rgb::new(0, 255, 0).channels();
        assert!(!is_darker(blue, green));
        assert!(!is_darker(green, blue));
    }

    #[test]
    fn test_project_offset_without_rotation() {
        let p = project_offset(&Pose::new(100.0, 100.0, 0.0), Vector2::new(40.0, 0.0));
        assert_abs_diff_eq!(p.x, 140.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 100.0, epsilon = 1e-12);
    }

    #[test]
    fn test_project_offset_quarter_turn_inverts_y() {
        // (40, 0) rotated by pi/2 is (0, 40); arena y points down, so y = 0 - 40
        let p = project_offset(&Pose::new(0.0, 0.0, FRAC_PI_2), Vector2::new(40.0, 0.0));
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, -40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_left_offset_is_above_robot_at_zero_heading() {
        let p = project_offset(&Pose::new(50.0, 50.0, 0.0), Vector2::new(0.0, 20.0));
        assert_abs_diff_eq!(p.y, 30.0, epsilon = 1e-12);
    }

    #[test]
    fn test_offset_from_absolute_inverts_projection() {
        let pose = Pose::new(320.0, 210.0, 2.0 * PI / 3.0);
        let offset = Vector2::new(40.0, -20.0);
        let point = project_offset(&pose, offset);
        let back = offset_from_absolute(&pose, point);
        assert_abs_diff_eq!(back.x, offset.x, epsilon = 1e-9);
        assert_abs_diff_eq!(back.y, offset.y, epsilon = 1e-9);
    }

    #[test]
    fn test_rgb_drops_alpha() {
        let c: Rgb = [12, 34, 56, 255].into();
        assert_eq!(c, Rgb::new(12, 34, 56));
    }
}

use log::debug;
use nalgebra::{Point2, Vector2};
use simcore::{MapProvider, Model, Pose, Rgb, SensorModel, SimContext, SimError};

use crate::line_sensor::{LineSensor, Polarity};

/// Marker colors assigned to sensors in mounting order.
pub const DEFAULT_SENSOR_COLORS: [Rgb; 10] = [
    Rgb::new(255, 0, 0),
    Rgb::new(0, 255, 0),
    Rgb::new(0, 0, 255),
    Rgb::new(255, 255, 0),
    Rgb::new(0, 255, 255),
    Rgb::new(255, 0, 255),
    Rgb::new(255, 255, 255),
    Rgb::new(128, 0, 0),
    Rgb::new(0, 128, 0),
    Rgb::new(0, 0, 128),
];

/// The ordered set of line sensors mounted on one robot.
#[derive(Debug, Clone)]
pub struct SensorArray {
    sensors: Vec<LineSensor>,
    colors: Vec<Rgb>,
    polarity: Polarity,
}

impl SensorArray {
    pub fn new(offsets: &[Vector2<f64>], robot_pose: &Pose, polarity: Polarity) -> Self {
        let sensors: Vec<LineSensor> = offsets
            .iter()
            .map(|&offset| LineSensor::new(offset, robot_pose))
            .collect();
        let colors = (0..sensors.len())
            .map(|i| DEFAULT_SENSOR_COLORS[i % DEFAULT_SENSOR_COLORS.len()])
            .collect();
        debug!("mounted {} line sensors ({:?})", sensors.len(), polarity);
        SensorArray {
            sensors,
            colors,
            polarity,
        }
    }

    /// Replaces the marker colors; sensors beyond `colors` keep their defaults.
    pub fn with_colors(mut self, colors: &[Rgb]) -> Self {
        for (slot, &color) in self.colors.iter_mut().zip(colors) {
            *slot = color;
        }
        self
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn get(&self, index: usize) -> Option<&LineSensor> {
        self.sensors.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineSensor> {
        self.sensors.iter()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn offsets(&self) -> Vec<Vector2<f64>> {
        self.sensors.iter().map(LineSensor::offset).collect()
    }

    pub fn positions(&self) -> Vec<Point2<f64>> {
        self.sensors.iter().map(LineSensor::position).collect()
    }

    pub fn readings(&self) -> Vec<u8> {
        self.sensors.iter().map(LineSensor::data).collect()
    }

    /// Reprojects every sensor from the robot's current pose.
    pub fn update_positions(&mut self, robot_pose: &Pose) {
        for sensor in &mut self.sensors {
            sensor.update_position(robot_pose);
        }
    }

    /// Reads every sensor in order. Stops at the first out-of-grid sample.
    pub fn read_all(&mut self, map: &dyn MapProvider) -> Result<(), SimError> {
        for sensor in &mut self.sensors {
            sensor.read_data(map, self.polarity)?;
        }
        Ok(())
    }
}

impl Model for SensorArray {
    fn reset(&mut self) {
        for sensor in &mut self.sensors {
            sensor.clear();
        }
    }
}

impl SensorModel for SensorArray {
    fn step_sensor(&mut self, _ctx: SimContext, map: &dyn MapProvider) -> Result<(), SimError> {
        self.read_all(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use simcore::ColorGrid;

    fn three_sensor_offsets() -> Vec<Vector2<f64>> {
        vec![
            Vector2::new(40.0, 20.0),
            Vector2::new(40.0, 0.0),
            Vector2::new(40.0, -20.0),
        ]
    }

    #[test]
    fn test_positions_follow_pose() {
        let mut array = SensorArray::new(&three_sensor_offsets(), &Pose::new(100.0, 100.0, 0.0), Polarity::DarkIsOne);
        let positions = array.positions();
        assert_abs_diff_eq!(positions[0].y, 80.0);
        assert_abs_diff_eq!(positions[2].y, 120.0);

        array.update_positions(&Pose::new(200.0, 100.0, 0.0));
        assert_abs_diff_eq!(array.positions()[1].x, 240.0);
    }

    #[test]
    fn test_read_all_over_line() {
        // Horizontal black band along y = 80 under the left sensor only
        let mut grid = ColorGrid::new(300, 200, Rgb::WHITE);
        grid.fill_rect(0, 75, 300, 85, Rgb::BLACK);
        let mut array = SensorArray::new(&three_sensor_offsets(), &Pose::new(100.0, 100.0, 0.0), Polarity::DarkIsOne);

        array.step_sensor(SimContext::default(), &grid).unwrap();
        assert_eq!(array.readings(), vec![1, 0, 0]);

        array.reset();
        assert_eq!(array.readings(), vec![0, 0, 0]);
    }

    #[test]
    fn test_read_all_reports_out_of_grid() {
        let grid = ColorGrid::new(120, 200, Rgb::WHITE);
        let mut array = SensorArray::new(&three_sensor_offsets(), &Pose::new(100.0, 100.0, 0.0), Polarity::DarkIsOne);
        assert!(array.read_all(&grid).is_err());
    }

    #[test]
    fn test_colors_default_and_override() {
        let array = SensorArray::new(&three_sensor_offsets(), &Pose::default(), Polarity::DarkIsOne);
        assert_eq!(array.colors(), &DEFAULT_SENSOR_COLORS[..3]);

        let array = array.with_colors(&[Rgb::BLACK]);
        assert_eq!(array.colors()[0], Rgb::BLACK);
        assert_eq!(array.colors()[1], DEFAULT_SENSOR_COLORS[1]);
    }
}

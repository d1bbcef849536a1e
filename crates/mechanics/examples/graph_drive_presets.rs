use mechanics::{DifferentialDriveConfig, DifferentialRobot, MotionCommand, TurnStyle, WheelDrive};
use plotters::prelude::*;
use simcore::Pose;

fn draw_paths(
    filename: &str,
    title: &str,
    paths: &[(&str, Vec<(f64, f64)>)],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(filename, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let all = || paths.iter().flat_map(|(_, p)| p.iter().copied());
    let x_min = all().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let x_max = all().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let y_min = all().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let y_max = all().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("Arial", 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min - 10.0..x_max + 10.0, y_min - 10.0..y_max + 10.0)?;

    chart.configure_mesh().x_desc("x [px]").y_desc("-y [px]").draw()?;

    for (i, (label, path)) in paths.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(LineSeries::new(path.iter().copied(), &color))?
            .label(*label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.filled()));
    }

    chart.configure_series_labels().border_style(&BLACK).draw()?;

    root.present()?;
    Ok(())
}

fn trace(command: MotionCommand, seconds: f64, dt: f64) -> Result<Vec<(f64, f64)>, Box<dyn std::error::Error>> {
    let config = DifferentialDriveConfig {
        width: 40.0,
        drive: WheelDrive::Linear,
        max_speed: 40.0,
        initial_speed: 0.0,
    };
    let mut robot = DifferentialRobot::new(config, Pose::new(0.0, 0.0, 0.0))?;
    robot.apply(command);

    let steps = (seconds / dt).ceil() as usize;
    // Arena y grows downward; negate it so the plot reads like the screen
    let mut path = Vec::with_capacity(steps + 1);
    path.push((robot.pose().x, -robot.pose().y));
    for _ in 0..steps {
        robot.advance(dt);
        path.push((robot.pose().x, -robot.pose().y));
    }
    Ok(path)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dt = 1.0 / 60.0;
    let seconds = 4.0;

    let paths = vec![
        ("forward", trace(MotionCommand::Forward, seconds, dt)?),
        ("backward", trace(MotionCommand::Backward, seconds, dt)?),
        ("turn left (arc)", trace(MotionCommand::TurnLeft(TurnStyle::Arc), seconds, dt)?),
        ("turn right (arc)", trace(MotionCommand::TurnRight(TurnStyle::Arc), seconds, dt)?),
    ];

    draw_paths("drive_presets.png", "Differential Drive Presets", &paths)?;

    println!("Wrote plot: drive_presets.png");

    Ok(())
}

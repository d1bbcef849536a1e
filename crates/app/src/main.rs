use std::env;
use std::process::ExitCode;
use std::time::Duration;

use line_follower::track::ring_track;
use line_follower::{
    AppError, FixedPlacement, LogSink, PlacementService, RunSummary, Runner, ScriptedInput, SetupRecord, SimSettings,
    SystemClock, build_simulation,
};
use log::{LevelFilter, error, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

const TRACK_THICKNESS: f64 = 20.0;

fn init_logging() {
    let level = env::var("LINE_SIM_LOG")
        .ok()
        .and_then(|v| v.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto);
}

fn run() -> Result<RunSummary, AppError> {
    let mut args = env::args().skip(1);
    let setup_path = args.next().unwrap_or_else(|| "setup.txt".to_string());
    let settings = match args.next() {
        Some(path) => SimSettings::load(path)?,
        None => SimSettings::default(),
    };

    let record = SetupRecord::load(&setup_path)?;
    info!("loaded setup from {setup_path}");
    let placement = FixedPlacement::from_record(&record).place()?;
    let map = ring_track(record.arena, placement.pose.position(), TRACK_THICKNESS);

    let mut sim = build_simulation(&record, &placement, &settings)?;
    let mut runner = Runner::new(
        SystemClock::new(),
        ScriptedInput::new(settings.script.clone()),
        LogSink::default(),
    )
    .tick_period(Duration::from_millis(settings.tick_period_ms))
    .max_ticks(settings.max_ticks)
    .out_of_bounds_delay(Duration::from_millis(settings.out_of_bounds_delay_ms));

    Ok(runner.run(&mut sim, &map))
}

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(summary) => {
            info!(
                "finished: {:?} after {} ticks in {:.2}s",
                summary.status,
                summary.ticks,
                summary.elapsed.as_secs_f64()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

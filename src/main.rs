//! touchstick - replay recorded touch traces through virtual joysticks
//!
//! Loads a joystick layout and a CSV touch trace, ticks the registry once per
//! frame and prints what each joystick reports.

use anyhow::Result;
use clap::Parser;
use colored::*;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use touchstick::config::{AppConfig, FireConfig};
use touchstick::replay::{FrameReport, Replay, Trace};

/// Replay a touch trace through a virtual joystick layout
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to joystick layout
    #[arg(short, long, default_value = "joysticks.yaml")]
    config: String,

    /// Path to CSV touch trace
    #[arg(short, long)]
    trace: String,

    /// Seconds per frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Print one JSON object per frame instead of a table
    #[arg(long)]
    json: bool,

    /// Fire trigger on this joystick (overrides the config's fire section)
    #[arg(long)]
    fire: Option<String>,
}

fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    info!("Configuration file: {}", args.config);
    let mut config = AppConfig::load(&args.config)?;

    if let Some(name) = &args.fire {
        let fire_delay = config
            .fire
            .as_ref()
            .map(|f| f.fire_delay)
            .unwrap_or(touchstick::fire::DEFAULT_FIRE_DELAY);
        config.fire = Some(FireConfig {
            joystick: Some(name.clone()),
            fire_delay,
        });
    }

    let trace = Trace::load(&args.trace)?;
    if trace.is_empty() {
        warn!("Trace {} contains no frames", args.trace);
    }
    info!("Replaying {} frames from {}", trace.len(), args.trace);

    let mut replay = Replay::from_config(&config, args.dt)?;
    let reports = replay.run(&trace);

    for report in &reports {
        if args.json {
            println!("{}", serde_json::to_string(report)?);
        } else {
            print_report(report);
        }
    }

    let fired = reports.iter().filter(|r| r.fired == Some(true)).count();
    info!("Replay complete: {} frames, {} shots", reports.len(), fired);
    Ok(())
}

fn print_report(report: &FrameReport) {
    let mut line = format!("{:>5}", report.frame).dimmed().to_string();

    for joystick in &report.joysticks {
        let [x, y] = joystick.position;
        let window = if joystick.tap_window_open { "*" } else { "" };
        let cell = format!(
            " {}=({:+.2},{:+.2}) taps={}{}",
            joystick.name, x, y, joystick.tap_count, window
        );
        if joystick.activated {
            line.push_str(&cell.green().to_string());
        } else {
            line.push_str(&cell);
        }
    }

    if report.fired == Some(true) {
        line.push_str(&" FIRE".red().bold().to_string());
    }

    println!("{}", line);
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

//! Split-flap clock CLI
//!
//! Runs a split-flap clock in the terminal, fed by the system clock or by
//! host state updates on stdin.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use splitflap_core::{decode, ClockConfig, COMMIT_DELAY};
use splitflap_runtime::{SplitFlapClock, StateTable};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod render;
mod source;

use config::Overrides;
use render::TerminalRenderer;

const DEFAULT_ENTITY: &str = "sensor.time";

#[derive(Parser)]
#[command(name = "splitflap")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Split-flap clock for the terminal", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the clock
    Run {
        /// Card config file (TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Entity holding the time string
        #[arg(short, long)]
        entity: Option<String>,

        /// Show seconds (`--show-seconds=false` overrides the config file)
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        show_seconds: Option<bool>,

        /// 12-hour time with AM/PM (`--show-meridiem=false` overrides the config file)
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        show_meridiem: Option<bool>,

        /// Where time values come from
        #[arg(long, value_enum, default_value_t = Source::System)]
        source: Source,

        /// Minutes east of UTC for the system source
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        utc_offset: i32,

        /// Disable colors
        #[arg(long)]
        plain: bool,
    },

    /// Decode a time string and print its digits
    Decode {
        /// Time string, HH:MM or HH:MM:SS
        time: String,

        /// Show seconds
        #[arg(long)]
        show_seconds: bool,

        /// 12-hour time with AM/PM
        #[arg(long)]
        show_meridiem: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Source {
    /// System clock, once per second
    System,
    /// One JSON object of entity states (or a bare time string) per line
    Stdin,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            config,
            entity,
            show_seconds,
            show_meridiem,
            source,
            utc_offset,
            plain,
        } => {
            let overrides = Overrides {
                entity,
                show_seconds,
                show_meridiem,
            };
            cmd_run(config.as_deref(), overrides, source, utc_offset, plain)
        }

        Commands::Decode {
            time,
            show_seconds,
            show_meridiem,
        } => cmd_decode(&time, show_seconds, show_meridiem),
    }
}

fn cmd_run(
    config_path: Option<&std::path::Path>,
    overrides: Overrides,
    source: Source,
    utc_offset: i32,
    plain: bool,
) -> Result<()> {
    let config = match config_path {
        Some(path) => config::load(path)?,
        None => ClockConfig::for_entity(DEFAULT_ENTITY),
    };
    let config = overrides.apply(config);

    info!(
        "Running clock on {:?} from {:?} source",
        config.entity, source
    );

    let states = StateTable::new();
    let renderer = Arc::new(TerminalRenderer::new(&config.colors, plain));
    let entity = config.entity.clone();

    let mut clock = SplitFlapClock::new(states.clone());
    let sink = Arc::clone(&renderer);
    clock.subscribe(move |snapshot| sink.render(snapshot));
    clock
        .set_config(config)
        .context("Failed to build clock")?;

    let result = match source {
        Source::System => source::run_system_clock(&states, &entity, utc_offset),
        Source::Stdin => {
            let result = source::run_stdin(&states, &entity);
            // Let the last flips land before tearing down
            thread::sleep(COMMIT_DELAY * 2);
            result
        }
    };

    clock.shutdown();
    println!();
    result
}

fn cmd_decode(time: &str, show_seconds: bool, show_meridiem: bool) -> Result<()> {
    let format = ClockConfig::default()
        .with_seconds(show_seconds)
        .display_format();

    match decode(time, &format, show_meridiem) {
        Ok(decoded) => {
            let digits: String = decoded.digits.iter().collect();
            match decoded.meridiem {
                Some(meridiem) => println!("{digits} {meridiem}"),
                None => println!("{digits}"),
            }
            Ok(())
        }
        Err(err) => anyhow::bail!("Cannot decode {:?}: {}", time, err),
    }
}

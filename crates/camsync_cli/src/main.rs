//! camsync - headless driver for camera setups
//!
//! - `validate`: load a setup document and print its camera graph
//! - `simulate`: run a sequence of swaps over simulated players
//! - `init`: write a sample setup document

mod simulate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use camsync_core::config::{load_config, CameraConfig, CameraDecl, ConfigManager, LinkDecl};
use camsync_core::logging::{init_tracing, init_tracing_with_file, LogLevel};
use camsync_core::models::OffsetRule;
use camsync_core::player::SimulatedPlayerFactory;
use camsync_core::CameraSync;

use simulate::Step;

#[derive(Parser)]
#[command(name = "camsync")]
#[command(version, about = "Validate and simulate multi-camera swap setups", long_about = None)]
struct Cli {
    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbosity: u8,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long = "log-dir", value_name = "DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a setup document and print cameras and links
    Validate {
        /// Setup document (.toml or .json)
        config: PathBuf,
    },

    /// Swap through simulated players and print each outcome as JSON
    Simulate {
        /// Setup document (.toml or .json)
        config: PathBuf,

        /// Swap step as DEST or DEST@SECS (play SECS seconds first); repeatable
        #[arg(short = 's', long = "step", value_name = "STEP")]
        steps: Vec<Step>,

        /// Start players not ready; the default camera activates on the first step
        #[arg(long)]
        late_ready: bool,
    },

    /// Write a sample setup document
    Init {
        /// Output path (.toml or .json)
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = verbosity_level(cli.verbosity);
    let _log_guard = match &cli.log_dir {
        Some(dir) => Some(init_tracing_with_file(level, dir)),
        None => {
            init_tracing(level);
            None
        }
    };
    tracing::debug!("camsync core {}", camsync_core::version());

    match cli.command {
        Commands::Validate { config } => cmd_validate(&config),
        Commands::Simulate {
            config,
            steps,
            late_ready,
        } => cmd_simulate(&config, &steps, late_ready),
        Commands::Init { path, force } => cmd_init(&path, force),
    }
}

fn verbosity_level(count: u8) -> LogLevel {
    match count {
        0 => LogLevel::Warn,
        1 => LogLevel::Info,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    }
}

/// Command: camsync validate <CONFIG>
fn cmd_validate(path: &Path) -> Result<()> {
    let config = load_config(path).with_context(|| format!("loading {}", path.display()))?;
    let mut factory = SimulatedPlayerFactory::new();
    let sync = CameraSync::build(&config, &mut factory)
        .with_context(|| format!("building cameras from {}", path.display()))?;

    println!(
        "{}: {} camera(s), {} link(s), player {}x{}",
        path.display(),
        sync.registry().len(),
        sync.graph().link_count(),
        config.options.width,
        config.options.height
    );
    for camera in sync.cameras() {
        let marker = if camera.is_default() { " (default)" } else { "" };
        println!("  {} [{}]{}", camera.name(), camera.media_id(), marker);
        for (destination, rule) in sync.graph().destinations(camera.name()) {
            let offset = match rule.offset {
                OffsetRule::CarryOver => "carry-over".to_string(),
                OffsetRule::Calibrated(cal) => {
                    format!("{} -> {}", cal.source, cal.destination)
                }
            };
            println!(
                "    -> {} at ({}%, {}%), {}",
                destination, rule.hotspot.x, rule.hotspot.y, offset
            );
        }
    }
    Ok(())
}

/// Command: camsync simulate <CONFIG> [--step STEP]...
fn cmd_simulate(path: &Path, steps: &[Step], late_ready: bool) -> Result<()> {
    let config = load_config(path).with_context(|| format!("loading {}", path.display()))?;
    let lines = simulate::run(&config, steps, late_ready)?;
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

/// Command: camsync init <PATH> [--force]
fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let mut manager = ConfigManager::new(path)?;
    *manager.config_mut() = sample_config();
    manager
        .save()
        .with_context(|| format!("writing {}", path.display()))?;

    println!("Wrote sample setup to {}", path.display());
    Ok(())
}

/// Two cameras linked both ways, the first calibrated.
fn sample_config() -> CameraConfig {
    let mut config = CameraConfig::default();

    let mut first = CameraDecl {
        id: "H5jERhB0RbA".to_string(),
        is_default: true,
        links: Default::default(),
    };
    first.links.insert(
        "2".to_string(),
        LinkDecl::Detailed {
            at: [20.0, 40.0],
            calibration: Some([20.0, 40.0]),
        },
    );

    let mut second = CameraDecl {
        id: "UDhJeS_l6UU".to_string(),
        is_default: false,
        links: Default::default(),
    };
    second
        .links
        .insert("1".to_string(), LinkDecl::Hotspot([40.0, 70.0]));

    config.cameras.insert("1".to_string(), first);
    config.cameras.insert("2".to_string(), second);
    config
}

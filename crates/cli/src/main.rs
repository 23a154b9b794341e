//! Handspace CLI - replay recorded tracking sessions and inspect the joint catalog.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use session::logger::SessionLogger;
use session::{Recording, RecordingProvider, Session, SessionConfig, SessionPhase};
use skeleton::{JointId, JointSlot};
use std::path::{Path, PathBuf};

/// Handspace CLI - drive the hand tracking core from the command line
#[derive(Parser)]
#[command(name = "handspace")]
#[command(about = "Command-line interface for the Handspace tracking core")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded session and print what happened
    Replay {
        /// Recording file (JSON with `volumes`, `hands` and `meshes`)
        recording: PathBuf,

        /// Session config file (JSON); defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Log level written to ~/.handspace/logs
        #[arg(short, long, default_value = "info")]
        log_level: LevelFilter,
    },

    /// Print the joint catalog with each joint's storage slot
    Catalog,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            recording,
            config,
            log_level,
        } => replay(&recording, config, log_level),
        Commands::Catalog => print_catalog(),
    }
}

fn replay(recording_path: &Path, config_path: Option<PathBuf>, log_level: LevelFilter) -> Result<()> {
    if let Err(err) = SessionLogger::init(log_level) {
        eprintln!("Warning: logging to file disabled: {err:#}");
    }

    let config = match config_path {
        Some(path) => SessionConfig::load(&path)?,
        None => SessionConfig::default(),
    };
    let recording = Recording::load(recording_path)?;
    session::logger::log_section(&format!("replay {}", recording_path.display()));

    let mut session = Session::new(config);
    for volume in &recording.volumes {
        session.add_interactive_volume(volume.center, volume.edge);
    }

    let mut provider = RecordingProvider::new(recording);
    let result = smol::block_on(session.run(&mut provider));

    println!("{}", session.summary());
    if let Some(path) = SessionLogger::current_log_path() {
        println!("log:                {}", path.display());
    }

    result.with_context(|| format!("Replay of {} failed", recording_path.display()))?;
    if session.phase() == SessionPhase::Idle {
        anyhow::bail!("tracking session could not be started");
    }
    Ok(())
}

fn print_catalog() -> Result<()> {
    println!("{:<4} {:<26} slot", "#", "joint");
    for joint in JointId::all() {
        let slot = match joint.slot() {
            JointSlot::Named(named) => format!("hand.{named}"),
            JointSlot::Finger(finger, role) => format!("{finger}.{role}"),
        };
        println!("{:<4} {:<26} {}", joint.index(), joint.as_ref(), slot);
    }
    Ok(())
}

//! riffbridge-replay - feed captured instrument traffic through the engine.
//!
//! Captures are JSON files of hex-encoded frames, either as relayed by a
//! wireless receiver or as read from a directly attached device. Every
//! controller state the mappers submit and every packet the engine would send
//! back to the device is logged.

#![deny(static_mut_refs)]

mod backend;
mod capture;
mod decode;
mod replay;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use riffbridge_engine::{EngineConfig, EngineContext};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::backend::LoggingBackend;
use crate::capture::{CaptureFile, parse_hex_byte};

#[derive(Parser)]
#[command(
    name = "riffbridge-replay",
    about = "Replay captured game input protocol traffic through the instrument mappers"
)]
#[command(version)]
struct Cli {
    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a capture file
    Replay {
        /// Capture file ({"frames": [{"timestamp_us", "device", "data"}]})
        capture: PathBuf,
        /// Engine configuration (JSON or YAML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Treat every frame as coming from one directly attached device
        #[arg(long)]
        direct: bool,
        /// Number of virtual controllers the logging backend can hand out
        #[arg(long, default_value = "4")]
        slots: usize,
        /// Print the frame counts as JSON when done
        #[arg(long)]
        json: bool,
    },
    /// Decode a single protocol message
    Decode {
        /// Message bytes (hex, e.g. 0x20 0x00 0x01 0x0A ...)
        #[arg(required = true, value_parser = parse_hex_byte)]
        bytes: Vec<u8>,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("riffbridge={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config '{}'", path.display())),
        None => {
            let mut config = EngineConfig::default();
            config
                .apply_env_overrides()
                .context("Invalid environment override")?;
            Ok(config)
        }
    }
}

fn run_replay(
    capture: &Path,
    config: Option<&Path>,
    direct: bool,
    slots: usize,
    json: bool,
) -> Result<()> {
    let config = load_config(config)?;
    let capture = CaptureFile::load(capture)?;
    let backend = LoggingBackend::new(config.backend, slots);
    let context = EngineContext::new(config, Arc::new(backend.clone()))
        .context("Failed to build engine context")?;

    let stats = replay::replay(&capture, context, direct)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialize stats")?
        );
    } else {
        println!(
            "Replayed {} frame(s): {} dispatched, {} pending, {} duplicate, {} ignored, {} rejected",
            stats.frames,
            stats.dispatched,
            stats.pending,
            stats.duplicates,
            stats.ignored,
            stats.errors
        );
        println!(
            "{} controller(s) created, {} state update(s), {} outgoing packet(s)",
            backend.created(),
            backend.submitted(),
            stats.outgoing
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Replay {
            capture,
            config,
            direct,
            slots,
            json,
        } => run_replay(capture, config.as_deref(), *direct, *slots, *json),
        Commands::Decode { bytes } => {
            for line in decode::describe(bytes).context("Failed to decode message")? {
                println!("{line}");
            }
            Ok(())
        }
    }
}

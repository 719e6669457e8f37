//! tickchain command line.
//!
//! Runs live tick sessions and verifies exported stamp files.
//!
//! # Quick Start
//!
//! ```bash
//! # Write a default tickchain.toml
//! tickchain init .
//!
//! # Tick every 250 ms, stop after 40 ticks
//! tickchain run --tick-sec 0.25 --max-ticks 40
//!
//! # Check an export
//! tickchain verify stamps_tickchain_cli_20240101_000000Z.csv
//! ```

mod commands;
mod style;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::run::RunOptions;

/// tickchain - tamper-evident clock cadence sessions.
#[derive(Parser)]
#[command(name = "tickchain")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Disable colored output (also honours NO_COLOR).
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Write a default tickchain.toml.
    Init {
        /// Project directory.
        #[arg(default_value = ".")]
        path: String,

        /// Overwrite an existing tickchain.toml.
        #[arg(long)]
        force: bool,
    },

    /// Run a live tick session.
    Run {
        /// Project directory holding tickchain.toml.
        #[arg(short, long, default_value = ".")]
        project: String,

        /// Cadence in seconds (floored at 0.001).
        #[arg(long, conflicts_with = "tick_ms")]
        tick_sec: Option<f64>,

        /// Cadence in milliseconds.
        #[arg(long)]
        tick_ms: Option<f64>,

        /// Stop after N ticks (0 runs until Ctrl+C).
        #[arg(short = 'n', long)]
        max_ticks: Option<u64>,

        /// Stress offset, clamped to [-0.05, 0.05].
        #[arg(long, allow_hyphen_values = true)]
        stress: Option<f64>,

        /// Kernel decay factor in (0, 1].
        #[arg(long)]
        decay: Option<f64>,

        /// Kernel sample weight.
        #[arg(long)]
        weight: Option<f64>,

        /// Seed for reproducible noise draws.
        #[arg(long)]
        seed: Option<u64>,

        /// Directory for the exported CSV.
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Export file name prefix.
        #[arg(long)]
        basename: Option<String>,

        /// Label shown in the manifest.
        #[arg(long)]
        manifest_id: Option<String>,

        /// Do not export records on exit.
        #[arg(long)]
        no_export: bool,
    },

    /// Verify the stamp chain of an exported CSV file.
    Verify {
        /// Path to the exported file.
        path: String,
    },

    /// Configuration commands.
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration.
    Show {
        /// Project directory.
        #[arg(short, long, default_value = ".")]
        project: String,

        /// Output format (text, toml, json).
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Validate configuration files.
    Validate {
        /// Project directory.
        #[arg(short, long, default_value = ".")]
        project: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let no_color = cli.no_color || std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    style::set_no_color(no_color);

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .init();

    match cli.command {
        Commands::Version => {
            commands::version::run();
            Ok(())
        }
        Commands::Init { path, force } => commands::init::run(&path, force),
        Commands::Run {
            project,
            tick_sec,
            tick_ms,
            max_ticks,
            stress,
            decay,
            weight,
            seed,
            out_dir,
            basename,
            manifest_id,
            no_export,
        } => commands::run::run(&RunOptions {
            project,
            tick_sec,
            tick_ms,
            max_ticks,
            stress,
            decay,
            weight,
            seed,
            out_dir,
            basename,
            manifest_id,
            no_export,
        }),
        Commands::Verify { path } => commands::verify::run(&path),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show { project, format } => commands::config::show(&project, &format),
            ConfigCommands::Validate { project } => commands::config::validate(&project),
        },
    }
}

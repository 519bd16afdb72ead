//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "hover", version, about = "Hovercraft altitude-hold controller")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/hover.toml")]
    pub config: PathBuf,

    /// Log as JSON lines and print results as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the altitude-hold loop until Ctrl-C (or for a fixed number of cycles)
    Run {
        /// Stop after this many control cycles
        #[arg(long, value_name = "N")]
        cycles: Option<u64>,
        /// Suppress the per-cycle status display
        #[arg(long, action = ArgAction::SetTrue)]
        quiet: bool,
    },
    /// Validate config, build the rig and run a single cycle
    SelfCheck,
}

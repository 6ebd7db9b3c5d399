//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

pub fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}

#[derive(Parser, Debug)]
#[command(name = "carafe", version, about = "Coffee station: who drank which mug")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/carafe.toml")]
    pub config: PathBuf,

    /// Log and report as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); takes precedence over RUST_LOG
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the station until interrupted (Ctrl-C)
    Run {
        /// Simulated scale, console display and keyboard commands on stdin
        #[arg(long, action = ArgAction::SetTrue)]
        sim: bool,
    },
    /// Quick health check: the scale answers and the ledger opens
    SelfCheck,
    /// Print mug totals from the ledger
    Stats {
        /// Only this person button (0..15)
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(0..16))]
        button: Option<u8>,
    },
}

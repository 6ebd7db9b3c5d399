mod cli;
mod error_fmt;
mod logging;
mod report;
mod station;

use crate::cli::{Cli, Commands, JSON_MODE, json_mode};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use carafe_core::StationError;
use clap::Parser;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn main() {
    // Fancy reports for anything that escapes our own formatting
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = real_main(cli) {
        tracing::error!(error = %err, "command failed");
        if json_mode() {
            println!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let cfg = carafe_config::load_file(&cli.config)
        .map_err(|e| StationError::Config(format!("{e:#}")));
    // Log even when the config is broken, just without the file sink
    logging::init(
        cli.json,
        cli.log_level.as_deref(),
        cfg.as_ref().ok().map(|c| &c.logging),
    )?;
    let cfg = cfg?;
    tracing::debug!(config = %cli.config.display(), "configuration loaded");

    match cli.cmd {
        Commands::Run { sim } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let flag = shutdown.clone();
                ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))?;
            }
            // Test hook: stop on our own after N ms
            if let Some(ms) = std::env::var("CARAFE_TEST_RUN_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
            {
                let flag = shutdown.clone();
                std::thread::spawn(move || {
                    std::thread::sleep(Duration::from_millis(ms));
                    flag.store(true, Ordering::Relaxed);
                });
            }
            station::run(&cfg, sim, &shutdown)
        }
        Commands::SelfCheck => report::self_check(&cfg),
        Commands::Stats { button } => report::stats(&cfg, button),
    }
}

//! Console and optional rolling-file log sinks.

use crate::cli::FILE_GUARD;
use carafe_config::Logging;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Console level: `--log-level`, then `RUST_LOG`, then `[logging] level`, then info.
fn console_filter(cli_level: Option<&str>, cfg: Option<&Logging>) -> eyre::Result<EnvFilter> {
    if let Some(level) = cli_level {
        return Ok(EnvFilter::try_new(level)?);
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let level = cfg.and_then(|c| c.level.as_deref()).unwrap_or("info");
    Ok(EnvFilter::try_new(level)?)
}

fn rotation(cfg: &Logging) -> Rotation {
    match cfg.rotation.as_deref() {
        Some("daily") => Rotation::DAILY,
        Some("hourly") => Rotation::HOURLY,
        _ => Rotation::NEVER,
    }
}

/// JSON lines into `[logging] file`, rotated per `[logging] rotation`.
fn file_layer(cfg: &Logging) -> eyre::Result<Option<BoxedLayer>> {
    let Some(file) = cfg.file.as_deref() else {
        return Ok(None);
    };
    let path = Path::new(file);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| eyre::eyre!("logging.file {file:?} has no file name"))?;
    let appender = RollingFileAppender::builder()
        .rotation(rotation(cfg))
        .filename_prefix(name.to_string_lossy().into_owned())
        .build(dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);
    // Keep the worker alive for the whole process so buffered lines get flushed
    let _ = FILE_GUARD.set(guard);
    let level = cfg.level.as_deref().unwrap_or("info");
    Ok(Some(
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(EnvFilter::try_new(level)?)
            .boxed(),
    ))
}

/// Install the global subscriber. Console output goes to stderr so stdout
/// stays free for reports and the simulated display.
pub fn init(json: bool, cli_level: Option<&str>, cfg: Option<&Logging>) -> eyre::Result<()> {
    let filter = console_filter(cli_level, cfg)?;
    let console: BoxedLayer = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    };
    let mut layers = vec![console];
    if let Some(file) = cfg.map(file_layer).transpose()?.flatten() {
        layers.push(file);
    }
    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(())
}

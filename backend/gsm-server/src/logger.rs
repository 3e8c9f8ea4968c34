use crate::error::{Result as ServerErrorResult, ServerError};

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback, Output};
use log::{LevelFilter, Record, info};

/// Install the global fern logger.
///
/// Lines go to `log_file` when set (never colored), otherwise to stdout.
/// Supervisor and backup spans reach this sink through the `log` feature of
/// `tracing`.
pub fn initialize(
    log_level: gsm_config::LogLevel,
    log_file: Option<PathBuf>,
    colored: bool,
) -> ServerErrorResult<()> {
    let level_filter = log_level.0;

    let (sink, colors): (Output, _) = match &log_file {
        Some(path) => (open_log_file(path)?.into(), None),
        None => (std::io::stdout().into(), colored.then(level_colors)),
    };

    Dispatch::new()
        .level(level_filter)
        .level_for("sqlx", LevelFilter::Warn)
        .format(move |out, message, record| match &colors {
            Some(colors) => write_line(out, message, record, colors.color(record.level())),
            None => write_line(out, message, record, record.level()),
        })
        .chain(sink)
        .apply()
        .map_err(|e| ServerError::Logger {
            message: e.to_string(),
        })?;

    let destination = log_file
        .as_deref()
        .map_or_else(|| "stdout".to_string(), |p| p.display().to_string());
    info!("Logging at {:?} to {}", level_filter, destination);

    Ok(())
}

/// Open `path` for appending, creating it and its directory if needed.
pub(crate) fn open_log_file(path: &Path) -> ServerErrorResult<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ServerError::Logger {
            message: format!("cannot open {}: {}", path.display(), e),
        })
}

fn level_colors() -> ColoredLevelConfig {
    ColoredLevelConfig::new()
        .trace(Color::Magenta)
        .debug(Color::Blue)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red)
}

fn write_line(
    out: FormatCallback<'_>,
    message: &fmt::Arguments<'_>,
    record: &Record<'_>,
    level: impl fmt::Display,
) {
    out.finish(format_args!(
        "[{} - {}] {} [{}:{}]",
        humantime::format_rfc3339_millis(SystemTime::now()),
        level,
        message,
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0),
    ))
}

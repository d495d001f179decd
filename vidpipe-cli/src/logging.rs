// ============================================================================
// vidpipe-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: fern dispatch for the vidpipe binary
//
// The core library logs through the `log` facade only. This module installs
// the backend: colored, level-tagged lines on stderr and, when requested, a
// plain copy of every line in a log file.
//
// KEY COMPONENTS:
// - init_logging: installs the global fern dispatcher
// - get_timestamp: timestamp used for log file names and summaries

// ---- Internal crate imports ----
use crate::error::{CliErrorContext, CliResult};

// ---- External crate imports ----
use console::style;
use log::{Level, LevelFilter};

// ---- Standard library imports ----
use std::path::Path;

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let log_filename = format!("vidpipe_{}.log", vidpipe_cli::logging::get_timestamp());
/// assert!(log_filename.starts_with("vidpipe_"));
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

fn colored_level(level: Level) -> String {
    let tag = format!("{:<5}", level);
    match level {
        Level::Error => style(tag).red().bold().to_string(),
        Level::Warn => style(tag).yellow().to_string(),
        Level::Info => style(tag).green().to_string(),
        Level::Debug => style(tag).cyan().to_string(),
        Level::Trace => style(tag).dim().to_string(),
    }
}

/// Installs the global logger.
///
/// Console lines go to stderr so that stdout stays free for summaries and
/// JSON progress. The log file, if any, receives every line at `level`
/// without color codes.
pub fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> CliResult<()> {
    let console = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {} {}",
                chrono::Local::now().format("%H:%M:%S"),
                colored_level(record.level()),
                message
            ))
        })
        .chain(std::io::stderr());

    let mut dispatch = fern::Dispatch::new()
        .level(level)
        // ffmpeg-sidecar's own download/probe chatter is not useful here
        .level_for("ffmpeg_sidecar", LevelFilter::Warn)
        .chain(console);

    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .cli_with_context(|| format!("Failed to create log directory '{}'", parent.display()))?;
        }
        let file = fern::log_file(path)
            .cli_with_context(|| format!("Failed to open log file '{}'", path.display()))?;
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{} [{}] {}: {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                        record.level(),
                        record.target(),
                        message
                    ))
                })
                .chain(file),
        );
    }

    dispatch
        .apply()
        .map_err(|e| vidpipe_core::CoreError::OperationFailed(format!("Failed to initialize logging: {e}")))
}

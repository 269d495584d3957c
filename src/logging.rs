// src/logging.rs

use crate::error::{SpiderError, SpiderResult};
use log::LevelFilter;
use std::path::Path;

pub const LOG_FILE: &str = "download.log";

/// Send log records to stdout and append them to `log_file`.
///
/// If the file cannot be opened, logging continues on stdout only.
pub fn init(log_file: &Path, level: LevelFilter) -> SpiderResult<()> {
    let mut dispatch = fern::Dispatch::new()
        .level(level)
        .level_for("thirtyfour", LevelFilter::Warn)
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message
            ))
        })
        .chain(std::io::stdout());

    match fern::log_file(log_file) {
        Ok(file) => dispatch = dispatch.chain(file),
        Err(e) => eprintln!(
            "Warning: could not open log file {}: {e}. Logging to stdout only.",
            log_file.display()
        ),
    }

    dispatch
        .apply()
        .map_err(|e| SpiderError::Logger(e.to_string()))
}

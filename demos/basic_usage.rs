//! Basic usage: one logger, three tier files.
//!
//! Run with `cargo run --example basic_usage`, then look for
//! `test.debug.*.log`, `test.info.*.log` and `test.error.*.log` in the
//! working directory.

use std::time::Duration;
use tiered_logger::{global, info, Fields, LogLevel, Logger, Result};

fn main() -> Result<()> {
    let logger = Logger::new(LogLevel::Debug, "test.log")?;

    logger.debug("Debug Test")?;
    logger.info("Info Test")?;
    logger.error("Error Test")?;

    logger.warnf(format_args!("{} of {} workers idle", 3, 8))?;
    logger.info_with_fields(
        "request served",
        Fields::new()
            .with_field("status", 200)
            .with_field("path", "/health"),
    )?;
    info!(logger; "values", "are", "space", "joined")?;

    // Hourly files kept for three days, under the process-wide default logger
    let hourly = Logger::builder()
        .threshold(LogLevel::Info)
        .path("hourly.log")
        .rotation_period(Duration::from_secs(3600))
        .max_age(Duration::from_secs(3 * 24 * 3600))
        .build()?;
    global::install(hourly);
    global::info("hello from the default logger")?;

    logger.flush()
}

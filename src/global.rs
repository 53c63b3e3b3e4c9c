//! Process-wide default logger
//!
//! Optional convenience for programs that want one logger reachable from
//! anywhere. Everything here delegates to a [`Logger`] installed with
//! [`init`], [`install`] or [`try_init`].
//!
//! ```no_run
//! use tiered_logger::{global, LogLevel};
//!
//! global::init(LogLevel::Debug, "test.log").unwrap();
//! global::info("Info Test").unwrap();
//! global::errorf(format_args!("{} failures", 3)).unwrap();
//! ```

use crate::core::{ClockMode, Fields, Formatter, LogLevel, Logger, LoggerError, Result};
use parking_lot::RwLock;
use std::fmt;
use std::panic::Location;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

static LOGGER: OnceLock<RwLock<Logger>> = OnceLock::new();

/// Open a logger at `path` and make it the default, replacing any previous one.
///
/// # Errors
///
/// Returns `SinkOpen` if a tier file cannot be opened. The previous default,
/// if any, stays installed.
pub fn init(level: LogLevel, path: impl AsRef<Path>) -> Result<()> {
    install(Logger::new(level, path)?);
    Ok(())
}

/// Make `logger` the default, replacing any previous one.
pub fn install(logger: Logger) {
    if let Err(rejected) = LOGGER.set(RwLock::new(logger)) {
        if let Some(lock) = LOGGER.get() {
            *lock.write() = rejected.into_inner();
        }
    }
}

/// Make `logger` the default unless one is already installed.
///
/// # Errors
///
/// Returns `InvalidConfiguration` when a default logger already exists.
pub fn try_init(logger: Logger) -> Result<()> {
    LOGGER.set(RwLock::new(logger)).map_err(|_| {
        LoggerError::config("global logger", "a default logger is already installed")
    })
}

pub fn is_initialized() -> bool {
    LOGGER.get().is_some()
}

fn not_initialized() -> LoggerError {
    LoggerError::config("global logger", "no default logger installed")
}

/// Run `f` with shared access to the default logger.
pub fn with_logger<R>(f: impl FnOnce(&Logger) -> R) -> Result<R> {
    let lock = LOGGER.get().ok_or_else(not_initialized)?;
    let logger = lock.read();
    Ok(f(&logger))
}

/// Run `f` with exclusive access to the default logger, for reconfiguration.
pub fn with_logger_mut<R>(f: impl FnOnce(&mut Logger) -> R) -> Result<R> {
    let lock = LOGGER.get().ok_or_else(not_initialized)?;
    let mut logger = lock.write();
    Ok(f(&mut logger))
}

#[track_caller]
fn log_here(level: LogLevel, message: impl fmt::Display, fields: Fields) -> Result<()> {
    let call_site = Location::caller();
    with_logger(|logger| logger.log_at(level, message, fields, call_site))?
}

#[track_caller]
pub fn log(level: LogLevel, message: impl fmt::Display) -> Result<()> {
    log_here(level, message, Fields::new())
}

#[track_caller]
pub fn log_with_fields(level: LogLevel, message: impl fmt::Display, fields: Fields) -> Result<()> {
    log_here(level, message, fields)
}

#[track_caller]
pub fn debug(message: impl fmt::Display) -> Result<()> {
    log_here(LogLevel::Debug, message, Fields::new())
}

#[track_caller]
pub fn info(message: impl fmt::Display) -> Result<()> {
    log_here(LogLevel::Info, message, Fields::new())
}

#[track_caller]
pub fn warn(message: impl fmt::Display) -> Result<()> {
    log_here(LogLevel::Warn, message, Fields::new())
}

#[track_caller]
pub fn error(message: impl fmt::Display) -> Result<()> {
    log_here(LogLevel::Error, message, Fields::new())
}

#[track_caller]
pub fn fatal(message: impl fmt::Display) -> Result<()> {
    log_here(LogLevel::Fatal, message, Fields::new())
}

#[track_caller]
pub fn panic(message: impl fmt::Display) -> Result<()> {
    log_here(LogLevel::Panic, message, Fields::new())
}

#[track_caller]
pub fn debugf(args: fmt::Arguments<'_>) -> Result<()> {
    log_here(LogLevel::Debug, args, Fields::new())
}

#[track_caller]
pub fn infof(args: fmt::Arguments<'_>) -> Result<()> {
    log_here(LogLevel::Info, args, Fields::new())
}

#[track_caller]
pub fn warnf(args: fmt::Arguments<'_>) -> Result<()> {
    log_here(LogLevel::Warn, args, Fields::new())
}

#[track_caller]
pub fn errorf(args: fmt::Arguments<'_>) -> Result<()> {
    log_here(LogLevel::Error, args, Fields::new())
}

#[track_caller]
pub fn fatalf(args: fmt::Arguments<'_>) -> Result<()> {
    log_here(LogLevel::Fatal, args, Fields::new())
}

#[track_caller]
pub fn panicf(args: fmt::Arguments<'_>) -> Result<()> {
    log_here(LogLevel::Panic, args, Fields::new())
}

pub fn set_threshold(level: LogLevel) -> Result<()> {
    with_logger_mut(|logger| logger.set_threshold(level))
}

/// Render the default logger's records with `formatter` from now on.
pub fn set_formatter<F: Formatter + 'static>(formatter: F) -> Result<()> {
    with_logger_mut(|logger| logger.set_formatter(formatter))
}

pub fn set_caller_skip(skip: usize) -> Result<()> {
    with_logger_mut(|logger| logger.set_caller_skip(skip))
}

pub fn set_max_age(max_age: Duration) -> Result<()> {
    with_logger_mut(|logger| logger.set_max_age(max_age))
}

pub fn set_rotation_period(period: Duration) -> Result<()> {
    with_logger_mut(|logger| logger.set_rotation_period(period))
}

pub fn set_clock(clock: ClockMode) -> Result<()> {
    with_logger_mut(|logger| logger.set_clock(clock))
}

pub fn set_console(enabled: bool) -> Result<()> {
    with_logger_mut(|logger| logger.set_console(enabled))
}

/// Reopen the default logger's tier files under `path`.
pub fn reopen_sinks(path: impl AsRef<Path>) -> Result<()> {
    with_logger_mut(|logger| logger.reopen_sinks(path))?
}

pub fn flush() -> Result<()> {
    with_logger(|logger| logger.flush())?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::JsonFormatter;
    use crate::sinks::MemorySink;
    use std::sync::Arc;

    // The default logger is process-wide, so the whole lifecycle is one test.
    #[test]
    fn test_default_logger_lifecycle() {
        assert!(info("before init").is_err());

        let first = Arc::new(MemorySink::new("info"));
        let logger = Logger::builder()
            .sinks(
                Arc::new(MemorySink::new("error")),
                first.clone(),
                Arc::new(MemorySink::new("debug")),
            )
            .console(false)
            .build()
            .unwrap();
        try_init(logger).unwrap();
        assert!(is_initialized());

        let line = line!() + 1;
        info("from anywhere").unwrap();
        let lines = first.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains(&format!("{}:{}", file!(), line)), "{}", lines[0]);

        set_threshold(LogLevel::Error).unwrap();
        warn("filtered").unwrap();
        assert_eq!(first.len(), 1);

        // A second try_init is refused, install replaces
        let second = Arc::new(MemorySink::new("error"));
        let replacement = Logger::builder()
            .sinks(
                second.clone(),
                Arc::new(MemorySink::new("info")),
                Arc::new(MemorySink::new("debug")),
            )
            .console(false)
            .build()
            .unwrap();
        let rejected = Logger::builder()
            .sinks(
                Arc::new(MemorySink::new("error")),
                Arc::new(MemorySink::new("info")),
                Arc::new(MemorySink::new("debug")),
            )
            .console(false)
            .build()
            .unwrap();
        assert!(try_init(rejected).is_err());
        install(replacement);

        errorf(format_args!("code {}", 7)).unwrap();
        assert!(second.lines()[0].ends_with(" code 7"));
        assert_eq!(with_logger(|logger| logger.threshold()).unwrap(), LogLevel::Info);

        set_formatter(JsonFormatter::new()).unwrap();
        error("as json").unwrap();
        let value: serde_json::Value = serde_json::from_str(&second.lines()[1]).unwrap();
        assert_eq!(value["msg"], "as json");
        assert_eq!(with_logger(|logger| logger.formatter().name().to_string()).unwrap(), "json");
    }
}

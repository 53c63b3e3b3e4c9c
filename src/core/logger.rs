//! Leveled logging facade
//!
//! A [`Logger`] gates each call against its threshold, attributes it to the
//! caller's source location, renders it with its formatter and hands the line
//! to the [`TierRouter`], which writes it to the tier file for its level.

use super::{
    caller,
    config::RotationConfig,
    error::Result,
    fields::Fields,
    formatter::{Formatter, JsonFormatter, TextFormatter},
    log_level::LogLevel,
    log_record::{LogRecord, CALLER_FIELD},
    metrics::LoggerMetrics,
    router::{strip_log_suffix, TierRouter},
    sink::Sink,
    timestamp::{ClockMode, TimestampFormat},
};
use crate::sinks::{system_time_source, TimeSource};
use std::fmt;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Invoked with exit code 1 after a fatal record has been written.
pub type ExitHandler = fn(i32) -> !;

fn exit_process(code: i32) -> ! {
    std::process::exit(code)
}

/// Logger writing to three rotating tier files
///
/// # Examples
///
/// ```no_run
/// use tiered_logger::{Fields, LogLevel, Logger};
///
/// let logger = Logger::new(LogLevel::Debug, "/var/log/app.log")?;
///
/// logger.debug("cache warmed")?;                     // app.debug.<stamp>.log
/// logger.warnf(format_args!("{} retries left", 2))?; // app.info.<stamp>.log
/// logger.error_with_fields(
///     "upload failed",
///     Fields::new().with_field("bucket", "photos"),
/// )?;                                               // app.error.<stamp>.log
/// # Ok::<(), tiered_logger::LoggerError>(())
/// ```
pub struct Logger {
    threshold: LogLevel,
    formatter: Box<dyn Formatter>,
    caller_skip: usize,
    rotation: RotationConfig,
    base_path: Option<PathBuf>,
    router: TierRouter,
    console_colors: bool,
    time_source: TimeSource,
    metrics: Arc<LoggerMetrics>,
    exit_handler: ExitHandler,
}

impl Logger {
    /// Open a logger at `path` with default rotation and a text formatter.
    ///
    /// A trailing `.log` is dropped from `path`, so `/var/log/app.log` writes
    /// `/var/log/app.{error,info,debug}.<stamp>.log`.
    ///
    /// # Errors
    ///
    /// Returns `SinkOpen` if any tier file cannot be opened.
    pub fn new(level: LogLevel, path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().threshold(level).path(path).build()
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Whether a record at `level` would be written.
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.threshold
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl fmt::Display) -> Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        self.emit(level, message.to_string(), Fields::new(), Location::caller())
    }

    /// Log preformatted arguments. Nothing is rendered when `level` is disabled.
    #[track_caller]
    pub fn logf(&self, level: LogLevel, args: fmt::Arguments<'_>) -> Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        self.emit(level, args.to_string(), Fields::new(), Location::caller())
    }

    #[track_caller]
    pub fn log_with_fields(
        &self,
        level: LogLevel,
        message: impl fmt::Display,
        fields: Fields,
    ) -> Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        self.emit(level, message.to_string(), fields, Location::caller())
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) -> Result<()> {
        self.log(LogLevel::Debug, message)
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) -> Result<()> {
        self.log(LogLevel::Info, message)
    }

    #[inline]
    #[track_caller]
    pub fn warn(&self, message: impl fmt::Display) -> Result<()> {
        self.log(LogLevel::Warn, message)
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) -> Result<()> {
        self.log(LogLevel::Error, message)
    }

    /// Write the record, then call the exit handler with code 1.
    ///
    /// Returns only when `Fatal` is below the threshold.
    #[inline]
    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) -> Result<()> {
        self.log(LogLevel::Fatal, message)
    }

    /// Write the record, then panic with its message.
    ///
    /// Returns only when `Panic` is below the threshold.
    #[inline]
    #[track_caller]
    pub fn panic(&self, message: impl fmt::Display) -> Result<()> {
        self.log(LogLevel::Panic, message)
    }

    #[inline]
    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.logf(LogLevel::Debug, args)
    }

    #[inline]
    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.logf(LogLevel::Info, args)
    }

    #[inline]
    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.logf(LogLevel::Warn, args)
    }

    #[inline]
    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.logf(LogLevel::Error, args)
    }

    #[inline]
    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.logf(LogLevel::Fatal, args)
    }

    #[inline]
    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments<'_>) -> Result<()> {
        self.logf(LogLevel::Panic, args)
    }

    #[inline]
    #[track_caller]
    pub fn debug_with_fields(&self, message: impl fmt::Display, fields: Fields) -> Result<()> {
        self.log_with_fields(LogLevel::Debug, message, fields)
    }

    #[inline]
    #[track_caller]
    pub fn info_with_fields(&self, message: impl fmt::Display, fields: Fields) -> Result<()> {
        self.log_with_fields(LogLevel::Info, message, fields)
    }

    #[inline]
    #[track_caller]
    pub fn warn_with_fields(&self, message: impl fmt::Display, fields: Fields) -> Result<()> {
        self.log_with_fields(LogLevel::Warn, message, fields)
    }

    #[inline]
    #[track_caller]
    pub fn error_with_fields(&self, message: impl fmt::Display, fields: Fields) -> Result<()> {
        self.log_with_fields(LogLevel::Error, message, fields)
    }

    #[inline]
    #[track_caller]
    pub fn fatal_with_fields(&self, message: impl fmt::Display, fields: Fields) -> Result<()> {
        self.log_with_fields(LogLevel::Fatal, message, fields)
    }

    #[inline]
    #[track_caller]
    pub fn panic_with_fields(&self, message: impl fmt::Display, fields: Fields) -> Result<()> {
        self.log_with_fields(LogLevel::Panic, message, fields)
    }

    /// Log on behalf of `call_site`, for wrappers that capture the location
    /// themselves.
    pub(crate) fn log_at(
        &self,
        level: LogLevel,
        message: impl fmt::Display,
        fields: Fields,
        call_site: &Location<'_>,
    ) -> Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        self.emit(level, message.to_string(), fields, call_site)
    }

    fn emit(
        &self,
        level: LogLevel,
        message: String,
        mut fields: Fields,
        call_site: &Location<'_>,
    ) -> Result<()> {
        let location = caller::resolve(call_site, self.caller_skip);
        fields.insert(CALLER_FIELD, location.to_string());

        let record = LogRecord::new(level, message)
            .with_timestamp((self.time_source)())
            .with_fields(fields);
        let written = self.dispatch(&record);

        match level {
            LogLevel::Fatal => self.exit_after(written),
            LogLevel::Panic => self.panic_after(written, &record.message),
            _ => written,
        }
    }

    fn dispatch(&self, record: &LogRecord) -> Result<()> {
        let written = self
            .formatter
            .format(record)
            .and_then(|line| self.router.route(record.level, &line));
        if written.is_ok() {
            self.metrics.record_logged();
        } else {
            self.metrics.record_dropped();
        }
        written
    }

    fn exit_after(&self, written: Result<()>) -> ! {
        if let Err(e) = written {
            eprintln!("[LOGGER ERROR] Failed to write fatal record: {}", e);
        }
        if let Err(e) = self.router.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush before exit: {}", e);
        }
        (self.exit_handler)(1)
    }

    fn panic_after(&self, written: Result<()>, message: &str) -> ! {
        if let Err(e) = written {
            eprintln!("[LOGGER ERROR] Failed to write panic record: {}", e);
        }
        self.flush_logged();
        panic!("{}", message)
    }

    pub fn threshold(&self) -> LogLevel {
        self.threshold
    }

    pub fn set_threshold(&mut self, level: LogLevel) {
        self.threshold = level;
    }

    pub fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    pub fn set_formatter<F: Formatter + 'static>(&mut self, formatter: F) {
        self.formatter = Box::new(formatter);
    }

    pub fn caller_skip(&self) -> usize {
        self.caller_skip
    }

    /// Attribute records to the frame `skip` levels above the logging call,
    /// for use behind wrapper functions.
    pub fn set_caller_skip(&mut self, skip: usize) {
        self.caller_skip = skip;
    }

    pub fn rotation(&self) -> &RotationConfig {
        &self.rotation
    }

    /// Replace the rotation settings. Open sinks keep their settings until
    /// [`reopen_sinks`](Self::reopen_sinks) is called.
    pub fn set_rotation(&mut self, rotation: RotationConfig) {
        self.rotation = rotation;
    }

    pub fn set_max_age(&mut self, max_age: Duration) {
        self.rotation.max_age = max_age;
    }

    pub fn set_rotation_period(&mut self, period: Duration) {
        self.rotation.rotation_period = period;
    }

    /// Clock for file name stamps, effective on the next
    /// [`reopen_sinks`](Self::reopen_sinks).
    ///
    /// Record timestamps are rendered by the formatter with its own clock,
    /// so pass a reconfigured formatter to [`set_formatter`](Self::set_formatter)
    /// to change those as well.
    pub fn set_clock(&mut self, clock: ClockMode) {
        self.rotation.clock = clock;
    }

    /// Reopen the three tier sinks under `path` with the current rotation
    /// settings. On failure the previous sinks stay in place.
    ///
    /// # Errors
    ///
    /// Returns `SinkOpen` or `InvalidConfiguration`.
    pub fn reopen_sinks(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let base = strip_log_suffix(path.as_ref());
        let mut router =
            TierRouter::open_with_time_source(&base, &self.rotation, Arc::clone(&self.time_source))?;
        if self.router.has_console() {
            router = router.with_console(self.console_colors);
        }
        // Lines already written stay where they are
        self.flush_logged();
        self.router = router;
        self.base_path = Some(base);
        Ok(())
    }

    /// Base path of the tier files, `None` when built from custom sinks
    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    pub fn console(&self) -> bool {
        self.router.has_console()
    }

    /// Echo every record to stderr in addition to its tier file.
    pub fn set_console(&mut self, enabled: bool) {
        let router = self.router.clone();
        self.router = if enabled {
            router.with_console(self.console_colors)
        } else {
            router.without_console()
        };
    }

    pub fn set_exit_handler(&mut self, handler: ExitHandler) {
        self.exit_handler = handler;
    }

    pub fn router(&self) -> &TierRouter {
        &self.router
    }

    /// Get logger metrics for observability
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn flush(&self) -> Result<()> {
        self.router.flush()
    }

    /// Flush where no caller can receive the error.
    fn flush_logged(&self) {
        if let Err(e) = self.router.flush() {
            eprintln!("[LOGGER WARN] Failed to flush log sinks: {}", e);
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("threshold", &self.threshold)
            .field("formatter", &self.formatter.name())
            .field("caller_skip", &self.caller_skip)
            .field("rotation", &self.rotation)
            .field("base_path", &self.base_path)
            .field("router", &self.router)
            .finish()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.flush_logged();
    }
}

/// Builder for configuring a [`Logger`]
///
/// # Examples
///
/// ```no_run
/// use tiered_logger::{ClockMode, LogLevel, Logger};
/// use std::time::Duration;
///
/// let logger = Logger::builder()
///     .threshold(LogLevel::Debug)
///     .path("/var/log/app.log")
///     .rotation_period(Duration::from_secs(3600))
///     .max_age(Duration::from_secs(3 * 24 * 3600))
///     .clock(ClockMode::Utc)
///     .console(false)
///     .build()
///     .unwrap();
/// ```
pub struct LoggerBuilder {
    threshold: LogLevel,
    path: Option<PathBuf>,
    router: Option<TierRouter>,
    rotation: RotationConfig,
    formatter: Option<Box<dyn Formatter>>,
    json: bool,
    timestamp_format: TimestampFormat,
    caller_skip: usize,
    console: bool,
    console_colors: bool,
    time_source: TimeSource,
    exit_handler: ExitHandler,
}

impl LoggerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            threshold: LogLevel::default(),
            path: None,
            router: None,
            rotation: RotationConfig::default(),
            formatter: None,
            json: false,
            timestamp_format: TimestampFormat::default(),
            caller_skip: 0,
            console: true,
            console_colors: false,
            time_source: system_time_source(),
            exit_handler: exit_process,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn threshold(mut self, level: LogLevel) -> Self {
        self.threshold = level;
        self
    }

    /// Base path of the tier files. A trailing `.log` is dropped.
    #[must_use = "builder methods return a new value"]
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use caller-supplied tier sinks instead of rotating files.
    #[must_use = "builder methods return a new value"]
    pub fn sinks(
        mut self,
        error: Arc<dyn Sink>,
        info: Arc<dyn Sink>,
        debug: Arc<dyn Sink>,
    ) -> Self {
        self.router = Some(TierRouter::new(error, info, debug));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn rotation(mut self, rotation: RotationConfig) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.rotation.max_age = max_age;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn rotation_period(mut self, period: Duration) -> Self {
        self.rotation.rotation_period = period;
        self
    }

    /// Clock for rotation stamps and for the default formatter's timestamps
    #[must_use = "builder methods return a new value"]
    pub fn clock(mut self, clock: ClockMode) -> Self {
        self.rotation.clock = clock;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_size(mut self, bytes: u64) -> Self {
        self.rotation.max_size = Some(bytes);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn compress(mut self, enabled: bool) -> Self {
        self.rotation.compress = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn formatter<F: Formatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Some(Box::new(formatter));
        self
    }

    /// Use [`JsonFormatter`] as the default formatter.
    #[must_use = "builder methods return a new value"]
    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }

    /// Timestamp layout for the default formatter
    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn caller_skip(mut self, skip: usize) -> Self {
        self.caller_skip = skip;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn console_colors(mut self, enabled: bool) -> Self {
        self.console_colors = enabled;
        self
    }

    /// Source of "now" for record timestamps and rotation decisions
    #[must_use = "builder methods return a new value"]
    pub fn time_source(mut self, time_source: TimeSource) -> Self {
        self.time_source = time_source;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn exit_handler(mut self, handler: ExitHandler) -> Self {
        self.exit_handler = handler;
        self
    }

    /// Open the tier sinks and build the logger.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` when neither a path nor sinks were
    /// given or the timestamp pattern is unknown to chrono, and `SinkOpen`
    /// when a tier file cannot be opened.
    pub fn build(self) -> Result<Logger> {
        self.rotation.validate()?;
        self.timestamp_format.validate()?;

        let (router, base_path) = match (self.router, self.path) {
            (Some(router), _) => (router, None),
            (None, Some(path)) => {
                let base = strip_log_suffix(&path);
                let router = TierRouter::open_with_time_source(
                    &base,
                    &self.rotation,
                    Arc::clone(&self.time_source),
                )?;
                (router, Some(base))
            }
            (None, None) => {
                return Err(super::error::LoggerError::config(
                    "LoggerBuilder",
                    "a log path or tier sinks must be provided",
                ))
            }
        };
        let router = if self.console {
            router.with_console(self.console_colors)
        } else {
            router
        };

        let clock = self.rotation.clock;
        let formatter: Box<dyn Formatter> = match self.formatter {
            Some(formatter) => formatter,
            None if self.json => Box::new(
                JsonFormatter::new()
                    .with_timestamp_format(self.timestamp_format)
                    .with_clock(clock),
            ),
            None => Box::new(
                TextFormatter::new()
                    .with_timestamp_format(self.timestamp_format)
                    .with_clock(clock),
            ),
        };

        Ok(Logger {
            threshold: self.threshold,
            formatter,
            caller_skip: self.caller_skip,
            rotation: self.rotation,
            base_path,
            router,
            console_colors: self.console_colors,
            time_source: self.time_source,
            metrics: Arc::new(LoggerMetrics::new()),
            exit_handler: self.exit_handler,
        })
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::LoggerError;
    use crate::sinks::MemorySink;
    use chrono::{TimeZone, Utc};
    use std::panic::{catch_unwind, AssertUnwindSafe};

    struct Sinks {
        error: Arc<MemorySink>,
        info: Arc<MemorySink>,
        debug: Arc<MemorySink>,
    }

    fn memory_logger(threshold: LogLevel) -> (Logger, Sinks) {
        let sinks = Sinks {
            error: Arc::new(MemorySink::new("error")),
            info: Arc::new(MemorySink::new("info")),
            debug: Arc::new(MemorySink::new("debug")),
        };
        let fixed = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).single().unwrap();
        let logger = Logger::builder()
            .threshold(threshold)
            .sinks(sinks.error.clone(), sinks.info.clone(), sinks.debug.clone())
            .clock(ClockMode::Utc)
            .console(false)
            .time_source(Arc::new(move || fixed))
            .exit_handler(exit_by_panicking)
            .build()
            .unwrap();
        (logger, sinks)
    }

    /// Sink whose writes always fail, as on a full disk
    struct FailingSink;

    impl Sink for FailingSink {
        fn write(&self, _level: LogLevel, _line: &[u8]) -> Result<()> {
            Err(LoggerError::io_operation(
                "writing log line",
                "Failed to write to 'app.error.log'",
                std::io::Error::new(std::io::ErrorKind::Other, "no space left on device"),
            ))
        }

        fn flush(&self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn failing_logger() -> Logger {
        Logger::builder()
            .threshold(LogLevel::Debug)
            .sinks(Arc::new(FailingSink), Arc::new(FailingSink), Arc::new(FailingSink))
            .console(false)
            .exit_handler(exit_by_panicking)
            .build()
            .unwrap()
    }

    fn exit_by_panicking(code: i32) -> ! {
        panic!("exit called with {code}")
    }

    fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
        payload
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
            .unwrap_or_default()
    }

    #[test]
    fn test_builder_requires_destination() {
        let err = Logger::builder().build().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_threshold_gates_records() {
        let (logger, sinks) = memory_logger(LogLevel::Warn);

        logger.debug("hidden").unwrap();
        logger.info("hidden").unwrap();
        logger.warn("shown").unwrap();
        logger.error("shown").unwrap();

        assert!(sinks.debug.is_empty());
        assert_eq!(sinks.info.len(), 1);
        assert_eq!(sinks.error.len(), 1);
        assert_eq!(logger.metrics().total_logged(), 2);
        assert!(!logger.enabled(LogLevel::Info));
    }

    #[test]
    fn test_line_layout_and_caller() {
        let (logger, sinks) = memory_logger(LogLevel::Debug);

        let line = line!() + 1;
        logger.info("Info Test").unwrap();

        let expected = format!("2025-01-08_10:30:45.000000 INFO {}:{} Info Test", file!(), line);
        assert_eq!(sinks.info.lines(), vec![expected]);
    }

    #[test]
    fn test_formatted_variant() {
        let (logger, sinks) = memory_logger(LogLevel::Debug);
        logger.errorf(format_args!("{} of {} failed", 3, 10)).unwrap();
        assert!(sinks.error.lines()[0].ends_with(" 3 of 10 failed"));
    }

    #[test]
    fn test_fields_are_key_ordered_and_caller_wins() {
        let (logger, sinks) = memory_logger(LogLevel::Debug);
        let fields = Fields::new()
            .with_field("user", "ana")
            .with_field("attempt", 2)
            .with_field(CALLER_FIELD, "spoofed.rs:1");

        let line = line!() + 1;
        logger.warn_with_fields("login", fields).unwrap();

        let expected = format!(
            "2025-01-08_10:30:45.000000 WARN 2 {}:{} ana login",
            file!(),
            line
        );
        assert_eq!(sinks.info.lines(), vec![expected]);
    }

    #[test]
    fn test_fatal_writes_then_exits() {
        let (logger, sinks) = memory_logger(LogLevel::Debug);

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let _ = logger.fatal("database unreachable");
        }));

        let message = panic_message(outcome.unwrap_err());
        assert_eq!(message, "exit called with 1");
        assert_eq!(sinks.error.levels(), vec![LogLevel::Fatal]);
        assert!(sinks.error.lines()[0].contains("FATL"));
        assert!(sinks.error.lines()[0].ends_with("database unreachable"));
    }

    #[test]
    fn test_panic_writes_then_panics() {
        let (logger, sinks) = memory_logger(LogLevel::Debug);

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let _ = logger.panic("invariant broken");
        }));

        assert_eq!(panic_message(outcome.unwrap_err()), "invariant broken");
        assert!(sinks.error.lines()[0].contains("PANC"));
    }

    #[test]
    fn test_write_failure_is_returned_and_counted() {
        let logger = failing_logger();

        let err = logger.error("lost record").unwrap_err();
        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert_eq!(logger.metrics().dropped_count(), 1);
        assert_eq!(logger.metrics().total_logged(), 0);

        assert!(logger.infof(format_args!("{} more", 1)).is_err());
        assert_eq!(logger.metrics().dropped_count(), 2);
    }

    #[test]
    fn test_fatal_exits_even_when_write_fails() {
        let logger = failing_logger();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let _ = logger.fatal("database unreachable");
        }));

        assert_eq!(panic_message(outcome.unwrap_err()), "exit called with 1");
        assert_eq!(logger.metrics().dropped_count(), 1);
    }

    #[test]
    fn test_panic_panics_even_when_write_fails() {
        let logger = failing_logger();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let _ = logger.panicf(format_args!("invariant {} broken", 7));
        }));

        assert_eq!(panic_message(outcome.unwrap_err()), "invariant 7 broken");
        assert_eq!(logger.metrics().dropped_count(), 1);
    }

    #[test]
    fn test_unknown_timestamp_specifier_fails_build() {
        let err = Logger::builder()
            .sinks(
                Arc::new(MemorySink::new("error")),
                Arc::new(MemorySink::new("info")),
                Arc::new(MemorySink::new("debug")),
            )
            .timestamp_format(TimestampFormat::Custom("%H:%Q".to_string()))
            .build()
            .unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_bad_formatter_pattern_drops_record() {
        let (mut logger, sinks) = memory_logger(LogLevel::Debug);
        logger.set_formatter(TextFormatter::new().with_custom_timestamp("%Q"));

        let err = logger.info("never rendered").unwrap_err();
        assert!(matches!(err, LoggerError::FormatterError { .. }));
        assert!(sinks.info.is_empty());
        assert_eq!(logger.metrics().dropped_count(), 1);
    }

    #[test]
    fn test_set_clock_leaves_record_timestamps_to_formatter() {
        let (mut logger, sinks) = memory_logger(LogLevel::Debug);

        logger.set_clock(ClockMode::Local);
        assert_eq!(logger.rotation().clock, ClockMode::Local);
        logger.info("still utc").unwrap();
        assert!(sinks.info.lines()[0].starts_with("2025-01-08_10:30:45.000000 INFO "));

        logger.set_formatter(
            TextFormatter::new()
                .with_clock(ClockMode::Utc)
                .with_custom_timestamp("%H:%M"),
        );
        logger.info("short").unwrap();
        assert!(sinks.info.lines()[1].starts_with("10:30 INFO "));
    }

    #[test]
    fn test_terminal_levels_below_threshold_do_nothing() {
        let (mut logger, sinks) = memory_logger(LogLevel::Debug);
        logger.set_threshold(LogLevel::Panic);

        assert!(logger.fatal("ignored").is_ok());
        assert!(sinks.error.is_empty());
    }

    #[test]
    fn test_reconfiguration() {
        let (mut logger, sinks) = memory_logger(LogLevel::Info);

        logger.set_threshold(LogLevel::Debug);
        logger.set_formatter(JsonFormatter::new().with_clock(ClockMode::Utc));
        logger.debug("now visible").unwrap();

        let value: serde_json::Value = serde_json::from_str(&sinks.debug.lines()[0]).unwrap();
        assert_eq!(value["msg"], "now visible");
        assert_eq!(value["level"], "debug");
        assert_eq!(logger.formatter().name(), "json");
    }

    #[test]
    fn test_reopen_sinks_moves_output() {
        let dir = tempfile::tempdir().unwrap();
        let (mut logger, sinks) = memory_logger(LogLevel::Debug);
        logger.set_rotation_period(Duration::from_secs(3600));

        logger.reopen_sinks(dir.path().join("moved.log")).unwrap();
        logger.info("to disk").unwrap();

        assert!(sinks.info.is_empty());
        assert_eq!(logger.base_path(), Some(dir.path().join("moved").as_path()));
        let info_file = dir.path().join("moved.info.2025-01-08-10.log");
        assert!(std::fs::read_to_string(info_file).unwrap().ends_with("to disk\n"));
    }

    #[test]
    fn test_failed_reopen_keeps_previous_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();
        let (mut logger, sinks) = memory_logger(LogLevel::Debug);

        let err = logger.reopen_sinks(blocker.join("app.log")).unwrap_err();
        assert!(err.is_sink_open());

        logger.info("still here").unwrap();
        assert_eq!(sinks.info.len(), 1);
    }

    #[test]
    fn test_console_toggle() {
        let (mut logger, _sinks) = memory_logger(LogLevel::Debug);
        assert!(!logger.console());
        logger.set_console(true);
        assert!(logger.console());
        logger.set_console(false);
        assert!(!logger.console());
    }
}

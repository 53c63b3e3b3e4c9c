//! # Tiered Logger
//!
//! Leveled logging into three time-rotated files per application.
//!
//! Records at six levels (Debug, Info, Warn, Error, Fatal, Panic) are routed
//! to one of three tier files derived from a base path:
//!
//! - `app.error.<stamp>.log` receives Error, Fatal and Panic
//! - `app.info.<stamp>.log` receives Info and Warn
//! - `app.debug.<stamp>.log` receives Debug
//!
//! Each tier rotates on a fixed period, keeps an `app.<tier>.log` alias on the
//! active file and prunes files past a retention age. Every record carries the
//! `file:line` of the logging call.
//!
//! ```no_run
//! use tiered_logger::{LogLevel, Logger};
//!
//! let logger = Logger::new(LogLevel::Debug, "test.log")?;
//! logger.debug("Debug Test")?;
//! logger.info("Info Test")?;
//! logger.error("Error Test")?;
//! # Ok::<(), tiered_logger::LoggerError>(())
//! ```

pub mod core;
pub mod global;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        ClockMode, FieldValue, Fields, Formatter, JsonFormatter, LogLevel, LogRecord, Logger,
        LoggerBuilder, LoggerConfig, LoggerError, Result, RotationConfig, Sink, TextFormatter,
        Tier, TimestampFormat,
    };
    pub use crate::sinks::{ConsoleSink, MemorySink, RotatingFileSink};
}

pub use crate::core::{
    CallerLocation, ClockMode, ExitHandler, FieldValue, Fields, Formatter, JsonFormatter,
    LogLevel, LogRecord, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics,
    OutputKind, Result, RotationConfig, Sink, TextFormatter, Tier, TierRouter, TimestampFormat,
    CALLER_FIELD,
};
pub use sinks::{system_time_source, ConsoleSink, MemorySink, RotatingFileSink, TimeSource};

//! Core logger types and traits

pub mod caller;
pub mod config;
pub mod error;
pub mod fields;
pub mod formatter;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod router;
pub mod sink;
pub mod timestamp;

pub use caller::CallerLocation;
pub use config::{LoggerConfig, OutputKind, RotationConfig};
pub use error::{LoggerError, Result};
pub use fields::{FieldValue, Fields};
pub use formatter::{Formatter, JsonFormatter, TextFormatter, DEFAULT_LOG_FORMAT};
pub use log_level::LogLevel;
pub use log_record::{LogRecord, CALLER_FIELD};
pub use logger::{ExitHandler, Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use router::{Tier, TierRouter};
pub use sink::Sink;
pub use timestamp::{ClockMode, TimestampFormat};

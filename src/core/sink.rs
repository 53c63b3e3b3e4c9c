//! Sink trait for log output destinations

use super::error::Result;
use super::log_level::LogLevel;

/// Destination for already formatted lines.
///
/// Sinks are shared between threads behind `Arc`, so implementations
/// synchronize internally. One `write` call carries exactly one line and
/// must not interleave with another call on the same sink.
pub trait Sink: Send + Sync {
    fn write(&self, level: LogLevel, line: &[u8]) -> Result<()>;
    fn flush(&self) -> Result<()>;
    fn name(&self) -> &str;
}

//! Record formatters
//!
//! A formatter turns one [`LogRecord`] into the bytes of one output line.
//! - `TextFormatter`: space-separated positional layout (default)
//! - `JsonFormatter`: one JSON object per line

use super::error::{LoggerError, Result};
use super::log_record::LogRecord;
use super::timestamp::{ClockMode, TimestampFormat};
use std::io::Write;

/// Template reported by [`TextFormatter::log_format`] when none is set.
pub const DEFAULT_LOG_FORMAT: &str = "[%lvl%]: %time% - %msg%";

/// Renders a record into a newline-terminated line
pub trait Formatter: Send + Sync {
    fn format(&self, record: &LogRecord) -> Result<Vec<u8>>;
    fn name(&self) -> &str;
}

/// Positional text layout: `<timestamp> <CODE> <field values...> <message>\n`
///
/// The template string is kept for reference only; placeholders such as
/// `%lvl%` are not substituted.
///
/// # Examples
///
/// ```
/// use tiered_logger::{ClockMode, Formatter, LogLevel, LogRecord, TextFormatter};
/// use chrono::{TimeZone, Utc};
///
/// let formatter = TextFormatter::new().with_clock(ClockMode::Utc);
/// let record = LogRecord::new(LogLevel::Info, "hello")
///     .with_timestamp(Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap())
///     .with_field("file", "src/main.rs:7");
///
/// let line = formatter.format(&record).unwrap();
/// assert_eq!(
///     String::from_utf8(line).unwrap(),
///     "2025-01-08_10:30:45.000000 INFO src/main.rs:7 hello\n"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct TextFormatter {
    log_format: String,
    timestamp_format: TimestampFormat,
    clock: ClockMode,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            log_format: DEFAULT_LOG_FORMAT.to_string(),
            timestamp_format: TimestampFormat::default(),
            clock: ClockMode::default(),
        }
    }
}

impl TextFormatter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_log_format(mut self, template: impl Into<String>) -> Self {
        self.log_format = template.into();
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Set a custom timestamp format using a strftime-compatible format string
    #[must_use]
    pub fn with_custom_timestamp(mut self, format_str: &str) -> Self {
        self.timestamp_format = TimestampFormat::Custom(format_str.to_string());
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: ClockMode) -> Self {
        self.clock = clock;
        self
    }

    pub fn log_format(&self) -> &str {
        &self.log_format
    }

    pub fn timestamp_format(&self) -> &TimestampFormat {
        &self.timestamp_format
    }

    pub fn clock(&self) -> ClockMode {
        self.clock
    }

    fn append(buf: &mut Vec<u8>, value: &str) -> std::io::Result<()> {
        if !buf.is_empty() {
            buf.write_all(b" ")?;
        }
        write_escaped(buf, value)
    }
}

/// Escape line breaks and tabs so that one record stays on one line.
fn write_escaped(buf: &mut Vec<u8>, value: &str) -> std::io::Result<()> {
    let mut start = 0;
    for (idx, ch) in value.char_indices() {
        let escaped: &[u8] = match ch {
            '\n' => b"\\n",
            '\r' => b"\\r",
            '\t' => b"\\t",
            _ => continue,
        };
        buf.write_all(value[start..idx].as_bytes())?;
        buf.write_all(escaped)?;
        start = idx + ch.len_utf8();
    }
    buf.write_all(value[start..].as_bytes())
}

impl Formatter for TextFormatter {
    fn format(&self, record: &LogRecord) -> Result<Vec<u8>> {
        let timestamp = self.timestamp_format.format(&record.timestamp, self.clock)?;
        let mut buf = Vec::with_capacity(64 + record.message.len());

        let render = |buf: &mut Vec<u8>| -> std::io::Result<()> {
            Self::append(buf, &timestamp)?;
            Self::append(buf, record.level.code())?;

            for value in record.fields.values() {
                Self::append(buf, &value.to_string())?;
            }

            if !record.message.is_empty() {
                Self::append(buf, &record.message)?;
            }

            buf.write_all(b"\n")
        };

        render(&mut buf).map_err(|e| LoggerError::formatter("text", e.to_string()))?;
        Ok(buf)
    }

    fn name(&self) -> &str {
        "text"
    }
}

/// One JSON object per line with `time`, `level`, `msg` and the fields
///
/// A field whose key collides with one of the reserved keys is written as
/// `fields.<key>`.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    timestamp_format: TimestampFormat,
    clock: ClockMode,
}

impl JsonFormatter {
    const RESERVED: [&'static str; 3] = ["time", "level", "msg"];

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: ClockMode) -> Self {
        self.clock = clock;
        self
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &LogRecord) -> Result<Vec<u8>> {
        let mut json_obj = serde_json::Map::new();

        for (key, value) in record.fields.iter() {
            let key = if Self::RESERVED.contains(&key.as_str()) {
                format!("fields.{}", key)
            } else {
                key.clone()
            };
            json_obj.insert(key, value.to_json_value());
        }

        json_obj.insert(
            "time".to_string(),
            serde_json::Value::String(self.timestamp_format.format(&record.timestamp, self.clock)?),
        );
        json_obj.insert(
            "level".to_string(),
            serde_json::Value::String(record.level.to_str().to_lowercase()),
        );
        json_obj.insert(
            "msg".to_string(),
            serde_json::Value::String(record.message.clone()),
        );

        let mut buf = serde_json::to_vec(&serde_json::Value::Object(json_obj))?;
        buf.push(b'\n');
        Ok(buf)
    }

    fn name(&self) -> &str {
        "json"
    }
}

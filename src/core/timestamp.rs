//! Timestamp formatting and wall-clock selection
//!
//! `ClockMode` picks the time zone used both for rendering record timestamps
//! and for stamping rotated file names. `TimestampFormat` picks the layout.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::str::FromStr;

/// Default record timestamp layout, microsecond precision.
pub const DEFAULT_TIMESTAMP_LAYOUT: &str = "%Y-%m-%d_%H:%M:%S%.6f";

/// Wall clock used for rendering times
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    Utc,
    #[default]
    Local,
}

impl ClockMode {
    /// Render `datetime` with a strftime pattern in this clock's time zone.
    ///
    /// # Errors
    ///
    /// Returns `FormatterError` when `pattern` holds an unknown specifier.
    pub fn format(&self, datetime: &DateTime<Utc>, pattern: &str) -> Result<String> {
        let mut rendered = String::with_capacity(pattern.len() + 16);
        let written = match self {
            ClockMode::Utc => write!(rendered, "{}", datetime.format(pattern)),
            ClockMode::Local => write!(rendered, "{}", datetime.with_timezone(&Local).format(pattern)),
        };
        written.map_err(|_| {
            LoggerError::formatter("timestamp", format!("invalid timestamp pattern '{pattern}'"))
        })?;
        Ok(rendered)
    }

    /// Offset from UTC in seconds at the given instant.
    #[must_use]
    pub fn offset_seconds(&self, datetime: &DateTime<Utc>) -> i64 {
        match self {
            ClockMode::Utc => 0,
            ClockMode::Local => i64::from(
                datetime
                    .with_timezone(&Local)
                    .offset()
                    .fix()
                    .local_minus_utc(),
            ),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClockMode::Utc => "utc",
            ClockMode::Local => "local",
        }
    }
}

impl fmt::Display for ClockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClockMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "utc" => Ok(ClockMode::Utc),
            "local" => Ok(ClockMode::Local),
            _ => Err(format!("Invalid clock mode: '{}'", s)),
        }
    }
}

/// Timestamp layout for rendered records
///
/// # Examples
///
/// ```
/// use tiered_logger::{ClockMode, TimestampFormat};
/// use chrono::{TimeZone, Utc};
///
/// let at = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// let rendered = TimestampFormat::default().format(&at, ClockMode::Utc)?;
/// assert_eq!(rendered, "2025-01-08_10:30:45.000000");
/// # Ok::<(), tiered_logger::LoggerError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `2025-01-08_10:30:45.123456`
    #[default]
    Micros,

    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123`
    Iso8601,

    /// RFC 3339 with offset: `2025-01-08T10:30:45.123456+00:00`
    Rfc3339,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Custom strftime format
    Custom(String),
}

impl TimestampFormat {
    /// Render `datetime` in `clock`'s time zone.
    ///
    /// # Errors
    ///
    /// Returns `FormatterError` for a `Custom` pattern chrono cannot render.
    pub fn format(&self, datetime: &DateTime<Utc>, clock: ClockMode) -> Result<String> {
        match self {
            TimestampFormat::Micros => clock.format(datetime, DEFAULT_TIMESTAMP_LAYOUT),
            TimestampFormat::Iso8601 => clock.format(datetime, "%Y-%m-%dT%H:%M:%S%.3f"),
            TimestampFormat::Rfc3339 => clock.format(datetime, "%Y-%m-%dT%H:%M:%S%.6f%:z"),
            TimestampFormat::UnixMillis => Ok(datetime.timestamp_millis().to_string()),
            TimestampFormat::Custom(format_str) => clock.format(datetime, format_str),
        }
    }

    /// Reject `Custom` patterns with specifiers chrono does not know.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` naming the pattern.
    pub fn validate(&self) -> Result<()> {
        let TimestampFormat::Custom(pattern) = self else {
            return Ok(());
        };
        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(LoggerError::config(
                "TimestampFormat",
                format!("invalid strftime pattern '{pattern}'"),
            ));
        }
        Ok(())
    }
}

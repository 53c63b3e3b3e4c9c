//! Log record structure

use super::fields::{FieldValue, Fields};
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Key under which the resolved caller location is stored.
pub const CALLER_FIELD: &str = "file";

/// A single record on its way from the facade to a formatter.
///
/// Records are built, rendered and dropped within one logging call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub fields: Fields,
}

impl LogRecord {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
            fields: Fields::new(),
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key, value);
        self
    }

    /// The `file:line` attribution, if the facade attached one.
    pub fn caller(&self) -> Option<&FieldValue> {
        self.fields.get(CALLER_FIELD)
    }
}

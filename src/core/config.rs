//! Logger and rotation configuration
//!
//! `RotationConfig` drives the per-tier rotating sinks. `LoggerConfig` is the
//! serializable form of a whole logger, loadable from JSON.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::logger::{Logger, LoggerBuilder};
use super::timestamp::{ClockMode, TimestampFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Files older than this are pruned when a new period opens.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Length of one rotation period.
pub const DEFAULT_ROTATION_PERIOD: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Time-based rotation and retention settings shared by all three tiers
///
/// # Examples
///
/// ```
/// use tiered_logger::{ClockMode, RotationConfig};
/// use std::time::Duration;
///
/// let config = RotationConfig::new()
///     .with_rotation_period(Duration::from_secs(3600))
///     .with_max_age(Duration::from_secs(3 * 24 * 3600))
///     .with_clock(ClockMode::Utc)
///     .with_compression(true);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationConfig {
    /// Maximum age of a retired file. Zero disables pruning.
    pub max_age: Duration,
    /// Length of one period; a new file is opened at each boundary.
    pub rotation_period: Duration,
    /// Wall clock used for period boundaries and file name stamps
    pub clock: ClockMode,
    /// Optional byte cap; a full file continues into a numbered generation
    pub max_size: Option<u64>,
    /// Gzip files once they are retired
    pub compress: bool,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_MAX_AGE,
            rotation_period: DEFAULT_ROTATION_PERIOD,
            clock: ClockMode::default(),
            max_size: None,
            compress: false,
        }
    }
}

impl RotationConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_rotation_period(mut self, period: Duration) -> Self {
        self.rotation_period = period;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_clock(mut self, clock: ClockMode) -> Self {
        self.clock = clock;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_size = Some(bytes);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    /// Reject settings the rotating sink cannot honour.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for a period shorter than one second or a
    /// zero size cap.
    pub fn validate(&self) -> Result<()> {
        if self.rotation_period.as_secs() == 0 {
            return Err(LoggerError::config(
                "RotationConfig",
                "rotation period must be at least one second",
            ));
        }
        if self.max_size == Some(0) {
            return Err(LoggerError::config(
                "RotationConfig",
                "max_size must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Line layout selected by [`LoggerConfig`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    #[default]
    Text,
    Json,
}

/// Serializable logger settings
///
/// Every field has a default, so a JSON document only needs the keys it
/// changes:
///
/// ```
/// use tiered_logger::{LogLevel, LoggerConfig};
///
/// let config = LoggerConfig::from_json_str(
///     r#"{ "level": "debug", "path": "/var/log/app.log", "rotation_period_secs": 3600 }"#,
/// ).unwrap();
///
/// assert_eq!(config.level, LogLevel::Debug);
/// assert_eq!(config.rotation().rotation_period.as_secs(), 3600);
/// assert_eq!(config.rotation().max_age.as_secs(), 86400);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub level: LogLevel,
    /// Base path; a trailing `.log` is stripped before tier names are added
    pub path: PathBuf,
    pub max_age_secs: u64,
    pub rotation_period_secs: u64,
    pub clock: ClockMode,
    pub max_size: Option<u64>,
    pub compress: bool,
    /// Echo every record to stderr as well
    pub console: bool,
    pub caller_skip: usize,
    pub format: OutputKind,
    pub timestamp_format: TimestampFormat,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            path: PathBuf::from("app.log"),
            max_age_secs: DEFAULT_MAX_AGE.as_secs(),
            rotation_period_secs: DEFAULT_ROTATION_PERIOD.as_secs(),
            clock: ClockMode::default(),
            max_size: None,
            compress: false,
            console: true,
            caller_skip: 0,
            format: OutputKind::default(),
            timestamp_format: TimestampFormat::default(),
        }
    }
}

impl LoggerConfig {
    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `JsonError` for malformed input and `InvalidConfiguration`
    /// when [`validate`](Self::validate) fails.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LoggerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading logger configuration",
                format!("Failed to read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(LoggerError::config("LoggerConfig", "path must not be empty"));
        }
        self.timestamp_format.validate()?;
        self.rotation().validate()
    }

    #[must_use]
    pub fn rotation(&self) -> RotationConfig {
        RotationConfig {
            max_age: Duration::from_secs(self.max_age_secs),
            rotation_period: Duration::from_secs(self.rotation_period_secs),
            clock: self.clock,
            max_size: self.max_size,
            compress: self.compress,
        }
    }

    /// A builder preloaded with these settings, for further customization.
    #[must_use]
    pub fn builder(&self) -> LoggerBuilder {
        let builder = Logger::builder()
            .threshold(self.level)
            .path(&self.path)
            .rotation(self.rotation())
            .caller_skip(self.caller_skip)
            .console(self.console)
            .timestamp_format(self.timestamp_format.clone());
        match self.format {
            OutputKind::Text => builder,
            OutputKind::Json => builder.json(),
        }
    }

    /// Open the three tier sinks and build the logger.
    ///
    /// # Errors
    ///
    /// Returns `SinkOpen` when a tier file cannot be opened.
    pub fn build(&self) -> Result<Logger> {
        self.validate()?;
        self.builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_defaults() {
        let config = RotationConfig::default();
        assert_eq!(config.max_age, Duration::from_secs(86_400));
        assert_eq!(config.rotation_period, Duration::from_secs(604_800));
        assert_eq!(config.clock, ClockMode::Local);
        assert_eq!(config.max_size, None);
        assert!(!config.compress);
    }

    #[test]
    fn test_rotation_validation() {
        let zero_period = RotationConfig::new().with_rotation_period(Duration::from_millis(500));
        assert!(zero_period.validate().is_err());

        let zero_size = RotationConfig::new().with_max_size(0);
        assert!(zero_size.validate().is_err());

        // Zero max age only disables pruning
        let no_pruning = RotationConfig::new().with_max_age(Duration::ZERO);
        assert!(no_pruning.validate().is_ok());
    }

    #[test]
    fn test_config_from_empty_json_uses_defaults() {
        let config = LoggerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, LoggerConfig::default());
        assert!(config.console);
    }

    #[test]
    fn test_config_rejects_empty_path() {
        let err = LoggerConfig::from_json_str(r#"{ "path": "" }"#).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_config_rejects_unknown_timestamp_specifier() {
        let err = LoggerConfig::from_json_str(r#"{ "timestamp_format": { "Custom": "%Y-%Q" } }"#)
            .unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("%Y-%Q"));
    }

    #[test]
    fn test_config_rejects_malformed_json() {
        let err = LoggerConfig::from_json_str("{ level: ").unwrap_err();
        assert!(matches!(err, LoggerError::JsonError(_)));
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logger.json");
        std::fs::write(
            &path,
            r#"{ "level": "warn", "clock": "utc", "max_size": 4096, "format": "json" }"#,
        )
        .unwrap();

        let config = LoggerConfig::from_json_file(&path).unwrap();
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.clock, ClockMode::Utc);
        assert_eq!(config.rotation().max_size, Some(4096));
        assert_eq!(config.format, OutputKind::Json);
    }

    #[test]
    fn test_missing_config_file() {
        let err = LoggerConfig::from_json_file("/nonexistent/logger.json").unwrap_err();
        assert!(matches!(err, LoggerError::IoOperation { .. }));
    }
}

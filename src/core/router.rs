//! Level-to-tier routing
//!
//! Six levels collapse onto three file tiers:
//!
//! | Levels               | Tier    |
//! |----------------------|---------|
//! | Panic, Fatal, Error  | `error` |
//! | Warn, Info           | `info`  |
//! | Debug                | `debug` |

use super::config::RotationConfig;
use super::error::Result;
use super::log_level::LogLevel;
use super::sink::Sink;
use crate::sinks::{system_time_source, ConsoleSink, RotatingFileSink, TimeSource};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One of the three output files of a logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Error,
    Info,
    Debug,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Error, Tier::Info, Tier::Debug];

    #[inline]
    pub fn for_level(level: LogLevel) -> Tier {
        match level {
            LogLevel::Panic | LogLevel::Fatal | LogLevel::Error => Tier::Error,
            LogLevel::Warn | LogLevel::Info => Tier::Info,
            LogLevel::Debug => Tier::Debug,
        }
    }

    /// Name used in file names: `<base>.<name>.<stamp>.log`
    pub fn name(&self) -> &'static str {
        match self {
            Tier::Error => "error",
            Tier::Info => "info",
            Tier::Debug => "debug",
        }
    }

    /// `<base>.<name>`, the prefix handed to the tier's rotating sink
    pub fn prefix(&self, base: &Path) -> PathBuf {
        let mut prefix = base.as_os_str().to_owned();
        prefix.push(".");
        prefix.push(self.name());
        PathBuf::from(prefix)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Drop a trailing `.log` from a user-supplied log path.
///
/// `/var/log/app.log` and `/var/log/app` both yield the base `/var/log/app`.
pub fn strip_log_suffix(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    match text.strip_suffix(".log") {
        Some(base) if !base.is_empty() => PathBuf::from(base),
        _ => path.to_path_buf(),
    }
}

/// Holds one sink per tier plus an optional console echo
#[derive(Clone)]
pub struct TierRouter {
    error: Arc<dyn Sink>,
    info: Arc<dyn Sink>,
    debug: Arc<dyn Sink>,
    console: Option<Arc<dyn Sink>>,
}

impl TierRouter {
    pub fn new(error: Arc<dyn Sink>, info: Arc<dyn Sink>, debug: Arc<dyn Sink>) -> Self {
        Self {
            error,
            info,
            debug,
            console: None,
        }
    }

    /// Open rotating file sinks for all three tiers under `base`.
    ///
    /// # Errors
    ///
    /// Returns `SinkOpen` naming the first tier that could not be opened.
    pub fn open(base: &Path, config: &RotationConfig) -> Result<Self> {
        Self::open_with_time_source(base, config, system_time_source())
    }

    pub fn open_with_time_source(
        base: &Path,
        config: &RotationConfig,
        time_source: TimeSource,
    ) -> Result<Self> {
        let open = |tier: Tier| -> Result<Arc<dyn Sink>> {
            let sink = RotatingFileSink::with_time_source(
                tier.name(),
                tier.prefix(base),
                config.clone(),
                Arc::clone(&time_source),
            )?;
            Ok(Arc::new(sink))
        };
        Ok(Self::new(open(Tier::Error)?, open(Tier::Info)?, open(Tier::Debug)?))
    }

    /// Echo every routed line to stderr as well.
    #[must_use]
    pub fn with_console(mut self, use_colors: bool) -> Self {
        self.console = Some(Arc::new(ConsoleSink::with_colors(use_colors)));
        self
    }

    #[must_use]
    pub fn with_console_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.console = Some(sink);
        self
    }

    #[must_use]
    pub fn without_console(mut self) -> Self {
        self.console = None;
        self
    }

    pub fn has_console(&self) -> bool {
        self.console.is_some()
    }

    pub fn sink(&self, tier: Tier) -> &Arc<dyn Sink> {
        match tier {
            Tier::Error => &self.error,
            Tier::Info => &self.info,
            Tier::Debug => &self.debug,
        }
    }

    /// Write `line` to the sink of `level`'s tier, then to the console.
    ///
    /// The console is written even when the tier sink fails; the tier error
    /// is the one reported.
    pub fn route(&self, level: LogLevel, line: &[u8]) -> Result<()> {
        let written = self.sink(Tier::for_level(level)).write(level, line);
        if let Some(console) = &self.console {
            if let Err(e) = console.write(level, line) {
                eprintln!("[LOGGER WARN] Console echo failed: {}", e);
            }
        }
        written
    }

    /// Flush every sink, reporting the first failure.
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;
        let sinks = Tier::ALL
            .iter()
            .map(|tier| self.sink(*tier))
            .chain(self.console.as_ref());
        for sink in sinks {
            if let Err(e) = sink.flush() {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for TierRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TierRouter")
            .field("error", &self.error.name())
            .field("info", &self.info.name())
            .field("debug", &self.debug.name())
            .field("console", &self.console.as_ref().map(|c| c.name().to_string()))
            .finish()
    }
}

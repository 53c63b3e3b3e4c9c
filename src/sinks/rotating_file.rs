//! Time-rotated file sink
//!
//! Each sink owns one tier prefix such as `/var/log/app.info`. Lines go to a
//! period-stamped file (`app.info.2025-01-08.log`), a new file is opened at
//! every period boundary, and the alias `app.info.log` is re-pointed at the
//! active file. Files older than the retention window are pruned whenever a
//! new file is opened.

use crate::core::config::RotationConfig;
use crate::core::error::{LoggerError, Result};
use crate::core::log_level::LogLevel;
use crate::core::sink::Sink;
use chrono::{DateTime, NaiveDateTime, Utc};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Source of "now" for rotation decisions
pub type TimeSource = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Wall-clock time source used unless one is injected.
pub fn system_time_source() -> TimeSource {
    Arc::new(Utc::now)
}

const DAY_SECS: u64 = 24 * 60 * 60;
const HOUR_SECS: u64 = 60 * 60;

/// File name stamp pattern, as fine-grained as the period requires.
fn stamp_pattern(config: &RotationConfig) -> &'static str {
    let period = config.rotation_period.as_secs();
    if period >= DAY_SECS {
        "%Y-%m-%d"
    } else if period >= HOUR_SECS {
        "%Y-%m-%d-%H"
    } else {
        "%Y-%m-%d-%H-%M"
    }
}

/// Seconds from 0001-01-01 to the Unix epoch. Periods are counted from
/// 0001-01-01, a Monday, so weekly files start on Mondays.
const ZERO_TIME_OFFSET: i64 = 62_135_596_800;

/// Start of the period containing `wall`, both as wall-clock seconds.
fn align_wall(wall: i64, period: i64) -> i64 {
    wall - (wall + ZERO_TIME_OFFSET).rem_euclid(period)
}

/// Wall-clock start of the period containing `now`, given the clock's offset
/// from UTC at `now`.
fn period_start_wall(now: DateTime<Utc>, offset: i64, config: &RotationConfig) -> NaiveDateTime {
    let period = i64::try_from(config.rotation_period.as_secs().max(1)).unwrap_or(i64::MAX);
    let start = align_wall(now.timestamp() + offset, period);
    DateTime::from_timestamp(start, 0)
        .unwrap_or(now)
        .naive_utc()
}

fn stamp_with_offset(now: DateTime<Utc>, offset: i64, config: &RotationConfig) -> String {
    period_start_wall(now, offset, config)
        .format(stamp_pattern(config))
        .to_string()
}

/// File name stamp for `now`. The truncated wall time is rendered as is, so
/// an offset change inside a period never moves the stamp backwards.
fn period_stamp(now: DateTime<Utc>, config: &RotationConfig) -> String {
    stamp_with_offset(now, config.clock.offset_seconds(&now), config)
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

struct ActiveFile {
    file: File,
    path: PathBuf,
    stamp: String,
    generation: u32,
    size: u64,
}

/// Rotating file sink for one tier
///
/// # Examples
///
/// ```no_run
/// use tiered_logger::{LogLevel, RotatingFileSink, RotationConfig, Sink};
/// use std::time::Duration;
///
/// let config = RotationConfig::new().with_rotation_period(Duration::from_secs(3600));
/// let sink = RotatingFileSink::open("info", "/var/log/app.info", config).unwrap();
/// sink.write(LogLevel::Info, b"service started\n").unwrap();
/// ```
pub struct RotatingFileSink {
    name: String,
    dir: PathBuf,
    stem: String,
    config: RotationConfig,
    time_source: TimeSource,
    active: Mutex<ActiveFile>,
}

impl RotatingFileSink {
    /// Open the sink for `prefix` using the system clock.
    ///
    /// # Errors
    ///
    /// Returns `SinkOpen` if the directory or the period file cannot be
    /// created, and `InvalidConfiguration` for an unusable config.
    pub fn open(
        name: impl Into<String>,
        prefix: impl AsRef<Path>,
        config: RotationConfig,
    ) -> Result<Self> {
        Self::with_time_source(name, prefix, config, system_time_source())
    }

    /// Open the sink with an injected time source.
    pub fn with_time_source(
        name: impl Into<String>,
        prefix: impl AsRef<Path>,
        config: RotationConfig,
        time_source: TimeSource,
    ) -> Result<Self> {
        config.validate()?;
        let name = name.into();
        let prefix = prefix.as_ref();

        let stem = prefix
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                LoggerError::config(
                    "RotatingFileSink",
                    format!("'{}' has no file name", prefix.display()),
                )
            })?;
        let dir = match prefix.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        fs::create_dir_all(&dir)
            .map_err(|e| LoggerError::sink_open(&name, dir.display().to_string(), e))?;

        let now = time_source();
        let stamp = period_stamp(now, &config);
        let generation = match config.max_size {
            Some(_) => latest_generation(&dir, &stem, &stamp),
            None => 0,
        };
        let path = file_path(&dir, &stem, &stamp, generation);
        let file = open_append(&path)
            .map_err(|e| LoggerError::sink_open(&name, path.display().to_string(), e))?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);

        let sink = Self {
            name,
            dir,
            stem,
            config,
            time_source,
            active: Mutex::new(ActiveFile {
                file,
                path: path.clone(),
                stamp,
                generation,
                size,
            }),
        };
        sink.update_alias(&path);
        sink.prune_logged(now, &path);
        Ok(sink)
    }

    /// Write one line as if it were logged at `now`.
    pub fn write_at(&self, now: DateTime<Utc>, line: &[u8]) -> Result<()> {
        let mut active = self.active.lock();
        let stamp = period_stamp(now, &self.config);
        let line_len = line.len() as u64;

        if stamp != active.stamp {
            let generation = match self.config.max_size {
                Some(_) => latest_generation(&self.dir, &self.stem, &stamp),
                None => 0,
            };
            self.rotate(&mut active, stamp, generation, now);
        } else if let Some(max_size) = self.config.max_size {
            if active.size > 0 && active.size + line_len > max_size {
                let next = active.generation + 1;
                self.rotate(&mut active, stamp, next, now);
            }
        }

        active.file.write_all(line).map_err(|e| {
            LoggerError::io_operation(
                "writing log line",
                format!("Failed to write to '{}'", active.path.display()),
                e,
            )
        })?;
        active.size += line_len;
        Ok(())
    }

    /// Switch to a new file. On failure the current file stays active.
    fn rotate(&self, active: &mut ActiveFile, stamp: String, generation: u32, now: DateTime<Utc>) {
        let path = file_path(&self.dir, &self.stem, &stamp, generation);
        let file = match open_append(&path) {
            Ok(file) => file,
            Err(e) => {
                let err = LoggerError::file_rotation(path.display().to_string(), e.to_string());
                eprintln!("[LOGGER WARN] {}. Continuing with current file.", err);
                return;
            }
        };
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);

        let retired = std::mem::replace(
            active,
            ActiveFile {
                file,
                path: path.clone(),
                stamp,
                generation,
                size,
            },
        );
        let retired_path = retired.path.clone();
        // Close the retired handle before compressing it
        drop(retired);

        self.update_alias(&path);

        if self.config.compress && retired_path != path {
            if let Err(e) = compress_file(&retired_path) {
                eprintln!("[LOGGER WARN] Failed to compress retired log file: {}", e);
            }
        }

        self.prune_logged(now, &path);
    }

    /// Point the alias at `target`. Failures only warn.
    fn update_alias(&self, target: &Path) {
        let alias = self.alias_path();

        if fs::symlink_metadata(&alias).is_ok() {
            if let Err(e) = fs::remove_file(&alias) {
                eprintln!(
                    "[LOGGER WARN] Failed to remove old alias {}: {}",
                    alias.display(),
                    e
                );
                return;
            }
        }

        // Relative target, so the directory can be moved as a whole
        let relative = target.file_name().map(Path::new).unwrap_or(target);

        #[cfg(unix)]
        let linked = std::os::unix::fs::symlink(relative, &alias);
        #[cfg(windows)]
        let linked = std::os::windows::fs::symlink_file(relative, &alias);
        #[cfg(not(any(unix, windows)))]
        let linked: std::io::Result<()> = Ok(());

        if let Err(e) = linked {
            eprintln!(
                "[LOGGER WARN] Failed to create alias {} -> {}: {}",
                alias.display(),
                relative.display(),
                e
            );
        }
    }

    fn prune_logged(&self, now: DateTime<Utc>, active: &Path) {
        if let Err(e) = self.prune(now, active) {
            eprintln!("[LOGGER WARN] Log retention sweep failed: {}", e);
        }
    }

    /// Remove this tier's files last modified before `now - max_age`.
    ///
    /// Never touches the active file or the alias. Returns how many files
    /// were removed.
    pub fn prune(&self, now: DateTime<Utc>, active: &Path) -> Result<usize> {
        if self.config.max_age.is_zero() {
            return Ok(0);
        }
        let Some(cutoff) = SystemTime::from(now).checked_sub(self.config.max_age) else {
            return Ok(0);
        };

        let entries = fs::read_dir(&self.dir).map_err(|e| {
            LoggerError::io_operation(
                "pruning old log files",
                format!("Failed to list '{}'", self.dir.display()),
                e,
            )
        })?;

        let alias = self.alias_path();
        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path == active || path == alias {
                continue;
            }
            if !self.is_tier_file(&entry.file_name().to_string_lossy()) {
                continue;
            }
            let Ok(metadata) = fs::symlink_metadata(&path) else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let expired = metadata
                .modified()
                .map(|modified| modified < cutoff)
                .unwrap_or(false);
            if !expired {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => eprintln!(
                    "[LOGGER WARN] Failed to remove expired log file {}: {}",
                    path.display(),
                    e
                ),
            }
        }
        Ok(removed)
    }

    fn is_tier_file(&self, file_name: &str) -> bool {
        file_name
            .strip_prefix(self.stem.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .map(|rest| rest.ends_with(".log") || rest.ends_with(".log.gz"))
            .unwrap_or(false)
    }

    /// Path of the alias that always points at the active file
    #[must_use]
    pub fn alias_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.stem))
    }

    /// Path of the file currently receiving lines
    #[must_use]
    pub fn current_path(&self) -> PathBuf {
        self.active.lock().path.clone()
    }

    /// Bytes in the active file
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.active.lock().size
    }

    #[must_use]
    pub fn config(&self) -> &RotationConfig {
        &self.config
    }
}

impl Sink for RotatingFileSink {
    fn write(&self, _level: LogLevel, line: &[u8]) -> Result<()> {
        self.write_at((self.time_source)(), line)
    }

    fn flush(&self) -> Result<()> {
        let mut active = self.active.lock();
        active.file.flush().map_err(|e| {
            LoggerError::io_operation(
                "flushing log file",
                format!("Failed to flush '{}'", active.path.display()),
                e,
            )
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn file_path(dir: &Path, stem: &str, stamp: &str, generation: u32) -> PathBuf {
    if generation == 0 {
        dir.join(format!("{stem}.{stamp}.log"))
    } else {
        dir.join(format!("{stem}.{stamp}.{generation}.log"))
    }
}

/// Highest generation already on disk for a period, so a restart appends to
/// the newest file instead of the first one.
fn latest_generation(dir: &Path, stem: &str, stamp: &str) -> u32 {
    let prefix = format!("{stem}.{stamp}.");
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            name.strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_suffix(".log"))
                .and_then(|generation| generation.parse::<u32>().ok())
        })
        .max()
        .unwrap_or(0)
}

/// Gzip `path` into `path.gz` through a temporary file, then remove `path`.
fn compress_file(path: &Path) -> Result<()> {
    use std::io::{BufReader, BufWriter};

    let gz_path = path.with_extension("log.gz");
    let temp_gz_path = path.with_extension("log.gz.tmp");

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_gz_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!(
                "Failed to create temporary compressed file: {}",
                temp_gz_path.display()
            ),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let streamed = std::io::copy(&mut reader, &mut encoder)
        .and_then(|_| encoder.finish())
        .and_then(|mut writer| writer.flush());
    if let Err(e) = streamed {
        let _ = fs::remove_file(&temp_gz_path);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress {}", path.display()),
            e,
        ));
    }

    fs::rename(&temp_gz_path, &gz_path).map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to rename compressed file to: {}", gz_path.display()),
            e,
        )
    })?;

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[LOGGER WARN] Compression succeeded but failed to remove original file {}: {}",
            path.display(),
            e
        );
    }
    Ok(())
}

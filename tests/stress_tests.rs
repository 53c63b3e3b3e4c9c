//! Stress tests for rotation under concurrent load
//!
//! These tests verify:
//! - No line is lost or torn while threads log across period boundaries
//! - Size-capped generations stay within their cap under contention
//! - Every tier receives exactly its own levels under mixed-level load

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;
use tiered_logger::{ClockMode, LogLevel, Logger, TimeSource};

const THREADS: usize = 8;
const PER_THREAD: usize = 250;

/// Lines of every file in `dir` whose name starts with `prefix`, skipping the alias.
fn collect_lines(dir: &Path, prefix: &str, alias: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in fs::read_dir(dir).expect("Failed to list temp dir").flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(prefix) || name == alias {
            continue;
        }
        let content = fs::read_to_string(entry.path()).expect("Failed to read log file");
        lines.extend(content.lines().map(str::to_string));
    }
    lines
}

/// Test that lines survive while the clock crosses hour boundaries mid-run
#[test]
fn test_no_lines_lost_across_period_boundaries() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let start: DateTime<Utc> = Utc
        .with_ymd_and_hms(2025, 1, 8, 10, 0, 0)
        .single()
        .expect("valid datetime");

    // Every 100 reads of the clock advance it by twenty minutes
    let ticks = Arc::new(AtomicUsize::new(0));
    let clock_ticks = Arc::clone(&ticks);
    let clock: TimeSource = Arc::new(move || {
        let tick = clock_ticks.fetch_add(1, Ordering::Relaxed);
        start + chrono::Duration::minutes(20 * (tick / 100) as i64)
    });

    let logger = Arc::new(
        Logger::builder()
            .threshold(LogLevel::Debug)
            .path(temp_dir.path().join("stress.log"))
            .clock(ClockMode::Utc)
            .rotation_period(Duration::from_secs(3600))
            .max_age(Duration::ZERO)
            .console(false)
            .time_source(clock)
            .build()
            .expect("Failed to build logger"),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger
                        .infof(format_args!("worker={t} seq={i}"))
                        .expect("write failed");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("logging thread panicked");
    }
    logger.flush().expect("Failed to flush");

    let lines = collect_lines(temp_dir.path(), "stress.info.", "stress.info.log");
    assert_eq!(lines.len(), THREADS * PER_THREAD);

    let unique: HashSet<&str> = lines
        .iter()
        .map(|line| {
            let at = line.find("worker=").unwrap_or_else(|| panic!("torn line: {line}"));
            &line[at..]
        })
        .collect();
    assert_eq!(unique.len(), THREADS * PER_THREAD, "duplicate or torn lines");

    let period_files = fs::read_dir(temp_dir.path())
        .unwrap()
        .flatten()
        .filter(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            name.starts_with("stress.info.2025-01-08-") && name.ends_with(".log")
        })
        .count();
    assert!(period_files > 1, "the clock should have crossed at least one hour");
}

/// Test that size-capped generations hold under concurrent writers
#[test]
fn test_size_cap_under_contention() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let fixed = Utc
        .with_ymd_and_hms(2025, 1, 8, 10, 0, 0)
        .single()
        .expect("valid datetime");
    let clock: TimeSource = Arc::new(move || fixed);
    let cap = 4 * 1024;

    let logger = Arc::new(
        Logger::builder()
            .threshold(LogLevel::Debug)
            .path(temp_dir.path().join("capped.log"))
            .clock(ClockMode::Utc)
            .rotation_period(Duration::from_secs(3600))
            .max_size(cap)
            .console(false)
            .time_source(clock)
            .build()
            .expect("Failed to build logger"),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger
                        .debugf(format_args!("worker={t} seq={i} padding=................"))
                        .expect("write failed");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("logging thread panicked");
    }

    let mut total = 0;
    for entry in fs::read_dir(temp_dir.path()).unwrap().flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with("capped.debug.") || name == "capped.debug.log" {
            continue;
        }
        let size = entry.metadata().unwrap().len();
        assert!(size <= cap, "{name} holds {size} bytes");
        total += fs::read_to_string(entry.path()).unwrap().lines().count();
    }
    assert_eq!(total, THREADS * PER_THREAD);
}

/// Test that mixed-level load keeps every tier pure
#[test]
fn test_mixed_levels_stay_in_their_tiers() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Arc::new(
        Logger::builder()
            .threshold(LogLevel::Debug)
            .path(temp_dir.path().join("mixed.log"))
            .console(false)
            .build()
            .expect("Failed to build logger"),
    );
    let levels = [LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error];
    let writers = Arc::new(Mutex::new(0usize));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            let writers = Arc::clone(&writers);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    let level = levels[(t + i) % levels.len()];
                    logger.log(level, format!("worker={t} seq={i}")).expect("write failed");
                }
                *writers.lock() += 1;
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("logging thread panicked");
    }
    assert_eq!(*writers.lock(), THREADS);

    let expectations = [
        ("mixed.debug.", "mixed.debug.log", vec![" DEBG "]),
        ("mixed.info.", "mixed.info.log", vec![" INFO ", " WARN "]),
        ("mixed.error.", "mixed.error.log", vec![" ERRO "]),
    ];
    let mut total = 0;
    for (prefix, alias, codes) in expectations {
        let lines = collect_lines(temp_dir.path(), prefix, alias);
        for line in &lines {
            assert!(
                codes.iter().any(|code| line.contains(code)),
                "{line} does not belong in {prefix}"
            );
        }
        total += lines.len();
    }
    assert_eq!(total, THREADS * PER_THREAD);
}

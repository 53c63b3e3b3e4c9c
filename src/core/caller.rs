//! Source location attribution for log records
//!
//! The logging call site is captured through `#[track_caller]`, which is exact
//! and free. When a caller-skip depth is configured, a backtrace is captured
//! and walked upward from the frame holding that call site.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::panic::Location;

/// Rendered as `file:line` in the `file` field of every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerLocation {
    file: String,
    line: u32,
}

impl CallerLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Used when the stack is shallower than the requested skip depth.
    pub fn unknown() -> Self {
        Self::new("<???>", 0)
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    fn matches(&self, site: &Location<'_>) -> bool {
        self.line == site.line() && self.same_file(site.file())
    }

    fn same_file(&self, file: &str) -> bool {
        let frame_path = normalize(&self.file);
        let site_path = normalize(file);
        frame_path == site_path || frame_path.ends_with(&format!("/{}", site_path))
    }
}

impl From<&Location<'_>> for CallerLocation {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for CallerLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    match path.strip_prefix("./") {
        Some(stripped) => stripped.to_string(),
        None => path,
    }
}

/// Resolve the location `skip` frames above `call_site`.
///
/// `skip == 0` returns the call site itself without touching the stack. If the
/// backtrace cannot be captured or symbolized, the call site is returned.
pub fn resolve(call_site: &Location<'_>, skip: usize) -> CallerLocation {
    if skip == 0 {
        return CallerLocation::from(call_site);
    }

    let backtrace = Backtrace::force_capture();
    if backtrace.status() != BacktraceStatus::Captured {
        return CallerLocation::from(call_site);
    }

    let frames = source_frames(&backtrace.to_string());
    let exact = frames.iter().position(|frame| frame.matches(call_site));
    // Multi-line call expressions may be attributed to a neighbouring line.
    let anchor = exact.or_else(|| {
        frames
            .iter()
            .position(|frame| frame.same_file(call_site.file()))
    });
    match anchor {
        Some(index) => frames
            .get(index + skip)
            .cloned()
            .unwrap_or_else(CallerLocation::unknown),
        None => CallerLocation::from(call_site),
    }
}

/// Extract the `at <file>:<line>:<col>` entries of a rendered backtrace,
/// innermost frame first.
fn source_frames(rendered: &str) -> Vec<CallerLocation> {
    rendered
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix("at "))
        .filter_map(|location| {
            let mut parts = location.rsplitn(3, ':');
            let _column = parts.next()?;
            let line = parts.next()?.parse::<u32>().ok()?;
            let file = parts.next()?;
            Some(CallerLocation::new(file, line))
        })
        .collect()
}

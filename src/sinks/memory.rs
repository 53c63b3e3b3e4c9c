//! In-memory sink that keeps every line it receives

use crate::core::error::Result;
use crate::core::log_level::LogLevel;
use crate::core::sink::Sink;
use parking_lot::Mutex;

/// Captures lines for inspection, mostly in tests
///
/// # Examples
///
/// ```
/// use tiered_logger::{LogLevel, MemorySink, Sink};
///
/// let sink = MemorySink::new("info");
/// sink.write(LogLevel::Warn, b"low disk\n").unwrap();
/// assert_eq!(sink.lines(), vec!["low disk".to_string()]);
/// ```
pub struct MemorySink {
    name: String,
    records: Mutex<Vec<(LogLevel, String)>>,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Mutex::new(Vec::new()),
        }
    }

    /// Lines received so far, without their trailing newline
    pub fn lines(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|(_, line)| line.clone())
            .collect()
    }

    /// Levels of the lines received so far, in order
    pub fn levels(&self) -> Vec<LogLevel> {
        self.records.lock().iter().map(|(level, _)| *level).collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write(&self, level: LogLevel, line: &[u8]) -> Result<()> {
        let text = String::from_utf8_lossy(line);
        let text = text.strip_suffix('\n').unwrap_or(&text).to_string();
        self.records.lock().push((level, text));
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

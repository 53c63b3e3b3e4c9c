//! Console sink, echoing formatted lines to stderr

use crate::core::error::Result;
use crate::core::log_level::LogLevel;
use crate::core::sink::Sink;
use std::io::Write;

pub struct ConsoleSink {
    use_colors: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self { use_colors: false }
    }

    /// Colorize each line by level. Only takes effect with the `console` feature.
    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    pub fn use_colors(&self) -> bool {
        self.use_colors
    }

    #[cfg(feature = "console")]
    fn render(&self, level: LogLevel, line: &[u8]) -> Vec<u8> {
        use colored::Colorize;

        if !self.use_colors {
            return line.to_vec();
        }
        let text = String::from_utf8_lossy(line);
        let body = text.strip_suffix('\n').unwrap_or(&text);
        format!("{}\n", body.color(level.color_code())).into_bytes()
    }

    #[cfg(not(feature = "console"))]
    fn render(&self, _level: LogLevel, line: &[u8]) -> Vec<u8> {
        line.to_vec()
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn write(&self, level: LogLevel, line: &[u8]) -> Result<()> {
        let rendered = self.render(level, line);
        // Locked so concurrent lines do not interleave
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(&rendered)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_render_is_verbatim() {
        let sink = ConsoleSink::new();
        assert_eq!(sink.render(LogLevel::Info, b"hello\n"), b"hello\n".to_vec());
        assert!(sink.write(LogLevel::Info, b"console sink test line\n").is_ok());
    }

    #[cfg(feature = "console")]
    #[test]
    fn test_colored_render_keeps_text_and_newline() {
        colored::control::set_override(true);
        let sink = ConsoleSink::with_colors(true);
        let rendered = String::from_utf8(sink.render(LogLevel::Error, b"boom\n")).unwrap();
        assert!(rendered.contains("boom"));
        assert!(rendered.ends_with('\n'));
        assert_ne!(rendered, "boom\n");
    }
}

//! Logging macros.
//!
//! Each level macro has two forms:
//!
//! - `info!(logger; a, b, c)` joins the `Display` output of its values with
//!   single spaces. The values are only rendered when the level is enabled.
//! - `info!(logger, "port {}", port)` formats like `format!`, lazily through
//!   `format_args!`.
//!
//! Both evaluate to the `Result<()>` of the underlying logger call.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use tiered_logger::{info, Logger, MemorySink};
//!
//! let info_sink = Arc::new(MemorySink::new("info"));
//! let logger = Logger::builder()
//!     .sinks(
//!         Arc::new(MemorySink::new("error")),
//!         info_sink.clone(),
//!         Arc::new(MemorySink::new("debug")),
//!     )
//!     .console(false)
//!     .build()?;
//!
//! info!(logger; "user", 42, "logged in")?;
//! info!(logger, "listening on port {}", 8080)?;
//!
//! let lines = info_sink.lines();
//! assert!(lines[0].ends_with(" user 42 logged in"));
//! assert!(lines[1].ends_with(" listening on port 8080"));
//! # Ok::<(), tiered_logger::LoggerError>(())
//! ```

/// Log at an explicit level.
///
/// ```
/// # use std::sync::Arc;
/// # use tiered_logger::{LogLevel, Logger, MemorySink};
/// # let logger = Logger::builder()
/// #     .sinks(Arc::new(MemorySink::new("e")), Arc::new(MemorySink::new("i")), Arc::new(MemorySink::new("d")))
/// #     .console(false)
/// #     .build()
/// #     .unwrap();
/// use tiered_logger::log;
/// log!(logger, LogLevel::Warn; "disk", 93, "percent full").unwrap();
/// log!(logger, LogLevel::Error, "Error code: {}", 500).unwrap();
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr; $($value:expr),+ $(,)?) => {{
        let logger = &$logger;
        let level = $level;
        if logger.enabled(level) {
            let parts: ::std::vec::Vec<::std::string::String> =
                ::std::vec![$(::std::string::ToString::to_string(&$value)),+];
            logger.log(level, parts.join(" "))
        } else {
            ::std::result::Result::Ok(())
        }
    }};
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.logf($level, ::std::format_args!($($arg)+))
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr; $($value:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Debug; $($value),+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr; $($value:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Info; $($value),+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr; $($value:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Warn; $($value),+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr; $($value:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Error; $($value),+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal message, then exit the process with status 1.
#[macro_export]
macro_rules! fatal {
    ($logger:expr; $($value:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Fatal; $($value),+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

/// Log a panic-level message, then panic with it.
///
/// Named `panic_log!` so it never shadows `std::panic!`.
#[macro_export]
macro_rules! panic_log {
    ($logger:expr; $($value:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Panic; $($value),+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Panic, $($arg)+)
    };
}

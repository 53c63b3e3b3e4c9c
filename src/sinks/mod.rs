//! Sink implementations

pub mod console;
pub mod memory;
pub mod rotating_file;

pub use console::ConsoleSink;
pub use memory::MemorySink;
pub use rotating_file::{system_time_source, RotatingFileSink, TimeSource};

pub use crate::core::Sink;

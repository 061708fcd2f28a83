#![deny(missing_docs)]
//! Shared logging utilities for the pebble workspace.
//!
//! This crate provides the `pebble_*` logging macros used across the codebase,
//! a process-wide refresh generation that every log line is tagged with, and a
//! minimal test initializer for the global logger.

use std::sync::atomic::{AtomicU64, Ordering};

/// Latest refresh/search generation issued by the controller.
static GENERATION: AtomicU64 = AtomicU64::new(0);

/// Records the most recently issued generation.
///
/// Called by the controller whenever it issues a fetch or search so that log
/// lines emitted by the engine threads can be correlated with the request.
pub fn set_generation(generation: u64) {
    GENERATION.store(generation, Ordering::Relaxed);
}

/// Returns the most recently issued generation, or 0 before the first request.
pub fn current_generation() -> u64 {
    GENERATION.load(Ordering::Relaxed)
}

/// Logs a trace-level message tagged with the current generation.
#[macro_export]
macro_rules! pebble_trace {
    ($($arg:tt)*) => {{
        log::trace!("[g{}] {}", $crate::current_generation(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the current generation.
#[macro_export]
macro_rules! pebble_info {
    ($($arg:tt)*) => {{
        log::info!("[g{}] {}", $crate::current_generation(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the current generation.
#[macro_export]
macro_rules! pebble_debug {
    ($($arg:tt)*) => {{
        log::debug!("[g{}] {}", $crate::current_generation(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the current generation.
#[macro_export]
macro_rules! pebble_warn {
    ($($arg:tt)*) => {{
        log::warn!("[g{}] {}", $crate::current_generation(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the current generation.
#[macro_export]
macro_rules! pebble_error {
    ($($arg:tt)*) => {{
        log::error!("[g{}] {}", $crate::current_generation(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

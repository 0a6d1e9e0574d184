#![deny(missing_docs)]
//! Shared logging utilities for the chain workspace.
//!
//! This crate provides the `chain_*` logging macros used across the codebase,
//! a per-message sequence counter for log correlation, and a minimal test
//! initializer for the global logger.

use std::cell::Cell;

thread_local! {
    /// Thread-local storage for the sequence number of the coordinator
    /// message currently being processed.
    static MSG_SEQ: Cell<u64> = const { Cell::new(0) };
}

/// Sets the message sequence number for the current thread.
/// The host loop calls this once per processed message.
pub fn set_msg_seq(seq: u64) {
    MSG_SEQ.with(|v| v.set(seq));
}

/// Retrieves the message sequence number for the current thread.
/// Returns 0 if no message is being processed.
pub fn get_msg_seq() -> u64 {
    MSG_SEQ.with(|v| v.get())
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! chain_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! chain_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! chain_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! chain_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! chain_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#![deny(missing_docs)]
//! Shared logging utilities for the docsync workspace.
//!
//! This crate provides the `sync_*` logging macros used across the codebase,
//! a per-thread source label that prefixes every message, and a minimal test
//! initializer for the global logger.

use std::cell::RefCell;

#[doc(hidden)]
pub use log;

thread_local! {
    /// Name of the documentation source currently being synced on this thread.
    static SOURCE_LABEL: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Restores the previous source label when dropped.
#[derive(Debug)]
pub struct SourceLabelGuard {
    previous: Option<String>,
}

impl Drop for SourceLabelGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        SOURCE_LABEL.with(|label| *label.borrow_mut() = previous);
    }
}

/// Labels every message logged on this thread with `name` until the guard is dropped.
///
/// Only meaningful on the thread that drives the sync future (`block_on`).
pub fn enter_source(name: impl Into<String>) -> SourceLabelGuard {
    let previous = SOURCE_LABEL.with(|label| label.borrow_mut().replace(name.into()));
    SourceLabelGuard { previous }
}

/// Returns `"[name] "` for the active source label, or an empty string.
pub fn source_prefix() -> String {
    SOURCE_LABEL.with(|label| match label.borrow().as_deref() {
        Some(name) => format!("[{name}] "),
        None => String::new(),
    })
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! sync_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("{}{}", $crate::source_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! sync_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("{}{}", $crate::source_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! sync_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("{}{}", $crate::source_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! sync_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("{}{}", $crate::source_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! sync_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("{}{}", $crate::source_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
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

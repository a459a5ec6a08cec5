//! Thread-local node logging context.
//!
//! Provides the `nlog!()` macro which lets nodes log without passing a
//! context around. The scheduler sets the current node context before each
//! lifecycle call (init, tick, shutdown).
//!
//! ```ignore
//! use powersim_core::nlog;
//!
//! fn tick(&mut self) {
//!     nlog!(info, "Processing sensor data");
//!     if let Err(e) = self.process() {
//!         nlog!(error, "Processing failed: {}", e);
//!     }
//! }
//! ```

use std::cell::RefCell;
use std::io::{self, Write};
use std::time::Instant;

thread_local! {
    static CURRENT_NODE: RefCell<Option<NodeLogContext>> = const { RefCell::new(None) };
}

/// Log severity for node log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Debug,
}

/// Thread-local context for node logging.
pub struct NodeLogContext {
    /// The node's name for log attribution.
    pub name: String,
    /// When the current tick started (for timing info).
    pub tick_start: Option<Instant>,
    /// Current tick number.
    pub tick_number: u64,
}

/// Set the current node context for this thread.
/// Called by the scheduler before invoking node lifecycle methods.
///
/// Reuses the existing allocation when possible.
pub fn set_node_context(name: &str, tick_number: u64) {
    CURRENT_NODE.with(|ctx| {
        let mut slot = ctx.borrow_mut();
        if let Some(ref mut existing) = *slot {
            existing.name.clear();
            existing.name.push_str(name);
            existing.tick_start = Some(Instant::now());
            existing.tick_number = tick_number;
        } else {
            *slot = Some(NodeLogContext {
                name: name.to_owned(),
                tick_start: Some(Instant::now()),
                tick_number,
            });
        }
    });
}

/// Clear the current node context for this thread.
/// Called by the scheduler after node lifecycle methods complete.
///
/// Keeps the allocation alive for the next `set_node_context`.
pub fn clear_node_context() {
    CURRENT_NODE.with(|ctx| {
        if let Some(ref mut existing) = *ctx.borrow_mut() {
            existing.tick_start = None;
        }
    });
}

/// Get the current node name if set, otherwise "unknown".
pub fn current_node_name() -> String {
    CURRENT_NODE.with(|ctx| {
        ctx.borrow()
            .as_ref()
            .filter(|c| c.tick_start.is_some())
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "unknown".to_string())
    })
}

/// Get the current tick number if set, otherwise 0.
pub fn current_tick_number() -> u64 {
    CURRENT_NODE.with(|ctx| ctx.borrow().as_ref().map(|c| c.tick_number).unwrap_or(0))
}

/// Internal function used by the nlog!() macro.
pub fn log_with_context(level: LogLevel, message: String) {
    let stamp = chrono::Local::now().format("%H:%M:%S%.3f");
    let node_name = current_node_name();

    let tag = match level {
        LogLevel::Info => "\x1b[34m[INFO]\x1b[0m",
        LogLevel::Warning => "\x1b[33m[WARN]\x1b[0m",
        LogLevel::Error => "\x1b[31m[ERROR]\x1b[0m",
        LogLevel::Debug => "\x1b[90m[DEBUG]\x1b[0m",
    };

    let line = format!(
        "{} {} \x1b[33m[{}]\x1b[0m {}\n",
        stamp, tag, node_name, message
    );
    let _ = io::stderr().write_all(line.as_bytes());
    let _ = io::stderr().flush();
}

/// Log a message from within a powersim node.
///
/// Automatically captures the current node context set by the scheduler.
///
/// ```ignore
/// nlog!(info, "Simple message");
/// nlog!(warn, "Warning with value: {}", value);
/// nlog!(error, "Error: {}", err);
/// nlog!(debug, "Debug info: {:?}", data);
/// ```
#[macro_export]
macro_rules! nlog {
    (info, $($arg:tt)*) => {
        $crate::core::nlog::log_with_context($crate::core::LogLevel::Info, format!($($arg)*))
    };
    (warn, $($arg:tt)*) => {
        $crate::core::nlog::log_with_context($crate::core::LogLevel::Warning, format!($($arg)*))
    };
    (error, $($arg:tt)*) => {
        $crate::core::nlog::log_with_context($crate::core::LogLevel::Error, format!($($arg)*))
    };
    (debug, $($arg:tt)*) => {
        $crate::core::nlog::log_with_context($crate::core::LogLevel::Debug, format!($($arg)*))
    };
}

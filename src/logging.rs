//! Per-run logging handle.
//!
//! Components never log through a process-wide logger of their own. Each
//! conversion run creates one [`RunLogger`] and hands it down to the parsers,
//! the geometry resolver and the condition-table resolver. Messages go through
//! the `log` facade under the run's target, and every warning is also kept so
//! the caller can report what was inconsistent in the metadata.

use std::cell::RefCell;
use std::fmt;

use log::Level;

/// Default log target used when no run label is given
pub const DEFAULT_TARGET: &str = "hcs_converters";

/// Logging handle scoped to a single conversion run
#[derive(Debug)]
pub struct RunLogger {
    target: String,
    warnings: RefCell<Vec<String>>,
}

impl Default for RunLogger {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET)
    }
}

impl RunLogger {
    /// Create a logger emitting under the given target
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            warnings: RefCell::new(Vec::new()),
        }
    }

    /// Log target of this run
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Emit a debug message
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        log::log!(target: self.target.as_str(), Level::Debug, "{}", args);
    }

    /// Emit an informational message
    pub fn info(&self, args: fmt::Arguments<'_>) {
        log::log!(target: self.target.as_str(), Level::Info, "{}", args);
    }

    /// Emit a warning and remember it for [`RunLogger::warnings`]
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        let message = args.to_string();
        log::log!(target: self.target.as_str(), Level::Warn, "{}", message);
        self.warnings.borrow_mut().push(message);
    }

    /// Warnings emitted so far, oldest first
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.borrow().clone()
    }

    /// Number of warnings emitted so far
    pub fn warning_count(&self) -> usize {
        self.warnings.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_are_recorded_in_order() {
        let log = RunLogger::new("test_run");
        log.info(format_args!("not recorded"));
        log.warn(format_args!("first {}", 1));
        log.warn(format_args!("second"));

        assert_eq!(log.target(), "test_run");
        assert_eq!(log.warning_count(), 2);
        assert_eq!(log.warnings(), vec!["first 1".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_separate_runs_do_not_share_warnings() {
        let a = RunLogger::default();
        let b = RunLogger::default();
        a.warn(format_args!("only in a"));
        assert_eq!(a.warning_count(), 1);
        assert_eq!(b.warning_count(), 0);
    }
}

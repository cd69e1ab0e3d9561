//! Named handles onto a shared run log.

use std::sync::Arc;

use crate::record::Record;
use crate::severity::Severity;
use crate::sink::{Disposition, Log, ABORT_FLOOR};

/// Path separator between scope names.
const SEP: char = '.';

/// A named view of a [`Log`].
///
/// Components receive a scope at construction and write through it; the
/// scope path identifies the writer in rendered output. The root scope is
/// named `tb`.
#[derive(Clone)]
pub struct Scope {
    log: Arc<Log>,
    path: String,
}

impl Scope {
    /// Creates the root scope of `log`.
    pub fn root(log: Arc<Log>) -> Self {
        Self {
            log,
            path: "tb".to_string(),
        }
    }

    /// Creates a child scope named `<self>.<name>`.
    pub fn child(&self, name: &str) -> Self {
        Self {
            log: Arc::clone(&self.log),
            path: format!("{}{SEP}{name}", self.path),
        }
    }

    /// The dotted path of this scope.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The underlying log.
    pub fn log(&self) -> &Arc<Log> {
        &self.log
    }

    /// Writes a record under this scope's path.
    pub fn emit(&self, mut record: Record) -> Disposition {
        record.scope.clone_from(&self.path);
        self.log.write(record)
    }

    /// Writes a message at the given severity.
    pub fn write(&self, severity: Severity, message: impl Into<String>) -> Disposition {
        self.emit(Record::new(severity, message))
    }

    /// Writes a debug message.
    pub fn debug(&self, message: impl Into<String>) {
        self.note(Severity::Debug, message);
    }

    /// Writes an informational message.
    pub fn info(&self, message: impl Into<String>) {
        self.note(Severity::Info, message);
    }

    fn note(&self, severity: Severity, message: impl Into<String>) {
        debug_assert!(severity < ABORT_FLOOR);
        // Below the abort floor, so always `Continue`.
        let _ = self.write(severity, message);
    }
}

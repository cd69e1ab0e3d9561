//! Structured log records with severity, cycle stamp, and notes.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// One message written to the run log.
///
/// The cycle stamp and scope path are filled in by [`Scope::emit`](crate::Scope::emit)
/// when the record is written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// The severity level of this record.
    pub severity: Severity,
    /// Hardware cycle counter value when the record was written.
    pub cycle: u64,
    /// Dotted path of the emitting scope (e.g. `tb.model`).
    pub scope: String,
    /// The main message.
    pub message: String,
    /// Additional lines (expected/actual values and the like).
    pub notes: Vec<String>,
}

impl Record {
    /// Creates a record with the given severity and message.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            cycle: 0,
            scope: String::new(),
            message: message.into(),
            notes: Vec::new(),
        }
    }

    /// Adds a note to this record.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

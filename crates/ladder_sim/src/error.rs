//! Error types for the scoreboard and drive loop.
//!
//! Every condition that stops a run early is a variant of [`BenchError`].
//! Failed comparisons are not errors; they are written to the run log and
//! counted in the [`RunSummary`](crate::RunSummary).

use std::fmt;
use std::io;

use ladder_common::ContextId;
use ladder_config::ConfigError;

/// The interface on which a command was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interface {
    /// The update command interface.
    Update,
    /// The query command interface.
    Query,
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interface::Update => write!(f, "update"),
            Interface::Query => write!(f, "query"),
        }
    }
}

/// Errors that stop a test run.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// A command addressed a context outside the configured range.
    #[error("{interface} command addressed context {id}, but only {limit} contexts exist")]
    ContextOutOfRange {
        /// The interface carrying the command.
        interface: Interface,
        /// The offending context id.
        id: ContextId,
        /// The configured number of contexts.
        limit: u32,
    },

    /// A log record reached the abort threshold.
    #[error("run aborted at cycle {cycle}: {reason}")]
    Aborted {
        /// Hardware cycle at which the run was abandoned.
        cycle: u64,
        /// The message of the record that triggered the abort.
        reason: String,
    },

    /// The scenario did not terminate within the configured cycle budget.
    #[error("watchdog expired after {cycles} cycles")]
    WatchdogExpired {
        /// The configured cycle budget.
        cycles: u64,
    },

    /// The configuration describes a design the bench cannot run.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// An I/O error occurred while writing waveform data.
    #[error("waveform I/O error: {0}")]
    WaveformIo(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_out_of_range_display() {
        let e = BenchError::ContextOutOfRange {
            interface: Interface::Update,
            id: 9,
            limit: 8,
        };
        assert_eq!(
            e.to_string(),
            "update command addressed context 9, but only 8 contexts exist"
        );
    }

    #[test]
    fn query_interface_display() {
        let e = BenchError::ContextOutOfRange {
            interface: Interface::Query,
            id: 100,
            limit: 4,
        };
        assert!(e.to_string().starts_with("query command"));
    }

    #[test]
    fn aborted_display() {
        let e = BenchError::Aborted {
            cycle: 120,
            reason: "notify mismatch".into(),
        };
        assert_eq!(e.to_string(), "run aborted at cycle 120: notify mismatch");
    }

    #[test]
    fn watchdog_display() {
        let e = BenchError::WatchdogExpired { cycles: 1000 };
        assert_eq!(e.to_string(), "watchdog expired after 1000 cycles");
    }

    #[test]
    fn config_display() {
        let e = BenchError::from(ConfigError::ValidationError(
            "design.update_pipe_delay must be at least 1".into(),
        ));
        assert_eq!(
            e.to_string(),
            "invalid configuration: validation error: design.update_pipe_delay must be at least 1"
        );
    }

    #[test]
    fn waveform_io_display() {
        let e = BenchError::WaveformIo(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(e.to_string().contains("waveform I/O error"));
    }
}

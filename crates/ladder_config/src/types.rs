//! Configuration types deserialized from `ladder.toml`.

use serde::{Deserialize, Serialize};

/// The top-level bench configuration parsed from `ladder.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LadderConfig {
    /// Parameters of the block under test.
    #[serde(default)]
    pub design: DesignParams,
    /// Drive-loop and checking settings.
    #[serde(default)]
    pub bench: BenchSettings,
    /// Run log settings.
    #[serde(default)]
    pub log: LogSettings,
}

/// Structural parameters shared by the hardware and the reference model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DesignParams {
    /// Number of independent contexts (`CONTEXT_N`).
    pub contexts: u32,
    /// Maximum entries held per context (`ENTRIES_N`).
    pub entries: u32,
    /// Cycles between accepting an update and presenting its notify.
    pub update_pipe_delay: usize,
    /// Cycles between accepting a query and presenting its response.
    pub query_pipe_delay: usize,
    /// Cycles the block stays busy after reset is released.
    ///
    /// Defaults to one cycle per context when omitted.
    pub init_cycles: Option<u32>,
}

impl DesignParams {
    /// Returns the configured busy period, defaulting to `contexts`.
    pub fn init_cycles(&self) -> u32 {
        self.init_cycles.unwrap_or(self.contexts)
    }
}

impl Default for DesignParams {
    fn default() -> Self {
        Self {
            contexts: 8,
            entries: 4,
            update_pipe_delay: 4,
            query_pipe_delay: 1,
            init_cycles: None,
        }
    }
}

/// Settings of the synchronous drive loop.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BenchSettings {
    /// Trace ticks per clock half period.
    pub half_period: u64,
    /// Whether predicted query responses are checked against the hardware.
    pub check_queries: bool,
    /// Whether a VCD waveform is written for each test.
    pub waveform: bool,
    /// Directory that receives waveform files.
    pub waveform_dir: String,
    /// Abort after this many clock cycles; `0` disables the limit.
    pub watchdog: u64,
}

impl Default for BenchSettings {
    fn default() -> Self {
        Self {
            half_period: 5,
            check_queries: true,
            waveform: false,
            waveform_dir: "out".to_string(),
            watchdog: 0,
        }
    }
}

/// Settings of the run log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// Echo every record to standard error as it is written.
    pub verbose: bool,
    /// Abort a test on the first failed check instead of only on fatal errors.
    pub fail_fast: bool,
}

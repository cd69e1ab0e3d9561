//! Cycle-accurate scoreboard for the ladder head-tracking block.
//!
//! The block keeps several independent ordered lists ("contexts") of
//! key/volume entries and reports every change to the head of a list. This
//! crate predicts, independently of the hardware, what the block must output
//! on every clock and flags any divergence.
//!
//! # Architecture
//!
//! A [`Bench`] owns a [`Hardware`] implementation and a reference [`Model`].
//! Once per clock period it consults a [`Scenario`] for stimulus, drives it
//! onto the hardware, samples the responses, and steps the model, which
//! aligns its predictions with the hardware's pipeline latencies through
//! [`DelayPipe`]s and compares them.
//!
//! # Modules
//!
//! - `error`: Errors that stop a run
//! - `pipe`: Fixed-latency delay line
//! - `model`: Reference model and checker
//! - `port`: Signal-level hardware contract
//! - `rtl`: Register-level behavioral model of the block
//! - `scenario`: Stimulus interface between tests and the bench
//! - `directed`: Instruction-list directed tests
//! - `waveform`: VCD tracing
//! - `bench`: The synchronous drive loop

#![warn(missing_docs)]

pub mod bench;
pub mod directed;
pub mod error;
pub mod model;
pub mod pipe;
pub mod port;
pub mod rtl;
pub mod scenario;
pub mod waveform;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use ladder_config::LadderConfig;
use ladder_diagnostics::Scope;

pub use bench::{Bench, RunSummary};
pub use directed::Directed;
pub use error::{BenchError, Interface};
pub use model::{Entry, Model, ModelStats};
pub use pipe::DelayPipe;
pub use port::{Hardware, InputPorts, OutputPorts};
pub use rtl::LadderRtl;
pub use scenario::{CycleStimulus, CycleView, Directive, Scenario};
pub use waveform::{VcdRecorder, WaveformRecorder};

/// High-level entry point: runs a scenario against the behavioral model.
///
/// Builds a [`LadderRtl`] and a [`Bench`] from `config`, attaches a VCD
/// recorder writing to `waveform` when given, and runs `scenario` to
/// completion. The waveform is finalized on every exit path.
///
/// `config` is validated first, so a hand-built configuration is held to
/// the same rules as one loaded from `ladder.toml`.
pub fn simulate(
    config: &LadderConfig,
    scenario: &mut dyn Scenario,
    log: Scope,
    waveform: Option<&Path>,
) -> Result<RunSummary, BenchError> {
    ladder_config::validate_config(config)?;
    let hw = LadderRtl::new(&config.design);
    let mut bench = Bench::new(hw, &config.design, &config.bench, log);
    if let Some(path) = waveform {
        let writer = BufWriter::new(File::create(path)?);
        bench = bench.with_waveform(Box::new(VcdRecorder::new(writer)))?;
    }
    let summary = bench.run(scenario)?;
    bench.finish()?;
    Ok(summary)
}

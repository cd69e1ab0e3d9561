//! The synchronous drive loop.
//!
//! [`Bench`] owns one hardware model, one reference [`Model`], and an
//! optional waveform recorder, all bound to the lifetime of the bench. Each
//! clock period it toggles the clock, asks the scenario for stimulus at the
//! falling edge, drives that stimulus onto the hardware, samples the
//! hardware's responses, and steps the model so it can check them.
//!
//! The first edge of a run is a rising edge. At every falling edge, in order:
//!
//! 1. staged stimulus is cleared and the scenario consulted,
//! 2. both commands are driven onto the hardware inputs,
//! 3. notify and query responses are sampled from the hardware outputs,
//! 4. commands and samples are applied to the model, which steps and checks,
//! 5. the scenario's [`Directive`] is acted on.
//!
//! At every rising edge, if the hardware is held in reset, the model is
//! reset as well.

use serde::Serialize;

use ladder_config::{BenchSettings, DesignParams};
use ladder_diagnostics::{Scope, Severity};

use crate::error::BenchError;
use crate::model::{Model, ModelStats};
use crate::port::{self, Hardware, PORTS};
use crate::scenario::{CycleView, Directive, Scenario};
use crate::waveform::WaveformRecorder;

/// Outcome of one completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Clock periods simulated.
    pub cycles: u64,
    /// Cycles on which a notify prediction was compared.
    pub notifies_checked: u64,
    /// Notifies the hardware was expected to raise.
    pub notifies_expected: u64,
    /// Query responses compared.
    pub queries_checked: u64,
    /// Failed comparisons.
    pub mismatches: u64,
    /// Entries dropped on capacity overflow.
    pub evictions: u64,
    /// Error records written during the run, mismatches included.
    pub errors: usize,
    /// No mismatches and no errors.
    pub passed: bool,
}

impl RunSummary {
    fn new(cycles: u64, stats: &ModelStats, errors: usize) -> Self {
        Self {
            cycles,
            notifies_checked: stats.notifies_checked,
            notifies_expected: stats.notifies_expected,
            queries_checked: stats.queries_checked,
            mismatches: stats.mismatches(),
            evictions: stats.evictions,
            errors,
            passed: stats.mismatches() == 0 && errors == 0,
        }
    }
}

/// Drive loop binding a hardware model to the reference model.
pub struct Bench<H: Hardware> {
    hw: H,
    model: Model,
    log: Scope,
    test_log: Scope,
    recorder: Option<Box<dyn WaveformRecorder>>,
    traced: Option<[u64; 20]>,
    half_period: u64,
    watchdog: u64,
    tb_time: u64,
}

impl<H: Hardware> Bench<H> {
    /// Creates a bench around `hw`, logging under `log`.
    ///
    /// The model writes under the `model` child of `log` and the scenario
    /// under the `test` child.
    pub fn new(hw: H, params: &DesignParams, settings: &BenchSettings, log: Scope) -> Self {
        let model = Model::new(params, settings.check_queries, log.child("model"));
        Self {
            hw,
            model,
            log: log.child("bench"),
            test_log: log.child("test"),
            recorder: None,
            traced: None,
            half_period: settings.half_period,
            watchdog: settings.watchdog,
            tb_time: 0,
        }
    }

    /// Attaches a waveform recorder and declares every port to it.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::WaveformIo`] if the declarations cannot be written.
    pub fn with_waveform(mut self, mut recorder: Box<dyn WaveformRecorder>) -> Result<Self, BenchError> {
        recorder.begin_scope("tb")?;
        for (index, (name, width)) in PORTS.iter().enumerate() {
            recorder.register_signal(index, name, *width)?;
        }
        recorder.end_scope()?;
        self.recorder = Some(recorder);
        Ok(self)
    }

    /// The hardware model.
    pub fn hardware(&self) -> &H {
        &self.hw
    }

    /// The reference model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Runs `scenario` until it returns [`Directive::Terminate`].
    ///
    /// # Errors
    ///
    /// Stops at the first [`BenchError`]: a command addressing a missing
    /// context, a log record at the abort threshold, watchdog expiry, or a
    /// waveform write failure.
    pub fn run(&mut self, scenario: &mut dyn Scenario) -> Result<RunSummary, BenchError> {
        scenario.attach(self.test_log.clone());
        let errors_before = self.log.log().error_count();

        {
            let inputs = self.hw.inputs_mut();
            inputs.clk = false;
            inputs.rst = false;
        }
        self.tb_time = 0;
        self.eval()?;

        let mut cycles = 0;
        loop {
            self.tb_time += self.half_period;
            self.hw.inputs_mut().clk = true;
            self.eval()?;
            self.log.log().set_cycle(self.hw.cycle());
            if self.hw.in_reset() {
                self.model.reset();
            }

            self.tb_time += self.half_period;
            let directive = self.negedge(scenario)?;
            self.hw.inputs_mut().clk = false;
            self.eval()?;
            cycles += 1;

            if directive == Directive::Terminate {
                break;
            }
            if self.watchdog > 0 && cycles >= self.watchdog {
                let err = BenchError::WatchdogExpired {
                    cycles: self.watchdog,
                };
                let _ = self.log.write(Severity::Fatal, err.to_string());
                return Err(err);
            }
        }

        let summary = RunSummary::new(
            cycles,
            self.model.stats(),
            self.log.log().error_count() - errors_before,
        );
        self.log.debug(format!(
            "run complete after {cycles} cycles, {} mismatches",
            summary.mismatches
        ));
        Ok(summary)
    }

    /// Flushes and detaches the waveform recorder.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::WaveformIo`] if the trailer cannot be written.
    pub fn finish(&mut self) -> Result<(), BenchError> {
        if let Some(mut recorder) = self.recorder.take() {
            recorder.finalize()?;
        }
        Ok(())
    }

    fn negedge(&mut self, scenario: &mut dyn Scenario) -> Result<Directive, BenchError> {
        let view = CycleView {
            cycle: self.hw.cycle(),
            busy: self.hw.busy(),
            in_reset: self.hw.in_reset(),
        };
        let stimulus = scenario.on_negedge(&view);

        let inputs = self.hw.inputs_mut();
        port::drive_update(inputs, &stimulus.update);
        port::drive_query(inputs, &stimulus.query);
        let outputs = self.hw.outputs();
        let nr = port::sample_notify(outputs);
        let qr = port::sample_query(outputs);

        self.model.apply_update(stimulus.update);
        self.model.apply_query(stimulus.query);
        self.model.apply_notify_response(nr);
        self.model.apply_query_response(qr);
        self.model.step()?;

        match stimulus.directive {
            Directive::ApplyReset => {
                self.model.reset();
                self.hw.inputs_mut().rst = true;
            }
            Directive::RescindReset => self.hw.inputs_mut().rst = false,
            Directive::Continue | Directive::Terminate => {}
        }
        Ok(stimulus.directive)
    }

    /// Evaluates the hardware and traces every port that changed.
    fn eval(&mut self) -> Result<(), BenchError> {
        self.hw.eval();
        let Some(recorder) = self.recorder.as_mut() else {
            return Ok(());
        };
        let values = port::port_values(self.hw.inputs(), self.hw.outputs());
        for (index, value) in values.iter().enumerate() {
            if self.traced.map_or(true, |prev| prev[index] != *value) {
                recorder.record_change(self.tb_time, index, *value)?;
            }
        }
        self.traced = Some(values);
        Ok(())
    }
}

impl<H: Hardware> Drop for Bench<H> {
    fn drop(&mut self) {
        let _ = self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ladder_common::{NotifyResponse, QueryCommand, UpdateCommand};
    use ladder_diagnostics::Log;

    use crate::directed::Directed;
    use crate::port::{InputPorts, OutputPorts};
    use crate::rtl::LadderRtl;
    use crate::scenario::CycleStimulus;

    fn params() -> DesignParams {
        DesignParams {
            contexts: 2,
            entries: 4,
            update_pipe_delay: 4,
            query_pipe_delay: 1,
            init_cycles: Some(2),
        }
    }

    fn bench(log: &Arc<Log>) -> Bench<LadderRtl> {
        Bench::new(
            LadderRtl::new(&params()),
            &params(),
            &BenchSettings::default(),
            Scope::root(Arc::clone(log)),
        )
    }

    /// Hardware that never answers, to exercise the checker.
    #[derive(Default)]
    struct Silent {
        inputs: InputPorts,
        outputs: OutputPorts,
        prev: bool,
    }

    impl Hardware for Silent {
        fn inputs(&self) -> &InputPorts {
            &self.inputs
        }
        fn inputs_mut(&mut self) -> &mut InputPorts {
            &mut self.inputs
        }
        fn outputs(&self) -> &OutputPorts {
            &self.outputs
        }
        fn eval(&mut self) {
            if self.inputs.clk && !self.prev {
                self.outputs.cycle += 1;
            }
            self.prev = self.inputs.clk;
        }
    }

    #[test]
    fn summary_serializes() {
        let stats = ModelStats {
            notify_mismatches: 1,
            evictions: 2,
            ..ModelStats::default()
        };
        let json = serde_json::to_value(RunSummary::new(3, &stats, 1)).unwrap();
        assert_eq!(json["cycles"], 3);
        assert_eq!(json["mismatches"], 1);
        assert_eq!(json["evictions"], 2);
        assert_eq!(json["passed"], false);
    }

    #[test]
    fn terminate_ends_after_one_cycle() {
        let log = Arc::new(Log::new());
        let mut b = bench(&log);
        let mut stop = |_: &CycleView| CycleStimulus::idle(Directive::Terminate);
        let summary = b.run(&mut stop).unwrap();
        assert_eq!(summary.cycles, 1);
        assert!(summary.passed);
        assert_eq!(b.hardware().cycle(), 1);
    }

    #[test]
    fn scenario_sees_hardware_cycle() {
        let log = Arc::new(Log::new());
        let mut b = bench(&log);
        let mut seen = Vec::new();
        let mut scenario = |v: &CycleView| {
            seen.push(v.cycle);
            let d = if seen.len() == 3 { Directive::Terminate } else { Directive::Continue };
            CycleStimulus::idle(d)
        };
        b.run(&mut scenario).unwrap();
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn add_then_query_passes() {
        let log = Arc::new(Log::new());
        let mut b = bench(&log);
        let mut program = Directed::new()
            .update(UpdateCommand::add(0, 5, 10))
            .query(QueryCommand::new(0, 0))
            .wait(6);
        let summary = b.run(&mut program).unwrap();
        assert!(summary.passed, "{:?}", log.records());
        assert_eq!(summary.notifies_expected, 1);
        assert_eq!(summary.queries_checked, 1);
    }

    #[test]
    fn silent_hardware_misses_notify() {
        let log = Arc::new(Log::new());
        let mut b = Bench::new(
            Silent::default(),
            &params(),
            &BenchSettings::default(),
            Scope::root(Arc::clone(&log)),
        );
        let mut program = Directed::new().update(UpdateCommand::add(1, 2, 3)).wait(6);
        let summary = b.run(&mut program).unwrap();
        assert!(!summary.passed);
        assert_eq!(summary.mismatches, 1);
        let record = &log.records()[0];
        assert_eq!(record.scope, "tb.model");
        assert_eq!(record.cycle, 5);
        assert!(record.notes[0].contains(&NotifyResponse::new(1, 2, 3).to_string()));
    }

    #[test]
    fn reset_clears_both_sides() {
        let log = Arc::new(Log::new());
        let mut b = bench(&log);
        let mut program = Directed::new()
            .update(UpdateCommand::add(0, 5, 10))
            .reset(2)
            .wait_until_not_busy()
            .query(QueryCommand::new(0, 0))
            .wait(6);
        let summary = b.run(&mut program).unwrap();
        assert!(summary.passed, "{:?}", log.records());
        assert!(b.model().context(0).unwrap().is_empty());
        assert_eq!(summary.notifies_expected, 0);
    }

    #[test]
    fn watchdog_stops_endless_scenario() {
        let log = Arc::new(Log::new());
        let settings = BenchSettings {
            watchdog: 10,
            ..BenchSettings::default()
        };
        let mut b = Bench::new(
            LadderRtl::new(&params()),
            &params(),
            &settings,
            Scope::root(Arc::clone(&log)),
        );
        let mut forever = |_: &CycleView| CycleStimulus::default();
        let err = b.run(&mut forever).unwrap_err();
        assert!(matches!(err, BenchError::WatchdogExpired { cycles: 10 }));
        assert_eq!(log.records()[0].severity, Severity::Fatal);
    }
}

//! The stimulus interface between a test and the drive loop.

use ladder_common::{QueryCommand, UpdateCommand};
use ladder_diagnostics::Scope;

/// What the drive loop should do after the current cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Directive {
    /// Reset the model and assert hardware reset.
    ApplyReset,
    /// Deassert hardware reset.
    RescindReset,
    /// Keep running.
    #[default]
    Continue,
    /// End the run after this cycle.
    Terminate,
}

/// Hardware state visible to a scenario at a falling clock edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleView {
    /// Hardware cycle counter.
    pub cycle: u64,
    /// The block is initializing.
    pub busy: bool,
    /// Hardware reset is asserted.
    pub in_reset: bool,
}

/// Commands to drive for one cycle, and the directive that follows them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStimulus {
    /// Update command, invalid when idle.
    pub update: UpdateCommand,
    /// Query command, invalid when idle.
    pub query: QueryCommand,
    /// Directive applied after the cycle is checked.
    pub directive: Directive,
}

impl CycleStimulus {
    /// An idle cycle with the given directive.
    pub fn idle(directive: Directive) -> Self {
        Self {
            directive,
            ..Self::default()
        }
    }
}

/// A source of stimulus, consulted once per falling clock edge.
pub trait Scenario {
    /// Returns the commands to drive this cycle.
    fn on_negedge(&mut self, view: &CycleView) -> CycleStimulus;

    /// Hands the scenario its log scope before the first cycle.
    fn attach(&mut self, _log: Scope) {}
}

impl<F> Scenario for F
where
    F: FnMut(&CycleView) -> CycleStimulus,
{
    fn on_negedge(&mut self, view: &CycleView) -> CycleStimulus {
        self(view)
    }
}

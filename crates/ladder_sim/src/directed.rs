//! Directed tests as a list of instructions.
//!
//! A [`Directed`] program is built up front and consumed one instruction per
//! falling edge. The run terminates when the list is exhausted or an
//! explicit [`end`](Directed::end) is reached.
//!
//! ```ignore
//! let program = Directed::new()
//!     .reset(2)
//!     .wait_until_not_busy()
//!     .update(UpdateCommand::add(0, 5, 10))
//!     .wait(4)
//!     .query(QueryCommand::new(0, 0));
//! ```

use std::collections::VecDeque;

use ladder_common::{QueryCommand, UpdateCommand};
use ladder_diagnostics::Scope;

use crate::scenario::{CycleStimulus, CycleView, Directive, Scenario};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Instruction {
    Emit(UpdateCommand, QueryCommand),
    Wait(usize),
    WaitUntilNotBusy,
    Reset { cycles: usize, elapsed: usize },
    End,
}

/// An instruction-list scenario.
#[derive(Default)]
pub struct Directed {
    program: VecDeque<Instruction>,
    log: Option<Scope>,
}

impl Directed {
    /// Creates an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drives both commands in a single cycle.
    pub fn emit(mut self, update: UpdateCommand, query: QueryCommand) -> Self {
        self.program.push_back(Instruction::Emit(update, query));
        self
    }

    /// Drives an update command with an idle query interface.
    pub fn update(self, update: UpdateCommand) -> Self {
        self.emit(update, QueryCommand::default())
    }

    /// Drives a query command with an idle update interface.
    pub fn query(self, query: QueryCommand) -> Self {
        self.emit(UpdateCommand::default(), query)
    }

    /// Idles both interfaces for `n` cycles.
    pub fn wait(mut self, n: usize) -> Self {
        if n > 0 {
            self.program.push_back(Instruction::Wait(n));
        }
        self
    }

    /// Idles until the hardware reports it is no longer busy.
    pub fn wait_until_not_busy(mut self) -> Self {
        self.program.push_back(Instruction::WaitUntilNotBusy);
        self
    }

    /// Holds the hardware in reset for `cycles` rising edges, then releases it.
    pub fn reset(mut self, cycles: usize) -> Self {
        self.program.push_back(Instruction::Reset {
            cycles: cycles.max(1),
            elapsed: 0,
        });
        self
    }

    /// Ends the run, discarding any later instructions.
    pub fn end(mut self) -> Self {
        self.program.push_back(Instruction::End);
        self
    }

    /// Appends every instruction of `other`.
    pub fn then(mut self, other: Directed) -> Self {
        self.program.extend(other.program);
        self
    }

    /// Instructions not yet consumed.
    pub fn remaining(&self) -> usize {
        self.program.len()
    }

    fn note(&self, message: &str) {
        if let Some(log) = &self.log {
            log.info(message);
        }
    }
}

impl Scenario for Directed {
    fn attach(&mut self, log: Scope) {
        self.log = Some(log);
    }

    fn on_negedge(&mut self, view: &CycleView) -> CycleStimulus {
        if let Some(Instruction::End) = self.program.front() {
            self.note("Simulation complete!");
            self.program.clear();
        }
        let Some(front) = self.program.front_mut() else {
            return CycleStimulus::idle(Directive::Terminate);
        };

        let mut stimulus = CycleStimulus::default();
        let done = match front {
            Instruction::Emit(update, query) => {
                stimulus.update = *update;
                stimulus.query = *query;
                true
            }
            Instruction::Wait(n) => {
                *n -= 1;
                *n == 0
            }
            Instruction::WaitUntilNotBusy => !view.busy && !view.in_reset,
            Instruction::Reset { cycles, elapsed } => {
                stimulus.directive = if *elapsed == 0 {
                    Directive::ApplyReset
                } else if *elapsed == *cycles {
                    Directive::RescindReset
                } else {
                    Directive::Continue
                };
                *elapsed += 1;
                *elapsed > *cycles
            }
            // Consumed above.
            Instruction::End => false,
        };

        if done {
            if let Some(Instruction::WaitUntilNotBusy) = self.program.pop_front() {
                self.note("Initialization complete!");
            }
        }
        stimulus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ladder_diagnostics::Log;

    fn run(program: &mut Directed, views: impl IntoIterator<Item = CycleView>) -> Vec<CycleStimulus> {
        views.into_iter().map(|v| program.on_negedge(&v)).collect()
    }

    fn ready() -> CycleView {
        CycleView::default()
    }

    #[test]
    fn empty_program_terminates() {
        let mut p = Directed::new();
        assert_eq!(p.on_negedge(&ready()).directive, Directive::Terminate);
    }

    #[test]
    fn emit_then_exhaust() {
        let uc = UpdateCommand::add(0, 1, 2);
        let mut p = Directed::new().update(uc);
        let out = run(&mut p, [ready(), ready()]);
        assert_eq!(out[0].update, uc);
        assert!(!out[0].query.is_valid());
        assert_eq!(out[0].directive, Directive::Continue);
        assert_eq!(out[1].directive, Directive::Terminate);
    }

    #[test]
    fn wait_idles_for_n_cycles() {
        let uc = UpdateCommand::clear(0);
        let mut p = Directed::new().wait(3).update(uc);
        let out = run(&mut p, [ready(); 4]);
        assert!(out[..3].iter().all(|s| !s.update.is_valid()));
        assert_eq!(out[3].update, uc);
    }

    #[test]
    fn zero_wait_is_skipped() {
        let p = Directed::new().wait(0);
        assert_eq!(p.remaining(), 0);
    }

    #[test]
    fn reset_sequence() {
        let mut p = Directed::new().reset(2);
        let out = run(&mut p, [ready(); 4]);
        let directives: Vec<_> = out.iter().map(|s| s.directive).collect();
        assert_eq!(
            directives,
            vec![
                Directive::ApplyReset,
                Directive::Continue,
                Directive::RescindReset,
                Directive::Terminate
            ]
        );
    }

    #[test]
    fn wait_until_not_busy_polls() {
        let log = Arc::new(Log::new());
        let mut p = Directed::new()
            .wait_until_not_busy()
            .query(QueryCommand::new(0, 0));
        p.attach(Scope::root(Arc::clone(&log)).child("test"));
        let busy = CycleView {
            busy: true,
            ..CycleView::default()
        };
        let out = run(&mut p, [busy, busy, ready(), ready()]);
        assert!(out[..3].iter().all(|s| !s.query.is_valid()));
        assert!(out[3].query.is_valid());
        let records = log.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "Initialization complete!");
        assert_eq!(records[0].scope, "tb.test");
    }

    #[test]
    fn end_discards_rest() {
        let mut p = Directed::new().end().update(UpdateCommand::clear(0));
        assert_eq!(p.on_negedge(&ready()).directive, Directive::Terminate);
        assert_eq!(p.remaining(), 0);
    }

    #[test]
    fn then_concatenates() {
        let a = Directed::new().wait(1);
        let b = Directed::new().update(UpdateCommand::clear(1));
        assert_eq!(a.then(b).remaining(), 2);
    }
}

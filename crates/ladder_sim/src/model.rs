//! Reference model of the head-tracking block.
//!
//! [`Model`] re-implements the list semantics of the hardware in software.
//! Each cycle it consumes the commands driven onto the hardware, predicts the
//! notify and query responses those commands must produce, delays the
//! predictions by the hardware's pipeline latencies, and compares the
//! predictions that fall due against what was sampled from the hardware.

use serde::Serialize;

use ladder_common::{
    ContextId, Key, ListSize, NotifyResponse, Opcode, QueryCommand, QueryResponse,
    UpdateCommand, Volume,
};
use ladder_config::DesignParams;
use ladder_diagnostics::{Disposition, Record, Scope, Severity};

use crate::error::{BenchError, Interface};
use crate::pipe::DelayPipe;

/// One element of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Ordering key.
    pub key: Key,
    /// Payload.
    pub volume: Volume,
}

/// Counters accumulated by the model over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModelStats {
    /// Cycles on which a notify prediction was compared.
    pub notifies_checked: u64,
    /// Notify predictions that were valid (a head change was expected).
    pub notifies_expected: u64,
    /// Cycles on which a query prediction was compared.
    pub queries_checked: u64,
    /// Failed notify comparisons.
    pub notify_mismatches: u64,
    /// Failed query comparisons.
    pub query_mismatches: u64,
    /// Entries dropped because an Add exceeded context capacity.
    pub evictions: u64,
}

impl ModelStats {
    /// Total failed comparisons.
    pub fn mismatches(&self) -> u64 {
        self.notify_mismatches + self.query_mismatches
    }
}

/// The reference model.
pub struct Model {
    contexts: Vec<Vec<Entry>>,
    capacity: usize,
    check_queries: bool,
    notify_pipe: DelayPipe<NotifyResponse>,
    query_pipe: DelayPipe<QueryResponse>,
    uc: UpdateCommand,
    qc: QueryCommand,
    qr: QueryResponse,
    nr: NotifyResponse,
    stats: ModelStats,
    log: Scope,
}

impl Model {
    /// Creates an empty model for a design with the given parameters.
    pub fn new(params: &DesignParams, check_queries: bool, log: Scope) -> Self {
        Self {
            contexts: vec![Vec::new(); params.contexts as usize],
            capacity: params.entries as usize,
            check_queries,
            notify_pipe: DelayPipe::new(params.update_pipe_delay),
            query_pipe: DelayPipe::new(params.query_pipe_delay),
            uc: UpdateCommand::default(),
            qc: QueryCommand::default(),
            qr: QueryResponse::default(),
            nr: NotifyResponse::default(),
            stats: ModelStats::default(),
            log,
        }
    }

    /// Empties every context and discards all in-flight predictions.
    pub fn reset(&mut self) {
        for ctxt in &mut self.contexts {
            ctxt.clear();
        }
        self.notify_pipe.clear();
        self.query_pipe.clear();
    }

    /// Supplies the update command driven this cycle.
    pub fn apply_update(&mut self, uc: UpdateCommand) {
        self.uc = uc;
    }

    /// Supplies the query command driven this cycle.
    pub fn apply_query(&mut self, qc: QueryCommand) {
        self.qc = qc;
    }

    /// Supplies the query response sampled this cycle.
    pub fn apply_query_response(&mut self, qr: QueryResponse) {
        self.qr = qr;
    }

    /// Supplies the notify response sampled this cycle.
    pub fn apply_notify_response(&mut self, nr: NotifyResponse) {
        self.nr = nr;
    }

    /// Advances the model by one cycle.
    ///
    /// Processes the pending commands, stages their predictions, and checks
    /// the predictions due this cycle against the sampled responses.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::ContextOutOfRange`] if a command addresses a
    /// context that does not exist, and [`BenchError::Aborted`] if a failed
    /// check reaches the log's abort threshold.
    pub fn step(&mut self) -> Result<(), BenchError> {
        self.notify_pipe.step();
        self.query_pipe.step();

        self.handle_update()?;
        self.handle_query()?;
        self.check_notify()?;
        self.check_query()
    }

    /// The sorted entries of context `id`, if it exists.
    pub fn context(&self, id: ContextId) -> Option<&[Entry]> {
        self.contexts.get(id as usize).map(Vec::as_slice)
    }

    /// Counters accumulated since construction.
    pub fn stats(&self) -> &ModelStats {
        &self.stats
    }

    /// The notify prediction due this cycle.
    pub fn expected_notify(&self) -> &NotifyResponse {
        self.notify_pipe.head()
    }

    /// The query prediction due this cycle.
    pub fn expected_query(&self) -> &QueryResponse {
        self.query_pipe.head()
    }

    fn handle_update(&mut self) -> Result<(), BenchError> {
        if !self.uc.is_valid() {
            // No command on the interface this cycle, so no notify is expected.
            self.notify_pipe.push_back(NotifyResponse::default());
            return Ok(());
        }

        let uc = self.uc;
        let index = self.context_index(Interface::Update, uc.id())?;
        let capacity = self.capacity;
        let ctxt = &mut self.contexts[index];

        let mut nr = NotifyResponse::default();
        match uc.op() {
            Opcode::Clear => {
                if let Some(head) = ctxt.first() {
                    // Clearing discards the current head.
                    nr = NotifyResponse::new(uc.id(), head.key, head.volume);
                }
                ctxt.clear();
            }
            Opcode::Add => {
                if ctxt.first().map_or(true, |head| uc.key() < head.key) {
                    // The new entry becomes the head, so it is what gets reported.
                    nr = NotifyResponse::new(uc.id(), uc.key(), uc.volume());
                }
                ctxt.push(Entry {
                    key: uc.key(),
                    volume: uc.volume(),
                });
                // Stable: equal keys keep insertion order.
                ctxt.sort_by_key(|e| e.key);
                if ctxt.len() > capacity {
                    if let Some(spilled) = ctxt.pop() {
                        self.stats.evictions += 1;
                        self.log.debug(format!(
                            "context {} full, evicted key {} volume {}",
                            uc.id(),
                            spilled.key,
                            spilled.volume
                        ));
                    }
                }
            }
            Opcode::Delete | Opcode::Replace => {
                // Absent key (or empty context): the command is a no-op.
                if let Some(pos) = ctxt.iter().position(|e| e.key == uc.key()) {
                    if pos == 0 {
                        let head = ctxt[0];
                        nr = NotifyResponse::new(uc.id(), head.key, head.volume);
                    }
                    if uc.op() == Opcode::Replace {
                        ctxt[pos].volume = uc.volume();
                    } else {
                        ctxt.remove(pos);
                    }
                }
            }
        }

        self.notify_pipe.push_back(nr);
        Ok(())
    }

    fn handle_query(&mut self) -> Result<(), BenchError> {
        let mut qr = QueryResponse::default();
        if self.qc.is_valid() {
            let index = self.context_index(Interface::Query, self.qc.id())?;
            let ctxt = &self.contexts[index];
            let level = self.qc.level() as usize;
            qr = match ctxt.get(level) {
                Some(e) => QueryResponse::new(e.key, e.volume, false, ctxt.len() as ListSize),
                None => QueryResponse::errored(),
            };
        }
        self.query_pipe.push_back(qr);
        Ok(())
    }

    fn check_notify(&mut self) -> Result<(), BenchError> {
        let predicted = *self.notify_pipe.head();
        let actual = self.nr;
        self.stats.notifies_checked += 1;
        if predicted.is_valid() {
            self.stats.notifies_expected += 1;
        }
        if predicted.matches(&actual) {
            return Ok(());
        }
        self.stats.notify_mismatches += 1;
        self.report_mismatch("notify mismatch", predicted.to_string(), actual.to_string())
    }

    fn check_query(&mut self) -> Result<(), BenchError> {
        let predicted = *self.query_pipe.head();
        if !self.check_queries || !predicted.is_valid() {
            return Ok(());
        }
        let actual = self.qr;
        self.stats.queries_checked += 1;
        if predicted.matches(&actual) {
            return Ok(());
        }
        self.stats.query_mismatches += 1;
        self.report_mismatch(
            "query response mismatch",
            predicted.to_string(),
            actual.to_string(),
        )
    }

    fn report_mismatch(
        &self,
        what: &str,
        expected: String,
        actual: String,
    ) -> Result<(), BenchError> {
        let record = Record::new(Severity::Error, what)
            .with_note(format!("expected {expected}"))
            .with_note(format!("actual   {actual}"));
        match self.log.emit(record) {
            Disposition::Continue => Ok(()),
            Disposition::Abort => Err(BenchError::Aborted {
                cycle: self.log.log().cycle(),
                reason: what.to_string(),
            }),
        }
    }

    /// Validates a context id, raising a fatal record if it is out of range.
    fn context_index(&self, interface: Interface, id: ContextId) -> Result<usize, BenchError> {
        let limit = self.contexts.len() as u32;
        if id < limit {
            return Ok(id as usize);
        }
        let err = BenchError::ContextOutOfRange {
            interface,
            id,
            limit,
        };
        let _ = self.log.write(Severity::Fatal, err.to_string());
        Err(err)
    }
}

//! Register-level behavioral model of the head-tracking block.
//!
//! [`LadderRtl`] implements the [`Hardware`] port contract the way the block
//! is built: each context is a fixed array of `entries` slots kept in key
//! order by shift-insert, notifications travel through an output register
//! chain of depth `update_pipe_delay`, and query responses through a chain of
//! depth `query_pipe_delay`. Outputs change only on rising clock edges.
//!
//! After reset is released the block is busy for `init_cycles` cycles while
//! it clears its tables; commands presented during that window are ignored.
//! Commands with an undefined opcode or an out-of-range context id are also
//! ignored.

use ladder_common::{ContextId, Key, ListSize, Opcode, Volume};
use ladder_config::DesignParams;

use crate::port::{Hardware, InputPorts, OutputPorts};

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    key: Key,
    volume: Volume,
}

#[derive(Debug, Clone)]
struct Table {
    slots: Vec<Slot>,
    count: usize,
}

impl Table {
    fn new(entries: usize) -> Self {
        Self {
            slots: vec![Slot::default(); entries],
            count: 0,
        }
    }

    fn head(&self) -> Option<Slot> {
        (self.count > 0).then(|| self.slots[0])
    }

    fn find(&self, key: Key) -> Option<usize> {
        self.slots[..self.count].iter().position(|s| s.key == key)
    }

    /// Inserts behind every slot with an equal or lower key; the last slot
    /// falls off the end when the table is full. Returns the insert position.
    fn insert(&mut self, slot: Slot) -> usize {
        let cap = self.slots.len();
        let pos = self.slots[..self.count]
            .iter()
            .position(|s| s.key > slot.key)
            .unwrap_or(self.count);
        if pos < cap {
            let last = self.count.min(cap - 1);
            for i in (pos + 1..=last).rev() {
                self.slots[i] = self.slots[i - 1];
            }
            self.slots[pos] = slot;
            self.count = (self.count + 1).min(cap);
        }
        pos
    }

    fn remove(&mut self, pos: usize) {
        for i in pos..self.count - 1 {
            self.slots[i] = self.slots[i + 1];
        }
        self.count -= 1;
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct NotifyStage {
    vld: bool,
    id: ContextId,
    key: Key,
    volume: Volume,
}

impl NotifyStage {
    fn head(id: ContextId, slot: Slot) -> Self {
        Self {
            vld: true,
            id,
            key: slot.key,
            volume: slot.volume,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct QueryStage {
    key: Key,
    volume: Volume,
    error: bool,
    listsize: ListSize,
}

/// Behavioral hardware model of the block.
pub struct LadderRtl {
    inputs: InputPorts,
    outputs: OutputPorts,
    prev_clk: bool,
    tables: Vec<Table>,
    notify_regs: Vec<NotifyStage>,
    query_regs: Vec<QueryStage>,
    init_cycles: u32,
    init_remaining: u32,
}

impl LadderRtl {
    /// Creates a model with empty tables that is ready to accept commands.
    pub fn new(params: &DesignParams) -> Self {
        Self {
            inputs: InputPorts::default(),
            outputs: OutputPorts::default(),
            prev_clk: false,
            tables: vec![Table::new(params.entries as usize); params.contexts as usize],
            notify_regs: vec![NotifyStage::default(); params.update_pipe_delay],
            query_regs: vec![QueryStage::default(); params.query_pipe_delay],
            init_cycles: params.init_cycles(),
            init_remaining: 0,
        }
    }

    fn posedge(&mut self) {
        self.outputs.cycle += 1;

        if self.inputs.rst {
            for t in &mut self.tables {
                t.count = 0;
            }
            self.notify_regs.fill(NotifyStage::default());
            self.query_regs.fill(QueryStage::default());
            self.init_remaining = self.init_cycles;
            self.outputs.busy = true;
            self.drive_outputs();
            return;
        }

        let (ntf, qry) = if self.init_remaining > 0 {
            self.init_remaining -= 1;
            (NotifyStage::default(), QueryStage::default())
        } else {
            let ntf = self.update();
            (ntf, self.lookup())
        };
        self.outputs.busy = self.init_remaining > 0;

        shift_in(&mut self.notify_regs, ntf);
        shift_in(&mut self.query_regs, qry);
        self.drive_outputs();
    }

    fn update(&mut self) -> NotifyStage {
        let i = self.inputs;
        if !i.upd_vld {
            return NotifyStage::default();
        }
        let (Ok(op), Some(table)) = (
            Opcode::try_from(i.upd_cmd),
            self.tables.get_mut(i.upd_id as usize),
        ) else {
            return NotifyStage::default();
        };

        let mut ntf = NotifyStage::default();
        match op {
            Opcode::Clear => {
                if let Some(head) = table.head() {
                    ntf = NotifyStage::head(i.upd_id, head);
                }
                table.count = 0;
            }
            Opcode::Add => {
                let slot = Slot {
                    key: i.upd_key,
                    volume: i.upd_volume,
                };
                if table.insert(slot) == 0 {
                    ntf = NotifyStage::head(i.upd_id, slot);
                }
            }
            Opcode::Delete | Opcode::Replace => {
                if let Some(pos) = table.find(i.upd_key) {
                    if pos == 0 {
                        ntf = NotifyStage::head(i.upd_id, table.slots[0]);
                    }
                    if op == Opcode::Replace {
                        table.slots[pos].volume = i.upd_volume;
                    } else {
                        table.remove(pos);
                    }
                }
            }
        }
        ntf
    }

    fn lookup(&self) -> QueryStage {
        let i = self.inputs;
        if !i.qry_vld {
            return QueryStage::default();
        }
        let Some(table) = self.tables.get(i.qry_id as usize) else {
            return QueryStage::default();
        };
        let level = i.qry_level as usize;
        if level < table.count {
            let s = table.slots[level];
            QueryStage {
                key: s.key,
                volume: s.volume,
                error: false,
                listsize: table.count as ListSize,
            }
        } else {
            QueryStage {
                error: true,
                ..QueryStage::default()
            }
        }
    }

    fn drive_outputs(&mut self) {
        if let Some(n) = self.notify_regs.last() {
            self.outputs.ntf_vld = n.vld;
            self.outputs.ntf_id = n.id;
            self.outputs.ntf_key = n.key;
            self.outputs.ntf_volume = n.volume;
        }
        if let Some(q) = self.query_regs.last() {
            self.outputs.qry_key = q.key;
            self.outputs.qry_volume = q.volume;
            self.outputs.qry_error = q.error;
            self.outputs.qry_listsize = q.listsize;
        }
    }
}

/// Shifts `stage` into the front of a register chain. An empty chain drops it.
fn shift_in<T>(regs: &mut [T], stage: T) {
    regs.rotate_right(1);
    if let Some(first) = regs.first_mut() {
        *first = stage;
    }
}

impl Hardware for LadderRtl {
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
        let rising = self.inputs.clk && !self.prev_clk;
        self.prev_clk = self.inputs.clk;
        if rising {
            self.posedge();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{drive_query, drive_update, sample_notify, sample_query};
    use ladder_common::{NotifyResponse, QueryCommand, QueryResponse, UpdateCommand};

    fn rtl(entries: u32) -> LadderRtl {
        LadderRtl::new(&DesignParams {
            contexts: 2,
            entries,
            update_pipe_delay: 4,
            query_pipe_delay: 1,
            init_cycles: Some(3),
        })
    }

    /// Drives the commands, then clocks one full period.
    fn cycle(hw: &mut LadderRtl, uc: UpdateCommand, qc: QueryCommand) {
        drive_update(hw.inputs_mut(), &uc);
        drive_query(hw.inputs_mut(), &qc);
        hw.inputs_mut().clk = false;
        hw.eval();
        hw.inputs_mut().clk = true;
        hw.eval();
    }

    fn idle(hw: &mut LadderRtl) {
        cycle(hw, UpdateCommand::default(), QueryCommand::default());
    }

    fn update(hw: &mut LadderRtl, uc: UpdateCommand) {
        cycle(hw, uc, QueryCommand::default());
    }

    /// Flushes the notify chain and returns the notify of the last update.
    fn notify_of(hw: &mut LadderRtl, uc: UpdateCommand) -> NotifyResponse {
        update(hw, uc);
        for _ in 0..3 {
            idle(hw);
        }
        sample_notify(hw.outputs())
    }

    fn query(hw: &mut LadderRtl, id: ContextId, level: u32) -> QueryResponse {
        cycle(hw, UpdateCommand::default(), QueryCommand::new(id, level));
        sample_query(hw.outputs())
    }

    #[test]
    fn notify_appears_after_pipeline_depth() {
        let mut hw = rtl(4);
        update(&mut hw, UpdateCommand::add(0, 5, 10));
        for _ in 0..3 {
            assert!(!hw.outputs().ntf_vld);
            idle(&mut hw);
        }
        assert_eq!(sample_notify(hw.outputs()), NotifyResponse::new(0, 5, 10));
        idle(&mut hw);
        assert!(!hw.outputs().ntf_vld);
    }

    #[test]
    fn outputs_only_change_on_rising_edge() {
        let mut hw = rtl(4);
        hw.inputs_mut().clk = true;
        hw.eval();
        let cycle = hw.outputs().cycle;
        hw.eval();
        hw.eval();
        assert_eq!(hw.outputs().cycle, cycle);
        hw.inputs_mut().clk = false;
        hw.eval();
        assert_eq!(hw.outputs().cycle, cycle);
    }

    #[test]
    fn list_semantics() {
        let mut hw = rtl(4);
        assert_eq!(
            notify_of(&mut hw, UpdateCommand::add(0, 5, 10)),
            NotifyResponse::new(0, 5, 10)
        );
        assert_eq!(
            notify_of(&mut hw, UpdateCommand::add(0, 3, 20)),
            NotifyResponse::new(0, 3, 20)
        );
        assert!(!notify_of(&mut hw, UpdateCommand::replace(0, 5, 99)).is_valid());
        assert_eq!(
            notify_of(&mut hw, UpdateCommand::delete(0, 3)),
            NotifyResponse::new(0, 3, 20)
        );
        assert_eq!(query(&mut hw, 0, 0), QueryResponse::new(5, 99, false, 1));
        assert_eq!(query(&mut hw, 0, 1), QueryResponse::errored());
    }

    #[test]
    fn full_table_drops_highest_key() {
        let mut hw = rtl(2);
        update(&mut hw, UpdateCommand::add(1, 5, 1));
        update(&mut hw, UpdateCommand::add(1, 7, 2));
        update(&mut hw, UpdateCommand::add(1, 6, 3));
        update(&mut hw, UpdateCommand::add(1, 9, 4));
        assert_eq!(query(&mut hw, 1, 0), QueryResponse::new(5, 1, false, 2));
        assert_eq!(query(&mut hw, 1, 1), QueryResponse::new(6, 3, false, 2));
    }

    #[test]
    fn equal_keys_keep_arrival_order() {
        let mut hw = rtl(4);
        update(&mut hw, UpdateCommand::add(0, 4, 1));
        update(&mut hw, UpdateCommand::add(0, 4, 2));
        assert_eq!(query(&mut hw, 0, 0).volume(), 1);
        assert_eq!(query(&mut hw, 0, 1).volume(), 2);
    }

    #[test]
    fn clear_reports_head() {
        let mut hw = rtl(4);
        update(&mut hw, UpdateCommand::add(0, 8, 1));
        assert_eq!(
            notify_of(&mut hw, UpdateCommand::clear(0)),
            NotifyResponse::new(0, 8, 1)
        );
        assert!(query(&mut hw, 0, 0).error());
    }

    #[test]
    fn reset_then_busy_window() {
        let mut hw = rtl(4);
        update(&mut hw, UpdateCommand::add(0, 8, 1));
        hw.inputs_mut().rst = true;
        idle(&mut hw);
        assert!(hw.busy());
        assert!(hw.in_reset());
        hw.inputs_mut().rst = false;

        // Commands presented while busy are dropped.
        update(&mut hw, UpdateCommand::add(0, 1, 1));
        assert!(hw.busy());
        idle(&mut hw);
        assert!(hw.busy());
        idle(&mut hw);
        assert!(!hw.busy());
        assert!(query(&mut hw, 0, 0).error());
    }

    #[test]
    fn undefined_commands_are_ignored() {
        let mut hw = rtl(4);
        update(&mut hw, UpdateCommand::add(5, 1, 1));
        hw.inputs_mut().upd_vld = true;
        hw.inputs_mut().upd_id = 0;
        hw.inputs_mut().upd_cmd = 7;
        hw.inputs_mut().clk = false;
        hw.eval();
        hw.inputs_mut().clk = true;
        hw.eval();
        for _ in 0..4 {
            idle(&mut hw);
            assert!(!hw.outputs().ntf_vld);
        }
        assert!(query(&mut hw, 0, 0).error());
    }

    #[test]
    fn cycle_counter_free_runs() {
        let mut hw = rtl(4);
        for _ in 0..5 {
            idle(&mut hw);
        }
        hw.inputs_mut().rst = true;
        idle(&mut hw);
        assert_eq!(hw.cycle(), 6);
    }

    #[test]
    fn empty_register_chain_does_not_panic() {
        let mut hw = LadderRtl::new(&DesignParams {
            contexts: 1,
            entries: 2,
            update_pipe_delay: 0,
            query_pipe_delay: 0,
            init_cycles: Some(0),
        });
        update(&mut hw, UpdateCommand::add(0, 1, 1));
        idle(&mut hw);
        assert!(!hw.outputs().ntf_vld);
    }
}

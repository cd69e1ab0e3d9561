//! Signal-level contract of the head-tracking block.
//!
//! The hardware is an opaque [`Hardware`] implementation exposing its input
//! and output ports as plain values, in the manner of a generated simulation
//! model: the bench writes [`InputPorts`], calls [`Hardware::eval`], and reads
//! [`OutputPorts`]. The free functions in this module translate between the
//! port level and the protocol transactions of `ladder_common`.

use ladder_common::{
    ContextId, Key, Level, ListSize, NotifyResponse, QueryCommand, QueryResponse,
    UpdateCommand, Volume,
};

/// Ports driven by the bench.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputPorts {
    /// Clock.
    pub clk: bool,
    /// Synchronous reset, active high.
    pub rst: bool,
    /// Update command valid.
    pub upd_vld: bool,
    /// Update command context id.
    pub upd_id: ContextId,
    /// Update command opcode encoding.
    pub upd_cmd: u8,
    /// Update command key.
    pub upd_key: Key,
    /// Update command volume.
    pub upd_volume: Volume,
    /// Query command valid.
    pub qry_vld: bool,
    /// Query command context id.
    pub qry_id: ContextId,
    /// Query command level.
    pub qry_level: Level,
}

/// Ports sampled by the bench.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputPorts {
    /// Notify valid.
    pub ntf_vld: bool,
    /// Notify context id.
    pub ntf_id: ContextId,
    /// Notify key.
    pub ntf_key: Key,
    /// Notify volume.
    pub ntf_volume: Volume,
    /// Query response key.
    pub qry_key: Key,
    /// Query response volume.
    pub qry_volume: Volume,
    /// Query response error flag.
    pub qry_error: bool,
    /// Query response list size.
    pub qry_listsize: ListSize,
    /// The block is initializing and cannot accept commands.
    pub busy: bool,
    /// Free-running cycle counter.
    pub cycle: u64,
}

/// A cycle-evaluated hardware model.
///
/// Implementations update their outputs only from [`eval`](Self::eval); a
/// rising clock edge is the transition of `inputs().clk` from low to high
/// between two evaluations.
pub trait Hardware {
    /// The current input port values.
    fn inputs(&self) -> &InputPorts;

    /// Mutable access to the input ports.
    fn inputs_mut(&mut self) -> &mut InputPorts;

    /// The current output port values.
    fn outputs(&self) -> &OutputPorts;

    /// Evaluates the model against the current inputs.
    fn eval(&mut self);

    /// Whether the block is held in reset.
    fn in_reset(&self) -> bool {
        self.inputs().rst
    }

    /// Whether the block is initializing.
    fn busy(&self) -> bool {
        self.outputs().busy
    }

    /// The hardware cycle counter.
    fn cycle(&self) -> u64 {
        self.outputs().cycle
    }
}

/// Drives an update command onto the update interface.
///
/// Payload ports keep their previous values when the command is invalid.
pub fn drive_update(ports: &mut InputPorts, uc: &UpdateCommand) {
    ports.upd_vld = uc.is_valid();
    if uc.is_valid() {
        ports.upd_id = uc.id();
        ports.upd_cmd = uc.op().encoding();
        ports.upd_key = uc.key();
        ports.upd_volume = uc.volume();
    }
}

/// Drives a query command onto the query interface.
pub fn drive_query(ports: &mut InputPorts, qc: &QueryCommand) {
    ports.qry_vld = qc.is_valid();
    if qc.is_valid() {
        ports.qry_id = qc.id();
        ports.qry_level = qc.level();
    }
}

/// Samples the notify interface.
pub fn sample_notify(ports: &OutputPorts) -> NotifyResponse {
    if ports.ntf_vld {
        NotifyResponse::new(ports.ntf_id, ports.ntf_key, ports.ntf_volume)
    } else {
        NotifyResponse::default()
    }
}

/// Samples the query response interface. The response is always valid.
pub fn sample_query(ports: &OutputPorts) -> QueryResponse {
    QueryResponse::new(
        ports.qry_key,
        ports.qry_volume,
        ports.qry_error,
        ports.qry_listsize,
    )
}

/// Name and bit width of every traced port, in [`port_values`] order.
pub const PORTS: &[(&str, u32)] = &[
    ("clk", 1),
    ("rst", 1),
    ("i_upd_vld", 1),
    ("i_upd_id", 32),
    ("i_upd_cmd", 8),
    ("i_upd_key", 32),
    ("i_upd_volume", 32),
    ("i_qry_vld", 1),
    ("i_qry_id", 32),
    ("i_qry_level", 32),
    ("o_ntf_vld", 1),
    ("o_ntf_id", 32),
    ("o_ntf_key", 32),
    ("o_ntf_volume", 32),
    ("o_qry_key", 32),
    ("o_qry_volume", 32),
    ("o_qry_error", 1),
    ("o_qry_listsize", 32),
    ("o_busy", 1),
    ("o_cycle", 64),
];

/// Flattens the port values in [`PORTS`] order.
pub fn port_values(i: &InputPorts, o: &OutputPorts) -> [u64; 20] {
    [
        u64::from(i.clk),
        u64::from(i.rst),
        u64::from(i.upd_vld),
        u64::from(i.upd_id),
        u64::from(i.upd_cmd),
        u64::from(i.upd_key),
        u64::from(i.upd_volume),
        u64::from(i.qry_vld),
        u64::from(i.qry_id),
        u64::from(i.qry_level),
        u64::from(o.ntf_vld),
        u64::from(o.ntf_id),
        u64::from(o.ntf_key),
        u64::from(o.ntf_volume),
        u64::from(o.qry_key),
        u64::from(o.qry_volume),
        u64::from(o.qry_error),
        u64::from(o.qry_listsize),
        u64::from(o.busy),
        o.cycle,
    ]
}

//! Validity-tagged transactions of the four hardware interfaces.
//!
//! Every transaction carries an explicit validity flag. A default-constructed
//! transaction is invalid and all of its other fields are zero; constructing
//! a transaction from its fields marks it valid. Consumers must check
//! [`is_valid`](UpdateCommand::is_valid) before interpreting any other field.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::opcode::Opcode;
use crate::{ContextId, Key, Level, ListSize, Volume};

/// A command on the update interface.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct UpdateCommand {
    vld: bool,
    id: ContextId,
    op: Opcode,
    key: Key,
    volume: Volume,
}

impl UpdateCommand {
    /// Creates a valid update command.
    pub fn new(id: ContextId, op: Opcode, key: Key, volume: Volume) -> Self {
        Self {
            vld: true,
            id,
            op,
            key,
            volume,
        }
    }

    /// Clears every entry of context `id`.
    pub fn clear(id: ContextId) -> Self {
        Self::new(id, Opcode::Clear, 0, 0)
    }

    /// Adds `key`/`volume` to context `id`.
    pub fn add(id: ContextId, key: Key, volume: Volume) -> Self {
        Self::new(id, Opcode::Add, key, volume)
    }

    /// Deletes the entry with `key` from context `id`.
    pub fn delete(id: ContextId, key: Key) -> Self {
        Self::new(id, Opcode::Delete, key, 0)
    }

    /// Replaces the volume of the entry with `key` in context `id`.
    pub fn replace(id: ContextId, key: Key, volume: Volume) -> Self {
        Self::new(id, Opcode::Replace, key, volume)
    }

    /// Returns `true` if a command is present.
    pub fn is_valid(&self) -> bool {
        self.vld
    }

    /// The addressed context.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// The requested operation.
    pub fn op(&self) -> Opcode {
        self.op
    }

    /// The key operand.
    pub fn key(&self) -> Key {
        self.key
    }

    /// The volume operand.
    pub fn volume(&self) -> Volume {
        self.volume
    }
}

impl fmt::Display for UpdateCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.vld {
            return write!(f, "UpdateCommand{{vld:0}}");
        }
        write!(
            f,
            "UpdateCommand{{id:{}, cmd:{}, key:{}, volume:{}}}",
            self.id, self.op, self.key, self.volume
        )
    }
}

/// A rank lookup on the query interface.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct QueryCommand {
    vld: bool,
    id: ContextId,
    level: Level,
}

impl QueryCommand {
    /// Creates a valid query for rank `level` of context `id`.
    pub fn new(id: ContextId, level: Level) -> Self {
        Self {
            vld: true,
            id,
            level,
        }
    }

    /// Returns `true` if a query is present.
    pub fn is_valid(&self) -> bool {
        self.vld
    }

    /// The addressed context.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// The requested zero-based rank.
    pub fn level(&self) -> Level {
        self.level
    }
}

impl fmt::Display for QueryCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.vld {
            return write!(f, "QueryCommand{{vld:0}}");
        }
        write!(f, "QueryCommand{{id:{}, level:{}}}", self.id, self.level)
    }
}

/// The response to a query.
///
/// The hardware presents a response on every cycle; the validity flag is
/// used by the reference model to mark cycles on which no response is
/// expected.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    vld: bool,
    key: Key,
    volume: Volume,
    error: bool,
    listsize: ListSize,
}

impl QueryResponse {
    /// Creates a valid query response.
    pub fn new(key: Key, volume: Volume, error: bool, listsize: ListSize) -> Self {
        Self {
            vld: true,
            key,
            volume,
            error,
            listsize,
        }
    }

    /// An errored response: the requested level was out of range.
    pub fn errored() -> Self {
        Self::new(0, 0, true, 0)
    }

    /// Returns `true` if a response is present.
    pub fn is_valid(&self) -> bool {
        self.vld
    }

    /// Key of the entry at the requested rank.
    pub fn key(&self) -> Key {
        self.key
    }

    /// Volume of the entry at the requested rank.
    pub fn volume(&self) -> Volume {
        self.volume
    }

    /// Whether the requested rank was out of range.
    pub fn error(&self) -> bool {
        self.error
    }

    /// Size of the context when the query was answered.
    pub fn listsize(&self) -> ListSize {
        self.listsize
    }

    /// Compares a prediction against an observed response.
    ///
    /// Returns `false` if the validity flags differ, or if both are valid and
    /// any field differs.
    pub fn matches(&self, actual: &QueryResponse) -> bool {
        if self.vld != actual.vld {
            return false;
        }
        !self.vld
            || (self.key == actual.key
                && self.volume == actual.volume
                && self.error == actual.error
                && self.listsize == actual.listsize)
    }
}

impl fmt::Display for QueryResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.vld {
            return write!(f, "QueryResponse{{vld:0}}");
        }
        write!(
            f,
            "QueryResponse{{key:{}, volume:{}, error:{}, listsize:{}}}",
            self.key, self.volume, self.error, self.listsize
        )
    }
}

/// An unsolicited head-change notification.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct NotifyResponse {
    vld: bool,
    id: ContextId,
    key: Key,
    volume: Volume,
}

impl NotifyResponse {
    /// Creates a valid notification for context `id`.
    pub fn new(id: ContextId, key: Key, volume: Volume) -> Self {
        Self {
            vld: true,
            id,
            key,
            volume,
        }
    }

    /// Returns `true` if a notification is present.
    pub fn is_valid(&self) -> bool {
        self.vld
    }

    /// The context whose head changed.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// The reported key.
    pub fn key(&self) -> Key {
        self.key
    }

    /// The reported volume.
    pub fn volume(&self) -> Volume {
        self.volume
    }

    /// Compares a prediction against an observed notification.
    ///
    /// Returns `false` if the validity flags differ, or if both are valid and
    /// any field differs.
    pub fn matches(&self, actual: &NotifyResponse) -> bool {
        if self.vld != actual.vld {
            return false;
        }
        !self.vld || (self.id == actual.id && self.key == actual.key && self.volume == actual.volume)
    }
}

impl fmt::Display for NotifyResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.vld {
            return write!(f, "NotifyResponse{{vld:0}}");
        }
        write!(
            f,
            "NotifyResponse{{id:{}, key:{}, volume:{}}}",
            self.id, self.key, self.volume
        )
    }
}

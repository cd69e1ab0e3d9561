//! Shared protocol types for the ladder verification environment.
//!
//! This crate provides the scalar field types of the head-tracking block's
//! interfaces, the update opcode encoding, and the four validity-tagged
//! interface transactions exchanged between the hardware, the reference
//! model, and stimulus generators.

#![warn(missing_docs)]

pub mod opcode;
pub mod proto;

pub use opcode::{Opcode, ParseOpcodeError};
pub use proto::{NotifyResponse, QueryCommand, QueryResponse, UpdateCommand};

/// Identifier of one independently addressed context, in `[0, contexts)`.
pub type ContextId = u32;
/// Ordering key of a list entry. Lower keys sort towards the head.
pub type Key = u32;
/// Payload carried alongside a key.
pub type Volume = u32;
/// Zero-based rank requested by a query.
pub type Level = u32;
/// Number of entries currently held by a context.
pub type ListSize = u32;

//! Update command opcodes and their wire encoding.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The operation carried by an update command.
///
/// The discriminant is the value driven onto the hardware's update-opcode
/// input.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    /// Discard every entry of the addressed context.
    #[default]
    Clear = 0,
    /// Insert a new key/volume entry.
    Add = 1,
    /// Remove the entry with the given key.
    Delete = 2,
    /// Overwrite the volume of the entry with the given key.
    Replace = 3,
}

/// An opcode encoding outside the defined range was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid update opcode encoding {0}")]
pub struct ParseOpcodeError(pub u8);

impl Opcode {
    /// Returns the wire encoding of this opcode.
    pub fn encoding(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Opcode {
    type Error = ParseOpcodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Opcode::Clear),
            1 => Ok(Opcode::Add),
            2 => Ok(Opcode::Delete),
            3 => Ok(Opcode::Replace),
            other => Err(ParseOpcodeError(other)),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::Clear => write!(f, "Clr"),
            Opcode::Add => write!(f, "Add"),
            Opcode::Delete => write!(f, "Del"),
            Opcode::Replace => write!(f, "Rep"),
        }
    }
}

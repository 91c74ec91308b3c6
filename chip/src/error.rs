use std::fmt;

use thiserror::Error;

use crate::opcode::Opcode;

/// Errors that happen before the first instruction is executed.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("The program is {size} bytes long, but only {max} bytes fit into memory.")]
    ProgramTooLarge { size: usize, max: usize },
    #[error("The rom '{0}' does not exist.")]
    NotFound(String),
    #[error("Unable to allocate {0} bytes for the rom.")]
    Allocation(usize),
    #[error("Unable to read the rom '{name}': {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum OpcodeError {
    #[error("An unsupported opcode was used {0:#06X?}.")]
    InvalidOpcode(Opcode),
    #[error("Pointer location invalid there can not be an opcode at {pointer}, if data len is {len}")]
    MemoryInvalid { pointer: usize, len: usize },
}

/// The different reasons the engine can stop executing a program.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum FaultKind {
    #[error("invalid opcode")]
    InvalidOpcode,
    #[error("invalid program counter")]
    InvalidProgramCounter,
    #[error("stack underflow")]
    StackUnderflow,
    #[error("stack overflow")]
    StackOverflow,
    #[error("memory access out of bounds at {address:#06X}")]
    MemoryOutOfBounds { address: usize },
}

/// A terminal execution fault, together with the location it happened at.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub struct Fault {
    /// The program counter of the faulting instruction
    pub pc: u16,
    /// The raw instruction, if it could be fetched
    pub opcode: Option<Opcode>,
    pub kind: FaultKind,
}

impl Fault {
    pub fn new(pc: usize, opcode: Option<Opcode>, kind: FaultKind) -> Self {
        Self {
            pc: pc as u16,
            opcode,
            kind,
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at pc {:#06X}", self.kind, self.pc)?;
        if let Some(opcode) = self.opcode {
            write!(f, " (opcode {:#06X})", opcode)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum KeyMapError {
    #[error("The host key '{key}' is bound to both {first:#X} and {second:#X}.")]
    Duplicate { key: char, first: u8, second: u8 },
}

use owo_colors::OwoColorize;
use std::{io, time::Duration};
use thiserror::Error;

/// Errors while reading the machine code, before anything runs
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Couldn't open '{}': {source}", .path.bright_blue())]
    FileOpenError { path: String, source: io::Error },

    #[error("I/O Error: {0}")]
    IO(#[from] io::Error),

    #[error("Line {line}: '{}' is not a 32-bit decimal word", .text.bright_yellow())]
    MalformedInputWord { line: usize, text: String },
}

/// Why the machine stopped without reaching `halt`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FaultKind {
    #[error("program counter is outside of memory (0..{len})")]
    ProgramCounterOutOfBounds { len: usize },

    #[error("memory access at address {} is outside of memory (0..{len})", .address.bright_yellow())]
    MemoryOutOfBounds { address: i64, len: usize },

    #[error("invalid opcode {}", .0.bright_yellow())]
    InvalidOpcode(u32),

    #[error("step limit of {0} instructions reached")]
    StepLimitReached(u64),

    #[error("did not halt within {0:?}")]
    DeadlineExceeded(Duration),
}

impl FaultKind {
    /// The run was stopped from outside rather than by the program itself
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            FaultKind::StepLimitReached(_) | FaultKind::DeadlineExceeded(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} (pc = {pc})")]
pub struct Fault {
    pub kind: FaultKind,
    /// The pc of the instruction that faulted
    pub pc: i32,
}

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("{0}")]
    Load(#[from] LoadError),
    #[error("{0}")]
    Fault(#[from] Fault),
}

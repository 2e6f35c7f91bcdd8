//! Plain-text state dumps. This is the observable output of a run, so it carries no colors.

use super::MachineState;
use std::fmt;

/// ```text
/// @@@
/// state:
///         pc 2
///         memory:
///                 mem[ 0 ] 65538
///         ...
///         registers:
///                 reg[ 0 ] 5
///         ...
/// end state
/// ```
impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "@@@")?;
        writeln!(f, "state:")?;
        writeln!(f, "\tpc {}", self.pc)?;
        writeln!(f, "\tmemory:")?;
        for (i, word) in self.memory.words().iter().enumerate() {
            writeln!(f, "\t\tmem[ {} ] {}", i, word)?;
        }
        writeln!(f, "\tregisters:")?;
        for (i, reg) in self.registers.iter().enumerate() {
            writeln!(f, "\t\treg[ {} ] {}", i, reg)?;
        }
        writeln!(f, "end state")
    }
}

/// What gets printed once the machine halts
pub struct Report<'a> {
    pub executed: u64,
    pub state: &'a MachineState,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "machine halted")?;
        writeln!(f, "total of {} instructions executed", self.executed)?;
        writeln!(f, "final state of machine:")?;
        write!(f, "{}", self.state)
    }
}

//!
//! wordsim is an assembler and a simulator for a tiny 32-bit machine with 8 registers and 8
//! instructions: `add`, `nand`, `lw`, `sw`, `beq`, `jalr`, `halt` and `noop`, plus the `.fill`
//! directive for data.
//!
//! The assembler ([`parser`]) turns source text into a [`program::Program`], a list of words where
//! each word's index is its address. The simulator ([`simulator`]) loads those words into memory
//! and runs them. The only thing both sides agree on is the word layout in [`codegen`].
//!
//! ```
//! use wordsim::parser::{assemble_str, Options};
//! use wordsim::simulator::{Limits, Simulator};
//!
//! let program = assemble_str("add 0 1 2\nhalt", &Options::default()).unwrap();
//! let mut sim = Simulator::new(&program).with_registers([5, 3, 0, 0, 0, 0, 0, 0]);
//! assert_eq!(sim.run(&Limits::default()), Ok(2));
//! assert_eq!(sim.registers()[2], 8);
//! ```
//!
//! Every source line takes one address, blank lines included, so labels move if you add or
//! remove blank lines above them.
//!

pub mod codegen;
pub mod config;
pub mod instruction;
pub mod parser;
pub mod program;
pub mod simulator;
pub(crate) mod utf8_lossy_lines;

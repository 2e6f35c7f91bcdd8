//! The encoded program: the word stream handed from the assembler to the simulator.

use crate::codegen::{self, Word};
use owo_colors::OwoColorize;
use std::fmt;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Ordered sequence of machine words. The index of a word is its address, both for the
/// assembler's symbol table and for the simulator's program counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub words: Vec<i32>,
}

impl Program {
    pub fn new(words: Vec<i32>) -> Self {
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Writes the machine code text: one signed decimal word per line, in address order
    pub fn write_to<W: Write>(&self, mut out: W) -> io::Result<()> {
        for word in &self.words {
            writeln!(out, "{}", word)?;
        }
        out.flush()
    }

    /// Writes the machine code text to `path`. The text goes to a temporary file next to it first,
    /// which then replaces `path`, so a failed write never leaves a truncated file behind.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        self.write_to(BufWriter::new(tmp.as_file_mut()))?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Prints every word with its disassembly. Data words are decoded too, there's no telling
    /// them apart.
    pub fn print_instructions(&self) {
        eprintln!("{}", "Instructions: ---------------".bright_blue());
        for (address, &value) in self.words.iter().enumerate() {
            match codegen::decode(Word::from_value(value)) {
                Some(instruction) => {
                    eprintln!("{:>5}: {:>11}  {}", address.bright_blue(), value, instruction)
                }
                None => eprintln!("{:>5}: {:>11}  {}", address.bright_blue(), value, "???".bright_red()),
            }
        }
        eprintln!("{}", "-----------------------------".bright_blue());
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for word in &self.words {
            writeln!(f, "{}", word)?;
        }
        Ok(())
    }
}

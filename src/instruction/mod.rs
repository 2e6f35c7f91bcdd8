use std::fmt;

/// Register indices are 3 bits wide
pub const NUM_REGISTERS: usize = 8;

/// Opcode field values. `.fill` has no opcode, the word is the raw value.
pub mod opcode {
    pub const ADD: u32 = 0;
    pub const NAND: u32 = 1;
    pub const LW: u32 = 2;
    pub const SW: u32 = 3;
    pub const BEQ: u32 = 4;
    pub const JALR: u32 = 5;
    pub const HALT: u32 = 6;
    pub const NOOP: u32 = 7;
}

/// A single resolved instruction: every label has already been turned into a number and every
/// register into an index in `0..8`. This is what the assembler packs into a word and what the
/// simulator gets back when it decodes one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    // Type R
    /// reg_a, reg_b, dest
    Add(u8, u8, u8),
    Nand(u8, u8, u8),

    // Type I
    /// reg_a, reg_b, offset
    Lw(u8, u8, i32),
    Sw(u8, u8, i32),
    /// reg_a, reg_b, pc-relative offset
    Beq(u8, u8, i32),

    // Type J
    /// reg_a, reg_b
    Jalr(u8, u8),

    // Type O
    Halt,
    Noop,

    /// Raw data word, no opcode field
    Fill(i32),
}

impl Instruction {
    pub fn mnemonic(&self) -> &'static str {
        use Instruction::*;
        match self {
            Add(..) => "add",
            Nand(..) => "nand",
            Lw(..) => "lw",
            Sw(..) => "sw",
            Beq(..) => "beq",
            Jalr(..) => "jalr",
            Halt => "halt",
            Noop => "noop",
            Fill(_) => ".fill",
        }
    }
}

/// Prints the instruction back in assembler syntax
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        let m = self.mnemonic();
        match *self {
            Add(a, b, d) | Nand(a, b, d) => write!(f, "{m} {a} {b} {d}"),
            Lw(a, b, off) | Sw(a, b, off) | Beq(a, b, off) => write!(f, "{m} {a} {b} {off}"),
            Jalr(a, b) => write!(f, "{m} {a} {b}"),
            Halt | Noop => write!(f, "{m}"),
            Fill(x) => write!(f, "{m} {x}"),
        }
    }
}

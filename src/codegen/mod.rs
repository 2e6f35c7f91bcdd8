//!
//! Packs resolved instructions into machine words, and unpacks them again. This is the one
//! contract the assembler and the simulator share: whatever [`encode`] writes, [`decode`] must
//! read back.
//!
//! | field    | bits   |
//! |----------|--------|
//! | opcode   | 24..22 |
//! | reg_a    | 21..19 |
//! | reg_b    | 18..16 |
//! | offset   | 15..0  |
//! | dest     | 2..0   |
//!

pub mod bitops;
pub mod instruction;

pub use bitops::sign_extend16;
pub use instruction::Word;

use crate::instruction::{opcode, Instruction};

macro_rules! compile_inner {
    ($w:ident) => {};
    ($w:ident, ) => {};
    ($w:ident, opcode: $val:expr; $($props:tt)*) => {
        $w.set_opcode($val as u32);
        compile_inner!($w, $($props)*);
    };
    ($w:ident, reg_a: $val:expr; $($props:tt)*) => {
        $w.set_reg_a($val as u32);
        compile_inner!($w, $($props)*);
    };
    ($w:ident, reg_b: $val:expr; $($props:tt)*) => {
        $w.set_reg_b($val as u32);
        compile_inner!($w, $($props)*);
    };
    ($w:ident, dest: $val:expr; $($props:tt)*) => {
        $w.set_dest($val as u32);
        compile_inner!($w, $($props)*);
    };
    ($w:ident, offset: $val:expr; $($props:tt)*) => {
        $w.set_offset($val as i32);
        compile_inner!($w, $($props)*);
    };
}

macro_rules! compile {
    ($($props:tt)*) => {
        {
            let mut word = Word::default();
            compile_inner!(word, $($props)*);
            word
        }
    };
}

/// Packs a resolved instruction into its word. Register and offset ranges are the caller's
/// responsibility; anything wider than its field is truncated.
pub fn encode(instruction: Instruction) -> Word {
    use Instruction::*;

    match instruction {
        Add(a, b, d) => compile! { opcode: opcode::ADD; reg_a: a; reg_b: b; dest: d; },
        Nand(a, b, d) => compile! { opcode: opcode::NAND; reg_a: a; reg_b: b; dest: d; },
        Lw(a, b, off) => compile! { opcode: opcode::LW; reg_a: a; reg_b: b; offset: off; },
        Sw(a, b, off) => compile! { opcode: opcode::SW; reg_a: a; reg_b: b; offset: off; },
        Beq(a, b, off) => compile! { opcode: opcode::BEQ; reg_a: a; reg_b: b; offset: off; },
        Jalr(a, b) => compile! { opcode: opcode::JALR; reg_a: a; reg_b: b; },
        Halt => compile! { opcode: opcode::HALT; },
        Noop => compile! { opcode: opcode::NOOP; },
        Fill(value) => Word::from_value(value),
    }
}

/// Unpacks a word into the instruction it encodes. Returns `None` only for an opcode outside the
/// instruction set, which the 3-bit field can't currently produce.
pub fn decode(word: Word) -> Option<Instruction> {
    use Instruction::*;

    let a = word.reg_a() as u8;
    let b = word.reg_b() as u8;

    let instruction = match word.opcode() {
        opcode::ADD => Add(a, b, word.dest() as u8),
        opcode::NAND => Nand(a, b, word.dest() as u8),
        opcode::LW => Lw(a, b, word.offset()),
        opcode::SW => Sw(a, b, word.offset()),
        opcode::BEQ => Beq(a, b, word.offset()),
        opcode::JALR => Jalr(a, b),
        opcode::HALT => Halt,
        opcode::NOOP => Noop,
        _ => return None,
    };

    Some(instruction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode(Instruction::Add(0, 1, 2)).value(), 65538);
        assert_eq!(encode(Instruction::Nand(1, 2, 3)).value(), 0x004a_0003);
        assert_eq!(encode(Instruction::Lw(0, 1, 7)).value(), 8454151);
        assert_eq!(encode(Instruction::Beq(0, 1, -3)).value(), 0x0101_fffd);
        assert_eq!(encode(Instruction::Jalr(4, 2)).value(), 0x0162_0000);
        assert_eq!(encode(Instruction::Halt).value(), 25165824);
        assert_eq!(encode(Instruction::Noop).value(), 29360128);
        assert_eq!(encode(Instruction::Fill(-1)).value(), -1);
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode(Word::from_bits(65538)), Some(Instruction::Add(0, 1, 2)));
        assert_eq!(decode(Word::from_bits(0x0101_fffd)), Some(Instruction::Beq(0, 1, -3)));
        assert_eq!(decode(Word::from_bits(0x0100_7fff)), Some(Instruction::Beq(0, 0, 32767)));
        assert_eq!(decode(Word::from_bits(0x0100_8000)), Some(Instruction::Beq(0, 0, -32768)));
        assert_eq!(decode(Word::from_bits(25165824)), Some(Instruction::Halt));
    }

    #[test]
    fn test_decode_ignores_high_bits() {
        // bits 31..25 are not part of any field
        assert_eq!(decode(Word::from_bits(0xfe00_0000 | 65538)), Some(Instruction::Add(0, 1, 2)));
    }

    fn reg() -> impl Strategy<Value = u8> {
        0u8..8
    }

    proptest! {
        #[test]
        fn r_type_fields_survive(a in reg(), b in reg(), d in reg()) {
            prop_assert_eq!(decode(encode(Instruction::Nand(a, b, d))), Some(Instruction::Nand(a, b, d)));
        }

        #[test]
        fn i_type_offset_survives(a in reg(), b in reg(), off in -32768i32..=32767) {
            prop_assert_eq!(decode(encode(Instruction::Sw(a, b, off))), Some(Instruction::Sw(a, b, off)));
        }
    }
}

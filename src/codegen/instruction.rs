use super::bitops::sign_extend16;
use bitfield::bitfield;

bitfield! {
    /// One machine word, viewed through the instruction field layout
    #[derive(Default, Clone, Copy, PartialEq, Eq)]
    pub struct Word(u32);
    impl Debug;

    pub opcode, set_opcode: 24, 22;
    pub reg_a, set_reg_a: 21, 19;
    pub reg_b, set_reg_b: 18, 16;
    pub offset_bits, set_offset_bits: 15, 0;
    pub dest, set_dest: 2, 0;
}

impl Word {
    /// The signed 16-bit offset field of an I-type word
    pub fn offset(self) -> i32 {
        sign_extend16(self.offset_bits())
    }

    /// Stores the low 16 bits of `offset` (two's complement truncation)
    pub fn set_offset(&mut self, offset: i32) {
        self.set_offset_bits(offset as u32 & 0xffff);
    }

    /// The word as it appears in memory and in the machine code text
    pub fn value(self) -> i32 {
        self.0 as i32
    }

    pub fn from_value(value: i32) -> Self {
        Self(value as u32)
    }

    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }
}

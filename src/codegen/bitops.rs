use std::ops::Range;

pub const fn mask(range: Range<u32>) -> u32 {
    ((1 << (range.end - range.start)) - 1) << range.start
}

pub trait BitOps: Sized {
    fn mask(self, range: Range<Self>) -> Self;
}

impl BitOps for u32 {
    fn mask(self, range: Range<Self>) -> Self {
        self & mask(range)
    }
}

/// Treats bit 15 of `bits` as the sign bit and widens it to a full `i32`.
/// Anything above bit 15 is ignored.
#[inline]
pub fn sign_extend16(bits: u32) -> i32 {
    let low = bits.mask(0..16);
    if low & (1 << 15) == 0 {
        low as i32
    } else {
        (low | mask(16..32)) as i32
    }
}

//! Second pass: turns a parsed line into a resolved [`Instruction`], looking labels up in the
//! symbol table and checking every field against its width.

use super::error::AssemblerError;
use super::labels::SymbolTable;
use super::line::ParsedLine;
use crate::instruction::{Instruction, NUM_REGISTERS};

pub const OFFSET_MIN: i64 = -32768;
pub const OFFSET_MAX: i64 = 32767;

/// Optionally signed base-10 integer
pub fn is_number(s: &str) -> bool {
    let digits = s.strip_prefix(&['+', '-'][..]).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a numeric operand. Values that overflow an i64 saturate, which is still out of range
/// for every field.
pub fn parse_number(s: &str) -> Option<i64> {
    if !is_number(s) {
        return None;
    }
    Some(s.parse::<i64>().unwrap_or(if s.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    }))
}

struct Operands<'a> {
    line: &'a ParsedLine,
    mnemonic: &'static str,
    expected: usize,
}

impl<'a> Operands<'a> {
    fn new(line: &'a ParsedLine, mnemonic: &'static str, expected: usize) -> Self {
        Self {
            line,
            mnemonic,
            expected,
        }
    }

    fn get(&self, i: usize) -> Result<&'a str, AssemblerError> {
        self.line
            .operand(i)
            .ok_or(AssemblerError::MissingOperand {
                mnemonic: self.mnemonic,
                expected: self.expected,
                found: self.line.operands.len(),
            })
    }

    fn register(&self, i: usize) -> Result<u8, AssemblerError> {
        let token = self.get(i)?;
        match parse_number(token) {
            Some(r) if (0..NUM_REGISTERS as i64).contains(&r) => Ok(r as u8),
            _ => Err(AssemblerError::RegisterOutOfRange(token.to_owned())),
        }
    }
}

/// Resolves the offset field of an I-type instruction. A number is used as is; a label is its
/// address, made relative to the next instruction when `pc_relative` is set.
fn offset(
    token: &str,
    address: usize,
    symbols: &SymbolTable,
    pc_relative: bool,
) -> Result<i32, AssemblerError> {
    let offset = match parse_number(token) {
        Some(n) => n,
        None => {
            let target = symbols.resolve(token)? as i64;
            if pc_relative {
                target - (address as i64 + 1)
            } else {
                target
            }
        }
    };

    if !(OFFSET_MIN..=OFFSET_MAX).contains(&offset) {
        return Err(AssemblerError::OffsetOutOfRange(offset));
    }
    Ok(offset as i32)
}

/// `.fill` takes a number that fits in 32 bits (signed or unsigned) or a label
fn fill_value(token: &str, symbols: &SymbolTable) -> Result<i32, AssemblerError> {
    match parse_number(token) {
        Some(n) if (i32::MIN as i64..=u32::MAX as i64).contains(&n) => Ok(n as u32 as i32),
        Some(_) => Err(AssemblerError::ValueOutOfRange(token.to_owned())),
        None => Ok(symbols.resolve(token)? as i32),
    }
}

/// Resolves one line at `address`. Blank lines keep their address slot and become a zero word.
pub fn resolve(
    line: &ParsedLine,
    address: usize,
    symbols: &SymbolTable,
) -> Result<Instruction, AssemblerError> {
    use Instruction::*;

    if line.is_empty() {
        return Ok(Fill(0));
    }

    let instruction = match line.mnemonic.as_str() {
        "add" => {
            let ops = Operands::new(line, "add", 3);
            Add(ops.register(0)?, ops.register(1)?, ops.register(2)?)
        }
        "nand" => {
            let ops = Operands::new(line, "nand", 3);
            Nand(ops.register(0)?, ops.register(1)?, ops.register(2)?)
        }
        "lw" => {
            let ops = Operands::new(line, "lw", 3);
            let (a, b) = (ops.register(0)?, ops.register(1)?);
            Lw(a, b, offset(ops.get(2)?, address, symbols, false)?)
        }
        "sw" => {
            let ops = Operands::new(line, "sw", 3);
            let (a, b) = (ops.register(0)?, ops.register(1)?);
            Sw(a, b, offset(ops.get(2)?, address, symbols, false)?)
        }
        "beq" => {
            let ops = Operands::new(line, "beq", 3);
            let (a, b) = (ops.register(0)?, ops.register(1)?);
            Beq(a, b, offset(ops.get(2)?, address, symbols, true)?)
        }
        "jalr" => {
            let ops = Operands::new(line, "jalr", 2);
            Jalr(ops.register(0)?, ops.register(1)?)
        }
        "halt" => Halt,
        "noop" => Noop,
        ".fill" => {
            let ops = Operands::new(line, ".fill", 1);
            Fill(fill_value(ops.get(0)?, symbols)?)
        }
        // a label alone on its line, blank lines were handled above
        "" => {
            let label = line.label.clone().unwrap_or_default();
            return Err(AssemblerError::MissingMnemonic(label));
        }
        other => return Err(AssemblerError::UnrecognizedOpcode(other.to_owned())),
    };

    Ok(instruction)
}

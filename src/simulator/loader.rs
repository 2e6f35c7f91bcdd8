//! Reads machine code text: whitespace-separated decimal words, normally one per line.

use super::error::LoadError;
use crate::program::Program;
use crate::utf8_lossy_lines::Utf8LossyLinesExt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// A word is anything that fits in 32 bits, signed or unsigned. Unsigned values above
/// `i32::MAX` are reinterpreted as two's complement.
pub fn parse_word(text: &str) -> Option<i32> {
    let value = text.parse::<i64>().ok()?;
    if (i32::MIN as i64..=u32::MAX as i64).contains(&value) {
        Some(value as u32 as i32)
    } else {
        None
    }
}

pub fn load_lines<I: Iterator<Item = io::Result<String>>>(lines: I) -> Result<Program, LoadError> {
    let mut words = Vec::new();
    for (i, line) in lines.enumerate() {
        let line = line?;
        for token in line.split_whitespace() {
            let word = parse_word(token).ok_or_else(|| LoadError::MalformedInputWord {
                line: i + 1,
                text: token.to_owned(),
            })?;
            words.push(word);
        }
    }
    Ok(Program::new(words))
}

pub fn load_reader<R: BufRead>(reader: R) -> Result<Program, LoadError> {
    load_lines(reader.utf8_lossy_lines())
}

pub fn load_str(text: &str) -> Result<Program, LoadError> {
    load_reader(text.as_bytes())
}

pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Program, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::FileOpenError {
        path: path.display().to_string(),
        source,
    })?;
    load_reader(BufReader::new(file))
}

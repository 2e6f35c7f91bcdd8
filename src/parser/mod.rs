//!
//! Two-pass assembler. The first pass splits every line and records where each label is defined,
//! the second pass resolves operands against those labels and packs each line into one word.
//!
//! Every source line takes exactly one address, including blank and comment-only lines (those
//! become the word `0`), so a label's address is always its 0-based line number.
//!

pub mod encoder;
pub mod error;
pub mod labels;
pub mod line;

use crate::codegen;
use crate::program::Program;
use crate::utf8_lossy_lines::Utf8LossyLinesExt;
use error::{AssemblerError, Context, ContextualizeResult, Error};
use labels::SymbolTable;
use line::ParsedLine;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::Arc;

pub type AssembleResult = Result<Program, Error>;

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Reject labels that don't look like `[A-Za-z][A-Za-z0-9]{0,5}`
    pub strict_labels: bool,
}

pub trait Assemble {
    /// Assembles an iterator of source lines into a program. `file` only names the source in
    /// error messages.
    /// ```
    /// use wordsim::parser::{Assemble, Options};
    ///
    /// let source = ["add 0 1 2", "halt"].map(|l| Ok::<_, std::io::Error>(l.to_owned()));
    /// let program = source.into_iter().assemble("inline", &Options::default())?;
    /// assert_eq!(program.words, [65538, 25165824]);
    /// # Ok::<(), wordsim::parser::error::Error>(())
    /// ```
    fn assemble(self, file: &str, options: &Options) -> AssembleResult;
}

impl<I: Iterator<Item = io::Result<String>>> Assemble for I {
    fn assemble(self, file: &str, options: &Options) -> AssembleResult {
        let file: Arc<str> = file.into();
        let ctx = |address: usize| {
            let file = file.clone();
            move || Context::new(file, address + 1)
        };

        // First pass: split lines and collect labels
        let mut symbols = SymbolTable::new();
        let mut lines: Vec<ParsedLine> = Vec::new();

        for (address, source) in self.enumerate() {
            let parsed = line::parse_line(&source?);

            if let Some(label) = &parsed.label {
                if options.strict_labels {
                    labels::validate_strict(label).with_context(ctx(address))?;
                }
                symbols.define(label, address).with_context(ctx(address))?;
            }

            lines.push(parsed);
        }

        // Second pass: resolve and encode, one word per line
        let words = lines
            .iter()
            .enumerate()
            .map(|(address, parsed)| {
                encoder::resolve(parsed, address, &symbols)
                    .map(|i| codegen::encode(i).value())
                    .with_context(ctx(address))
            })
            .collect::<Result<Vec<i32>, Error>>()?;

        Ok(Program::new(words))
    }
}

/// Assembles source text held in memory
pub fn assemble_str(source: &str, options: &Options) -> AssembleResult {
    source
        .as_bytes()
        .utf8_lossy_lines()
        .assemble("<input>", options)
}

/// Reads and assembles the file at `path`
pub fn assemble_file<P: AsRef<Path>>(path: P, options: &Options) -> AssembleResult {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| AssemblerError::FileOpenError {
        path: path.display().to_string(),
        source,
    })?;

    BufReader::new(file)
        .utf8_lossy_lines()
        .assemble(&path.display().to_string(), options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(src: &str) -> AssembleResult {
        assemble_str(src, &Options::default())
    }

    #[test]
    fn test_two_lines() {
        let program = assemble("add 0 1 2\nhalt").unwrap();
        assert_eq!(program.words, [65538, 25165824]);
    }

    #[test]
    fn test_forward_and_backward_labels() {
        let src = "\
start   beq 0 1 done
        beq 0 0 start
done    halt
";
        let program = assemble(src).unwrap();
        // beq 0 1 +1, beq 0 0 -2, halt
        assert_eq!(program.words, [0x0101_0001, 0x0100_fffe, 25165824]);
    }

    #[test]
    fn test_blank_lines_take_an_address() {
        let src = "lw 0 1 five\n\n; comment\nhalt\nfive .fill 5";
        let program = assemble(src).unwrap();
        // `five` sits on the 5th line, so at address 4
        assert_eq!(program.words, [0x0081_0004, 0, 0, 25165824, 5]);
    }

    #[test]
    fn test_fill_with_label() {
        let src = "noop\nnoop\nnoop\nnoop\nnoop\nnoop\nnoop\ntarget halt\n.fill target";
        let program = assemble(src).unwrap();
        assert_eq!(program.words[8], 7);
    }

    #[test]
    fn test_duplicate_label_points_to_second_definition() {
        let src = "loop noop\nhalt\nloop noop";
        let err = assemble(src).unwrap_err();
        assert!(matches!(
            err.kind(),
            AssemblerError::DuplicateLabel { label, first: 0 } if label == "loop"
        ));
        assert_eq!(err.context().map(|c| c.line), Some(3));
    }

    #[test]
    fn test_first_error_wins() {
        let src = "add 0 1 2\nbogus 1 2\nlw 0 1 nowhere";
        let err = assemble(src).unwrap_err();
        assert!(matches!(err.kind(), AssemblerError::UnrecognizedOpcode(op) if op == "1"));
        assert_eq!(err.context().map(|c| c.line), Some(2));
    }

    #[test]
    fn test_offset_error_names_line() {
        let err = assemble("noop\nbeq 0 0 40000").unwrap_err();
        assert!(matches!(err.kind(), AssemblerError::OffsetOutOfRange(40000)));
        assert_eq!(err.context().map(|c| c.line), Some(2));
        assert!(err.to_string().contains("<input>:2"));
    }

    #[test]
    fn test_strict_labels() {
        let strict = Options {
            strict_labels: true,
        };
        assert!(assemble_str("verylonglabel halt", &Options::default()).is_ok());
        let err = assemble_str("verylonglabel halt", &strict).unwrap_err();
        assert!(matches!(err.kind(), AssemblerError::InvalidLabel(_)));
        assert!(assemble_str("ok1 halt", &strict).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = assemble_file("this/file/does/not/exist.s", &Options::default()).unwrap_err();
        assert!(matches!(err.kind(), AssemblerError::FileOpenError { .. }));
    }
}

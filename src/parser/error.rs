use owo_colors::OwoColorize;
use std::{fmt, io, sync::Arc};
use thiserror::Error;

use super::labels::MAX_STRICT_LABEL_LEN;

/// Every way an assembly can fail. All of them abort the whole run.
#[derive(Debug, Error)]
pub enum AssemblerError {
    #[error("Couldn't open '{}': {source}", .path.bright_blue())]
    FileOpenError { path: String, source: io::Error },

    /// Not the assembler's fault, some std::io went wrong while reading
    #[error("I/O Error: {0}")]
    IO(#[from] io::Error),

    #[error("Label '{}' was already defined at address {first}", .label.bright_yellow())]
    DuplicateLabel { label: String, first: usize },

    #[error("Undefined label '{}'", .0.bright_yellow())]
    UndefinedLabel(String),

    #[error("Offset {} does not fit in 16 bits (-32768..=32767)", .0.bright_yellow())]
    OffsetOutOfRange(i64),

    #[error("Unrecognized opcode '{}'", .0.bright_yellow())]
    UnrecognizedOpcode(String),

    #[error("Label '{}' is not followed by an instruction", .0.bright_yellow())]
    MissingMnemonic(String),

    #[error("Expected a register between 0 and 7, but found '{}'", .0.bright_yellow())]
    RegisterOutOfRange(String),

    #[error("'{}' takes {expected} operand(s), but only {found} were given", .mnemonic.bright_blue())]
    MissingOperand {
        mnemonic: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Value '{}' does not fit in a 32-bit word", .0.bright_yellow())]
    ValueOutOfRange(String),

    #[error(
        "Invalid label '{}': a label starts with a letter, is alphanumeric and at most {} characters long",
        .0.bright_yellow(),
        MAX_STRICT_LABEL_LEN
    )]
    InvalidLabel(String),
}

/// Where in the source an error happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub file: Arc<str>,
    /// 1-based source line. Since every line takes one address, this is also `address + 1`.
    pub line: usize,
}

impl Context {
    pub fn new(file: Arc<str>, line: usize) -> Self {
        Self { file, line }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Assembler(#[from] AssemblerError),
    #[error("{}: {err}", ctx.bright_blue())]
    WithContext { err: Box<Error>, ctx: Context },
}

impl Error {
    /// The underlying error, without any context attached
    pub fn kind(&self) -> &AssemblerError {
        match self {
            Error::Assembler(e) => e,
            Error::WithContext { err, .. } => err.kind(),
        }
    }

    /// The source location attached to this error, if any
    pub fn context(&self) -> Option<&Context> {
        match self {
            Error::Assembler(_) => None,
            Error::WithContext { ctx, .. } => Some(ctx),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        AssemblerError::from(e).into()
    }
}

pub trait Contextualize {
    fn with_context(self, ctx: Context) -> Error;
}

impl Contextualize for Error {
    fn with_context(self, ctx: Context) -> Error {
        match self {
            Error::WithContext { err, .. } => Error::WithContext { err, ctx },
            _ => Error::WithContext {
                err: Box::new(self),
                ctx,
            },
        }
    }
}

impl Contextualize for AssemblerError {
    fn with_context(self, ctx: Context) -> Error {
        Error::WithContext {
            err: Box::new(self.into()),
            ctx,
        }
    }
}

/// Attaches a context to the error of a `Result`, if there is one
pub trait ContextualizeResult<T> {
    fn with_context(self, ctx: impl FnOnce() -> Context) -> Result<T, Error>;
}

impl<T, E: Contextualize> ContextualizeResult<T> for Result<T, E> {
    fn with_context(self, ctx: impl FnOnce() -> Context) -> Result<T, Error> {
        self.map_err(|e| e.with_context(ctx()))
    }
}

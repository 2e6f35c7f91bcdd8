use crate::parser::Options;
use crate::simulator::Limits;
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Read from the working directory, if it exists
pub const CONFIG_FILE: &str = "wordsim.toml";

pub const DEFAULT_MAX_STEPS: u64 = 10_000_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Couldn't read wordsim.toml: {0}")]
    IO(#[from] std::io::Error),
    #[error("Couldn't parse wordsim.toml: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub config: OptionalConfig,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Assembles a source file into machine code
    Asm {
        /// The assembly file
        input: PathBuf,

        /// Where to write the machine code. Defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Runs a machine code file
    Sim {
        /// The machine code file, one decimal word per line
        input: PathBuf,
    },

    /// Assembles a source file and runs it right away
    Run {
        /// The assembly file
        input: PathBuf,
    },
}

/// Settings that can come from the command line or from `wordsim.toml`
#[derive(Args, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct OptionalConfig {
    /// Stops the simulator after this many instructions, 0 means no limit. Defaults to 10000000
    #[arg(long, global = true)]
    pub max_steps: Option<u64>,

    /// Stops the simulator after this many milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Pads the memory with zeroes up to this many words
    #[arg(long, global = true)]
    pub memory_size: Option<usize>,

    /// Only accepts labels of up to 6 alphanumeric characters, starting with a letter
    #[arg(long, global = true)]
    pub strict_labels: bool,

    /// Prints the machine state before every instruction
    #[arg(long, global = true)]
    pub trace: bool,

    /// Prints the final state of the machine after execution
    #[arg(long, global = true)]
    pub print_state: bool,

    /// Prints the program's disassembly before running it
    #[arg(long, global = true)]
    pub print_instructions: bool,
}

impl OptionalConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn get_toml() -> Result<Self, ConfigError> {
        match std::fs::read_to_string(CONFIG_FILE) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Values in `self` win over the ones in `rhs`
    pub fn merge(self, rhs: Self) -> Self {
        Self {
            max_steps: self.max_steps.or(rhs.max_steps),
            timeout_ms: self.timeout_ms.or(rhs.timeout_ms),
            memory_size: self.memory_size.or(rhs.memory_size),
            strict_labels: self.strict_labels || rhs.strict_labels,
            trace: self.trace || rhs.trace,
            print_state: self.print_state || rhs.print_state,
            print_instructions: self.print_instructions || rhs.print_instructions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub max_steps: Option<u64>,
    pub timeout: Option<Duration>,
    pub memory_size: Option<usize>,
    pub strict_labels: bool,
    pub trace: bool,
    pub print_state: bool,
    pub print_instructions: bool,
}

impl Default for Config {
    fn default() -> Self {
        OptionalConfig::default().into()
    }
}

impl From<OptionalConfig> for Config {
    fn from(config: OptionalConfig) -> Self {
        Self {
            max_steps: match config.max_steps.unwrap_or(DEFAULT_MAX_STEPS) {
                0 => None,
                n => Some(n),
            },
            timeout: config.timeout_ms.map(Duration::from_millis),
            memory_size: config.memory_size,
            strict_labels: config.strict_labels,
            trace: config.trace,
            print_state: config.print_state,
            print_instructions: config.print_instructions,
        }
    }
}

impl Config {
    /// Parses the command line and layers it over `wordsim.toml`
    pub fn get() -> Result<(Command, Self), ConfigError> {
        let cli = Cli::parse();
        let config = cli.config.merge(OptionalConfig::get_toml()?);
        Ok((cli.command, config.into()))
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_steps: self.max_steps,
            timeout: self.timeout,
        }
    }

    pub fn assembler_options(&self) -> Options {
        Options {
            strict_labels: self.strict_labels,
        }
    }
}

use owo_colors::OwoColorize;
use std::fmt::Display;
use std::io;
use std::path::Path;
use std::process::ExitCode;

use wordsim::config::{Command, Config};
use wordsim::parser::{self, error::AssemblerError};
use wordsim::program::Program;
use wordsim::simulator::{loader, Simulator, SimulatorError};

/// Assembler, loader and configuration errors
const EXIT_ERROR: u8 = 1;
/// The program faulted
const EXIT_FAULT: u8 = 2;
/// The program didn't halt within the step or time limit
const EXIT_CANCELLED: u8 = 3;

fn report_error(err: impl Display) {
    eprintln!("{} {}", "error:".bright_red().bold(), err);
}

fn write_program(program: &Program, output: Option<&Path>) -> Result<(), AssemblerError> {
    match output {
        Some(path) => program
            .save(path)
            .map_err(|source| AssemblerError::FileOpenError {
                path: path.display().to_string(),
                source,
            })?,
        None => program.write_to(io::stdout().lock())?,
    }
    Ok(())
}

fn simulate(program: &Program, config: &Config) -> ExitCode {
    if config.print_instructions {
        program.print_instructions();
    }

    let mut sim = Simulator::new(program).with_trace(config.trace);
    if let Some(size) = config.memory_size {
        sim = sim.with_memory_size(size);
    }

    let start_time = std::time::Instant::now();
    let result = sim.run(&config.limits());

    if config.print_state {
        sim.print_state();
        eprintln!("Finished in {}ms", start_time.elapsed().as_millis());
    }

    match result {
        Ok(_) => {
            print!("{}", sim.report());
            ExitCode::SUCCESS
        }
        Err(fault) => {
            println!("total of {} instructions executed", sim.executed());
            println!("state of machine at fault:");
            print!("{}", sim.state());
            report_error(SimulatorError::from(fault));

            if fault.kind.is_cancellation() {
                ExitCode::from(EXIT_CANCELLED)
            } else {
                ExitCode::from(EXIT_FAULT)
            }
        }
    }
}

fn main() -> ExitCode {
    let (command, config) = match Config::get() {
        Ok(x) => x,
        Err(e) => {
            report_error(e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let options = config.assembler_options();

    match command {
        Command::Asm { input, output } => {
            let result = parser::assemble_file(&input, &options).and_then(|program| {
                if config.print_instructions {
                    program.print_instructions();
                }
                write_program(&program, output.as_deref()).map_err(Into::into)
            });

            match result {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    report_error(e);
                    ExitCode::from(EXIT_ERROR)
                }
            }
        }

        Command::Sim { input } => match loader::load_file(&input) {
            Ok(program) => simulate(&program, &config),
            Err(e) => {
                report_error(SimulatorError::from(e));
                ExitCode::from(EXIT_ERROR)
            }
        },

        Command::Run { input } => match parser::assemble_file(&input, &options) {
            Ok(program) => simulate(&program, &config),
            Err(e) => {
                report_error(e);
                ExitCode::from(EXIT_ERROR)
            }
        },
    }
}

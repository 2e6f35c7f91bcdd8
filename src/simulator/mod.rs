//!
//! Runs an encoded program word by word.
//!
//! A [`Simulator`] is created from a [`Program`], which becomes its memory, and ran by calling
//! [`Simulator::run`] (or [`Simulator::step`] for one instruction at a time). The program counter
//! and every memory access are bounds checked, so a broken program ends in a [`Fault`] instead of
//! reading garbage.
//!

pub mod error;
pub mod loader;
pub mod memory;
pub mod report;

pub use error::{Fault, FaultKind, LoadError, SimulatorError};
pub use report::Report;

use crate::codegen::{self, Word};
use crate::instruction::{Instruction, NUM_REGISTERS};
use crate::program::Program;
use memory::Memory;
use owo_colors::OwoColorize;
use std::time::{Duration, Instant};

/// Everything an instruction can read or write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineState {
    pub pc: i32,
    pub registers: [i32; NUM_REGISTERS],
    pub memory: Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Halted,
    Faulted(Fault),
}

/// How many steps [`Simulator::run`] takes between two looks at the clock
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// Stops programs that never halt. Both limits are optional, and `Limits::default()` has none.
#[derive(Debug, Clone, Copy, Default)]
pub struct Limits {
    /// Maximum number of instructions executed, counted over the simulator's whole life
    pub max_steps: Option<u64>,
    /// Wall-clock time a single call to [`Simulator::run`] may take
    pub timeout: Option<Duration>,
}

impl Limits {
    pub fn steps(max_steps: u64) -> Self {
        Self {
            max_steps: Some(max_steps),
            ..Self::default()
        }
    }
}

pub struct Simulator {
    state: MachineState,
    status: Status,
    executed: u64,
    trace: bool,
}

impl Simulator {
    /// Loads `program` into memory. All registers start at zero and pc at address 0.
    pub fn new(program: &Program) -> Self {
        Self {
            state: MachineState {
                pc: 0,
                registers: [0; NUM_REGISTERS],
                memory: Memory::new(program.words.clone()),
            },
            status: Status::Running,
            executed: 0,
            trace: false,
        }
    }

    pub fn with_registers(mut self, registers: [i32; NUM_REGISTERS]) -> Self {
        self.state.registers = registers;
        self
    }

    /// Pads memory with zero words up to `size`. Memory is never smaller than the program.
    pub fn with_memory_size(mut self, size: usize) -> Self {
        self.state.memory.grow_to(size);
        self
    }

    /// Prints the whole state to stderr before every instruction
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn pc(&self) -> i32 {
        self.state.pc
    }

    pub fn registers(&self) -> &[i32; NUM_REGISTERS] {
        &self.state.registers
    }

    pub fn memory(&self) -> &Memory {
        &self.state.memory
    }

    /// Instructions executed so far, including the final `halt`
    pub fn executed(&self) -> u64 {
        self.executed
    }

    pub fn report(&self) -> Report<'_> {
        Report {
            executed: self.executed,
            state: &self.state,
        }
    }

    fn reg(&self, i: u8) -> i32 {
        self.state.registers[i as usize]
    }

    fn set_reg(&mut self, i: u8, x: i32) {
        self.state.registers[i as usize] = x;
    }

    fn fetch(&self) -> Result<Word, FaultKind> {
        let len = self.state.memory.len();
        self.state
            .memory
            .get_word(self.state.pc as i64)
            .map(Word::from_value)
            .map_err(|_| FaultKind::ProgramCounterOutOfBounds { len })
    }

    /// `reg[a] + offset`, computed without overflow
    fn effective_address(&self, a: u8, offset: i32) -> i64 {
        self.reg(a) as i64 + offset as i64
    }

    /// Fetches, decodes and executes the instruction at pc
    fn execute(&mut self) -> Result<(), FaultKind> {
        if self.trace {
            self.print_state();
        }

        let word = self.fetch()?;
        let instruction =
            codegen::decode(word).ok_or(FaultKind::InvalidOpcode(word.opcode()))?;

        self.execute_instruction(instruction)
    }

    /// Executes an already decoded instruction at pc. Data words can't be executed, they fault
    /// with the opcode their bits would have.
    fn execute_instruction(&mut self, instruction: Instruction) -> Result<(), FaultKind> {
        use Instruction::*;

        let pc = self.state.pc;
        let next = pc.wrapping_add(1);

        match instruction {
            // Type R
            Add(a, b, dest) => self.set_reg(dest, self.reg(a).wrapping_add(self.reg(b))),
            Nand(a, b, dest) => self.set_reg(dest, !(self.reg(a) & self.reg(b))),

            // Type I
            Lw(a, b, offset) => {
                let data = self.state.memory.get_word(self.effective_address(a, offset))?;
                self.set_reg(b, data);
            }
            Sw(a, b, offset) => {
                let (address, value) = (self.effective_address(a, offset), self.reg(b));
                self.state.memory.set_word(address, value)?;
            }
            Beq(a, b, offset) => {
                if self.reg(a) == self.reg(b) {
                    self.state.pc = next.wrapping_add(offset);
                    self.executed += 1;
                    return Ok(());
                }
            }

            // Type J
            Jalr(a, b) => {
                // The target is read before reg[b] is written, so `jalr 2 2` jumps to the old
                // value of reg[2] and leaves pc+1 in it
                let target = self.reg(a);
                self.state.pc = target;
                self.set_reg(b, next);
                self.executed += 1;
                return Ok(());
            }

            // Type O
            Halt => self.status = Status::Halted,
            Noop => {}

            Fill(value) => return Err(FaultKind::InvalidOpcode(Word::from_value(value).opcode())),
        }

        self.state.pc = next;
        self.executed += 1;
        Ok(())
    }

    fn fault(&self, kind: FaultKind) -> Fault {
        Fault {
            kind,
            pc: self.state.pc,
        }
    }

    /// Executes a single instruction. Once the machine has halted this does nothing, and once it
    /// has faulted it keeps returning the same fault.
    pub fn step(&mut self) -> Result<Status, Fault> {
        match self.status {
            Status::Running => {}
            Status::Halted => return Ok(Status::Halted),
            Status::Faulted(fault) => return Err(fault),
        }

        if let Err(kind) = self.execute() {
            let fault = self.fault(kind);
            self.status = Status::Faulted(fault);
            return Err(fault);
        }

        Ok(self.status)
    }

    /// Runs until `halt`, a fault, or one of the `limits` is hit. Returns the number of
    /// instructions executed.
    ///
    /// Hitting a limit doesn't fault the machine: the error is returned but the simulator can be
    /// ran again with a bigger budget.
    pub fn run(&mut self, limits: &Limits) -> Result<u64, Fault> {
        let deadline = limits.timeout.map(|t| (Instant::now() + t, t));

        let mut steps: u64 = 0;
        loop {
            if let Some(max) = limits.max_steps {
                if self.executed >= max && self.status == Status::Running {
                    return Err(self.fault(FaultKind::StepLimitReached(max)));
                }
            }

            if let Some((deadline, timeout)) = deadline {
                let check = steps % DEADLINE_CHECK_INTERVAL == 0;
                if check && self.status == Status::Running && Instant::now() >= deadline {
                    return Err(self.fault(FaultKind::DeadlineExceeded(timeout)));
                }
            }

            steps += 1;
            match self.step()? {
                Status::Running => {}
                Status::Halted => return Ok(self.executed),
                Status::Faulted(fault) => return Err(fault),
            }
        }
    }

    pub fn print_state(&self) {
        eprintln!(
            "{} {}",
            "pc:".bright_blue(),
            self.state.pc.bright_yellow()
        );

        eprintln!("{}", "Registers:".bright_blue());
        for (i, reg) in self.state.registers.iter().enumerate() {
            eprint!("{}{}: {:<11} ", "r".bright_blue(), i.bright_blue(), reg);
            if i % 4 == 3 {
                eprintln!();
            }
        }

        eprintln!("{}", "Memory:".bright_blue());
        for (i, word) in self.state.memory.words().iter().enumerate() {
            eprint!("{:>5}: {:<11} ", i.bright_blue(), word);
            if i % 4 == 3 {
                eprintln!();
            }
        }
        if self.state.memory.len() % 4 != 0 {
            eprintln!();
        }
        eprintln!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{assemble_str, Options};

    fn sim(src: &str) -> Simulator {
        let program = assemble_str(src, &Options::default()).unwrap();
        Simulator::new(&program)
    }

    #[test]
    fn test_add_then_halt() {
        let mut sim = sim("add 0 1 2\nhalt").with_registers([5, 3, 0, 0, 0, 0, 0, 0]);
        assert_eq!(sim.run(&Limits::default()), Ok(2));
        assert_eq!(sim.status(), Status::Halted);
        assert_eq!(sim.registers(), &[5, 3, 8, 0, 0, 0, 0, 0]);
        assert_eq!(sim.pc(), 2);
        assert_eq!(sim.executed(), 2);
    }

    #[test]
    fn test_nand() {
        let mut sim = sim("nand 0 1 2\nhalt").with_registers([0b1100, 0b1010, 0, 0, 0, 0, 0, 0]);
        sim.run(&Limits::default()).unwrap();
        assert_eq!(sim.registers()[2], !0b1000);
    }

    #[test]
    fn test_add_wraps() {
        let mut sim = sim("add 0 1 1\nhalt").with_registers([i32::MAX, 1, 0, 0, 0, 0, 0, 0]);
        sim.run(&Limits::default()).unwrap();
        assert_eq!(sim.registers()[1], i32::MIN);
    }

    #[test]
    fn test_load_store() {
        let src = "\
        lw 0 1 data
        sw 0 1 copy
        halt
data    .fill 42
copy    .fill 0
";
        let mut sim = sim(src);
        sim.run(&Limits::default()).unwrap();
        assert_eq!(sim.registers()[1], 42);
        assert_eq!(sim.memory().words()[4], 42);
    }

    #[test]
    fn test_beq_loop() {
        // counts reg[1] up to 5
        let src = "\
        lw 0 2 five
        lw 0 3 one
loop    beq 1 2 done
        add 1 3 1
        beq 0 0 loop
done    halt
five    .fill 5
one     .fill 1
";
        let mut sim = sim(src);
        sim.run(&Limits::default()).unwrap();
        assert_eq!(sim.registers()[1], 5);
        // 2 loads, 5 * (beq + add + beq), final beq, halt
        assert_eq!(sim.executed(), 2 + 5 * 3 + 1 + 1);
    }

    #[test]
    fn test_jalr_same_register() {
        // pc = 5, reg[2] = 10, `jalr 2 2` => pc = 10, reg[2] = 6
        let src = "noop\nnoop\nnoop\nnoop\nnoop\njalr 2 2\nnoop\nnoop\nnoop\nnoop\nhalt";
        let mut sim = sim(src).with_registers([0, 0, 10, 0, 0, 0, 0, 0]);
        for _ in 0..6 {
            assert_eq!(sim.step(), Ok(Status::Running));
        }
        assert_eq!(sim.pc(), 10);
        assert_eq!(sim.registers()[2], 6);
        assert_eq!(sim.step(), Ok(Status::Halted));
    }

    #[test]
    fn test_jalr_links() {
        let src = "lw 0 4 addr\njalr 4 7\nhalt\nfn jalr 7 6\naddr .fill fn";
        let mut sim = sim(src);
        sim.run(&Limits::default()).unwrap();
        assert_eq!(sim.registers()[7], 2);
        assert_eq!(sim.registers()[6], 4);
        assert_eq!(sim.pc(), 3);
    }

    #[test]
    fn test_pc_out_of_bounds() {
        let mut sim = sim("noop");
        let fault = sim.run(&Limits::default()).unwrap_err();
        assert_eq!(
            fault,
            Fault {
                kind: FaultKind::ProgramCounterOutOfBounds { len: 1 },
                pc: 1
            }
        );
        assert_eq!(sim.status(), Status::Faulted(fault));
        // faulting is sticky
        assert_eq!(sim.step(), Err(fault));
    }

    #[test]
    fn test_negative_pc() {
        let mut sim = sim("beq 0 0 -5\nhalt");
        let fault = sim.run(&Limits::default()).unwrap_err();
        assert_eq!(fault.kind, FaultKind::ProgramCounterOutOfBounds { len: 2 });
        assert_eq!(fault.pc, -4);
    }

    #[test]
    fn test_memory_out_of_bounds() {
        let mut sim = sim("lw 0 1 2\nhalt");
        let fault = sim.run(&Limits::default()).unwrap_err();
        assert_eq!(
            fault,
            Fault {
                kind: FaultKind::MemoryOutOfBounds { address: 2, len: 2 },
                pc: 0
            }
        );
        // nothing was executed and nothing changed
        assert_eq!(sim.executed(), 0);
        assert_eq!(sim.registers()[1], 0);
    }

    #[test]
    fn test_memory_size() {
        let mut sim = sim("sw 0 1 5\nhalt")
            .with_registers([0, 9, 0, 0, 0, 0, 0, 0])
            .with_memory_size(8);
        sim.run(&Limits::default()).unwrap();
        assert_eq!(sim.memory().words()[5], 9);
        assert_eq!(sim.memory().len(), 8);
    }

    #[test]
    fn test_step_limit() {
        let mut sim = sim("loop beq 0 0 loop");
        let fault = sim.run(&Limits::steps(1000)).unwrap_err();
        assert_eq!(fault.kind, FaultKind::StepLimitReached(1000));
        assert!(fault.kind.is_cancellation());
        assert_eq!(sim.executed(), 1000);
        // the machine itself is still fine
        assert_eq!(sim.status(), Status::Running);
    }

    #[test]
    fn test_timeout() {
        let mut sim = sim("loop beq 0 0 loop");
        let limits = Limits {
            max_steps: None,
            timeout: Some(Duration::from_millis(20)),
        };
        let fault = sim.run(&limits).unwrap_err();
        assert!(matches!(fault.kind, FaultKind::DeadlineExceeded(_)));
    }

    #[test]
    fn test_expired_deadline_stops_before_first_step() {
        let mut sim = sim("noop\nhalt");
        let limits = Limits {
            max_steps: None,
            timeout: Some(Duration::ZERO),
        };
        let fault = sim.run(&limits).unwrap_err();
        assert_eq!(fault.kind, FaultKind::DeadlineExceeded(Duration::ZERO));
        assert_eq!(sim.executed(), 0);
        assert_eq!(sim.status(), Status::Running);
    }

    #[test]
    fn test_generous_deadline_still_halts() {
        // more steps than one clock check interval
        let src = "\
        lw 0 2 count
        lw 0 3 one
loop    beq 1 2 done
        add 1 3 1
        beq 0 0 loop
done    halt
count   .fill 2000
one     .fill 1
";
        let mut sim = sim(src);
        let limits = Limits {
            max_steps: None,
            timeout: Some(Duration::from_secs(60)),
        };
        assert_eq!(sim.run(&limits), Ok(2 + 2000 * 3 + 1 + 1));
        assert_eq!(sim.registers()[1], 2000);
    }

    #[test]
    fn test_data_word_faults() {
        // decode only yields real instructions, so a data word has to be handed in directly
        let mut sim = sim("halt");
        assert_eq!(
            sim.execute_instruction(Instruction::Fill(-1)),
            Err(FaultKind::InvalidOpcode(7))
        );
        assert_eq!(
            sim.execute_instruction(Instruction::Fill(0)),
            Err(FaultKind::InvalidOpcode(0))
        );
        // nothing moved
        assert_eq!(sim.pc(), 0);
        assert_eq!(sim.executed(), 0);
        assert_eq!(sim.status(), Status::Running);
    }

    #[test]
    fn test_halt_is_final() {
        let mut sim = sim("halt\nnoop");
        assert_eq!(sim.run(&Limits::default()), Ok(1));
        assert_eq!(sim.step(), Ok(Status::Halted));
        assert_eq!(sim.executed(), 1);
        assert_eq!(sim.pc(), 1);
    }
}

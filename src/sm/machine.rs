use std::convert::TryFrom;
use std::fmt;
use std::io;

use log::debug;
use thiserror::Error;

use crate::config::MachineConfig;
use crate::io::{InputStream, OutputStream};
use crate::memory::Memory;
use crate::ops::{ArithmeticError, Op};
use crate::types::{Int, Level};

use super::program::{DecodeError, Instruction, Opcode, SysCall, Word};
use super::FRAME_HEADER;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("division by zero at {pc}")]
    DivisionByZero { pc: usize },

    #[error("modulo by zero at {pc}")]
    ModuloByZero { pc: usize },

    #[error("{source} at {pc}")]
    InvalidInstruction { pc: usize, source: DecodeError },

    #[error("invalid OPR modifier {code} at {pc}")]
    InvalidOperation { pc: usize, code: Int },

    #[error("invalid SYS modifier {code} at {pc}")]
    InvalidSysCall { pc: usize, code: Int },

    #[error("address {address} out of bounds at {pc}")]
    AddressOutOfBounds { pc: usize, address: Int },

    #[error("program counter {pc} is outside the code")]
    PcOutOfBounds { pc: Int },

    #[error("stack overflow at {pc}")]
    StackOverflow { pc: usize },

    #[error("stack underflow at {pc}")]
    StackUnderflow { pc: usize },

    #[error("no input for read at {pc}")]
    NoInput { pc: usize },

    #[error("failed to write output at {pc}: {source}")]
    Output { pc: usize, source: io::Error },

    #[error("program of {instructions} instruction(s) does not fit in {memory_size} memory cells")]
    ProgramTooLarge {
        instructions: usize,
        memory_size: usize,
    },
}

type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    /// Memory address of the next instruction.
    pub pc: usize,
    /// Start of the current activation record.
    pub base: usize,
    /// Next free stack cell is `top - 1`; the stack grows down.
    pub top: usize,
}

pub struct StackMachine<'a, I, O> {
    memory: Memory,
    config: MachineConfig,
    code_end: usize,
    registers: Registers,
    // address of the instruction being executed
    current: usize,
    halted: bool,
    input: &'a mut I,
    output: &'a mut O,
}

impl<'a, I, O> StackMachine<'a, I, O>
where
    I: InputStream,
    O: OutputStream,
{
    pub fn new(
        code: &[Word],
        config: MachineConfig,
        input: &'a mut I,
        output: &'a mut O,
    ) -> Result<Self> {
        let too_large = || RuntimeError::ProgramTooLarge {
            instructions: code.len(),
            memory_size: config.memory_size,
        };

        let mut memory = Memory::with_capacity(config.memory_size);
        let code_end = memory
            .load_code(config.code_offset, code)
            .ok_or_else(too_large)?;
        // room for at least the outermost frame's header
        if code_end + FRAME_HEADER > config.memory_size {
            return Err(too_large());
        }
        debug!("Loaded {} instruction(s)", code.len());

        Ok(StackMachine {
            memory,
            config,
            code_end,
            registers: Registers {
                pc: config.code_offset,
                base: config.memory_size - 1,
                top: config.memory_size,
            },
            current: config.code_offset,
            halted: false,
            input,
            output,
        })
    }

    pub fn registers(&self) -> Registers {
        self.registers
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Stack contents, topmost value last.
    pub fn stack(&self) -> Vec<Int> {
        self.memory
            .slice(self.registers.top, self.config.memory_size)
            .iter()
            .rev()
            .copied()
            .collect()
    }

    pub fn run(&mut self) -> Result<()> {
        self.run_traced(|_| {})
    }

    /// Runs to completion, calling `on_step` after every instruction.
    pub fn run_traced<F>(&mut self, mut on_step: F) -> Result<()>
    where
        F: FnMut(&Trace<'_>),
    {
        while !self.halted {
            let instruction = self.step()?;
            on_step(&self.trace(instruction));
        }

        debug!("Halted");
        Ok(())
    }

    /// Fetches and executes a single instruction.
    pub fn step(&mut self) -> Result<Instruction> {
        let instruction = self.fetch()?;
        self.current = self.registers.pc;
        self.registers.pc += 3;
        self.execute(instruction)?;
        Ok(instruction)
    }

    pub fn trace(&self, instruction: Instruction) -> Trace<'_> {
        Trace {
            instruction,
            registers: self.registers,
            stack: self.memory.slice(self.registers.top, self.config.memory_size),
            bases: self.active_bases(),
            bottom: self.registers.top,
        }
    }

    fn fetch(&self) -> Result<Instruction> {
        let pc = self.registers.pc;
        let aligned = pc >= self.config.code_offset && (pc - self.config.code_offset) % 3 == 0;
        if !aligned || pc >= self.code_end {
            return Err(RuntimeError::PcOutOfBounds { pc: pc as Int });
        }

        let word = self
            .memory
            .fetch(pc)
            .ok_or(RuntimeError::PcOutOfBounds { pc: pc as Int })?;
        Instruction::decode(word).map_err(|source| RuntimeError::InvalidInstruction { pc, source })
    }

    fn execute(&mut self, instruction: Instruction) -> Result<()> {
        let Instruction {
            opcode,
            level,
            modifier,
        } = instruction;

        match opcode {
            Opcode::Lit => self.push(modifier)?,
            Opcode::Opr => self.operate(modifier)?,
            Opcode::Lod => {
                let address = self.frame_slot(level, modifier)?;
                let value = self.load(address)?;
                self.push(value)?;
            }
            Opcode::Sto => {
                let address = self.frame_slot(level, modifier)?;
                let value = self.pop()?;
                self.store(address, value)?;
            }
            Opcode::Cal => self.call(level, modifier)?,
            Opcode::Inc => self.allocate(modifier)?,
            Opcode::Jmp => self.jump(modifier)?,
            Opcode::Jpc => {
                if self.pop()? == 0 {
                    self.jump(modifier)?;
                }
            }
            Opcode::Sys => self.system(modifier)?,
        }

        Ok(())
    }

    fn operate(&mut self, code: Int) -> Result<()> {
        let pc = self.current;
        let op = Op::from_code(code).ok_or(RuntimeError::InvalidOperation { pc, code })?;

        match op {
            Op::Return => {
                let frame = self.registers.base;
                let caller = self.load_at(frame as Int - 1)?;
                let resume = self.load_at(frame as Int - 2)?;

                self.registers.top = frame + 1;
                self.registers.base = self.stack_address(caller)?;
                self.registers.pc =
                    usize::try_from(resume).map_err(|_| RuntimeError::PcOutOfBounds { pc: resume })?;
            }
            Op::Neg => {
                let value = self.pop()?;
                self.push(value.wrapping_neg())?;
            }
            Op::Binary(op) => {
                let rhs = self.pop()?;
                let lhs = self.pop()?;
                let value = op.apply(lhs, rhs).map_err(|e| match e {
                    ArithmeticError::DivisionByZero => RuntimeError::DivisionByZero { pc },
                    ArithmeticError::ModuloByZero => RuntimeError::ModuloByZero { pc },
                })?;
                self.push(value)?;
            }
        }

        Ok(())
    }

    fn call(&mut self, level: Level, entry: Int) -> Result<()> {
        let static_link = self.resolve_frame(level)?;
        let top = self.registers.top;
        if top < self.code_end + FRAME_HEADER {
            return Err(RuntimeError::StackOverflow { pc: self.current });
        }

        self.store(top - 1, static_link as Int)?;
        self.store(top - 2, self.registers.base as Int)?;
        self.store(top - 3, self.registers.pc as Int)?;
        self.registers.base = top - 1;
        self.jump(entry)
    }

    fn allocate(&mut self, cells: Int) -> Result<()> {
        let pc = self.current;
        let top = (self.registers.top as Int)
            .checked_sub(cells)
            .ok_or(RuntimeError::StackUnderflow { pc })?;
        if top < self.code_end as Int {
            return Err(RuntimeError::StackOverflow { pc });
        }
        if top > self.config.memory_size as Int {
            return Err(RuntimeError::StackUnderflow { pc });
        }

        self.registers.top = top as usize;
        Ok(())
    }

    fn jump(&mut self, target: Int) -> Result<()> {
        let pc = usize::try_from(target)
            .ok()
            .and_then(|target| target.checked_mul(3))
            .and_then(|offset| offset.checked_add(self.config.code_offset))
            .ok_or(RuntimeError::PcOutOfBounds { pc: target })?;

        self.registers.pc = pc;
        Ok(())
    }

    fn system(&mut self, code: Int) -> Result<()> {
        let pc = self.current;
        let call = SysCall::from_code(code).ok_or(RuntimeError::InvalidSysCall { pc, code })?;

        match call {
            SysCall::Read => {
                let value = self.input.read().ok_or(RuntimeError::NoInput { pc })?;
                self.push(value)?;
            }
            SysCall::Write => {
                let value = self.pop()?;
                self.output
                    .write(value)
                    .map_err(|source| RuntimeError::Output { pc, source })?;
            }
            SysCall::Halt => self.halted = true,
        }

        Ok(())
    }

    /// Base of the frame `levels` static links up from the current one.
    fn resolve_frame(&self, levels: Level) -> Result<usize> {
        let mut base = self.registers.base;
        // every frame takes at least FRAME_HEADER cells, so a longer chain loops
        if levels > self.config.memory_size / FRAME_HEADER {
            return Err(RuntimeError::AddressOutOfBounds {
                pc: self.current,
                address: base as Int,
            });
        }

        for _ in 0..levels {
            let link = self.load(base)?;
            base = self.stack_address(link)?;
        }
        Ok(base)
    }

    fn frame_slot(&self, levels: Level, offset: Int) -> Result<usize> {
        let base = self.resolve_frame(levels)?;
        let address = (base as Int)
            .checked_sub(offset)
            .ok_or(RuntimeError::AddressOutOfBounds {
                pc: self.current,
                address: offset,
            })?;
        self.stack_address(address)
    }

    fn stack_address(&self, address: Int) -> Result<usize> {
        match usize::try_from(address) {
            Ok(a) if a >= self.code_end && a < self.config.memory_size => Ok(a),
            _ => Err(RuntimeError::AddressOutOfBounds {
                pc: self.current,
                address,
            }),
        }
    }

    fn load(&self, address: usize) -> Result<Int> {
        self.memory
            .load(address)
            .ok_or(RuntimeError::AddressOutOfBounds {
                pc: self.current,
                address: address as Int,
            })
    }

    fn load_at(&self, address: Int) -> Result<Int> {
        let address = self.stack_address(address)?;
        self.load(address)
    }

    fn store(&mut self, address: usize, value: Int) -> Result<()> {
        let pc = self.current;
        self.memory
            .store(address, value)
            .ok_or(RuntimeError::AddressOutOfBounds {
                pc,
                address: address as Int,
            })
    }

    fn push(&mut self, value: Int) -> Result<()> {
        if self.registers.top <= self.code_end {
            return Err(RuntimeError::StackOverflow { pc: self.current });
        }

        self.registers.top -= 1;
        self.store(self.registers.top, value)
    }

    fn pop(&mut self) -> Result<Int> {
        if self.registers.top >= self.config.memory_size {
            return Err(RuntimeError::StackUnderflow { pc: self.current });
        }

        let value = self.load(self.registers.top)?;
        self.registers.top += 1;
        Ok(value)
    }

    // Current base and every caller's base, innermost first; the outermost
    // frame is left out.
    fn active_bases(&self) -> Vec<usize> {
        let outermost = self.config.memory_size - 1;
        let mut bases = Vec::new();
        let mut base = self.registers.base;

        while base != outermost && bases.len() < self.config.memory_size {
            bases.push(base);
            match base
                .checked_sub(1)
                .and_then(|link| self.memory.load(link))
                .and_then(|caller| usize::try_from(caller).ok())
            {
                Some(caller) => base = caller,
                None => break,
            }
        }

        bases
    }
}

/// One row of the execution trace, taken right after an instruction ran.
pub struct Trace<'m> {
    pub instruction: Instruction,
    pub registers: Registers,
    stack: &'m [Int],
    bases: Vec<usize>,
    // address of stack[0]
    bottom: usize,
}

impl Trace<'_> {
    fn mnemonic(&self) -> &'static str {
        match self.instruction.opcode {
            Opcode::Opr => Op::from_code(self.instruction.modifier)
                .map(Op::mnemonic)
                .unwrap_or("OPR"),
            opcode => opcode.mnemonic(),
        }
    }
}

impl fmt::Display for Trace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Registers { pc, base, top } = self.registers;
        write!(
            f,
            "{:<4}{:>3} {:>4}\t{}\t{}\t{}\t",
            self.mnemonic(),
            self.instruction.level,
            self.instruction.modifier,
            pc,
            base,
            top
        )?;

        for (i, value) in self.stack.iter().enumerate().rev() {
            if self.bases.contains(&(self.bottom + i)) {
                write!(f, "| ")?;
            }
            write!(f, "{} ", value)?;
        }

        Ok(())
    }
}

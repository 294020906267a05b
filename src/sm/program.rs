use std::convert::TryFrom;
use std::fmt;

use thiserror::Error;

use crate::ops::Op;
use crate::types::{Int, Level};

/// Position of an instruction in a `Program`.
pub type Address = usize;

/// An instruction as persisted and as laid out in machine memory.
pub type Word = [Int; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Lit,
    Opr,
    Lod,
    Sto,
    Cal,
    Inc,
    Jmp,
    Jpc,
    Sys,
}

impl Opcode {
    const ALL: [Opcode; 9] = [
        Opcode::Lit,
        Opcode::Opr,
        Opcode::Lod,
        Opcode::Sto,
        Opcode::Cal,
        Opcode::Inc,
        Opcode::Jmp,
        Opcode::Jpc,
        Opcode::Sys,
    ];

    pub fn id(self) -> Int {
        match self {
            Opcode::Lit => 1,
            Opcode::Opr => 2,
            Opcode::Lod => 3,
            Opcode::Sto => 4,
            Opcode::Cal => 5,
            Opcode::Inc => 6,
            Opcode::Jmp => 7,
            Opcode::Jpc => 8,
            Opcode::Sys => 9,
        }
    }

    pub fn from_id(id: Int) -> Option<Opcode> {
        Self::ALL.iter().copied().find(|opcode| opcode.id() == id)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Lit => "LIT",
            Opcode::Opr => "OPR",
            Opcode::Lod => "LOD",
            Opcode::Sto => "STO",
            Opcode::Cal => "CAL",
            Opcode::Inc => "INC",
            Opcode::Jmp => "JMP",
            Opcode::Jpc => "JPC",
            Opcode::Sys => "SYS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysCall {
    Read,
    Write,
    Halt,
}

impl SysCall {
    pub fn code(self) -> Int {
        match self {
            SysCall::Read => 1,
            SysCall::Write => 2,
            SysCall::Halt => 3,
        }
    }

    pub fn from_code(code: Int) -> Option<SysCall> {
        match code {
            1 => Some(SysCall::Read),
            2 => Some(SysCall::Write),
            3 => Some(SysCall::Halt),
            _ => None,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid opcode {0}")]
    InvalidOpcode(Int),

    #[error("invalid level difference {0}")]
    InvalidLevel(Int),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Static-link hops for `LOD`, `STO` and `CAL`; 0 everywhere else.
    pub level: Level,
    pub modifier: Int,
}

impl Instruction {
    pub fn new(opcode: Opcode, level: Level, modifier: Int) -> Self {
        Instruction {
            opcode,
            level,
            modifier,
        }
    }

    pub fn lit(value: Int) -> Self {
        Self::new(Opcode::Lit, 0, value)
    }

    pub fn opr(op: Op) -> Self {
        Self::new(Opcode::Opr, 0, op.code())
    }

    pub fn lod(level: Level, offset: usize) -> Self {
        Self::new(Opcode::Lod, level, offset as Int)
    }

    pub fn sto(level: Level, offset: usize) -> Self {
        Self::new(Opcode::Sto, level, offset as Int)
    }

    pub fn cal(level: Level, entry: Address) -> Self {
        Self::new(Opcode::Cal, level, entry as Int)
    }

    pub fn inc(cells: usize) -> Self {
        Self::new(Opcode::Inc, 0, cells as Int)
    }

    pub fn jmp(target: Address) -> Self {
        Self::new(Opcode::Jmp, 0, target as Int)
    }

    pub fn jpc(target: Address) -> Self {
        Self::new(Opcode::Jpc, 0, target as Int)
    }

    pub fn sys(call: SysCall) -> Self {
        Self::new(Opcode::Sys, 0, call.code())
    }

    pub fn is_jump(&self) -> bool {
        matches!(self.opcode, Opcode::Jmp | Opcode::Jpc)
    }

    pub fn encode(self) -> Word {
        [self.opcode.id(), self.level as Int, self.modifier]
    }

    pub fn decode([op, level, modifier]: Word) -> Result<Self, DecodeError> {
        let opcode = Opcode::from_id(op).ok_or(DecodeError::InvalidOpcode(op))?;
        let level = Level::try_from(level).map_err(|_| DecodeError::InvalidLevel(level))?;
        Ok(Self::new(opcode, level, modifier))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.opcode.mnemonic(), self.level, self.modifier)
    }
}

/// Append-only code buffer. Only the target of an emitted jump may change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Address the next pushed instruction will get.
    pub fn next_address(&self) -> Address {
        self.instructions.len()
    }

    pub fn push(&mut self, instruction: Instruction) -> Address {
        self.instructions.push(instruction);
        self.instructions.len() - 1
    }

    pub fn patch(&mut self, at: Address, target: Address) {
        if let Some(instruction) = self.instructions.get_mut(at) {
            debug_assert!(instruction.is_jump(), "backpatching {}", instruction);
            instruction.modifier = target as Int;
        }
    }

    pub fn get(&self, at: Address) -> Option<&Instruction> {
        self.instructions.get(at)
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    pub fn encode(&self) -> Vec<Word> {
        self.instructions.iter().map(|i| i.encode()).collect()
    }
}

impl From<Vec<Instruction>> for Program {
    fn from(instructions: Vec<Instruction>) -> Self {
        Program { instructions }
    }
}

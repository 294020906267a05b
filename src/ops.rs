use thiserror::Error;

use crate::types::Int;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("Attempt to divide by 0")]
    DivisionByZero,

    #[error("Attempt to mod by 0")]
    ModuloByZero,
}

/// Sub-operation selected by the modifier of an `OPR` instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Return,
    Neg,
    Binary(BinaryOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Mod,
}

impl Op {
    pub fn code(self) -> Int {
        match self {
            Op::Return => 0,
            Op::Neg => 1,
            Op::Binary(op) => op.code(),
        }
    }

    pub fn from_code(code: Int) -> Option<Op> {
        let op = match code {
            0 => Op::Return,
            1 => Op::Neg,
            code => Op::Binary(BinaryOp::from_code(code)?),
        };

        Some(op)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Return => "RTN",
            Op::Neg => "NEG",
            Op::Binary(op) => op.mnemonic(),
        }
    }
}

impl BinaryOp {
    const ALL: [BinaryOp; 11] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Eq,
        BinaryOp::NotEq,
        BinaryOp::Less,
        BinaryOp::LessOrEqual,
        BinaryOp::Greater,
        BinaryOp::GreaterOrEqual,
        BinaryOp::Mod,
    ];

    pub fn code(self) -> Int {
        match self {
            BinaryOp::Add => 2,
            BinaryOp::Sub => 3,
            BinaryOp::Mul => 4,
            BinaryOp::Div => 5,
            BinaryOp::Eq => 6,
            BinaryOp::NotEq => 7,
            BinaryOp::Less => 8,
            BinaryOp::LessOrEqual => 9,
            BinaryOp::Greater => 10,
            BinaryOp::GreaterOrEqual => 11,
            BinaryOp::Mod => 12,
        }
    }

    fn from_code(code: Int) -> Option<BinaryOp> {
        Self::ALL.iter().copied().find(|op| op.code() == code)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            BinaryOp::Add => "ADD",
            BinaryOp::Sub => "SUB",
            BinaryOp::Mul => "MUL",
            BinaryOp::Div => "DIV",
            BinaryOp::Eq => "EQL",
            BinaryOp::NotEq => "NEQ",
            BinaryOp::Less => "LSS",
            BinaryOp::LessOrEqual => "LEQ",
            BinaryOp::Greater => "GTR",
            BinaryOp::GreaterOrEqual => "GEQ",
            BinaryOp::Mod => "MOD",
        }
    }

    pub fn apply(self, lhs: Int, rhs: Int) -> Result<Int, ArithmeticError> {
        let n = match self {
            BinaryOp::Add => lhs.wrapping_add(rhs),
            BinaryOp::Sub => lhs.wrapping_sub(rhs),
            BinaryOp::Mul => lhs.wrapping_mul(rhs),
            BinaryOp::Div => {
                if rhs == 0 {
                    return Err(ArithmeticError::DivisionByZero);
                }

                lhs.wrapping_div(rhs)
            }
            BinaryOp::Mod => {
                if rhs == 0 {
                    return Err(ArithmeticError::ModuloByZero);
                }

                lhs.wrapping_rem(rhs)
            }
            BinaryOp::Eq => Int::from(lhs == rhs),
            BinaryOp::NotEq => Int::from(lhs != rhs),
            BinaryOp::Less => Int::from(lhs < rhs),
            BinaryOp::LessOrEqual => Int::from(lhs <= rhs),
            BinaryOp::Greater => Int::from(lhs > rhs),
            BinaryOp::GreaterOrEqual => Int::from(lhs >= rhs),
        };

        Ok(n)
    }
}

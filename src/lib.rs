//! PL/0 compiler and the PM/0 stack machine that runs its output.

pub mod bytecode;
pub mod compiler;
pub mod config;
pub mod io;
pub mod lexer;
pub mod listing;
pub mod memory;
pub mod ops;
#[cfg(test)]
mod regression;
pub mod sm;
pub mod symbols;
pub mod token;
pub mod types;

use std::fmt;

use log::trace;
use thiserror::Error;

pub use crate::compiler::{Compilation, Diagnostic};
pub use crate::config::MachineConfig;
pub use crate::lexer::LexError;
pub use crate::sm::{RuntimeError, Word};

use crate::io::{InputStream, OutputStream};

/// Why a source file produced no code.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{}", lines("Lexical error", .0))]
    Lex(Vec<LexError>),

    #[error("{}", lines("Error", .0))]
    Syntax(Vec<Diagnostic>),
}

impl CompileError {
    pub fn count(&self) -> usize {
        match self {
            CompileError::Lex(errors) => errors.len(),
            CompileError::Syntax(errors) => errors.len(),
        }
    }
}

fn lines<T: fmt::Display>(label: &str, errors: &[T]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", label, e))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn compile(source: &str) -> Result<Compilation, CompileError> {
    trace!("Tokenizing");
    let tokens = lexer::tokenize(source).map_err(CompileError::Lex)?;

    trace!("Compiling");
    compiler::compile(&tokens).map_err(CompileError::Syntax)
}

pub fn run<I, O>(
    code: &[Word],
    config: MachineConfig,
    input: &mut I,
    output: &mut O,
) -> Result<(), RuntimeError>
where
    I: InputStream,
    O: OutputStream,
{
    trace!("Running");
    sm::run(code, config, input, output)
}

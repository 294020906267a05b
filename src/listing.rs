//! Human-readable dumps printed by the compiler driver.

use std::fmt;

use crate::sm::Program;
use crate::symbols::SymbolTable;

pub struct CodeListing<'a>(pub &'a Program);

impl fmt::Display for CodeListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Assembly Code:")?;
        writeln!(f, "Line OP   L M")?;
        for (line, instruction) in self.0.instructions().enumerate() {
            writeln!(
                f,
                "{:>4} {:<3}  {} {}",
                line,
                instruction.opcode.mnemonic(),
                instruction.level,
                instruction.modifier
            )?;
        }
        Ok(())
    }
}

/// Every symbol ever declared; `Mark` is 1 once its scope has closed.
pub struct SymbolListing<'a>(pub &'a SymbolTable);

impl fmt::Display for SymbolListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Symbol Table:")?;
        writeln!(f, "Kind | Name     | Value | Level | Address | Mark")?;
        writeln!(f, "{}", "-".repeat(47))?;
        for symbol in self.0.iter() {
            writeln!(
                f,
                "{:>4} | {:<8} | {:>5} | {:>5} | {:>7} | {:>4}",
                symbol.kind.id(),
                symbol.name,
                symbol.value,
                symbol.level,
                symbol.address,
                if symbol.live { 0 } else { 1 }
            )?;
        }
        Ok(())
    }
}

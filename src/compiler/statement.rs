// Statement ::= Assign | Call | Compound | IfElse | While | Read | Write | <empty>
// Assign ::= Var ':=' Expr
// Call ::= 'call' Var
// Compound ::= 'begin' Statement (';' Statement)* 'end'
// IfElse ::= 'if' Condition 'then' Statement ['else' Statement] 'fi'
// While ::= 'while' Condition 'do' Statement
// Read ::= 'read' Var
// Write ::= 'write' Expr

use super::{Compiler, Error, Result};
use crate::sm::{Instruction, SysCall};
use crate::symbols::SymbolKind;
use crate::token::TokenKind;

impl Compiler<'_> {
    /// Compiles one statement. A broken statement is reported and skipped
    /// up to the next token that can end it.
    pub(super) fn statement(&mut self) {
        if let Err(e) = self.nested(Self::try_statement) {
            self.report(e);
            self.skip_statement();
        }
    }

    fn try_statement(&mut self) -> Result<()> {
        match self.peek_kind() {
            Some(TokenKind::Ident) => self.assignment(),
            Some(TokenKind::Call) => self.call(),
            Some(TokenKind::Begin) => self.compound(),
            Some(TokenKind::If) => self.if_else(),
            Some(TokenKind::While) => self.while_(),
            Some(TokenKind::Read) => self.read(),
            Some(TokenKind::Write) => self.write(),
            _ => Ok(()),
        }
    }

    fn assignment(&mut self) -> Result<()> {
        let token = self.identifier("statement")?;
        let symbol = self.resolve(token)?;
        if symbol.kind != SymbolKind::Variable {
            return Err(self.error_at(Error::AssignmentToNonVariable(symbol.name), token));
        }

        self.expect(TokenKind::Becomes, Error::BecomesExpected)?;
        self.expression()?;
        self.emit(Instruction::sto(self.distance(&symbol), symbol.address));
        Ok(())
    }

    fn call(&mut self) -> Result<()> {
        self.advance();
        let token = self.identifier("call")?;
        let symbol = self.resolve(token)?;
        if symbol.kind != SymbolKind::Procedure {
            return Err(self.error_at(Error::CallOfNonProcedure(symbol.name), token));
        }

        self.emit(Instruction::cal(self.distance(&symbol), symbol.address));
        Ok(())
    }

    fn compound(&mut self) -> Result<()> {
        self.advance();

        loop {
            self.statement();

            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            if self.eat(TokenKind::End) {
                return Ok(());
            }

            match self.peek_kind() {
                Some(kind) if kind.starts_statement() => {
                    self.report(self.error(Error::StatementSemicolonMissing))
                }
                _ => return Err(self.error(Error::EndExpected)),
            }
        }
    }

    fn if_else(&mut self) -> Result<()> {
        self.advance();
        self.condition()?;
        self.expect_or_report(TokenKind::Then, Error::ThenExpected);

        let skip_then = self.emit(Instruction::jpc(0));
        self.statement();

        if self.eat(TokenKind::Else) {
            let skip_else = self.emit(Instruction::jmp(0));
            self.patch_here(skip_then);
            self.statement();
            self.patch_here(skip_else);
        } else {
            self.patch_here(skip_then);
        }

        self.expect_or_report(TokenKind::Fi, Error::FiExpected);
        Ok(())
    }

    fn while_(&mut self) -> Result<()> {
        let start = self.program.next_address();
        self.advance();
        self.condition()?;
        self.expect_or_report(TokenKind::Do, Error::DoExpected);

        let exit = self.emit(Instruction::jpc(0));
        self.statement();
        self.emit(Instruction::jmp(start));
        self.patch_here(exit);
        Ok(())
    }

    fn read(&mut self) -> Result<()> {
        self.advance();
        let token = self.identifier("read")?;
        let symbol = self.resolve(token)?;
        if symbol.kind != SymbolKind::Variable {
            return Err(self.error_at(Error::ReadIntoNonVariable(symbol.name), token));
        }

        self.emit(Instruction::sys(SysCall::Read));
        self.emit(Instruction::sto(self.distance(&symbol), symbol.address));
        Ok(())
    }

    fn write(&mut self) -> Result<()> {
        self.advance();
        self.expression()?;
        self.emit(Instruction::sys(SysCall::Write));
        Ok(())
    }
}

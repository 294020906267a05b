// Condition ::= Expr RelOp Expr
// Expr ::= ['+' | '-'] Term (('+' | '-') Term)*
// Term ::= Factor (('*' | '/' | 'mod') Factor)*
// Factor ::= Var | Number | '(' Expr ')'
//
// Operands are pushed first and the operator follows, so code comes out in
// post-order.

use super::{Compiler, Error, Result};
use crate::ops::{BinaryOp, Op};
use crate::sm::Instruction;
use crate::symbols::SymbolKind;
use crate::token::TokenKind;

fn relation(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Eq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::LessOrEqual => BinaryOp::LessOrEqual,
        TokenKind::Greater => BinaryOp::Greater,
        TokenKind::GreaterOrEqual => BinaryOp::GreaterOrEqual,
        _ => return None,
    };

    Some(op)
}

impl Compiler<'_> {
    pub(super) fn condition(&mut self) -> Result<()> {
        self.expression()?;

        let op = self
            .peek_kind()
            .and_then(relation)
            .ok_or_else(|| self.error(Error::RelationExpected))?;
        self.advance();

        self.expression()?;
        self.emit(Instruction::opr(Op::Binary(op)));
        Ok(())
    }

    pub(super) fn expression(&mut self) -> Result<()> {
        let negate = self.eat(TokenKind::Minus);
        if !negate {
            self.eat(TokenKind::Plus);
        }

        self.term()?;
        if negate {
            self.emit(Instruction::opr(Op::Neg));
        }

        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => return Ok(()),
            };
            self.advance();

            self.term()?;
            self.emit(Instruction::opr(Op::Binary(op)));
        }
    }

    fn term(&mut self) -> Result<()> {
        self.factor()?;

        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Times) => BinaryOp::Mul,
                Some(TokenKind::Slash) => BinaryOp::Div,
                Some(TokenKind::Mod) => BinaryOp::Mod,
                _ => return Ok(()),
            };
            self.advance();

            self.factor()?;
            self.emit(Instruction::opr(Op::Binary(op)));
        }
    }

    fn factor(&mut self) -> Result<()> {
        match self.peek_kind() {
            Some(TokenKind::Ident) => {
                let token = self.identifier("expression")?;
                let symbol = self.resolve(token)?;
                match symbol.kind {
                    // constants are folded into the code
                    SymbolKind::Constant => self.emit(Instruction::lit(symbol.value)),
                    SymbolKind::Variable => {
                        self.emit(Instruction::lod(self.distance(&symbol), symbol.address))
                    }
                    SymbolKind::Procedure => {
                        return Err(self.error_at(Error::ProcedureInExpression(symbol.name), token))
                    }
                };
            }
            Some(TokenKind::Number) => {
                let value = self.number()?;
                self.emit(Instruction::lit(value));
            }
            Some(TokenKind::LeftParen) => {
                self.advance();
                self.nested(Self::expression)?;
                self.expect(TokenKind::RightParen, Error::RightParenExpected)?;
            }
            _ => return Err(self.error(Error::FactorExpected)),
        }

        Ok(())
    }
}

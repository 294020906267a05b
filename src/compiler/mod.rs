//! Single-pass recursive-descent compiler.
//!
//! ```text
//! program    ::= block '.'
//! block      ::= constDecl varDecl { procDecl } statement
//! constDecl  ::= [ 'const' ident '=' number { ',' ident '=' number } ';' ]
//! varDecl    ::= [ 'var' ident { ',' ident } ';' ]
//! procDecl   ::= 'procedure' ident ';' block ';'
//! ```
//!
//! Code is emitted while parsing; no syntax tree is built. Forward jumps are
//! emitted with a placeholder target and patched once the target is known.

mod expr;
mod statement;

use std::fmt;

use log::{debug, trace};
use thiserror::Error;

use crate::config::{MAX_CODE_LENGTH, MAX_NESTING};
use crate::ops::Op;
use crate::sm::{Address, Instruction, Program, SysCall, FRAME_HEADER};
use crate::symbols::{Symbol, SymbolTable};
use crate::token::{Position, Token, TokenKind};
use crate::types::{Int, Level, Var};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("program must end with period")]
    PeriodExpected,

    #[error("unexpected '{0}' after end of program")]
    TrailingInput(String),

    #[error("{0} must be followed by identifier")]
    IdentifierExpected(&'static str),

    #[error("symbol name '{0}' has already been declared")]
    AlreadyDeclared(Var),

    #[error("constants must be assigned with =")]
    ConstantEqualsExpected,

    #[error("constants must be assigned an integer value")]
    ConstantValueExpected,

    #[error("constant and variable declarations must be followed by a semicolon")]
    DeclarationSemicolonExpected,

    #[error("incorrect symbol after procedure declaration")]
    ProcedureSemicolonExpected,

    #[error("semicolon between statements missing")]
    StatementSemicolonMissing,

    #[error("undeclared identifier '{0}'")]
    UndeclaredIdentifier(Var),

    #[error("assignment to constant or procedure '{0}' is not allowed")]
    AssignmentToNonVariable(Var),

    #[error("read into constant or procedure '{0}' is not allowed")]
    ReadIntoNonVariable(Var),

    #[error("assignment operator expected")]
    BecomesExpected,

    #[error("call of a constant or variable '{0}' is meaningless")]
    CallOfNonProcedure(Var),

    #[error("then expected")]
    ThenExpected,

    #[error("semicolon or end expected")]
    EndExpected,

    #[error("do expected")]
    DoExpected,

    #[error("fi expected")]
    FiExpected,

    #[error("relational operator expected")]
    RelationExpected,

    #[error("expression must not contain a procedure identifier '{0}'")]
    ProcedureInExpression(Var),

    #[error("right parenthesis missing")]
    RightParenExpected,

    #[error("an expression cannot begin with this symbol")]
    FactorExpected,

    #[error("program too long")]
    ProgramTooLong,

    #[error("nesting too deep")]
    NestingTooDeep,
}

/// A compile error pinned to the token it was found at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub error: Error,
    pub position: Position,
}

impl Diagnostic {
    pub fn new(error: Error, position: Position) -> Self {
        Diagnostic { error, position }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.error)
    }
}

impl std::error::Error for Diagnostic {}

type Result<T> = std::result::Result<T, Diagnostic>;

/// Everything a successful compilation produces.
#[derive(Debug)]
pub struct Compilation {
    pub program: Program,
    pub symbols: SymbolTable,
}

pub fn compile(tokens: &[Token]) -> std::result::Result<Compilation, Vec<Diagnostic>> {
    Compiler::new(tokens).compile()
}

pub struct Compiler<'t> {
    tokens: &'t [Token],
    cursor: usize,
    level: Level,
    // parser recursion depth
    depth: usize,
    symbols: SymbolTable,
    program: Program,
    diagnostics: Vec<Diagnostic>,
    overflowed: bool,
}

impl<'t> Compiler<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Compiler {
            tokens,
            cursor: 0,
            level: 0,
            depth: 0,
            symbols: SymbolTable::new(),
            program: Program::new(),
            diagnostics: Vec::new(),
            overflowed: false,
        }
    }

    pub fn compile(mut self) -> std::result::Result<Compilation, Vec<Diagnostic>> {
        trace!("Parsing {} token(s)", self.tokens.len());
        self.program();

        if !self.diagnostics.is_empty() {
            debug!("Compilation failed with {} error(s)", self.diagnostics.len());
            return Err(self.diagnostics);
        }

        debug!(
            "Compiled {} instruction(s), {} symbol(s)",
            self.program.len(),
            self.symbols.len()
        );
        Ok(Compilation {
            program: self.program,
            symbols: self.symbols,
        })
    }

    fn program(&mut self) {
        // jumps over the procedure bodies, patched by the top-level block
        let entry = self.emit(Instruction::jmp(0));
        self.block(Some(entry));
        self.emit(Instruction::sys(SysCall::Halt));

        if !self.eat(TokenKind::Period) {
            self.report(self.error(Error::PeriodExpected));
            return;
        }

        if let Some(token) = self.peek() {
            let error = Error::TrailingInput(token.to_string());
            self.report(Diagnostic::new(error, token.position));
        }
    }

    fn block(&mut self, entry: Option<Address>) {
        let mark = self.symbols.len();

        self.constants();
        let variables = self.variables();

        // nested procedures are laid out in front of the block's own code
        let entry = match entry {
            None if self.at(TokenKind::Procedure) => Some(self.emit(Instruction::jmp(0))),
            entry => entry,
        };
        while self.at(TokenKind::Procedure) {
            self.procedure();
        }
        if let Some(entry) = entry {
            self.program.patch(entry, self.program.next_address());
        }

        self.emit(Instruction::inc(FRAME_HEADER + variables));
        self.statement();

        self.symbols.close_scope(mark);
    }

    fn constants(&mut self) {
        if !self.eat(TokenKind::Const) {
            return;
        }

        if let Err(e) = self.constant_list() {
            self.report(e);
            self.skip_declaration();
        }
    }

    fn constant_list(&mut self) -> Result<()> {
        loop {
            let name = self.identifier("const")?;
            self.expect(TokenKind::Eq, Error::ConstantEqualsExpected)?;
            let value = self.number()?;
            self.declare(Symbol::constant(name.text.clone(), value, self.level), name);

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::Semicolon, Error::DeclarationSemicolonExpected)?;
        Ok(())
    }

    // returns the number of variables declared
    fn variables(&mut self) -> usize {
        if !self.eat(TokenKind::Var) {
            return 0;
        }

        let mut count = 0;
        if let Err(e) = self.variable_list(&mut count) {
            self.report(e);
            self.skip_declaration();
        }
        count
    }

    fn variable_list(&mut self, count: &mut usize) -> Result<()> {
        loop {
            let name = self.identifier("var")?;
            let offset = FRAME_HEADER + *count;
            if self.declare(Symbol::variable(name.text.clone(), self.level, offset), name) {
                *count += 1;
            }

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::Semicolon, Error::DeclarationSemicolonExpected)?;
        Ok(())
    }

    fn procedure(&mut self) {
        if self.depth >= MAX_NESTING {
            // the rest of the source is skipped
            self.report(self.error(Error::NestingTooDeep));
            self.cursor = self.tokens.len();
            return;
        }
        self.advance();

        // the body starts right here, so the entry address is already known
        let entry = self.program.next_address();
        match self.identifier("procedure") {
            Ok(name) => {
                self.declare(Symbol::procedure(name.text.clone(), self.level, entry), name);
            }
            Err(e) => self.report(e),
        }
        if let Err(e) = self.expect(TokenKind::Semicolon, Error::ProcedureSemicolonExpected) {
            self.report(e);
        }

        self.level += 1;
        self.depth += 1;
        self.block(None);
        self.depth -= 1;
        self.level -= 1;
        self.emit(Instruction::opr(Op::Return));

        if let Err(e) = self.expect(TokenKind::Semicolon, Error::ProcedureSemicolonExpected) {
            self.report(e);
        }
    }

    /// Runs `parse` one nesting level deeper.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(Error::NestingTooDeep));
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn declare(&mut self, symbol: Symbol, at: &Token) -> bool {
        let name = symbol.name.clone();
        let declared = self.symbols.declare(symbol).is_some();
        if !declared {
            self.report(Diagnostic::new(Error::AlreadyDeclared(name), at.position));
        }
        declared
    }

    // Resolution

    fn resolve(&self, token: &Token) -> Result<Symbol> {
        self.symbols
            .lookup(&token.text, self.level)
            .map(|(_, symbol)| symbol.clone())
            .ok_or_else(|| {
                Diagnostic::new(Error::UndeclaredIdentifier(token.text.clone()), token.position)
            })
    }

    // static-link hops from the current block to the symbol's block
    fn distance(&self, symbol: &Symbol) -> Level {
        self.level - symbol.level
    }

    // Code emission

    fn emit(&mut self, instruction: Instruction) -> Address {
        if self.program.len() >= MAX_CODE_LENGTH {
            if !self.overflowed {
                self.overflowed = true;
                self.report(self.error(Error::ProgramTooLong));
            }
            return self.program.next_address();
        }

        self.program.push(instruction)
    }

    fn patch_here(&mut self, jump: Address) {
        self.program.patch(jump, self.program.next_address());
    }

    // Token stream

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.cursor)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|token| token.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.peek()?;
        self.cursor += 1;
        Some(token)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, error: Error) -> Result<&'t Token> {
        if self.at(kind) {
            if let Some(token) = self.advance() {
                return Ok(token);
            }
        }

        Err(self.error(error))
    }

    // reports a missing keyword and carries on as if it was there
    fn expect_or_report(&mut self, kind: TokenKind, error: Error) {
        if !self.eat(kind) {
            self.report(self.error(error));
        }
    }

    fn identifier(&mut self, after: &'static str) -> Result<&'t Token> {
        self.expect(TokenKind::Ident, Error::IdentifierExpected(after))
    }

    fn number(&mut self) -> Result<Int> {
        let token = self.expect(TokenKind::Number, Error::ConstantValueExpected)?;
        token
            .text
            .parse::<Int>()
            .map_err(|_| Diagnostic::new(Error::ConstantValueExpected, token.position))
    }

    // Diagnostics

    fn position(&self) -> Position {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|token| token.position)
            .unwrap_or_default()
    }

    fn error(&self, error: Error) -> Diagnostic {
        Diagnostic::new(error, self.position())
    }

    fn error_at(&self, error: Error, token: &Token) -> Diagnostic {
        Diagnostic::new(error, token.position)
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        trace!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    // Skips to just past the next ';', or to the start of whatever may
    // follow a declaration.
    fn skip_declaration(&mut self) {
        while let Some(kind) = self.peek_kind() {
            match kind {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::Const
                | TokenKind::Var
                | TokenKind::Procedure
                | TokenKind::Period => return,
                kind if kind.starts_statement() && kind != TokenKind::Ident => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // Skips to the next token that can end a statement. Never consumes it.
    fn skip_statement(&mut self) {
        while let Some(kind) = self.peek_kind() {
            match kind {
                TokenKind::Semicolon
                | TokenKind::End
                | TokenKind::Fi
                | TokenKind::Else
                | TokenKind::Period => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

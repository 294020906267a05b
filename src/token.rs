use std::fmt;

/// 1-based location of the first character of a lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Mod,
    Ident,
    Number,
    Plus,
    Minus,
    Times,
    Slash,
    Fi,
    Eq,
    NotEq,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    Period,
    Becomes,
    Begin,
    End,
    If,
    Then,
    While,
    Do,
    Call,
    Const,
    Var,
    Procedure,
    Write,
    Read,
    Else,
}

impl TokenKind {
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "mod" => TokenKind::Mod,
            "const" => TokenKind::Const,
            "var" => TokenKind::Var,
            "procedure" => TokenKind::Procedure,
            "call" => TokenKind::Call,
            "begin" => TokenKind::Begin,
            "end" => TokenKind::End,
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "else" => TokenKind::Else,
            "fi" => TokenKind::Fi,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "read" => TokenKind::Read,
            "write" => TokenKind::Write,
            _ => return None,
        };

        Some(kind)
    }

    pub fn starts_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::Call
                | TokenKind::Begin
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Read
                | TokenKind::Write
        )
    }

    fn spelling(self) -> &'static str {
        match self {
            TokenKind::Mod => "mod",
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Times => "*",
            TokenKind::Slash => "/",
            TokenKind::Fi => "fi",
            TokenKind::Eq => "=",
            TokenKind::NotEq => "<>",
            TokenKind::Less => "<",
            TokenKind::LessOrEqual => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterOrEqual => ">=",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Period => ".",
            TokenKind::Becomes => ":=",
            TokenKind::Begin => "begin",
            TokenKind::End => "end",
            TokenKind::If => "if",
            TokenKind::Then => "then",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::Call => "call",
            TokenKind::Const => "const",
            TokenKind::Var => "var",
            TokenKind::Procedure => "procedure",
            TokenKind::Write => "write",
            TokenKind::Read => "read",
            TokenKind::Else => "else",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spelling())
    }
}

/// A lexeme; `text` is only filled for identifiers and numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Ident | TokenKind::Number => write!(f, "{}", self.text),
            kind => write!(f, "{}", kind),
        }
    }
}

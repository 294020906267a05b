use std::fmt;

use log::trace;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_until};
use nom::character::complete::anychar;
use nom::combinator::{map_opt, value};
use nom::sequence::delimited;
use thiserror::Error;

use crate::config::{MAX_IDENT_LENGTH, MAX_NUMBER_LENGTH};
use crate::token::{Position, Token, TokenKind};
use crate::types::parse::{digits, word, Input, Parsed};
use crate::types::Var;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("invalid symbol '{0}'")]
    InvalidSymbol(char),

    #[error("unterminated comment")]
    UnterminatedComment,

    #[error("identifier too long: '{0}'")]
    IdentifierTooLong(Var),

    #[error("number too long: '{0}'")]
    NumberTooLong(String),

    #[error("decimal numbers not allowed")]
    DecimalNumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: Position,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.kind)
    }
}

impl std::error::Error for LexError {}

/// Splits `source` into tokens.
///
/// A first pass only validates the text and collects every lexical error.
/// Tokens are materialized by a second pass, and only when the first one
/// came back clean.
pub fn tokenize(source: &str) -> Result<Vec<Token>, Vec<LexError>> {
    let errors = validate(source);
    if !errors.is_empty() {
        trace!("Lexing failed with {} error(s)", errors.len());
        return Err(errors);
    }

    let tokens = materialize(source);
    trace!("Lexed {} token(s)", tokens.len());
    Ok(tokens)
}

fn validate(source: &str) -> Vec<LexError> {
    Scanner::new(source)
        .filter_map(|(position, lexeme)| lexeme.err().map(|kind| LexError { kind, position }))
        .collect()
}

fn materialize(source: &str) -> Vec<Token> {
    Scanner::new(source)
        .filter_map(|(position, lexeme)| lexeme.ok().map(|lexeme| lexeme.into_token(position)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lexeme<'a> {
    Word(&'a str),
    Number(&'a str),
    Symbol(TokenKind),
}

impl Lexeme<'_> {
    fn into_token(self, position: Position) -> Token {
        match self {
            Lexeme::Word(word) => match TokenKind::keyword(word) {
                Some(keyword) => Token::new(keyword, "", position),
                None => Token::new(TokenKind::Ident, word, position),
            },
            Lexeme::Number(digits) => Token::new(TokenKind::Number, digits, position),
            Lexeme::Symbol(kind) => Token::new(kind, "", position),
        }
    }
}

// Raw scanner shared by both passes. Whitespace and comments never surface.
struct Scanner<'a> {
    source: &'a str,
    rest: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(at, _)| at + 1))
            .collect();

        Scanner {
            source,
            rest: source,
            line_starts,
        }
    }

    fn location(&self) -> Position {
        let offset = self.source.len() - self.rest.len();
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line - 1];
        let column = self.source[line_start..offset].chars().count() + 1;
        Position::new(line, column)
    }

    fn lexeme(&mut self, first: char) -> Result<Lexeme<'a>, LexErrorKind> {
        if let Ok((rest, word)) = word(self.rest) {
            self.rest = rest;
            if word.len() > MAX_IDENT_LENGTH {
                return Err(LexErrorKind::IdentifierTooLong(word.into()));
            }
            return Ok(Lexeme::Word(word));
        }

        if let Ok((rest, number)) = digits(self.rest) {
            if rest.starts_with('.') {
                // the rest of the malformed literal is discarded
                self.rest = rest.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.');
                return Err(LexErrorKind::DecimalNumber);
            }

            self.rest = rest;
            if number.len() > MAX_NUMBER_LENGTH {
                return Err(LexErrorKind::NumberTooLong(number.into()));
            }
            return Ok(Lexeme::Number(number));
        }

        match symbol(self.rest) {
            Ok((rest, kind)) => {
                self.rest = rest;
                Ok(Lexeme::Symbol(kind))
            }
            Err(_) => {
                self.rest = &self.rest[first.len_utf8()..];
                Err(LexErrorKind::InvalidSymbol(first))
            }
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = (Position, Result<Lexeme<'a>, LexErrorKind>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.rest = self.rest.trim_start();
            let first = self.rest.chars().next()?;
            let position = self.location();

            if self.rest.starts_with("/*") {
                match comment(self.rest) {
                    Ok((rest, _)) => {
                        self.rest = rest;
                        continue;
                    }
                    Err(_) => {
                        self.rest = "";
                        return Some((position, Err(LexErrorKind::UnterminatedComment)));
                    }
                }
            }

            return Some((position, self.lexeme(first)));
        }
    }
}

fn comment(input: Input) -> Parsed<Input> {
    delimited(tag("/*"), take_until("*/"), tag("*/"))(input)
}

fn symbol(input: Input) -> Parsed<TokenKind> {
    alt((
        value(TokenKind::LessOrEqual, tag("<=")),
        value(TokenKind::NotEq, tag("<>")),
        value(TokenKind::GreaterOrEqual, tag(">=")),
        value(TokenKind::Becomes, tag(":=")),
        map_opt(anychar, single_symbol),
    ))(input)
}

fn single_symbol(c: char) -> Option<TokenKind> {
    let kind = match c {
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Times,
        '/' => TokenKind::Slash,
        '(' => TokenKind::LeftParen,
        ')' => TokenKind::RightParen,
        '=' => TokenKind::Eq,
        ',' => TokenKind::Comma,
        '.' => TokenKind::Period,
        '<' => TokenKind::Less,
        '>' => TokenKind::Greater,
        ';' => TokenKind::Semicolon,
        _ => return None,
    };

    Some(kind)
}

//! Text form of a compiled program: one `op L M` line per instruction.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use log::warn;
use nom::character::complete::{digit1, space0, space1};
use nom::combinator::{all_consuming, map_res, opt, recognize};
use nom::sequence::{pair, preceded, terminated, tuple};
use thiserror::Error;

use crate::sm::Word;
use crate::types::parse::{Input, Parsed};
use crate::types::Int;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("cannot write {path}: {source}")]
    Write { path: String, source: io::Error },
}

fn integer(input: Input) -> Parsed<Int> {
    map_res(
        recognize(pair(opt(nom::character::complete::char('-')), digit1)),
        |s: &str| s.parse::<Int>(),
    )(input)
}

fn word(input: Input) -> Parsed<Word> {
    let (input, (op, level, modifier)) = all_consuming(terminated(
        tuple((
            preceded(space0, integer),
            preceded(space1, integer),
            preceded(space1, integer),
        )),
        space0,
    ))(input)?;

    Ok((input, [op, level, modifier]))
}

/// Parses words up to the first line that is not three integers.
pub fn parse(text: &str) -> Vec<Word> {
    let mut words = Vec::new();

    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match word(line) {
            Ok((_, w)) => words.push(w),
            Err(_) => {
                warn!("Stopped loading at line {}: {:?}", number + 1, line);
                break;
            }
        }
    }

    words
}

pub fn render(words: &[Word]) -> String {
    let mut text = String::new();
    for [op, level, modifier] in words {
        // writing into a String cannot fail
        let _ = writeln!(text, "{} {} {}", op, level, modifier);
    }
    text
}

pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<Word>, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse(&text))
}

pub fn write_file<P: AsRef<Path>>(path: P, words: &[Word]) -> Result<(), LoadError> {
    let path = path.as_ref();
    fs::write(path, render(words)).map_err(|source| LoadError::Write {
        path: path.display().to_string(),
        source,
    })
}

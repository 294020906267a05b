pub type Int = i64;
pub type Var = String;

// Lexical level of a block; 0 is the program's outermost block
pub type Level = usize;

pub mod parse {
    use nom::bytes::complete::{take_while, take_while1};
    use nom::combinator::recognize;
    use nom::sequence::pair;
    use nom::IResult;

    pub type Input<'a> = &'a str;
    pub type Parsed<'a, O> = IResult<Input<'a>, O>;

    // letter { letter | digit }
    pub fn word(input: Input) -> Parsed<Input> {
        recognize(pair(
            take_while1(|c: char| c.is_ascii_alphabetic()),
            take_while(|c: char| c.is_ascii_alphanumeric()),
        ))(input)
    }

    pub fn digits(input: Input) -> Parsed<Input> {
        take_while1(|c: char| c.is_ascii_digit())(input)
    }
}

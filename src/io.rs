use std::io::{self, Stdout, Write};

use rustyline::{Editor, Helper};

use crate::types::Int;

pub const READ_PROMPT: &str = "Please Enter an Integer: ";

/// Source of integers for `SYS 1`.
pub trait InputStream {
    fn read(&mut self) -> Option<Int>;
}

/// Sink for values printed by `SYS 2`.
pub trait OutputStream {
    fn write(&mut self, value: Int) -> io::Result<()>;
}

impl<T: InputStream + ?Sized> InputStream for &mut T {
    fn read(&mut self) -> Option<Int> {
        (**self).read()
    }
}

impl<T: OutputStream + ?Sized> OutputStream for &mut T {
    fn write(&mut self, value: Int) -> io::Result<()> {
        (**self).write(value)
    }
}

// IO streams implementations
impl<H: Helper> InputStream for Editor<H> {
    fn read(&mut self) -> Option<Int> {
        let line = self.readline(READ_PROMPT).ok()?;
        line.trim().parse::<Int>().ok()
    }
}

impl OutputStream for Stdout {
    fn write(&mut self, value: Int) -> io::Result<()> {
        writeln!(self, "Output result is: {}", value)
    }
}

/// Values are consumed from the back.
impl InputStream for Vec<Int> {
    fn read(&mut self) -> Option<Int> {
        self.pop()
    }
}

impl OutputStream for Vec<Int> {
    fn write(&mut self, value: Int) -> io::Result<()> {
        self.push(value);
        Ok(())
    }
}

pub struct EmptyInput;
impl InputStream for EmptyInput {
    fn read(&mut self) -> Option<Int> {
        None
    }
}

pub struct IgnoreOutput;
impl OutputStream for IgnoreOutput {
    fn write(&mut self, _: Int) -> io::Result<()> {
        Ok(())
    }
}

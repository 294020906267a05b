mod machine;
mod program;

use crate::config::MachineConfig;
use crate::io::{InputStream, OutputStream};

pub use self::machine::{Registers, RuntimeError, StackMachine, Trace};
pub use self::program::{Address, DecodeError, Instruction, Opcode, Program, SysCall, Word};

/// Cells at the start of every activation record: static link, dynamic
/// link and return address. The first local lives right after them.
pub const FRAME_HEADER: usize = 3;

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
    StackMachine::new(code, config, input, output)?.run()
}

use clap::error::{Error, ErrorKind};

pub const MAX_IDENT_LENGTH: usize = 11;
pub const MAX_NUMBER_LENGTH: usize = 5;
pub const MAX_CODE_LENGTH: usize = 500;
/// Deepest nesting of parentheses, statements or procedures the compiler accepts.
pub const MAX_NESTING: usize = 128;

pub const DEFAULT_MEMORY_SIZE: usize = 500;
pub const DEFAULT_CODE_OFFSET: usize = 10;

/// Layout of the stack machine's flat memory.
///
/// Code is loaded at `code_offset` (cells below it stay unused) and the
/// stack grows down from `memory_size - 1` towards the end of the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    pub memory_size: usize,
    pub code_offset: usize,
}

impl MachineConfig {
    pub fn with_memory_size(memory_size: usize) -> Self {
        MachineConfig {
            memory_size,
            ..Self::default()
        }
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            memory_size: DEFAULT_MEMORY_SIZE,
            code_offset: DEFAULT_CODE_OFFSET,
        }
    }
}

/// Exit status for a command line clap rejected: 0 when help or the
/// version was asked for, 1 for real usage errors.
pub fn usage_exit_code(error: &Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

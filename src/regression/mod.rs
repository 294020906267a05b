mod bad_programs;
pub(crate) mod generate;
mod programs;
mod properties;

use crate::config::MachineConfig;
use crate::sm::RuntimeError;
use crate::types::Int;

/// Compiles `program`, runs it on `stdin` and checks it printed `stdout`
/// after consuming exactly `reads` inputs.
pub fn run(program: &str, stdin: &[Int], stdout: &[Int], reads: usize) {
    let output = execute(program, stdin, reads).unwrap();
    assert_eq!(output, stdout);
}

/// Like `run`, for programs expected to fail at runtime.
pub fn run_err(program: &str, stdin: &[Int]) -> (RuntimeError, Vec<Int>) {
    let compilation = crate::compile(program).unwrap();
    let mut inputs = stdin.iter().rev().cloned().collect::<Vec<Int>>();
    let mut outputs = Vec::new();

    let code = compilation.program.encode();
    let err = crate::run(&code, MachineConfig::default(), &mut inputs, &mut outputs).unwrap_err();
    (err, outputs)
}

fn execute(program: &str, stdin: &[Int], reads: usize) -> Result<Vec<Int>, RuntimeError> {
    let compilation = match crate::compile(program) {
        Ok(compilation) => compilation,
        Err(e) => panic!("{}", e),
    };
    let mut inputs = stdin.iter().rev().cloned().collect::<Vec<Int>>();
    let mut outputs = Vec::new();

    let code = compilation.program.encode();
    crate::run(&code, MachineConfig::default(), &mut inputs, &mut outputs)?;
    assert_eq!(stdin.len() - inputs.len(), reads);
    Ok(outputs)
}

use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use rustyline::Editor;

use pl0::bytecode;
use pl0::config::usage_exit_code;
use pl0::sm::StackMachine;
use pl0::MachineConfig;

/// Runs PM/0 bytecode, tracing every instruction.
#[derive(Parser)]
#[command(name = "pm0", version)]
struct Cli {
    /// Bytecode file, one `op L M` line per instruction
    bytecode: PathBuf,

    /// Do not print the execution trace
    #[arg(short, long)]
    quiet: bool,

    /// Number of memory cells, code included
    #[arg(long, default_value_t = pl0::config::DEFAULT_MEMORY_SIZE)]
    memory_size: usize,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(usage_exit_code(&e));
        }
    };

    let code = match bytecode::read_file(&cli.bytecode) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let mut input = Editor::<()>::new();
    let mut output = io::stdout();
    let config = MachineConfig::with_memory_size(cli.memory_size);

    let result = StackMachine::new(&code, config, &mut input, &mut output).and_then(|mut machine| {
        if cli.quiet {
            return machine.run();
        }

        let start = machine.registers();
        println!("\t\t PC\tBP\tSP\tstack");
        println!("Initial Values:\t {}\t{}\t{}", start.pc, start.base, start.top);
        machine.run_traced(|row| println!("{}", row))
    });

    if let Err(e) = result {
        eprintln!("Runtime error: {}", e);
        process::exit(1);
    }
}

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use pl0::bytecode;
use pl0::config::usage_exit_code;
use pl0::listing::{CodeListing, SymbolListing};

/// Compiles a PL/0 program into PM/0 bytecode.
#[derive(Parser)]
#[command(name = "pl0c", version)]
struct Cli {
    /// PL/0 source file
    source: PathBuf,

    /// Where to write the bytecode
    #[arg(short, long, default_value = "elf.txt")]
    output: PathBuf,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(usage_exit_code(&e));
        }
    };

    let source = match fs::read_to_string(&cli.source) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Cannot open {}: {}", cli.source.display(), e);
            process::exit(1);
        }
    };

    let compilation = match pl0::compile(&source) {
        Ok(compilation) => compilation,
        Err(e) => {
            println!("{}", e);
            eprintln!("{} error(s), no code generated", e.count());
            process::exit(1);
        }
    };

    println!("{}", CodeListing(&compilation.program));
    println!("{}", SymbolListing(&compilation.symbols));

    if let Err(e) = bytecode::write_file(&cli.output, &compilation.program.encode()) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

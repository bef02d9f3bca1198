use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::error::ErrorKind;
use clap::Parser;

use expr_vm::{InterpretError, Vm};

// sysexits.h codes
const EX_USAGE: i32 = 64;
const EX_DATAERR: i32 = 65;
const EX_SOFTWARE: i32 = 70;
const EX_IOERR: i32 = 74;

#[derive(Parser)]
#[command(name = "expr-vm", version, about = "Evaluate expressions on a bytecode VM")]
struct Cli {
    /// Script to evaluate; starts the REPL when omitted
    path: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(_) => {
            eprintln!("Usage: expr-vm [path]");
            process::exit(EX_USAGE);
        }
    };

    match cli.path {
        Some(path) => run_file(&path),
        None => repl(),
    }
}

fn run_file(path: &Path) {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Could not open file \"{}\": {}", path.display(), err);
            process::exit(EX_IOERR);
        }
    };

    let mut vm = Vm::new(io::stdout());
    if let Err(err) = vm.interpret(&source) {
        eprintln!("{}", err);
        process::exit(exit_code(&err));
    }
}

fn repl() {
    let stdin = io::stdin();
    let mut vm = Vm::new(io::stdout());
    let mut line = String::new();

    loop {
        print!("> ");
        if let Err(err) = io::stdout().flush() {
            eprintln!("Could not flush prompt: {}", err);
        }

        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) => {
                // EOF ends the session
                println!();
                break;
            }
            Ok(_) => {}
            Err(err) => {
                eprintln!("Could not read input: {}", err);
                break;
            }
        }

        if let Err(err) = vm.interpret(&line) {
            eprintln!("{}", err);
        }
    }
}

fn exit_code(err: &InterpretError) -> i32 {
    match err {
        InterpretError::Compile(_) => EX_DATAERR,
        InterpretError::Runtime(_) => EX_SOFTWARE,
        InterpretError::Io(_) => EX_IOERR,
    }
}

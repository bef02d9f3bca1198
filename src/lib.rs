mod chunk;
mod compiler;
mod debug;
mod error;
mod scanner;
mod value;
mod vm;

use std::io::Write;

pub use error::{CompileError, Diagnostic, ErrorContext, InterpretError, RuntimeError,
    RuntimeErrorKind};
pub use vm::Vm;

pub type InterpretResult = Result<(), InterpretError>;

/// Compiles and runs one expression, writing its value to `out`.
pub fn interpret<W: Write>(source: &str, out: &mut W) -> InterpretResult {
    Vm::new(out).interpret(source)
}

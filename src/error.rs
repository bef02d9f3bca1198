use std::fmt;
use std::io;

/// Where a compile diagnostic points within the source.
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorContext {
    /// Error at end of input.
    Eof,
    /// Error at a concrete token; carries its lexeme.
    Lexeme(String),
    /// Error raised by the scanner; there is no lexeme to show.
    Scan,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub line: u32,
    pub context: ErrorContext,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("[line {}] Error", self.line))?;
        match &self.context {
            ErrorContext::Eof => f.write_str(" at end")?,
            ErrorContext::Lexeme(lexeme) => f.write_fmt(format_args!(" at '{}'", lexeme))?,
            ErrorContext::Scan => {}
        }
        f.write_fmt(format_args!(": {}", self.message))
    }
}

/// One or more diagnostics produced while compiling; rendering joins them
/// one per line.
#[derive(Debug, thiserror::Error)]
#[error("{}", format_diagnostics(.0))]
pub struct CompileError(Vec<Diagnostic>);

impl CompileError {
    pub(crate) fn new(diagnostics: Vec<Diagnostic>) -> Self {
        CompileError(diagnostics)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.0
    }
}

fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<String>>()
        .join("\n")
}

#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum RuntimeErrorKind {
    #[error("Operand must be a number.")]
    OperandNotNumber,
    #[error("Operands must be numbers.")]
    OperandsNotNumbers,
    #[error("Stack overflow.")]
    StackOverflow,
    // these indicate a malformed chunk, not a user fault
    #[error("illegal pop on empty stack")]
    EmptyStackPop,
    #[error("invalid op code")]
    InvalidOpCode,
}

#[derive(Debug, thiserror::Error)]
#[error("{kind}\n[line {line}] in script")]
pub struct RuntimeError {
    line: u32,
    kind: RuntimeErrorKind,
}

impl RuntimeError {
    pub(crate) fn new(line: u32, kind: RuntimeErrorKind) -> Self {
        RuntimeError { line, kind }
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn kind(&self) -> RuntimeErrorKind {
        self.kind
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InterpretError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("could not write result: {0}")]
    Io(#[from] io::Error),
}

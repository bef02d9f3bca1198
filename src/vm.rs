use std::io::Write;

use crate::chunk::{Chunk, Instruction};
use crate::compiler;
use crate::debug;
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::value::Value;
use crate::InterpretResult;

const STACK_MAX: usize = 256;

/// Stack machine over a compiled chunk. One instance serves a whole session;
/// the stack is reset at the start of every `interpret` call.
pub struct Vm<W> {
    out: W,
    stack: Vec<Value>,
}

impl<W: Write> Vm<W> {
    pub fn new(out: W) -> Self {
        Vm {
            out,
            stack: Vec::with_capacity(STACK_MAX),
        }
    }

    /// Compiles and runs a single expression, writing its value to the
    /// output sink.
    pub fn interpret(&mut self, source: &str) -> InterpretResult {
        log::trace!("interpreting source: {:?}", source);
        let chunk = compiler::compile(source)?;
        self.stack.clear();
        let result = self.run(&chunk)?;
        writeln!(self.out, "{}", result)?;
        Ok(())
    }

    fn run(&mut self, chunk: &Chunk) -> Result<Value, RuntimeError> {
        let mut ip = 0;
        loop {
            if log::log_enabled!(log::Level::Trace) {
                log::trace!("          {}", self.stack_contents());
                log::trace!("{}", debug::disassemble_instruction(chunk, ip));
            }

            let (size, instr) = chunk.read_instruction(ip);
            match self.execute(chunk, instr) {
                Ok(None) => ip += size,
                Ok(Some(result)) => return Ok(result),
                Err(kind) => {
                    // the faulting instruction is the one at ip
                    let line = chunk.line(ip);
                    self.stack.clear();
                    return Err(RuntimeError::new(line, kind));
                }
            }
        }
    }

    // Runs one instruction; `Some` carries the final value out of OpReturn.
    fn execute(
        &mut self,
        chunk: &Chunk,
        instr: Instruction,
    ) -> Result<Option<Value>, RuntimeErrorKind> {
        match instr {
            Instruction::OpConstant(index) => {
                let val = chunk.get_constant(index);
                self.push(val)?;
            }
            Instruction::OpNil => self.push(Value::Nil)?,
            Instruction::OpTrue => self.push(Value::Boolean(true))?,
            Instruction::OpFalse => self.push(Value::Boolean(false))?,

            Instruction::OpEqual => {
                let rhs = self.pop()?;
                let lhs = self.pop()?;
                self.push(Value::Boolean(lhs == rhs))?;
            }
            Instruction::OpGreater => {
                let (lhs, rhs) = self.number_operands()?;
                self.push(Value::Boolean(lhs > rhs))?;
            }
            Instruction::OpLess => {
                let (lhs, rhs) = self.number_operands()?;
                self.push(Value::Boolean(lhs < rhs))?;
            }

            Instruction::OpAdd => {
                let (lhs, rhs) = self.number_operands()?;
                self.push(Value::Number(lhs + rhs))?;
            }
            Instruction::OpSubtract => {
                let (lhs, rhs) = self.number_operands()?;
                self.push(Value::Number(lhs - rhs))?;
            }
            Instruction::OpMultiply => {
                let (lhs, rhs) = self.number_operands()?;
                self.push(Value::Number(lhs * rhs))?;
            }
            Instruction::OpDivide => {
                let (lhs, rhs) = self.number_operands()?;
                self.push(Value::Number(lhs / rhs))?;
            }

            Instruction::OpNot => {
                let val = self.pop()?;
                self.push(Value::Boolean(val.is_falsey()))?;
            }
            Instruction::OpNegate => match self.peek()? {
                Value::Number(val) => {
                    self.pop()?;
                    self.push(Value::Number(-val))?;
                }
                _ => return Err(RuntimeErrorKind::OperandNotNumber),
            },

            Instruction::OpReturn => return Ok(Some(self.pop()?)),
            Instruction::OpInvalid => return Err(RuntimeErrorKind::InvalidOpCode),
        }
        Ok(None)
    }

    // type-checks the top two slots before consuming either
    fn number_operands(&mut self) -> Result<(f64, f64), RuntimeErrorKind> {
        match (self.peek_nth(1)?, self.peek_nth(0)?) {
            (Value::Number(lhs), Value::Number(rhs)) => {
                self.pop()?;
                self.pop()?;
                Ok((lhs, rhs))
            }
            _ => Err(RuntimeErrorKind::OperandsNotNumbers),
        }
    }

    // === stack APIs ===
    fn push(&mut self, val: Value) -> Result<(), RuntimeErrorKind> {
        if self.stack.len() == STACK_MAX {
            return Err(RuntimeErrorKind::StackOverflow);
        }
        self.stack.push(val);
        Ok(())
    }

    fn pop(&mut self) -> Result<Value, RuntimeErrorKind> {
        self.stack.pop().ok_or(RuntimeErrorKind::EmptyStackPop)
    }

    fn peek(&self) -> Result<Value, RuntimeErrorKind> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, offset: usize) -> Result<Value, RuntimeErrorKind> {
        self.stack
            .iter()
            .rev()
            .nth(offset)
            .copied()
            .ok_or(RuntimeErrorKind::EmptyStackPop)
    }

    fn stack_contents(&self) -> String {
        self.stack
            .iter()
            .map(|val| format!("[ {} ]", val))
            .collect()
    }
}

use crate::chunk::{Chunk, Instruction, InstructionIter};

/// Renders one disassembly line per instruction: byte offset, source line
/// (`|` when unchanged from the previous instruction), opcode, operands.
pub struct Disassembler<'a> {
    chunk: &'a Chunk,
    iter: InstructionIter<'a>,
    prev_line: Option<u32>,
}

impl<'a> Disassembler<'a> {
    pub fn new(chunk: &'a Chunk) -> Self {
        Disassembler {
            chunk,
            iter: chunk.instructions(),
            prev_line: None,
        }
    }

    fn line_column(&mut self, offset: usize) -> String {
        let line = self.chunk.line(offset);
        let column = if self.prev_line == Some(line) {
            format!("{:>4} ", "|")
        } else {
            format!("{:04} ", line)
        };
        self.prev_line = Some(line);
        column
    }
}

impl<'a> Iterator for Disassembler<'a> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let (offset, instr) = self.iter.next()?;
        let mut result = format!("{:04} {}", offset, self.line_column(offset));
        result.push_str(&render(self.chunk, instr));
        Some(result)
    }
}

fn render(chunk: &Chunk, instr: Instruction) -> String {
    match instr {
        Instruction::OpConstant(index) => {
            let constant = match chunk.get_constant_checked(index) {
                Some(val) => format!("'{}'", val),
                None => "<out-of-bound>".to_string(),
            };
            format!("OP_CONSTANT {:>16} {}", format!("{:04}", index), constant)
        }
        Instruction::OpNil => "OP_NIL".to_string(),
        Instruction::OpTrue => "OP_TRUE".to_string(),
        Instruction::OpFalse => "OP_FALSE".to_string(),
        Instruction::OpEqual => "OP_EQUAL".to_string(),
        Instruction::OpGreater => "OP_GREATER".to_string(),
        Instruction::OpLess => "OP_LESS".to_string(),
        Instruction::OpAdd => "OP_ADD".to_string(),
        Instruction::OpSubtract => "OP_SUBTRACT".to_string(),
        Instruction::OpMultiply => "OP_MULTIPLY".to_string(),
        Instruction::OpDivide => "OP_DIVIDE".to_string(),
        Instruction::OpNot => "OP_NOT".to_string(),
        Instruction::OpNegate => "OP_NEGATE".to_string(),
        Instruction::OpReturn => "OP_RETURN".to_string(),
        Instruction::OpInvalid => "OP_INVALID".to_string(),
    }
}

/// Dumps a whole chunk to the log at debug level.
pub fn disassemble_chunk(chunk: &Chunk, name: &str) {
    log::debug!("== {} ==", name);
    for line in Disassembler::new(chunk) {
        log::debug!("{}", line);
    }
}

/// Renders the single instruction at a byte offset, for execution tracing.
pub fn disassemble_instruction(chunk: &Chunk, offset: usize) -> String {
    if offset >= chunk.code_len() {
        return format!("{:04} <end-of-code>", offset);
    }
    let (_, instr) = chunk.read_instruction(offset);
    format!(
        "{:04} {:04} {}",
        offset,
        chunk.line(offset),
        render(chunk, instr)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn formats_offsets_lines_and_operands() {
        let mut chunk = Chunk::new();
        let index = chunk.push_constant(Value::Number(1.2)) as u8;
        chunk.push_instruction(Instruction::OpConstant(index), 1);
        chunk.push_instruction(Instruction::OpNegate, 1);
        chunk.push_instruction(Instruction::OpReturn, 2);

        let listing: Vec<_> = Disassembler::new(&chunk).collect();
        assert_eq!(
            vec![
                "0000 0001 OP_CONSTANT             0000 '1.2'",
                "0002    | OP_NEGATE",
                "0003 0002 OP_RETURN",
            ],
            listing
        );
    }

    #[test]
    fn out_of_bound_constant() {
        let mut chunk = Chunk::new();
        chunk.push_instruction(Instruction::OpConstant(9), 1);
        let listing: Vec<_> = Disassembler::new(&chunk).collect();
        assert_eq!(
            vec!["0000 0001 OP_CONSTANT             0009 <out-of-bound>"],
            listing
        );
    }
}

use crate::chunk::{Chunk, Instruction};
use crate::debug;
use crate::error::{CompileError, Diagnostic, ErrorContext};
use crate::scanner::{ScanError, Scanner, Token, TokenKind};
use crate::value::Value;

/// Single pass over the token stream, emitting bytecode as it parses. The
/// accepted grammar is one expression followed by end of input.
pub fn compile(source: &str) -> Result<Chunk, CompileError> {
    let mut parser = Parser::new(Scanner::new(source));
    parser.expression();
    parser.expect_end();
    parser.finish()
}

#[derive(Clone, Copy)]
enum Precedence {
    None,
    Assignment,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Unary,
    Call,
    Primary,
}

type Parselet<'a> = fn(&mut Parser<'a>, Token<'a>);

struct Parser<'a> {
    scanner: std::iter::Peekable<Scanner<'a>>,
    chunk: Chunk,
    diagnostics: Vec<Diagnostic>,
    panic_mode: bool,
    curr_line: u32,
}

impl<'a> Parser<'a> {
    fn new(scanner: Scanner<'a>) -> Self {
        Parser {
            scanner: scanner.peekable(),
            chunk: Chunk::new(),
            diagnostics: Vec::new(),
            panic_mode: false,
            curr_line: 1,
        }
    }

    fn finish(mut self) -> Result<Chunk, CompileError> {
        self.emit_instruction(Instruction::OpReturn, self.curr_line);
        if !self.diagnostics.is_empty() {
            return Err(CompileError::new(self.diagnostics));
        }
        if log::log_enabled!(log::Level::Debug) {
            debug::disassemble_chunk(&self.chunk, "code");
        }
        Ok(self.chunk)
    }

    // === code emitters ===
    fn emit_instruction(&mut self, instr: Instruction, line: u32) {
        self.chunk.push_instruction(instr, line);
    }

    fn make_constant(&mut self, value: Value, tok: &Token<'a>) -> u8 {
        let index = self.chunk.push_constant(value);
        if index > u8::MAX as usize {
            self.error_at(tok, "Too many constants in one chunk.");
            return 0;
        }
        index as u8
    }

    // === parsing methods ===
    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment as i32);
    }

    fn parse_precedence(&mut self, prec: i32) {
        let Some(tok) = self.advance() else {
            self.error_at_end("Expect expression.");
            return;
        };
        let Some(prefix) = Self::prefix_rule(tok.kind) else {
            self.error_at(&tok, "Expect expression.");
            return;
        };
        prefix(self, tok);

        while let Some(next) = self.peek() {
            if prec > Self::infix_prec(next.kind) as i32 {
                break;
            }
            let Some(infix) = Self::infix_rule(next.kind) else {
                break;
            };
            self.advance();
            infix(self, next);
        }
    }

    fn number(&mut self, tok: Token<'a>) {
        let value = tok.lexeme.parse::<f64>().unwrap();
        let index = self.make_constant(Value::Number(value), &tok);
        self.emit_instruction(Instruction::OpConstant(index), tok.line);
    }

    fn literal(&mut self, tok: Token<'a>) {
        match tok.kind {
            TokenKind::True => self.emit_instruction(Instruction::OpTrue, tok.line),
            TokenKind::False => self.emit_instruction(Instruction::OpFalse, tok.line),
            TokenKind::Nil => self.emit_instruction(Instruction::OpNil, tok.line),
            _ => {} // dispatch only routes the three literals here
        }
    }

    fn grouping(&mut self, _: Token<'a>) {
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after expression.");
    }

    fn unary(&mut self, tok: Token<'a>) {
        // operand first, operator applies to its result
        self.parse_precedence(Precedence::Unary as i32);
        match tok.kind {
            TokenKind::Minus => self.emit_instruction(Instruction::OpNegate, tok.line),
            TokenKind::Bang => self.emit_instruction(Instruction::OpNot, tok.line),
            _ => {}
        }
    }

    fn binary(&mut self, tok: Token<'a>) {
        // one level higher keeps same-precedence chains left-associative
        let my_prec = Self::infix_prec(tok.kind);
        self.parse_precedence(my_prec as i32 + 1);

        match tok.kind {
            TokenKind::Plus => self.emit_instruction(Instruction::OpAdd, tok.line),
            TokenKind::Minus => self.emit_instruction(Instruction::OpSubtract, tok.line),
            TokenKind::Star => self.emit_instruction(Instruction::OpMultiply, tok.line),
            TokenKind::Slash => self.emit_instruction(Instruction::OpDivide, tok.line),
            TokenKind::EqualEqual => self.emit_instruction(Instruction::OpEqual, tok.line),
            TokenKind::BangEqual => {
                self.emit_instruction(Instruction::OpEqual, tok.line);
                self.emit_instruction(Instruction::OpNot, tok.line);
            }
            TokenKind::Greater => self.emit_instruction(Instruction::OpGreater, tok.line),
            TokenKind::GreaterEqual => {
                self.emit_instruction(Instruction::OpLess, tok.line);
                self.emit_instruction(Instruction::OpNot, tok.line);
            }
            TokenKind::Less => self.emit_instruction(Instruction::OpLess, tok.line),
            TokenKind::LessEqual => {
                self.emit_instruction(Instruction::OpGreater, tok.line);
                self.emit_instruction(Instruction::OpNot, tok.line);
            }
            _ => {}
        }
    }

    fn prefix_rule(kind: TokenKind) -> Option<Parselet<'a>> {
        match kind {
            TokenKind::LeftParen => Some(Self::grouping),
            TokenKind::Number => Some(Self::number),
            TokenKind::True => Some(Self::literal),
            TokenKind::False => Some(Self::literal),
            TokenKind::Nil => Some(Self::literal),
            TokenKind::Minus => Some(Self::unary),
            TokenKind::Bang => Some(Self::unary),
            _ => None,
        }
    }

    fn infix_rule(kind: TokenKind) -> Option<Parselet<'a>> {
        match kind {
            TokenKind::Minus => Some(Self::binary),
            TokenKind::Plus => Some(Self::binary),
            TokenKind::Star => Some(Self::binary),
            TokenKind::Slash => Some(Self::binary),
            TokenKind::BangEqual => Some(Self::binary),
            TokenKind::EqualEqual => Some(Self::binary),
            TokenKind::Greater => Some(Self::binary),
            TokenKind::GreaterEqual => Some(Self::binary),
            TokenKind::Less => Some(Self::binary),
            TokenKind::LessEqual => Some(Self::binary),
            _ => None,
        }
    }

    fn infix_prec(kind: TokenKind) -> Precedence {
        match kind {
            TokenKind::Minus => Precedence::Term,
            TokenKind::Plus => Precedence::Term,
            TokenKind::Star => Precedence::Factor,
            TokenKind::Slash => Precedence::Factor,
            TokenKind::BangEqual => Precedence::Equality,
            TokenKind::EqualEqual => Precedence::Equality,
            TokenKind::Greater => Precedence::Comparison,
            TokenKind::GreaterEqual => Precedence::Comparison,
            TokenKind::Less => Precedence::Comparison,
            TokenKind::LessEqual => Precedence::Comparison,
            _ => Precedence::None,
        }
    }

    // === parse utils ===
    fn advance(&mut self) -> Option<Token<'a>> {
        while let Some(result) = self.scanner.next() {
            match result {
                Ok(tok) => {
                    self.curr_line = tok.line;
                    return Some(tok);
                }
                Err(err) => self.error_in_scan(err),
            }
        }
        None
    }

    fn peek(&mut self) -> Option<Token<'a>> {
        while let Some(result) = self.scanner.peek() {
            match result.clone() {
                Ok(tok) => return Some(tok),
                Err(err) => {
                    self.scanner.next();
                    self.error_in_scan(err);
                }
            }
        }
        None
    }

    fn consume(&mut self, kind: TokenKind, message: &str) {
        match self.advance() {
            Some(tok) if tok.kind == kind => {}
            Some(tok) => self.error_at(&tok, message),
            None => self.error_at_end(message),
        }
    }

    fn expect_end(&mut self) {
        if let Some(tok) = self.advance() {
            self.error_at(&tok, "Expect end of expression.");
        }
    }

    // === error reporting ===
    fn error_at(&mut self, tok: &Token<'a>, message: &str) {
        self.report(tok.line, ErrorContext::Lexeme(tok.lexeme.to_string()), message);
    }

    fn error_at_end(&mut self, message: &str) {
        self.report(self.curr_line, ErrorContext::Eof, message);
    }

    fn error_in_scan(&mut self, err: ScanError) {
        self.report(err.line, ErrorContext::Scan, &err.to_string());
    }

    fn report(&mut self, line: u32, context: ErrorContext, message: &str) {
        if self.panic_mode {
            return;
        }
        // to be reset at the next synchronization point; the expression
        // grammar has none, so only the first error per compile surfaces
        self.panic_mode = true;
        self.diagnostics.push(Diagnostic {
            line,
            context,
            message: message.to_string(),
        });
    }
}

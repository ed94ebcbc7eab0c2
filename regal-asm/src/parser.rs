//! Assembler for the regal register machine
//!
//! Parser for the assembly syntax
//!
//! Parsing runs in two passes over the lexed lines. The first pass records
//! the instruction index of every `label`, the second emits instructions
//! and resolves jump targets against that table, so labels may be used
//! before they are declared.
use std::collections::HashMap;

use super::lexer::{self, Command, Lexer, Line};
use super::{Address, Instr, InstrKind, Program};

/// Label name -> absolute instruction index
pub type LabelTable = HashMap<String, usize>;

/// What to do with lines whose command word is not part of the language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParsePolicy {
    /// Skip them silently.
    #[default]
    Lenient,
    /// Fail with [`ParseError::UnknownCommand`].
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error(
        "syntax error on line {line}: '{command}' takes {expected} operand(s), found {found}"
    )]
    Arity {
        line: usize,
        command: String,
        expected: usize,
        found: usize,
    },

    #[error("syntax error on line {line}: unknown command '{name}'")]
    UnknownCommand { line: usize, name: String },

    #[error("unresolved label '{label}' on line {line}")]
    UnresolvedLabel { line: usize, label: String },

    #[error("label '{label}' declared again on line {line}")]
    DuplicateLabel { line: usize, label: String },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::Syntax { line, .. }
            | ParseError::Arity { line, .. }
            | ParseError::UnknownCommand { line, .. }
            | ParseError::UnresolvedLabel { line, .. }
            | ParseError::DuplicateLabel { line, .. } => *line,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse program text with the default (lenient) policy.
pub fn parse(src: &str) -> ParseResult<Program> {
    Parser::new(src).parse()
}

#[derive(Debug, Clone)]
pub struct Parser<'p> {
    pub lines: Vec<Line<'p>>,
    pub policy: ParsePolicy,
}

impl<'p> Parser<'p> {
    pub fn new(src: &'p str) -> Self {
        Self {
            lines: Lexer::new(src).lines().collect(),
            policy: ParsePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ParsePolicy) -> Self {
        self.policy = policy;
        self
    }

    fn expect_arity(line: &Line<'_>, expected: usize) -> ParseResult<()> {
        if line.operands.len() != expected {
            return Err(ParseError::Arity {
                line: line.number,
                command: line.command_literal().to_string(),
                expected,
                found: line.operands.len(),
            });
        }

        Ok(())
    }

    fn unknown(&self, line: &Line<'_>, name: &str) -> ParseResult<()> {
        match self.policy {
            ParsePolicy::Lenient => Ok(()),
            ParsePolicy::Strict => Err(ParseError::UnknownCommand {
                line: line.number,
                name: name.to_string(),
            }),
        }
    }

    // Pass 1
    // --------------------------------------

    /// Walk the lines and record the instruction index of every label.
    /// Labels do not take up an instruction slot.
    pub fn scan_labels(&self) -> ParseResult<LabelTable> {
        let mut labels = LabelTable::new();
        let mut count = 0usize;

        for line in &self.lines {
            match line.command {
                Command::Label => {
                    Self::expect_arity(line, 1)?;
                    let name = line.operands[0];

                    if labels.insert(name.to_string(), count).is_some() {
                        return Err(ParseError::DuplicateLabel {
                            line: line.number,
                            label: name.to_string(),
                        });
                    }
                }
                Command::Instruction(_) => count += 1,
                Command::Unknown(name) => self.unknown(line, name)?,
            }
        }

        Ok(labels)
    }

    // Pass 2
    // --------------------------------------

    fn resolve_label(line: &Line<'_>, name: &str, labels: &LabelTable) -> ParseResult<Address> {
        match labels.get(name) {
            Some(&index) => Ok(Address::immediate(index as i64)),
            None => Err(ParseError::UnresolvedLabel {
                line: line.number,
                label: name.to_string(),
            }),
        }
    }

    fn parse_instruction(
        line: &Line<'_>,
        kind: InstrKind,
        labels: &LabelTable,
    ) -> ParseResult<Instr> {
        Self::expect_arity(line, kind.arity())?;
        let address = |idx: usize| lexer::lex_address(line.operands[idx], line.number);

        let instr = match kind {
            InstrKind::Inc => Instr::Inc(address(0)?),
            InstrKind::Dec => Instr::Dec(address(0)?),
            InstrKind::Stop => Instr::Stop,
            InstrKind::Print => Instr::Print(address(0)?),
            InstrKind::Scan => Instr::Scan(address(0)?),
            InstrKind::Jzero => Instr::Jzero(
                address(0)?,
                Self::resolve_label(line, line.operands[1], labels)?,
            ),
            InstrKind::Jnzero => Instr::Jnzero(
                address(0)?,
                Self::resolve_label(line, line.operands[1], labels)?,
            ),
        };

        Ok(instr)
    }

    /// Emit instructions in source order, resolving jump targets.
    pub fn emit(&self, labels: &LabelTable) -> ParseResult<Program> {
        let mut instructions = Vec::new();

        for line in &self.lines {
            if let Command::Instruction(kind) = line.command {
                instructions.push(Self::parse_instruction(line, kind, labels)?);
            }
        }

        Ok(Program::new(instructions))
    }

    // --------------------------------------

    pub fn parse(&self) -> ParseResult<Program> {
        let labels = self.scan_labels()?;
        self.emit(&labels)
    }
}

//! Assembler for the regal register machine
//!
//! Holds the program representation shared with the runtime: operand
//! addresses, instructions and the resolved program.

pub mod lexer;
pub mod parser;

use std::fmt;

pub use parser::{ParseError, ParsePolicy, ParseResult, Parser, parse};

/// How an operand is resolved against memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddrMode {
    Immediate, // .N
    Direct,    // @N
    Indirect,  // *N
}

impl AddrMode {
    pub fn sigil(self) -> char {
        match self {
            AddrMode::Immediate => '.',
            AddrMode::Direct => '@',
            AddrMode::Indirect => '*',
        }
    }

    pub fn from_sigil(c: char) -> Option<Self> {
        match c {
            '.' => Some(AddrMode::Immediate),
            '@' => Some(AddrMode::Direct),
            '*' => Some(AddrMode::Indirect),
            _ => None,
        }
    }
}

/// An instruction operand. The mode is fixed when the program is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    pub mode: AddrMode,
    pub value: i64,
}

impl Address {
    pub const fn immediate(value: i64) -> Self {
        Self {
            mode: AddrMode::Immediate,
            value,
        }
    }

    pub const fn direct(value: i64) -> Self {
        Self {
            mode: AddrMode::Direct,
            value,
        }
    }

    pub const fn indirect(value: i64) -> Self {
        Self {
            mode: AddrMode::Indirect,
            value,
        }
    }

    pub fn is_immediate(&self) -> bool {
        self.mode == AddrMode::Immediate
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.mode.sigil(), self.value)
    }
}

/// Instruction tag, without operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrKind {
    Inc,
    Dec,
    Stop,
    Print,
    Jzero,
    Jnzero,
    Scan,
}

impl InstrKind {
    pub const ALL: [InstrKind; 7] = [
        InstrKind::Inc,
        InstrKind::Dec,
        InstrKind::Stop,
        InstrKind::Print,
        InstrKind::Jzero,
        InstrKind::Jnzero,
        InstrKind::Scan,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            InstrKind::Inc => "inc",
            InstrKind::Dec => "dec",
            InstrKind::Stop => "stop",
            InstrKind::Print => "print",
            InstrKind::Jzero => "jzero",
            InstrKind::Jnzero => "jnzero",
            InstrKind::Scan => "scan",
        }
    }

    /// Number of operand tokens expected in source. For jumps the second
    /// token is a label name, not an address.
    pub fn arity(self) -> usize {
        match self {
            InstrKind::Stop => 0,
            InstrKind::Inc | InstrKind::Dec | InstrKind::Print | InstrKind::Scan => 1,
            InstrKind::Jzero | InstrKind::Jnzero => 2,
        }
    }

    /// Case-insensitive lookup of a command name.
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.mnemonic().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for InstrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A single machine instruction.
///
/// Jumps carry `(value, target)`, where `target` is an immediate holding the
/// absolute index of the instruction to continue at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instr {
    Inc(Address),
    Dec(Address),
    Stop,
    Print(Address),
    Jzero(Address, Address),
    Jnzero(Address, Address),
    Scan(Address),
}

impl Instr {
    pub fn kind(&self) -> InstrKind {
        match self {
            Instr::Inc(_) => InstrKind::Inc,
            Instr::Dec(_) => InstrKind::Dec,
            Instr::Stop => InstrKind::Stop,
            Instr::Print(_) => InstrKind::Print,
            Instr::Jzero(..) => InstrKind::Jzero,
            Instr::Jnzero(..) => InstrKind::Jnzero,
            Instr::Scan(_) => InstrKind::Scan,
        }
    }

    pub fn operands(&self) -> Vec<Address> {
        match *self {
            Instr::Stop => vec![],
            Instr::Inc(a) | Instr::Dec(a) | Instr::Print(a) | Instr::Scan(a) => vec![a],
            Instr::Jzero(value, target) | Instr::Jnzero(value, target) => vec![value, target],
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())?;
        for operand in self.operands() {
            write!(f, " {}", operand)?;
        }
        Ok(())
    }
}

/// A parsed program. Instruction indices are the jump targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instr>,
}

impl Program {
    pub fn new(instructions: Vec<Instr>) -> Self {
        Self { instructions }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Instr> {
        self.instructions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instr> {
        self.instructions.iter()
    }

    pub fn instructions(&self) -> &[Instr] {
        &self.instructions
    }
}

/// One instruction per line, prefixed with its index.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, instr) in self.instructions.iter().enumerate() {
            writeln!(f, "{:04}  {}", idx, instr)?;
        }
        Ok(())
    }
}

impl From<Vec<Instr>> for Program {
    fn from(instructions: Vec<Instr>) -> Self {
        Self::new(instructions)
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Instr;
    type IntoIter = std::slice::Iter<'a, Instr>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

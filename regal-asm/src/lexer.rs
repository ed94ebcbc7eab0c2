//! Assembler for the regal register machine
//!
//! Lexer for the assembly syntax. The language is line oriented: every
//! non-blank line is a command word followed by its operands.

use crate::parser::{ParseError, ParseResult};
use crate::{AddrMode, Address, InstrKind};

#[derive(Debug, Clone)]
pub struct Lexer<'l> {
    pub src: &'l str,
}

/// The command word at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'l> {
    Instruction(InstrKind), // inc, dec, stop, ...
    Label,                  // label <name>
    Unknown(&'l str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'l> {
    /// 1-based line number in the source text
    pub number: usize,
    pub command: Command<'l>,
    pub operands: Vec<&'l str>,
}

impl<'l> Line<'l> {
    /// The command as it was written, for error messages.
    pub fn command_literal(&self) -> &'l str {
        match self.command {
            Command::Instruction(kind) => kind.mnemonic(),
            Command::Label => "label",
            Command::Unknown(name) => name,
        }
    }
}

impl<'l> Lexer<'l> {
    pub fn new(src: &'l str) -> Self {
        Lexer { src }
    }

    /// Split the source into command lines, skipping blank ones.
    pub fn lines(self) -> impl Iterator<Item = Line<'l>> {
        self.src
            .lines()
            .enumerate()
            .filter_map(|(idx, raw)| lex_line(idx + 1, raw))
    }
}

fn lex_line(number: usize, raw: &str) -> Option<Line<'_>> {
    let mut words = raw.split_whitespace();
    let first = words.next()?;

    let command = if first.eq_ignore_ascii_case("label") {
        Command::Label
    } else {
        match InstrKind::from_mnemonic(first) {
            Some(kind) => Command::Instruction(kind),
            None => Command::Unknown(first),
        }
    };

    Some(Line {
        number,
        command,
        operands: words.collect(),
    })
}

/// Lex an operand token such as `.5`, `@12` or `*-3`.
pub fn lex_address(token: &str, line: usize) -> ParseResult<Address> {
    let mut chars = token.chars();
    let sigil = chars.next().ok_or_else(|| ParseError::Syntax {
        line,
        message: "empty address".to_string(),
    })?;

    let mode = AddrMode::from_sigil(sigil).ok_or_else(|| ParseError::Syntax {
        line,
        message: format!(
            "invalid address mode '{}' in '{}', expected '.', '@' or '*'",
            sigil, token
        ),
    })?;

    let digits = chars.as_str();
    let value = digits.parse::<i64>().map_err(|_| ParseError::Syntax {
        line,
        message: format!("invalid integer '{}' in address '{}'", digits, token),
    })?;

    Ok(Address { mode, value })
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_skips_blank_lines() {
        let lex = Lexer::new("\n   \ninc @0\n\t\nstop\n");
        let lines: Vec<_> = lex.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 3);
        assert_eq!(lines[1].number, 5);
        assert_eq!(lines[1].command, Command::Instruction(InstrKind::Stop));
    }

    #[test]
    fn lex_commands_case_insensitive() {
        let lex = Lexer::new("INC @0\nLaBeL foo\nJnZeRo @0 foo");
        let lines: Vec<_> = lex.lines().collect();

        assert_eq!(lines[0].command, Command::Instruction(InstrKind::Inc));
        assert_eq!(lines[1].command, Command::Label);
        assert_eq!(lines[1].operands, vec!["foo"]);
        assert_eq!(lines[2].command, Command::Instruction(InstrKind::Jnzero));
    }

    #[test]
    fn lex_collapses_whitespace_runs() {
        let lex = Lexer::new("   jzero   @1 \t  end   ");
        let line = lex.lines().next().unwrap();

        assert_eq!(line.operands, vec!["@1", "end"]);
    }

    #[test]
    fn lex_unknown_command() {
        let lex = Lexer::new("nop @1");
        let line = lex.lines().next().unwrap();

        assert_eq!(line.command, Command::Unknown("nop"));
        assert_eq!(line.command_literal(), "nop");
    }

    #[test]
    fn lex_address_modes() {
        assert_eq!(lex_address(".1", 1).unwrap(), Address::immediate(1));
        assert_eq!(lex_address("@42", 1).unwrap(), Address::direct(42));
        assert_eq!(lex_address("*-3", 1).unwrap(), Address::indirect(-3));
        assert_eq!(lex_address("@+7", 1).unwrap(), Address::direct(7));
    }

    #[test]
    fn lex_address_rejects_bad_tokens() {
        for bad in ["", "#1", "1", "@", "@x", ".1.5", "*0x10"] {
            assert!(
                matches!(lex_address(bad, 4), Err(ParseError::Syntax { line: 4, .. })),
                "{bad:?} should not lex"
            );
        }
    }
}

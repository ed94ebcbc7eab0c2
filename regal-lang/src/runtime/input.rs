//! Numeric input for the `scan` instruction.

use std::collections::VecDeque;
use std::io::{self, BufRead};

use super::{VMError, VMResult};

/// A source of input lines, read on demand.
pub trait InputSource {
    /// The next line without its terminator, or `None` at end of input.
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

impl<R: BufRead> InputSource for R {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        Ok(Some(line))
    }
}

/// Input source for programs that never scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        Ok(None)
    }
}

/// Values read from a line but not consumed yet, in front of the source.
pub struct InputQueue<I: InputSource> {
    source: I,
    pending: VecDeque<i64>,
}

impl<I: InputSource> InputQueue<I> {
    pub fn new(source: I) -> Self {
        Self {
            source,
            pending: VecDeque::new(),
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn refill(&mut self) -> VMResult<()> {
        while self.pending.is_empty() {
            let line = self.source.next_line()?.ok_or(VMError::InputExhausted)?;

            for token in line.split_whitespace() {
                let value = token.parse::<i64>().map_err(|_| VMError::InvalidInput {
                    token: token.to_string(),
                })?;
                self.pending.push_back(value);
            }
        }

        Ok(())
    }

    /// Pop the next value, pulling a new line from the source when empty.
    pub fn next_value(&mut self) -> VMResult<i64> {
        self.refill()?;
        self.pending.pop_front().ok_or(VMError::InputExhausted)
    }
}

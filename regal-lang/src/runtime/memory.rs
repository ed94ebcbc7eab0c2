//! Flat integer memory with address-mode aware access.

use regal_asm::{AddrMode, Address};

use super::{VMError, VMResult};

/// Number of cells in a fresh memory bank.
pub const MEMORY_SIZE: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<i64>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(MEMORY_SIZE)
    }
}

impl Memory {
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![0; size],
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[i64] {
        &self.cells
    }

    fn check(&self, index: i64) -> VMResult<usize> {
        usize::try_from(index)
            .ok()
            .filter(|&idx| idx < self.cells.len())
            .ok_or(VMError::MemoryFault {
                index,
                size: self.cells.len(),
            })
    }

    /// Raw read of a single cell.
    pub fn load(&self, index: i64) -> VMResult<i64> {
        let idx = self.check(index)?;
        Ok(self.cells[idx])
    }

    /// Raw write of a single cell.
    pub fn store(&mut self, index: i64, value: i64) -> VMResult<()> {
        let idx = self.check(index)?;
        self.cells[idx] = value;
        Ok(())
    }

    /// The physical cell an operand refers to. Indirection is one level deep.
    pub fn resolve_cell(&self, address: Address) -> VMResult<usize> {
        match address.mode {
            AddrMode::Immediate => Err(VMError::ImmediateCell {
                value: address.value,
            }),
            AddrMode::Direct => self.check(address.value),
            AddrMode::Indirect => {
                let pointer = self.load(address.value)?;
                self.check(pointer)
            }
        }
    }

    pub fn read(&self, address: Address) -> VMResult<i64> {
        match address.mode {
            AddrMode::Immediate => Ok(address.value),
            AddrMode::Direct | AddrMode::Indirect => {
                let idx = self.resolve_cell(address)?;
                Ok(self.cells[idx])
            }
        }
    }

    /// Writes to an immediate operand are discarded.
    pub fn write(&mut self, address: Address, value: i64) -> VMResult<()> {
        match address.mode {
            AddrMode::Immediate => Ok(()),
            AddrMode::Direct | AddrMode::Indirect => {
                let idx = self.resolve_cell(address)?;
                self.cells[idx] = value;
                Ok(())
            }
        }
    }
}

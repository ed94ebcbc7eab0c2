pub mod disasm;
pub mod input;
pub mod machine;
pub mod memory;

pub use input::{InputQueue, InputSource, NoInput};
pub use machine::{Machine, MachineConfig, MachineState, execute};
pub use memory::{MEMORY_SIZE, Memory};

/// Errors raised while a program runs.
#[derive(Debug, thiserror::Error)]
pub enum VMError {
    #[error("memory fault: cell {index} is outside memory of {size} cells")]
    MemoryFault { index: i64, size: usize },

    #[error("memory fault: immediate operand .{value} has no memory cell")]
    ImmediateCell { value: i64 },

    #[error("scan: input exhausted")]
    InputExhausted,

    #[error("scan: '{token}' is not an integer")]
    InvalidInput { token: String },

    #[error("scan: failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("instruction {ip}: jump target {target} is not an instruction index")]
    BadJumpTarget { ip: usize, target: i64 },

    #[error("step limit of {limit} exceeded")]
    StepLimitExceeded { limit: u64 },
}

impl VMError {
    pub fn is_memory_fault(&self) -> bool {
        matches!(
            self,
            VMError::MemoryFault { .. } | VMError::ImmediateCell { .. }
        )
    }
}

pub type VMResult<T> = Result<T, VMError>;

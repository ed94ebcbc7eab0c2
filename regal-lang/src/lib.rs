//! regal: a minimal register-machine interpreter.
//!
//! Program text is parsed by `regal_asm` and run by [`runtime::Machine`]
//! against a flat integer memory, producing the printed output as a string.

pub mod log;
pub mod runtime;

pub use regal_asm::{ParseError, ParsePolicy, Program};
pub use runtime::{InputSource, Machine, MachineConfig, NoInput, VMError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Runtime(#[from] VMError),
}

/// Parse and run program text with default settings.
pub fn execute_program<I: InputSource>(src: &str, input: I) -> Result<String, Error> {
    let program = regal_asm::parse(src)?;
    Ok(runtime::execute(&program, input)?)
}

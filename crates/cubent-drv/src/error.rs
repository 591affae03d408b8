//! Driver-level error taxonomy (spec §7), grounded on
//! `faxt/src/error.rs::FaxtError` — a flat `thiserror` enum covering
//! everything outside a single function's own diagnostics.
//!
//! `Compile` wraps [`CompileError`]'s `Io`/`Config` variants — the two
//! kinds that abort a compile before the Lexer/Parser/Emitter ever get a
//! [`cubent_util::Handler`] to report into.

use thiserror::Error;

use cubent_util::CompileError;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("{0}")]
    Compile(#[from] CompileError),

    #[error("compilation failed with {0} error(s)")]
    CompileFailed(usize),
}

impl DriverError {
    pub fn io(message: impl Into<String>) -> Self {
        DriverError::Compile(CompileError::Io { message: message.into() })
    }

    pub fn config(message: impl Into<String>) -> Self {
        DriverError::Compile(CompileError::Config { message: message.into() })
    }
}

pub type DriverResult<T> = std::result::Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_and_config_constructors_carry_the_right_compile_error_kind() {
        match DriverError::io("boom") {
            DriverError::Compile(CompileError::Io { message }) => assert_eq!(message, "boom"),
            other => panic!("expected Compile(Io), got {other:?}"),
        }
        match DriverError::config("bad version") {
            DriverError::Compile(CompileError::Config { message }) => assert_eq!(message, "bad version"),
            other => panic!("expected Compile(Config), got {other:?}"),
        }
    }
}

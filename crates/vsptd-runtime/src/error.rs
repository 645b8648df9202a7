//! Runtime error types

use thiserror::Error;
use vsptd_core::{CoreError, ErrorKind};
use vsptd_parser::ParseError;

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Invalid triplet data or failed lookup
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Malformed facts text or expression
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Type error
    #[error("Type error: {0}")]
    TypeError(String),

    /// Operator applied to operands it does not support
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Referenced fact not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input value
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Function outside the allow-list
    #[error("Unknown function: {0}")]
    UnknownFunction(String),
}

impl RuntimeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::Core(e) => e.kind(),
            RuntimeError::Parse(e) => e.kind(),
            RuntimeError::TypeError(_) | RuntimeError::InvalidOperation(_) => ErrorKind::Type,
            RuntimeError::NotFound(_) | RuntimeError::UnknownFunction(_) => ErrorKind::NotFound,
            RuntimeError::InvalidValue(_) | RuntimeError::DivisionByZero => ErrorKind::Value,
        }
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

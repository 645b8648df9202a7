//! Parser error types

use thiserror::Error;
use vsptd_core::{CoreError, ErrorKind};

/// Parser error
#[derive(Error, Debug)]
pub enum ParseError {
    /// Invalid triplet data found while parsing
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Regex built from the settings delimiters failed to compile
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Invalid expression syntax
    #[error("Syntax error at {position}: {message}")]
    Syntax { position: usize, message: String },

    /// Expression ended where more input was expected
    #[error("Unexpected end of expression: {0}")]
    UnexpectedEnd(String),

    /// Invalid operator
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Core(e) => e.kind(),
            ParseError::Pattern(_) => ErrorKind::Settings,
            ParseError::Syntax { .. }
            | ParseError::UnexpectedEnd(_)
            | ParseError::InvalidOperator(_) => ErrorKind::Syntax,
        }
    }

    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            position,
            message: message.into(),
        }
    }
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;

//! Error types for VSPTD Core

use thiserror::Error;

/// Coarse classification shared by the errors of every VSPTD crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A value of a kind that is not accepted in its role
    Type,
    /// Text that does not match its configured pattern or any known grammar
    Format,
    /// Text whose length is outside the configured bounds
    Length,
    /// An invalid combination of otherwise well-formed inputs
    Value,
    /// A lookup that produced nothing
    NotFound,
    /// A position outside the collection
    Index,
    /// Malformed expression syntax
    Syntax,
    /// An unusable settings document
    Settings,
}

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Type error: {field} must be one of [{expected}], not {actual}")]
    Type {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Format error: {field} '{value}' has an invalid format")]
    Format { field: String, value: String },

    #[error("Length error: {field} length must be from {min} to {max}, not {actual}")]
    Length {
        field: String,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Index out of range: {index} (length {len})")]
    Index { index: String, len: usize },

    #[error("Settings error: {0}")]
    Settings(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Type { .. } => ErrorKind::Type,
            CoreError::Format { .. } => ErrorKind::Format,
            CoreError::Length { .. } => ErrorKind::Length,
            CoreError::InvalidValue(_) => ErrorKind::Value,
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::Index { .. } => ErrorKind::Index,
            CoreError::Settings(_) => ErrorKind::Settings,
        }
    }
}

impl From<serde_yaml::Error> for CoreError {
    fn from(e: serde_yaml::Error) -> Self {
        CoreError::Settings(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Settings(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

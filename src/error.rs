use std::io;
use thiserror::Error;

use crate::field_type::FieldKind;

/// Error type for CSV loading operations.
#[derive(Error, Debug)]
pub enum ReadError {
    /// IO error on the underlying byte source.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The line codec could not tokenize a physical line.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// A single field could not be coerced to its declared type.
    #[error("column {column} ({name}, {kind}): {source}")]
    Field {
        /// Zero-based column index within the row.
        column: usize,
        /// Header name the column was bound to.
        name: String,
        /// The declared target type.
        kind: FieldKind,
        /// The underlying coercion failure.
        source: CoerceError,
    },

    /// A row carried fewer fields than there are header bindings.
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    /// Failure from a caller-supplied row converter.
    #[error("row conversion: {source}")]
    Convert { source: CoerceError },

    /// A row-level failure, attributed to the 1-based physical line
    /// reported by the line codec.
    #[error("line {line}: {source}")]
    Row { line: u64, source: Box<ReadError> },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ReadError {
    /// Wrap this error as a row-level failure at the given physical line.
    pub(crate) fn at_line(self, line: u64) -> Self {
        ReadError::Row {
            line,
            source: Box::new(self),
        }
    }

    /// The physical line number, for row-level failures.
    pub fn line(&self) -> Option<u64> {
        match self {
            ReadError::Row { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Failure to convert one raw text field into a typed value.
#[derive(Error, Debug)]
pub enum CoerceError {
    /// Integer parse failure.
    #[error("invalid integer {value:?}: {source}")]
    Int {
        value: String,
        source: std::num::ParseIntError,
    },

    /// Floating point parse failure.
    #[error("invalid float {value:?}: {source}")]
    Float {
        value: String,
        source: std::num::ParseFloatError,
    },

    /// Date, date-time, or time-of-day parse failure.
    #[error("invalid temporal value {value:?}: {source}")]
    Temporal {
        value: String,
        source: chrono::ParseError,
    },

    /// An assignment received a value of the wrong shape.
    #[error("expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Failure from a caller-supplied parser or converter.
    #[error("{0}")]
    Custom(String),
}

/// Result type alias for loading operations.
pub type Result<T> = std::result::Result<T, ReadError>;

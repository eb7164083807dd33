//! Error types for buffer transforms.

use std::num::ParseIntError;
use thiserror::Error;

/// Errors that can occur while transforming a buffer.
#[derive(Error, Debug)]
pub enum TransformError {
    /// A field is not a base-10 integer.
    #[error("line {line}, column {column}: cannot parse '{field}' as an integer")]
    ParseFailed {
        line: u64,
        column: usize,
        field: String,
        #[source]
        source: ParseIntError,
    },

    /// A row has a different number of fields than the first row.
    #[error("line {line}: expected {expected} fields but found {found}")]
    ShapeMismatch {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// A column sum does not fit in a 64-bit integer.
    #[error("column {column}: sum overflows a 64-bit integer")]
    Overflow { column: usize },

    /// The input could not be split into records (e.g. invalid UTF-8).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Failure reported by a caller-supplied transform.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

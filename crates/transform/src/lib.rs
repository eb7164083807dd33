//! Buffer transforms for block-ingest
//!
//! A [`Transform`] turns the fully assembled input buffer into the bytes
//! written to the output file. Transforms are pure and synchronous: they see
//! only the buffer and never perform I/O.
//!
//! # Bundled transforms
//!
//! - [`ColumnSum`]: rows of delimited integers in, one row of per-column sums out
//! - [`Passthrough`]: output equals input
//!
//! Any `Fn(&[u8]) -> Result<Vec<u8>, TransformError>` is also a transform:
//!
//! ```
//! use block_ingest_transform::{Transform, TransformError};
//!
//! let upper = |input: &[u8]| -> Result<Vec<u8>, TransformError> {
//!     Ok(input.to_ascii_uppercase())
//! };
//! assert_eq!(upper.apply(b"abc").unwrap(), b"ABC");
//! ```

mod column_sum;
pub mod error;

pub use column_sum::ColumnSum;
pub use error::TransformError;

/// A pure function from the assembled input buffer to the output buffer
pub trait Transform: Send + Sync {
    /// Short name used in log output
    fn name(&self) -> &str {
        "custom"
    }

    fn apply(&self, input: &[u8]) -> Result<Vec<u8>, TransformError>;
}

impl<F> Transform for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>, TransformError> + Send + Sync,
{
    fn apply(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        self(input)
    }
}

/// Copies the input buffer to the output unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Transform for Passthrough {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn apply(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        Ok(input.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough() {
        assert_eq!(Passthrough.apply(b"1,2\n3,4").unwrap(), b"1,2\n3,4");
        assert_eq!(Passthrough.apply(b"").unwrap(), b"");
    }

    #[test]
    fn test_closure_transform() {
        let reverse = |input: &[u8]| -> Result<Vec<u8>, TransformError> {
            Ok(input.iter().rev().copied().collect())
        };
        assert_eq!(reverse.apply(b"abc").unwrap(), b"cba");
        assert_eq!(reverse.name(), "custom");
    }

    #[test]
    fn test_closure_error_propagates() {
        let failing = |_: &[u8]| -> Result<Vec<u8>, TransformError> {
            Err(anyhow::anyhow!("not today").into())
        };
        let err = failing.apply(b"x").unwrap_err();
        assert!(matches!(err, TransformError::Other(_)));
        assert_eq!(err.to_string(), "not today");
    }

    #[test]
    fn test_boxed_transform_keeps_name() {
        let boxed: Box<dyn Transform> = Box::new(ColumnSum::new());
        assert_eq!(boxed.name(), "column-sum");
        assert_eq!(boxed.apply(b"1,2\n3,4").unwrap(), b"4,6");
    }
}
